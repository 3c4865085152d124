use std::fmt;

pub type JobId = String;

/// Server-assigned identifier of an uploaded file.
pub type FileId = u64;

/// Lifecycle status reported by the download service.
///
/// Unrecognised values are kept verbatim and behave like `Processing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Processing,
    Ready,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "queued" => JobStatus::Queued,
            "processing" => JobStatus::Processing,
            "ready" => JobStatus::Ready,
            "failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Ready => "ready",
            JobStatus::Failed => "failed",
            JobStatus::Other(raw) => raw,
        }
    }

    /// Terminal jobs are never polled again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Ready | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The client's view of one job at the time it was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub job_id: JobId,
    pub status: JobStatus,
    /// Percentage as sent by the server. Not guaranteed monotonic or bounded.
    pub progress: u32,
    pub processed: u64,
    pub total: u64,
    /// One slot per file once results exist; `None` slots have no URL yet.
    pub result_urls: Option<Vec<Option<String>>>,
    pub error: Option<String>,
}

impl JobSnapshot {
    /// Snapshot for a job the service has just accepted.
    pub fn created(job_id: impl Into<JobId>, status: JobStatus, total: u64) -> Self {
        Self {
            job_id: job_id.into(),
            status,
            progress: 0,
            processed: 0,
            total,
            result_urls: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Acknowledgement returned when a download job is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiatedJob {
    pub job_id: JobId,
    pub status: JobStatus,
    pub total_file_ids: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_id: FileId,
    pub file_name: String,
    /// Milliseconds since the Unix epoch.
    pub uploaded_at_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub status: String,
    pub storage: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
