use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One poll loop: the job it watches and the generation it was started under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PollTarget {
    pub job_id: String,
    pub generation: u64,
}

/// Body of `GET /v1/download/status/{jobId}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusBody {
    /// Some servers omit it; the poller knows which job it asked for.
    #[serde(default)]
    pub job_id: String,
    pub status: String,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub result_urls: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobStatusBody {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "ready" | "failed")
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct InitiateRequest<'a> {
    pub file_ids: &'a [u64],
}

/// Body of `POST /v1/download/initiate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateBody {
    pub job_id: String,
    pub status: String,
    pub total_file_ids: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct UploadResponseBody {
    pub files: Vec<UploadedFileBody>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileBody {
    pub file_id: u64,
    pub file_name: String,
    /// Milliseconds since the Unix epoch, as a JSON number.
    pub uploaded_at: f64,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthBody {
    pub status: String,
    #[serde(default)]
    pub checks: HealthChecks,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct HealthChecks {
    #[serde(default)]
    pub storage: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A successful poll tick. Failed ticks produce no event.
    JobPolled {
        target: PollTarget,
        status: JobStatusBody,
    },
    /// `None` when the health check failed.
    HealthChecked(Option<HealthBody>),
    DownloadInitiated(Result<InitiateBody, ServiceError>),
    UploadCompleted(Result<Vec<UploadedFileBody>, ServiceError>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    Io,
    /// The engine's async runtime could not be started.
    Runtime,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response body"),
            FailureKind::Io => write!(f, "file error"),
            FailureKind::Runtime => write!(f, "engine runtime error"),
        }
    }
}
