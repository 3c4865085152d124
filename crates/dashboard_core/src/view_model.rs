use crate::{FileId, JobId, JobStatus, Notice};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    /// `None` until the first successful check, and again after a failed one.
    pub health: Option<HealthView>,
    pub uploads: Vec<UploadRowView>,
    pub chosen_files: Vec<String>,
    pub uploading: bool,
    pub file_ids_input: String,
    pub initiating: bool,
    pub job_count: usize,
    pub jobs: Vec<JobRowView>,
    pub selected_job_id: Option<JobId>,
    pub detail: Option<JobDetailView>,
    pub polling: bool,
    pub notice: Option<Notice>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthView {
    pub status: String,
    pub healthy: bool,
    pub storage: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRowView {
    pub file_id: FileId,
    pub file_name: String,
    pub uploaded_at_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub short_id: String,
    pub status: JobStatus,
    pub progress: u32,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDetailView {
    pub job_id: JobId,
    pub status: JobStatus,
    pub progress: u32,
    pub processed: u64,
    pub total: u64,
    pub links: Vec<ResultLinkView>,
    pub error: Option<String>,
}

impl JobDetailView {
    pub fn available_links(&self) -> impl Iterator<Item = &str> {
        self.links.iter().filter_map(|link| link.url.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLinkView {
    pub index: usize,
    /// `None` while the file has no download URL.
    pub url: Option<String>,
}
