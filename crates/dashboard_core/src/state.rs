use std::path::PathBuf;

use dashboard_logging::{dashboard_debug, dashboard_info};

use crate::input::join_file_ids;
use crate::view_model::{
    AppViewModel, HealthView, JobDetailView, JobRowView, ResultLinkView, UploadRowView,
};
use crate::{HealthReport, JobId, JobRegistry, JobSnapshot, RegistryError, UploadedFile};

pub const DEFAULT_FILE_IDS: &str = "70000,70001,70002";

/// Identifies one poll loop. Results carrying any other ticket are stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PollTicket {
    pub job_id: JobId,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Local input problem; nothing was sent.
    Validation,
    /// The upload or download service rejected or failed a request.
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Validation,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    registry: JobRegistry,
    selected: Option<JobId>,
    detail: Option<JobSnapshot>,
    poll: Option<PollTicket>,
    next_generation: u64,
    health: Option<HealthReport>,
    uploads: Vec<UploadedFile>,
    chosen_files: Vec<PathBuf>,
    file_ids_input: String,
    uploading: bool,
    initiating: bool,
    notice: Option<Notice>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_file_ids(DEFAULT_FILE_IDS)
    }

    /// Fresh session whose file-id input starts out as `file_ids`.
    pub fn with_file_ids(file_ids: impl Into<String>) -> Self {
        Self {
            registry: JobRegistry::new(),
            selected: None,
            detail: None,
            poll: None,
            next_generation: 1,
            health: None,
            uploads: Vec::new(),
            chosen_files: Vec::new(),
            file_ids_input: file_ids.into(),
            uploading: false,
            initiating: false,
            notice: None,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let jobs = self
            .registry
            .list_recent()
            .iter()
            .map(|job| JobRowView {
                job_id: job.job_id.clone(),
                short_id: job.job_id.chars().take(8).collect(),
                status: job.status.clone(),
                progress: job.progress,
                selected: self.selected.as_deref() == Some(job.job_id.as_str()),
            })
            .collect::<Vec<_>>();

        AppViewModel {
            health: self.health.as_ref().map(|report| HealthView {
                status: report.status.to_uppercase(),
                healthy: report.is_healthy(),
                storage: report
                    .storage
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
            }),
            uploads: self
                .uploads
                .iter()
                .map(|file| UploadRowView {
                    file_id: file.file_id,
                    file_name: file.file_name.clone(),
                    uploaded_at_ms: file.uploaded_at_ms,
                })
                .collect(),
            chosen_files: self
                .chosen_files
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
            uploading: self.uploading,
            file_ids_input: self.file_ids_input.clone(),
            initiating: self.initiating,
            job_count: jobs.len(),
            jobs,
            selected_job_id: self.selected.clone(),
            detail: self.detail.as_ref().map(detail_view),
            polling: self.poll.is_some(),
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn selected_job_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn detail(&self) -> Option<&JobSnapshot> {
        self.detail.as_ref()
    }

    pub fn poll_ticket(&self) -> Option<&PollTicket> {
        self.poll.as_ref()
    }

    pub fn is_polling(&self) -> bool {
        self.poll.is_some()
    }

    pub fn health(&self) -> Option<&HealthReport> {
        self.health.as_ref()
    }

    pub fn uploads(&self) -> &[UploadedFile] {
        &self.uploads
    }

    pub fn chosen_files(&self) -> &[PathBuf] {
        &self.chosen_files
    }

    pub fn file_ids_input(&self) -> &str {
        &self.file_ids_input
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn is_initiating(&self) -> bool {
        self.initiating
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.mark_dirty();
    }

    pub(crate) fn clear_notice(&mut self) {
        if self.notice.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_health(&mut self, report: Option<HealthReport>) {
        if self.health != report {
            self.health = report;
            self.mark_dirty();
        }
    }

    pub(crate) fn choose_files(&mut self, files: Vec<PathBuf>) {
        self.chosen_files = files;
        self.notice = None;
        self.mark_dirty();
    }

    pub(crate) fn begin_upload(&mut self) {
        self.uploading = true;
        self.notice = None;
        self.mark_dirty();
    }

    /// Newly uploaded files go to the front, keeping the batch's own order.
    pub(crate) fn finish_upload(&mut self, records: Vec<UploadedFile>) {
        self.uploading = false;
        self.file_ids_input = join_file_ids(&records);
        let mut uploads = records;
        uploads.append(&mut self.uploads);
        self.uploads = uploads;
        self.chosen_files.clear();
        self.mark_dirty();
    }

    pub(crate) fn fail_upload(&mut self, notice: Notice) {
        self.uploading = false;
        self.set_notice(notice);
    }

    pub(crate) fn set_file_ids_input(&mut self, input: String) {
        self.file_ids_input = input;
        self.mark_dirty();
    }

    pub(crate) fn begin_initiating(&mut self) {
        self.initiating = true;
        self.notice = None;
        self.mark_dirty();
    }

    pub(crate) fn finish_initiating(&mut self) {
        self.initiating = false;
        self.mark_dirty();
    }

    /// Admit a freshly created job. The selected job is never the one evicted.
    pub(crate) fn admit_job(&mut self, snapshot: JobSnapshot) -> Result<(), RegistryError> {
        let evicted = self.registry.admit(snapshot, self.selected.as_deref())?;
        if let Some(job_id) = evicted {
            dashboard_info!("Evicted job {} from recent jobs", job_id);
        }
        self.mark_dirty();
        Ok(())
    }

    /// Select `job_id`, showing the registry's snapshot when one is known.
    pub(crate) fn set_selection(&mut self, job_id: JobId) {
        self.detail = self.registry.get(&job_id).cloned();
        self.selected = Some(job_id);
        self.mark_dirty();
    }

    pub(crate) fn clear_selection(&mut self) {
        if self.selected.is_some() || self.detail.is_some() {
            self.selected = None;
            self.detail = None;
            self.mark_dirty();
        }
    }

    /// Bind polling to `job_id` under a new generation.
    pub(crate) fn begin_poll(&mut self, job_id: JobId) -> PollTicket {
        let ticket = PollTicket {
            job_id,
            generation: self.next_generation,
        };
        self.next_generation += 1;
        self.poll = Some(ticket.clone());
        self.mark_dirty();
        ticket
    }

    /// Returns whether a poll was active.
    pub(crate) fn end_poll(&mut self) -> bool {
        let was_polling = self.poll.take().is_some();
        if was_polling {
            self.mark_dirty();
        }
        was_polling
    }

    /// The polled id wins over whatever id the body carried.
    pub(crate) fn apply_poll_result(&mut self, job_id: &str, mut snapshot: JobSnapshot) {
        if snapshot.job_id != job_id {
            dashboard_debug!(
                "Poll result for {} reported id {:?}",
                job_id,
                snapshot.job_id
            );
            snapshot.job_id = job_id.to_owned();
        }
        self.registry.reconcile(job_id, snapshot.clone());
        if self.selected.as_deref() == Some(job_id) {
            self.detail = Some(snapshot);
        }
        self.mark_dirty();
    }
}

fn detail_view(job: &JobSnapshot) -> JobDetailView {
    JobDetailView {
        job_id: job.job_id.clone(),
        status: job.status.clone(),
        progress: job.progress,
        processed: job.processed,
        total: job.total,
        links: job
            .result_urls
            .iter()
            .flatten()
            .enumerate()
            .map(|(index, url)| ResultLinkView {
                index,
                url: url.clone(),
            })
            .collect(),
        error: job.error.clone(),
    }
}
