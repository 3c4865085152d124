use std::path::PathBuf;

use crate::{HealthReport, InitiatedJob, JobId, JobSnapshot, PollTicket, UploadedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked the set of files to upload.
    FilesChosen(Vec<PathBuf>),
    /// User asked to upload the chosen files.
    UploadClicked,
    /// Upload service answered; `Err` carries a displayable reason.
    UploadFinished(Result<Vec<UploadedFile>, String>),
    /// User edited the file-id input.
    FileIdsChanged(String),
    /// User asked to create a download job from the file-id input.
    StartDownloadClicked,
    /// Download service answered the job creation request.
    DownloadInitiated(Result<InitiatedJob, String>),
    /// User selected a job for the detail panel.
    JobSelected { job_id: JobId },
    /// User asked to refresh the selected job once.
    RefreshSelected,
    /// User closed the detail panel.
    ClearSelection,
    /// One successful poll tick.
    JobPolled {
        ticket: PollTicket,
        snapshot: JobSnapshot,
    },
    /// Health check result; `None` when the check failed.
    HealthChecked(Option<HealthReport>),
    /// User acknowledged the current notice.
    DismissNotice,
    /// Fallback for placeholder wiring.
    NoOp,
}
