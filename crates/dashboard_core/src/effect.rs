use std::path::PathBuf;

use crate::{FileId, PollTicket};

/// Work the core asks the engine to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Poll the ticket's job, replacing any running poll.
    StartPolling { ticket: PollTicket },
    StopPolling,
    InitiateDownload { file_ids: Vec<FileId> },
    UploadFiles { files: Vec<PathBuf> },
}
