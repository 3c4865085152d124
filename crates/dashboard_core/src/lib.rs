//! Dashboard core: pure job-tracking state machine and view-model helpers.
mod effect;
mod input;
mod job;
mod msg;
mod registry;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use input::parse_file_ids;
pub use job::{FileId, HealthReport, InitiatedJob, JobId, JobSnapshot, JobStatus, UploadedFile};
pub use msg::Msg;
pub use registry::{JobRegistry, RegistryError, REGISTRY_CAPACITY};
pub use state::{AppState, Notice, NoticeKind, PollTicket, DEFAULT_FILE_IDS};
pub use update::update;
pub use view_model::{
    AppViewModel, HealthView, JobDetailView, JobRowView, ResultLinkView, UploadRowView,
};
