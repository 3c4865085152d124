//! Dashboard engine: service client, job poller and health monitor.
mod engine;
mod health;
mod poller;
mod service;
mod sink;
mod types;

pub use engine::{upload_paths, EngineHandle, EngineSettings};
pub use health::{HealthMonitor, DEFAULT_HEALTH_INTERVAL};
pub use poller::{Poller, DEFAULT_POLL_INTERVAL};
pub use service::{DownloadService, ReqwestDownloadService, ServiceSettings, UploadFile};
pub use sink::{ChannelEventSink, EventSink};
pub use types::{
    EngineEvent, FailureKind, HealthBody, HealthChecks, InitiateBody, JobStatusBody, PollTarget,
    ServiceError, UploadedFileBody,
};
