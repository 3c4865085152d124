use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use dashboard_logging::{dashboard_error, dashboard_info};
use tokio::runtime::Runtime;

use crate::health::{HealthMonitor, DEFAULT_HEALTH_INTERVAL};
use crate::poller::{Poller, DEFAULT_POLL_INTERVAL};
use crate::service::{DownloadService, ReqwestDownloadService, ServiceSettings, UploadFile};
use crate::{EngineEvent, EventSink, FailureKind, PollTarget, ServiceError, UploadedFileBody};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub service: ServiceSettings,
    pub poll_interval: Duration,
    pub health_interval: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            service: ServiceSettings::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            health_interval: DEFAULT_HEALTH_INTERVAL,
        }
    }
}

enum EngineCommand {
    StartPolling(PollTarget),
    StopPolling,
    Initiate { file_ids: Vec<u64> },
    Upload { files: Vec<PathBuf> },
}

/// Runs the service client, the poller and the health monitor on a
/// dedicated runtime thread. Results are delivered to the sink.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings, sink: Arc<dyn EventSink>) -> Result<Self, ServiceError> {
        let service = Arc::new(ReqwestDownloadService::new(settings.service)?);
        Self::with_service(
            service,
            sink,
            settings.poll_interval,
            settings.health_interval,
        )
    }

    /// Start the engine thread. Returns once its runtime is up, or with a
    /// `FailureKind::Runtime` error when it could not be started.
    pub fn with_service(
        service: Arc<dyn DownloadService>,
        sink: Arc<dyn EventSink>,
        poll_interval: Duration,
        health_interval: Duration,
    ) -> Result<Self, ServiceError> {
        Self::spawn(
            service,
            sink,
            poll_interval,
            health_interval,
            Runtime::new,
        )
    }

    fn spawn<B>(
        service: Arc<dyn DownloadService>,
        sink: Arc<dyn EventSink>,
        poll_interval: Duration,
        health_interval: Duration,
        build_runtime: B,
    ) -> Result<Self, ServiceError>
    where
        B: FnOnce() -> io::Result<Runtime> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), String>>(1);

        thread::spawn(move || {
            let runtime = match build_runtime() {
                Ok(runtime) => runtime,
                Err(err) => {
                    dashboard_error!("Could not start engine runtime: {}", err);
                    let _ = ready_tx.send(Err(err.to_string()));
                    return;
                }
            };
            let _health = HealthMonitor::spawn(
                service.clone(),
                sink.clone(),
                health_interval,
                runtime.handle(),
            );
            let mut poller = Poller::new(
                service.clone(),
                sink.clone(),
                poll_interval,
                runtime.handle().clone(),
            );
            let _ = ready_tx.send(Ok(()));

            while let Ok(command) = cmd_rx.recv() {
                handle_command(&runtime, &mut poller, &service, &sink, command);
            }
            dashboard_info!("Engine command channel closed, shutting down");
        });

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { cmd_tx }),
            Ok(Err(message)) => Err(ServiceError::new(FailureKind::Runtime, message)),
            Err(_) => Err(ServiceError::new(
                FailureKind::Runtime,
                "engine thread exited during startup",
            )),
        }
    }

    pub fn start_polling(&self, target: PollTarget) {
        let _ = self.cmd_tx.send(EngineCommand::StartPolling(target));
    }

    pub fn stop_polling(&self) {
        let _ = self.cmd_tx.send(EngineCommand::StopPolling);
    }

    pub fn initiate(&self, file_ids: Vec<u64>) {
        let _ = self.cmd_tx.send(EngineCommand::Initiate { file_ids });
    }

    pub fn upload(&self, files: Vec<PathBuf>) {
        let _ = self.cmd_tx.send(EngineCommand::Upload { files });
    }
}

fn handle_command(
    runtime: &Runtime,
    poller: &mut Poller,
    service: &Arc<dyn DownloadService>,
    sink: &Arc<dyn EventSink>,
    command: EngineCommand,
) {
    match command {
        EngineCommand::StartPolling(target) => poller.start(target),
        EngineCommand::StopPolling => poller.stop(),
        EngineCommand::Initiate { file_ids } => {
            let service = service.clone();
            let sink = sink.clone();
            runtime.spawn(async move {
                let result = service.initiate(&file_ids).await;
                sink.emit(EngineEvent::DownloadInitiated(result));
            });
        }
        EngineCommand::Upload { files } => {
            let service = service.clone();
            let sink = sink.clone();
            runtime.spawn(async move {
                let result = upload_paths(service.as_ref(), &files).await;
                sink.emit(EngineEvent::UploadCompleted(result));
            });
        }
    }
}

/// Read every file, then send them in a single request. One unreadable file
/// fails the whole upload.
pub async fn upload_paths(
    service: &dyn DownloadService,
    paths: &[PathBuf],
) -> Result<Vec<UploadedFileBody>, ServiceError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(UploadFile::read(path).await?);
    }
    service.upload(files).await
}
