use std::sync::Arc;
use std::time::Duration;

use dashboard_logging::{dashboard_debug, dashboard_info};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{DownloadService, EngineEvent, EventSink, PollTarget};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2500);

/// Repeating status fetch for at most one job at a time.
///
/// The first request goes out as soon as a target is started, later ones on
/// a fixed cadence. A request is only issued once the previous tick has been
/// fully handled. Failed ticks are dropped silently; a terminal status ends
/// the loop after it has been emitted.
pub struct Poller {
    service: Arc<dyn DownloadService>,
    sink: Arc<dyn EventSink>,
    interval: Duration,
    runtime: Handle,
    active: Option<ActivePoll>,
}

struct ActivePoll {
    target: PollTarget,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Poller {
    pub fn new(
        service: Arc<dyn DownloadService>,
        sink: Arc<dyn EventSink>,
        interval: Duration,
        runtime: Handle,
    ) -> Self {
        Self {
            service,
            sink,
            interval: interval.max(Duration::from_millis(1)),
            runtime,
            active: None,
        }
    }

    /// Bind the poller to `target`, cancelling whatever it was polling before.
    pub fn start(&mut self, target: PollTarget) {
        self.stop();
        dashboard_info!(
            "Polling job {} (generation {}) every {:?}",
            target.job_id,
            target.generation,
            self.interval
        );

        let cancel = CancellationToken::new();
        let task = self.runtime.spawn(poll_loop(
            self.service.clone(),
            self.sink.clone(),
            target.clone(),
            self.interval,
            cancel.clone(),
        ));
        self.active = Some(ActivePoll {
            target,
            cancel,
            task,
        });
    }

    /// Cancel the pending tick and any request still in flight. Idempotent.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            dashboard_debug!(
                "Stopped polling job {} (generation {})",
                active.target.job_id,
                active.target.generation
            );
        }
    }

    /// The target whose loop is still running, if any.
    pub fn target(&self) -> Option<&PollTarget> {
        self.active
            .as_ref()
            .filter(|active| !active.task.is_finished())
            .map(|active| &active.target)
    }

    pub fn is_running(&self) -> bool {
        self.target().is_some()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    service: Arc<dyn DownloadService>,
    sink: Arc<dyn EventSink>,
    target: PollTarget,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = service.job_status(&target.job_id) => result,
        };

        match result {
            Ok(status) => {
                let terminal = status.is_terminal();
                sink.emit(EngineEvent::JobPolled {
                    target: target.clone(),
                    status,
                });
                if terminal {
                    dashboard_info!("Job {} is terminal, polling stopped", target.job_id);
                    break;
                }
            }
            Err(err) => {
                dashboard_debug!(
                    "Poll tick for job {} failed ({}): {}",
                    target.job_id,
                    err.kind,
                    err.message
                );
            }
        }
    }
}
