use std::sync::Arc;
use std::time::Duration;

use dashboard_logging::dashboard_warn;
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{DownloadService, EngineEvent, EventSink};

pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_millis(5000);

/// Checks service health immediately and then on a fixed interval until
/// stopped or dropped. A failed check is reported as `HealthChecked(None)`.
pub struct HealthMonitor {
    cancel: CancellationToken,
}

impl HealthMonitor {
    pub fn spawn(
        service: Arc<dyn DownloadService>,
        sink: Arc<dyn EventSink>,
        interval: Duration,
        runtime: &Handle,
    ) -> Self {
        let cancel = CancellationToken::new();
        runtime.spawn(health_loop(
            service,
            sink,
            interval.max(Duration::from_millis(1)),
            cancel.clone(),
        ));
        Self { cancel }
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn health_loop(
    service: Arc<dyn DownloadService>,
    sink: Arc<dyn EventSink>,
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
            result = service.health() => result,
        };

        let report = match result {
            Ok(report) => Some(report),
            Err(err) => {
                dashboard_warn!("Health check failed ({}): {}", err.kind, err.message);
                None
            }
        };
        sink.emit(EngineEvent::HealthChecked(report));
    }
}
