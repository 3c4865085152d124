use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::{Context, Result};
use dashboard_core::{
    Effect, HealthReport, InitiatedJob, JobSnapshot, JobStatus, Msg, PollTicket, UploadedFile,
};
use dashboard_engine::{
    ChannelEventSink, EngineEvent, EngineHandle, EngineSettings, HealthBody, InitiateBody,
    JobStatusBody, PollTarget, UploadedFileBody,
};
use dashboard_logging::{dashboard_debug, dashboard_info, dashboard_warn};

use super::app::Input;

/// Forwards core effects to the engine.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: EngineSettings, input_tx: mpsc::Sender<Input>) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel();
        let engine = EngineHandle::new(settings, Arc::new(ChannelEventSink::new(event_tx)))
            .context("starting engine")?;
        spawn_event_loop(event_rx, input_tx);
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartPolling { ticket } => {
                    dashboard_info!(
                        "StartPolling job_id={} generation={}",
                        ticket.job_id,
                        ticket.generation
                    );
                    self.engine.start_polling(PollTarget {
                        job_id: ticket.job_id,
                        generation: ticket.generation,
                    });
                }
                Effect::StopPolling => {
                    dashboard_debug!("StopPolling");
                    self.engine.stop_polling();
                }
                Effect::InitiateDownload { file_ids } => {
                    dashboard_info!("InitiateDownload file_ids={:?}", file_ids);
                    self.engine.initiate(file_ids);
                }
                Effect::UploadFiles { files } => {
                    dashboard_info!("UploadFiles count={}", files.len());
                    self.engine.upload(files);
                }
            }
        }
    }
}

/// Turns engine events into core messages on the app's input channel.
/// Ends when either side of the bridge is gone.
fn spawn_event_loop(event_rx: mpsc::Receiver<EngineEvent>, input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        for event in event_rx {
            if input_tx.send(Input::Engine(map_event(event))).is_err() {
                break;
            }
        }
        dashboard_debug!("Engine event loop finished");
    });
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::JobPolled { target, status } => Msg::JobPolled {
            ticket: PollTicket {
                job_id: target.job_id,
                generation: target.generation,
            },
            snapshot: map_status(status),
        },
        EngineEvent::HealthChecked(body) => Msg::HealthChecked(body.map(map_health)),
        EngineEvent::DownloadInitiated(result) => Msg::DownloadInitiated(match result {
            Ok(body) => Ok(map_initiated(body)),
            Err(err) => {
                dashboard_warn!("Initiate failed ({}): {}", err.kind, err);
                Err(err.to_string())
            }
        }),
        EngineEvent::UploadCompleted(result) => Msg::UploadFinished(match result {
            Ok(files) => Ok(files.into_iter().map(map_uploaded).collect()),
            Err(err) => {
                dashboard_warn!("Upload failed ({}): {}", err.kind, err);
                Err(err.to_string())
            }
        }),
    }
}

fn map_status(body: JobStatusBody) -> JobSnapshot {
    JobSnapshot {
        status: JobStatus::parse(&body.status),
        job_id: body.job_id,
        progress: body.progress,
        processed: body.processed,
        total: body.total,
        result_urls: body.result_urls,
        error: body.error,
    }
}

fn map_health(body: HealthBody) -> HealthReport {
    HealthReport {
        status: body.status,
        storage: body.checks.storage,
    }
}

fn map_initiated(body: InitiateBody) -> InitiatedJob {
    InitiatedJob {
        status: JobStatus::parse(&body.status),
        job_id: body.job_id,
        total_file_ids: body.total_file_ids,
    }
}

fn map_uploaded(body: UploadedFileBody) -> UploadedFile {
    UploadedFile {
        file_id: body.file_id,
        file_name: body.file_name,
        uploaded_at_ms: body.uploaded_at as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_engine::{EventSink, FailureKind, HealthChecks, ServiceError};
    use pretty_assertions::assert_eq;

    #[test]
    fn event_loop_forwards_engine_events_as_messages() {
        let (event_tx, event_rx) = mpsc::channel();
        let (input_tx, input_rx) = mpsc::channel();
        spawn_event_loop(event_rx, input_tx);

        let sink = ChannelEventSink::new(event_tx);
        sink.emit(EngineEvent::HealthChecked(None));
        drop(sink);

        match input_rx.recv_timeout(std::time::Duration::from_secs(2)) {
            Ok(Input::Engine(msg)) => assert_eq!(msg, Msg::HealthChecked(None)),
            _ => panic!("expected an engine message"),
        }
        // The loop ends once the sink is dropped.
        assert!(input_rx.recv_timeout(std::time::Duration::from_secs(2)).is_err());
    }

    #[test]
    fn polled_status_keeps_ticket_and_unknown_status() {
        let msg = map_event(EngineEvent::JobPolled {
            target: PollTarget {
                job_id: "abc".to_string(),
                generation: 3,
            },
            status: JobStatusBody {
                job_id: "abc".to_string(),
                status: "paused".to_string(),
                progress: 40,
                processed: 1,
                total: 3,
                result_urls: Some(vec![Some("u1".to_string()), None, None]),
                error: None,
            },
        });

        assert_eq!(
            msg,
            Msg::JobPolled {
                ticket: PollTicket {
                    job_id: "abc".to_string(),
                    generation: 3,
                },
                snapshot: JobSnapshot {
                    job_id: "abc".to_string(),
                    status: JobStatus::Other("paused".to_string()),
                    progress: 40,
                    processed: 1,
                    total: 3,
                    result_urls: Some(vec![Some("u1".to_string()), None, None]),
                    error: None,
                },
            }
        );
    }

    #[test]
    fn failures_become_display_text() {
        let msg = map_event(EngineEvent::DownloadInitiated(Err(ServiceError {
            kind: FailureKind::HttpStatus(500),
            message: "500 Internal Server Error".to_string(),
        })));
        assert_eq!(
            msg,
            Msg::DownloadInitiated(Err("500 Internal Server Error".to_string()))
        );
    }

    #[test]
    fn health_and_uploads_are_mapped() {
        assert_eq!(
            map_event(EngineEvent::HealthChecked(Some(HealthBody {
                status: "healthy".to_string(),
                checks: HealthChecks {
                    storage: Some("ok".to_string()),
                },
            }))),
            Msg::HealthChecked(Some(HealthReport {
                status: "healthy".to_string(),
                storage: Some("ok".to_string()),
            }))
        );
        assert_eq!(
            map_event(EngineEvent::HealthChecked(None)),
            Msg::HealthChecked(None)
        );

        assert_eq!(
            map_event(EngineEvent::UploadCompleted(Ok(vec![UploadedFileBody {
                file_id: 70000,
                file_name: "a.txt".to_string(),
                uploaded_at: 1_700_000_000_500.0,
            }]))),
            Msg::UploadFinished(Ok(vec![UploadedFile {
                file_id: 70000,
                file_name: "a.txt".to_string(),
                uploaded_at_ms: 1_700_000_000_500,
            }]))
        );
    }
}
