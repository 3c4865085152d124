mod common;

use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use common::{init_logging, status_body, FakeService};
use dashboard_engine::{ChannelEventSink, EngineEvent, EngineHandle, PollTarget};
use pretty_assertions::assert_eq;

const HOUR: Duration = Duration::from_secs(3600);

fn engine_with(
    service: Arc<FakeService>,
    health_interval: Duration,
) -> (EngineHandle, mpsc::Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel();
    let engine = EngineHandle::with_service(
        service,
        Arc::new(ChannelEventSink::new(tx)),
        Duration::from_millis(20),
        health_interval,
    )
    .expect("engine");
    (engine, rx)
}

/// Next event accepted by `pick`, skipping everything else.
fn next_matching<T>(
    rx: &mpsc::Receiver<EngineEvent>,
    mut pick: impl FnMut(EngineEvent) -> Option<T>,
) -> Option<T> {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let remaining = deadline.checked_duration_since(Instant::now())?;
        let event = rx.recv_timeout(remaining).ok()?;
        if let Some(found) = pick(event) {
            return Some(found);
        }
    }
}

#[test]
fn health_is_reported_on_start() {
    init_logging();
    let (_engine, rx) = engine_with(
        Arc::new(FakeService::new(|_, id| Ok(status_body(id, "queued", 0)))),
        HOUR,
    );

    let health = next_matching(&rx, |event| match event {
        EngineEvent::HealthChecked(report) => Some(report),
        _ => None,
    })
    .expect("health event");

    let report = health.expect("healthy report");
    assert_eq!(report.status, "healthy");
    assert_eq!(report.checks.storage.as_deref(), Some("ok"));
}

#[test]
fn failed_health_checks_repeat_as_unknown() {
    init_logging();
    let (_engine, rx) = engine_with(
        Arc::new(FakeService::new(|_, id| Ok(status_body(id, "queued", 0))).unhealthy()),
        Duration::from_millis(20),
    );

    for _ in 0..3 {
        let health = next_matching(&rx, |event| match event {
            EngineEvent::HealthChecked(report) => Some(report),
            _ => None,
        })
        .expect("health event");
        assert_eq!(health, None);
    }
}

#[test]
fn initiate_reports_the_created_job() {
    init_logging();
    let (engine, rx) = engine_with(
        Arc::new(FakeService::new(|_, id| Ok(status_body(id, "queued", 0)))),
        HOUR,
    );

    engine.initiate(vec![70000, 70001, 70002]);

    let job = next_matching(&rx, |event| match event {
        EngineEvent::DownloadInitiated(result) => Some(result),
        _ => None,
    })
    .expect("initiate event")
    .expect("created");
    assert_eq!(job.job_id, "job-1");
    assert_eq!(job.total_file_ids, 3);
}

#[test]
fn polling_runs_until_the_job_is_ready() {
    init_logging();
    let service = Arc::new(FakeService::new(|call, id| {
        let status = if call < 2 { "processing" } else { "ready" };
        Ok(status_body(id, status, (call as u32 + 1) * 33))
    }));
    let (engine, rx) = engine_with(service.clone(), HOUR);

    engine.start_polling(PollTarget {
        job_id: "abc".to_string(),
        generation: 4,
    });

    let mut statuses: Vec<String> = Vec::new();
    while statuses.last().map(String::as_str) != Some("ready") {
        let status = next_matching(&rx, |event| match event {
            EngineEvent::JobPolled { target, status } => {
                assert_eq!(target.generation, 4);
                Some(status.status)
            }
            _ => None,
        })
        .expect("poll event");
        statuses.push(status);
    }
    std::thread::sleep(Duration::from_millis(100));

    assert_eq!(statuses, vec!["processing", "processing", "ready"]);
    assert_eq!(service.status_calls(), 3);
}

#[test]
fn stop_polling_halts_the_loop() {
    init_logging();
    let service = Arc::new(FakeService::new(|_, id| Ok(status_body(id, "processing", 5))));
    let (engine, rx) = engine_with(service.clone(), HOUR);

    engine.start_polling(PollTarget {
        job_id: "abc".to_string(),
        generation: 1,
    });
    next_matching(&rx, |event| match event {
        EngineEvent::JobPolled { .. } => Some(()),
        _ => None,
    })
    .expect("first tick");
    engine.stop_polling();

    std::thread::sleep(Duration::from_millis(60));
    let calls = service.status_calls();
    std::thread::sleep(Duration::from_millis(120));
    assert_eq!(service.status_calls(), calls);
}

#[test]
fn upload_reads_files_and_reports_records() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.txt");
    let second = dir.path().join("second.txt");
    std::fs::write(&first, "one").unwrap();
    std::fs::write(&second, "two").unwrap();
    let service = Arc::new(FakeService::new(|_, id| Ok(status_body(id, "queued", 0))));
    let (engine, rx) = engine_with(service.clone(), HOUR);

    engine.upload(vec![first, second]);

    let records = next_matching(&rx, |event| match event {
        EngineEvent::UploadCompleted(result) => Some(result),
        _ => None,
    })
    .expect("upload event")
    .expect("uploaded");
    let names = records
        .iter()
        .map(|record| record.file_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["first.txt", "second.txt"]);

    let sent = service.uploads();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0][1].bytes, b"two".to_vec());
}
