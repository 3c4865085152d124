#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashboard_engine::{
    DownloadService, EngineEvent, EventSink, FailureKind, HealthBody, HealthChecks, InitiateBody,
    JobStatusBody, ServiceError, UploadFile, UploadedFileBody,
};

pub fn init_logging() {
    dashboard_logging::initialize_for_tests();
}

#[derive(Default, Clone)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Job ids of every `JobPolled` event so far.
    pub fn polled_jobs(&self) -> Vec<String> {
        self.snapshot()
            .into_iter()
            .filter_map(|event| match event {
                EngineEvent::JobPolled { target, .. } => Some(target.job_id),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Wait until `done` holds, giving up after `timeout`.
pub async fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    done()
}

pub fn status_body(job_id: &str, status: &str, progress: u32) -> JobStatusBody {
    JobStatusBody {
        job_id: job_id.to_string(),
        status: status.to_string(),
        progress,
        processed: 0,
        total: 3,
        result_urls: None,
        error: None,
    }
}

type StatusFn = dyn Fn(usize, &str) -> Result<JobStatusBody, ServiceError> + Send + Sync;

/// In-memory service that records how it is called.
pub struct FakeService {
    status: Box<StatusFn>,
    status_delay: Duration,
    healthy: bool,
    status_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    uploads: Mutex<Vec<Vec<UploadFile>>>,
}

impl FakeService {
    /// `status` gets the zero-based call number and the job id.
    pub fn new(
        status: impl Fn(usize, &str) -> Result<JobStatusBody, ServiceError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            status: Box::new(status),
            status_delay: Duration::ZERO,
            healthy: true,
            status_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<Vec<UploadFile>> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DownloadService for FakeService {
    async fn health(&self) -> Result<HealthBody, ServiceError> {
        if self.healthy {
            Ok(HealthBody {
                status: "healthy".to_string(),
                checks: HealthChecks {
                    storage: Some("ok".to_string()),
                },
            })
        } else {
            Err(ServiceError {
                kind: FailureKind::Network,
                message: "connection refused".to_string(),
            })
        }
    }

    async fn upload(&self, files: Vec<UploadFile>) -> Result<Vec<UploadedFileBody>, ServiceError> {
        let records = files
            .iter()
            .enumerate()
            .map(|(index, file)| UploadedFileBody {
                file_id: 100 + index as u64,
                file_name: file.file_name.clone(),
                uploaded_at: 1_700_000_000_000.0,
            })
            .collect();
        self.uploads.lock().unwrap().push(files);
        Ok(records)
    }

    async fn initiate(&self, file_ids: &[u64]) -> Result<InitiateBody, ServiceError> {
        Ok(InitiateBody {
            job_id: "job-1".to_string(),
            status: "queued".to_string(),
            total_file_ids: file_ids.len() as u64,
        })
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusBody, ServiceError> {
        let call = self.status_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        (self.status)(call, job_id)
    }
}
