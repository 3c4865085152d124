use std::path::Path;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::types::{InitiateRequest, UploadResponseBody};
use crate::{
    FailureKind, HealthBody, InitiateBody, JobStatusBody, ServiceError, UploadedFileBody,
};

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Root that `/health` and `/v1/...` are resolved against.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// A file read from disk, ready to be sent as one multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub async fn read(path: &Path) -> Result<Self, ServiceError> {
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            ServiceError::new(FailureKind::Io, format!("{}: {}", path.display(), err))
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { file_name, bytes })
    }
}

/// Client side of the upload, download-job and health endpoints.
#[async_trait::async_trait]
pub trait DownloadService: Send + Sync {
    async fn health(&self) -> Result<HealthBody, ServiceError>;

    async fn upload(&self, files: Vec<UploadFile>) -> Result<Vec<UploadedFileBody>, ServiceError>;

    async fn initiate(&self, file_ids: &[u64]) -> Result<InitiateBody, ServiceError>;

    async fn job_status(&self, job_id: &str) -> Result<JobStatusBody, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestDownloadService {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestDownloadService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Append path segments to the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl DownloadService for ReqwestDownloadService {
    async fn health(&self) -> Result<HealthBody, ServiceError> {
        let url = self.endpoint(&["health"])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn upload(&self, files: Vec<UploadFile>) -> Result<Vec<UploadedFileBody>, ServiceError> {
        let url = self.endpoint(&["v1", "upload"])?;
        let form = files.into_iter().fold(Form::new(), |form, file| {
            form.part("files", Part::bytes(file.bytes).file_name(file.file_name))
        });

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: UploadResponseBody = read_json(response).await?;
        Ok(body.files)
    }

    async fn initiate(&self, file_ids: &[u64]) -> Result<InitiateBody, ServiceError> {
        let url = self.endpoint(&["v1", "download", "initiate"])?;
        let payload = serde_json::to_vec(&InitiateRequest { file_ids })
            .map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusBody, ServiceError> {
        let url = self.endpoint(&["v1", "download", "status", job_id])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ServiceError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }

    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body).map_err(|err| ServiceError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ServiceError::new(FailureKind::Decode, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}
