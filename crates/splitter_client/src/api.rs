use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use splitter_core::JobHandle;
use splitter_logging::{splitter_debug, splitter_info, splitter_warn};

use crate::types::map_reqwest_error;
use crate::wire::{CleanupResponse, DownloadAllRequest, ErrorBody, SubmitAccepted, TaskStatus};
use crate::{ApiError, ClientSettings, VideoUpload};

/// HTTP client for the processing service endpoints.
#[derive(Debug, Clone)]
pub struct SplitterClient {
    settings: ClientSettings,
    base: Url,
    http: reqwest::Client,
}

impl SplitterClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::InvalidBaseUrl(format!("{}: {err}", settings.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(settings.base_url.clone()));
        }
        // No overall request timeout: streamed responses stay open for the
        // whole job. Each suspension point is bounded separately.
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self {
            settings,
            base,
            http,
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Resolve an absolute or root-relative artifact locator against the service origin.
    pub fn resolve(&self, url: &str) -> Result<Url, ApiError> {
        self.base
            .join(url)
            .map_err(|err| ApiError::InvalidResponse(format!("bad artifact url {url}: {err}")))
    }

    /// `POST /api/split_video`, expecting `{task_id, session_id}` (poll deployment).
    pub async fn submit(&self, upload: &VideoUpload) -> Result<JobHandle, ApiError> {
        let response = self.send_upload(upload).await?;
        let body = self.read_body(response, self.settings.submit_timeout).await?;
        let accepted: SubmitAccepted = parse_json(&body)?;
        splitter_info!(
            "submission accepted task_id={} session_id={:?}",
            accepted.task_id,
            accepted.session_id
        );
        Ok(JobHandle::new(accepted.task_id, accepted.session_id))
    }

    /// `POST /api/split_video` whose successful response body is the event stream.
    pub async fn open_stream(&self, upload: &VideoUpload) -> Result<Response, ApiError> {
        let response = self.send_upload(upload).await?;
        splitter_info!("event stream opened status={}", response.status().as_u16());
        Ok(response)
    }

    /// `GET /api/task_status/{task_id}`, bounded by the idle timeout.
    pub async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError> {
        let url = self.endpoint(&["api", "task_status", task_id])?;
        let timeout = self.settings.idle_timeout;
        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| map_reqwest_error(err, timeout))?;
        let response = check_status(response, timeout).await?;
        let body = self.read_body(response, timeout).await?;
        parse_json(&body)
    }

    /// `POST /api/cleanup/{session_id}`; returns the server's message.
    pub async fn cleanup(&self, session_id: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["api", "cleanup", session_id])?;
        let timeout = self.settings.idle_timeout;
        let response = self
            .http
            .post(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| map_reqwest_error(err, timeout))?;
        let response = check_status(response, timeout).await?;
        let body = self.read_body(response, timeout).await?;
        let cleanup: CleanupResponse = parse_json(&body)?;
        splitter_info!("session {} cleaned up: {}", session_id, cleanup.message);
        Ok(cleanup.message)
    }

    /// `POST /api/download_all`; returns the archive bytes.
    pub async fn download_all(&self, filenames: &[String]) -> Result<Bytes, ApiError> {
        let url = self.endpoint(&["api", "download_all"])?;
        let body = serde_json::to_vec(&DownloadAllRequest { filenames })
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
        let timeout = self.settings.idle_timeout;
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| map_reqwest_error(err, timeout))?;
        let response = check_status(response, timeout).await?;
        self.read_body(response, timeout).await
    }

    /// Fetch one artifact by its (possibly root-relative) locator.
    pub async fn download(&self, url: &str) -> Result<Bytes, ApiError> {
        let url = self.resolve(url)?;
        let timeout = self.settings.idle_timeout;
        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| map_reqwest_error(err, timeout))?;
        let response = check_status(response, timeout).await?;
        self.read_body(response, timeout).await
    }

    async fn send_upload(&self, upload: &VideoUpload) -> Result<Response, ApiError> {
        let url = self.endpoint(&["api", "split_video"])?;
        let field = self.settings.deployment.duration_field();
        let video = Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name.clone());
        let form = Form::new()
            .part("video", video)
            .text(field, upload.segment_seconds.to_string());

        splitter_debug!(
            "uploading {} ({} bytes) {}={}",
            upload.file_name,
            upload.bytes.len(),
            field,
            upload.segment_seconds
        );
        let timeout = self.settings.submit_timeout;
        let send = self.http.post(url).multipart(form).send();
        let response = tokio::time::timeout(timeout, send)
            .await
            .map_err(|_| ApiError::Timeout(timeout))?
            .map_err(|err| map_reqwest_error(err, timeout))?;
        check_status(response, timeout).await
    }

    async fn read_body(&self, response: Response, timeout: Duration) -> Result<Bytes, ApiError> {
        tokio::time::timeout(timeout, response.bytes())
            .await
            .map_err(|_| ApiError::Timeout(timeout))?
            .map_err(|err| map_reqwest_error(err, timeout))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Pass successful responses through; turn the rest into `ApiError::Http`.
///
/// The error body is read within `timeout`.
async fn check_status(response: Response, timeout: Duration) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = tokio::time::timeout(timeout, response.bytes())
        .await
        .map_err(|_| ApiError::Timeout(timeout))?
        .unwrap_or_default();
    let message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.error.or(body.message))
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
    splitter_warn!("request failed status={} message={}", status.as_u16(), message);
    Err(ApiError::Http {
        status: status.as_u16(),
        message,
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::InvalidResponse(err.to_string()))
}
