use std::num::NonZeroU32;
use std::path::Path;

use bytes::Bytes;
use splitter_core::{FailureKind, JobFailure};
use splitter_logging::splitter_warn;

use crate::persist::PersistError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid base url {0}")]
    InvalidBaseUrl(String),
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("no response within {0:?}")]
    Timeout(std::time::Duration),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

const UNREADABLE_RESPONSE: &str = "The server sent an unreadable response.";

impl ApiError {
    /// Convert into the failure delivered to job observers.
    pub fn into_failure(self) -> JobFailure {
        match self {
            ApiError::Http { status, message } => {
                JobFailure::new(FailureKind::HttpStatus(status), message)
            }
            ApiError::Timeout(_) => JobFailure::new(FailureKind::Timeout, self.to_string()),
            ApiError::InvalidResponse(detail) => {
                splitter_warn!("unreadable response: {}", detail);
                JobFailure::reported(UNREADABLE_RESPONSE)
            }
            other => JobFailure::new(FailureKind::Network, other.to_string()),
        }
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error, timeout: std::time::Duration) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout(timeout);
    }
    if err.is_decode() {
        return ApiError::InvalidResponse(err.to_string());
    }
    ApiError::Network(err.to_string())
}

/// The video to split and the requested segment length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUpload {
    pub file_name: String,
    pub bytes: Bytes,
    pub segment_seconds: NonZeroU32,
}

impl VideoUpload {
    pub fn new(
        file_name: impl Into<String>,
        bytes: impl Into<Bytes>,
        segment_seconds: NonZeroU32,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            segment_seconds,
        }
    }

    /// Read a video from disk; the upload keeps the file's own name.
    pub async fn from_path(path: &Path, segment_seconds: NonZeroU32) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        Ok(Self::new(file_name, bytes, segment_seconds))
    }
}
