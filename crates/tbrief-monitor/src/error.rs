//! Monitoring error types.
//!
//! Every service in this crate reports through [`MonitorError`], which
//! classifies failures the way the HTTP layer wants to map them:
//! missing records, bad input, upstream quota, upstream outages,
//! generation failures, and everything else.

use thiserror::Error;

use tbrief_ai::AiError;
use tbrief_store::StoreError;
use tbrief_youtube::YoutubeError;

/// Result type for monitoring operations.
pub type MonitorResult<T> = Result<T, MonitorError>;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream quota exceeded: {0}")]
    UpstreamQuota(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Summary generation failed: {0}")]
    GenerationFailed(String),

    #[error("Internal failure: {0}")]
    InternalFailure(String),
}

impl MonitorError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn generation_failed(msg: impl Into<String>) -> Self {
        Self::GenerationFailed(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalFailure(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MonitorError::NotFound(_))
    }
}

impl From<StoreError> for MonitorError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => MonitorError::NotFound(msg),
            other => MonitorError::InternalFailure(other.to_string()),
        }
    }
}

impl From<YoutubeError> for MonitorError {
    fn from(e: YoutubeError) -> Self {
        let msg = e.to_string();
        match e {
            YoutubeError::QuotaExceeded(_) => MonitorError::UpstreamQuota(msg),
            YoutubeError::ChannelNotFound(_) | YoutubeError::VideoNotFound(_) => {
                MonitorError::NotFound(msg)
            }
            YoutubeError::InvalidReference(_) | YoutubeError::Config(_) => {
                MonitorError::BadRequest(msg)
            }
            YoutubeError::Network(_) | YoutubeError::Feed(_) | YoutubeError::RequestFailed(_) => {
                MonitorError::UpstreamUnavailable(msg)
            }
            // Transcript gaps and yt-dlp failures are local pipeline
            // conditions, not upstream outages.
            _ => MonitorError::InternalFailure(msg),
        }
    }
}

impl From<AiError> for MonitorError {
    fn from(e: AiError) -> Self {
        let msg = e.to_string();
        match e {
            AiError::QuotaExceeded(_) => MonitorError::UpstreamQuota(msg),
            AiError::Config(_) => MonitorError::InternalFailure(msg),
            _ => MonitorError::GenerationFailed(msg),
        }
    }
}
