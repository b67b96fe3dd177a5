//! YouTube adapter error types.

use thiserror::Error;

/// Result type for YouTube operations.
pub type YoutubeResult<T> = Result<T, YoutubeError>;

/// Errors from the Data API, feeds, or yt-dlp tooling.
#[derive(Debug, Error)]
pub enum YoutubeError {
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("YouTube API quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("YouTube API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Invalid channel reference: {0}")]
    InvalidReference(String),

    #[error("No transcript available: {0}")]
    TranscriptUnavailable(String),

    #[error("yt-dlp failed: {0}")]
    ToolFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl YoutubeError {
    pub fn channel_not_found(what: impl Into<String>) -> Self {
        Self::ChannelNotFound(what.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn tool_failed(msg: impl Into<String>) -> Self {
        Self::ToolFailed(msg.into())
    }

    /// True when the Data API refused the request for quota reasons and
    /// the caller should fall back to the feed.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, YoutubeError::QuotaExceeded(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            YoutubeError::ChannelNotFound(_) | YoutubeError::VideoNotFound(_)
        )
    }
}
