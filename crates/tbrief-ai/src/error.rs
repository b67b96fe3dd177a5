//! AI error types.

use thiserror::Error;

/// Result type for AI operations.
pub type AiResult<T> = Result<T, AiError>;

/// Errors that can occur while generating summaries.
#[derive(Debug, Error)]
pub enum AiError {
    /// The model refused for quota reasons; the next model may work.
    #[error("Gemini quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AiError {
    pub fn generation_failed(msg: impl Into<String>) -> Self {
        Self::GenerationFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the failure was quota-shaped and falling through to
    /// the next model in the priority list makes sense.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, AiError::QuotaExceeded(_))
    }
}
