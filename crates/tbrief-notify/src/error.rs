use thiserror::Error;

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Errors from notification delivery.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification request failed: {0}")]
    RequestFailed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl NotifyError {
    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }
}
