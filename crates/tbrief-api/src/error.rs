//! API error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use tbrief_monitor::MonitorError;
use tbrief_store::StoreError;

/// Errors surfaced by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream quota exhausted: {0}")]
    UpstreamQuota(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::UpstreamQuota(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamUnavailable(_) | Self::GenerationFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable label for the error body.
    fn label(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Conflict(_) => "conflict",
            Self::UpstreamQuota(_) => "upstream_quota",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::GenerationFailed(_) => "generation_failed",
            Self::Internal(_) => "internal",
        }
    }
}

/// JSON error body: `{"error": "...", "detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<MonitorError> for ApiError {
    fn from(e: MonitorError) -> Self {
        match e {
            MonitorError::NotFound(msg) => Self::NotFound(msg),
            MonitorError::BadRequest(msg) => Self::BadRequest(msg),
            MonitorError::UpstreamQuota(msg) => Self::UpstreamQuota(msg),
            MonitorError::UpstreamUnavailable(msg) => Self::UpstreamUnavailable(msg),
            MonitorError::GenerationFailed(msg) => Self::GenerationFailed(msg),
            MonitorError::InternalFailure(msg) => Self::Internal(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        MonitorError::from(e).into()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = status.as_u16(), "{self}");
        }

        let is_production = std::env::var("ENVIRONMENT")
            .map(|e| e == "production")
            .unwrap_or(false);

        // Internal detail never leaves a production deployment.
        let detail = if is_production && matches!(self, Self::Internal(_)) {
            None
        } else {
            Some(self.to_string())
        };

        let body = ErrorResponse {
            error: self.label().to_string(),
            detail,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(MonitorError::UpstreamQuota("quota".into())).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::from(MonitorError::UpstreamUnavailable("down".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(MonitorError::GenerationFailed("bad".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(MonitorError::InternalFailure("io".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_not_found_maps_to_404() {
        let e = ApiError::from(StoreError::NotFound("settings".into()));
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_body_omits_missing_detail() {
        let body = ErrorResponse {
            error: "not_found".to_string(),
            detail: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"not_found"}"#);
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(ApiError::not_found("x").label(), "not_found");
        assert_eq!(
            ApiError::UpstreamQuota("x".into()).label(),
            "upstream_quota"
        );
        assert_eq!(ApiError::internal("x").label(), "internal");
    }
}
