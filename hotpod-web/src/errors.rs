//! API error types with stable machine-readable codes.
//!
//! Every error renders as `{"error": <message>, "code": <CODE>}` so that
//! load-test scripts can match on the code without parsing prose.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidParameter(String),

    #[error("concurrent operation limit exceeded")]
    TooManyRequests,

    #[error("request timeout exceeded")]
    Timeout,

    #[error("server is shutting down")]
    ShuttingDown,

    #[error("internal server error")]
    Internal,

    #[error("chaos endpoints are disabled")]
    ChaosDisabled,

    #[error("queue endpoints are disabled")]
    QueueDisabled,

    #[error("queue is not available in this mode")]
    QueueNotAvailable,

    #[error("invalid or missing admin token")]
    Unauthorized,
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Timeout | ApiError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ChaosDisabled | ApiError::QueueDisabled => StatusCode::FORBIDDEN,
            ApiError::QueueNotAvailable => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    /// Stable error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidParameter(_) => "INVALID_PARAMETER",
            ApiError::TooManyRequests => "TOO_MANY_REQUESTS",
            ApiError::Timeout | ApiError::ShuttingDown => "OPERATION_TIMEOUT",
            ApiError::Internal => "INTERNAL_ERROR",
            ApiError::ChaosDisabled => "CHAOS_DISABLED",
            ApiError::QueueDisabled => "QUEUE_DISABLED",
            ApiError::QueueNotAvailable => "QUEUE_NOT_AVAILABLE",
            ApiError::Unauthorized => "UNAUTHORIZED",
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        ApiError::InvalidParameter(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.to_string(),
            "code": self.error_code(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<hotpod_core::TooManyOps> for ApiError {
    fn from(_: hotpod_core::TooManyOps) -> Self {
        ApiError::TooManyRequests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_the_taxonomy() {
        assert_eq!(
            ApiError::invalid_parameter("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::TooManyRequests.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Timeout.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::ShuttingDown.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiError::ChaosDisabled.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::QueueNotAvailable.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn codes_are_stable_strings() {
        assert_eq!(ApiError::Timeout.error_code(), "OPERATION_TIMEOUT");
        assert_eq!(ApiError::ShuttingDown.error_code(), "OPERATION_TIMEOUT");
        assert_eq!(ApiError::Internal.error_code(), "INTERNAL_ERROR");
        assert_eq!(ApiError::QueueDisabled.error_code(), "QUEUE_DISABLED");
    }
}
