//! Panic recovery middleware.

use axum::response::IntoResponse;
use tower_http::catch_panic::CatchPanicLayer;

use crate::errors::ApiError;

type PanicHandler = fn(Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response;

/// Layer that traps handler panics and turns them into INTERNAL_ERROR
/// responses instead of tearing down the connection.
pub fn recovery_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "panic recovered");

    ApiError::Internal.into_response()
}
