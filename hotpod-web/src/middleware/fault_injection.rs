//! Fault-injection middleware.
//!
//! Consults the injector's rules for the request path and short-circuits
//! with the injected status code when the dice say so. Applied only to
//! workload and queue routes: injecting on probes or admin endpoints would
//! let a global rule take down the control plane that clears it.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{http::Request, middleware::Next, response::Response, Json};
use serde_json::json;

use hotpod_core::{FaultInjector, Metrics};

/// Shared state for the fault-injection layer.
#[derive(Clone)]
pub struct FaultLayerState {
    pub injector: Arc<FaultInjector>,
    pub metrics: Arc<Metrics>,
}

/// Short-circuit the request with an injected error when a rule fires.
pub async fn inject_faults<B>(
    State(state): State<FaultLayerState>,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    let endpoint = request.uri().path().to_string();

    if let Some(code) = state.injector.should_inject(&endpoint) {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        state
            .metrics
            .fault_errors_injected_total
            .with_label_values(&[endpoint.as_str(), status.as_str()])
            .inc();

        let body = json!({
            "error": "injected error",
            "code": "FAULT_INJECTED",
            "status": status.as_u16(),
        });
        return (status, Json(body)).into_response();
    }

    next.run(request).await
}
