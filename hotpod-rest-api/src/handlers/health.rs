//! Health probe endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use hotpod_core::State as LifecycleState;

use crate::context::AppContext;
use crate::models::health::HealthResponse;
use crate::params::fmt_duration_ms;

/// Liveness: always 200.
pub async fn healthz() -> impl IntoResponse {
    Json(HealthResponse::ok())
}

/// Readiness: 200 when the lifecycle (or an admin override) says ready.
pub async fn readyz(State(ctx): State<AppContext>) -> impl IntoResponse {
    if ctx.lifecycle.is_ready() {
        return (StatusCode::OK, Json(HealthResponse::ok()));
    }

    let reason = match ctx.lifecycle.state() {
        LifecycleState::Starting => "server is starting",
        LifecycleState::ShuttingDown => "server is shutting down",
        LifecycleState::Ready => "readiness overridden by admin",
    };
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(HealthResponse::not_ready(reason)),
    )
}

/// Startup probe: 503 with the remaining delay while starting.
pub async fn startupz(State(ctx): State<AppContext>) -> impl IntoResponse {
    if ctx.lifecycle.state() == LifecycleState::Starting {
        let remaining = fmt_duration_ms(ctx.lifecycle.startup_remaining());
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::starting(remaining)),
        );
    }

    (StatusCode::OK, Json(HealthResponse::ok()))
}
