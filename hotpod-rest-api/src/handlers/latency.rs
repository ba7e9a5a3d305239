//! Latency endpoint: a configurable cancellable sleep.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rand::Rng;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use hotpod_core::{workload, OpClass};
use hotpod_web::{ApiError, ApiResult};

use crate::context::AppContext;
use crate::models::workload::LatencyResponse;
use crate::params::{fmt_duration, fmt_duration_ms, parse_duration, parse_int};

pub async fn latency(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let duration = parse_duration(&params, "duration", Duration::from_millis(100))?;
    let jitter = parse_duration(&params, "jitter", Duration::ZERO)?;

    let status = parse_int(&params, "status", 200)?;
    if !(100..=599).contains(&status) {
        return Err(ApiError::invalid_parameter(
            "status must be between 100 and 599",
        ));
    }
    let status =
        StatusCode::from_u16(status as u16).map_err(|e| ApiError::invalid_parameter(e.to_string()))?;

    let _guard = ctx.tracker.acquire(OpClass::Latency)?;

    let mut actual = duration;
    if !jitter.is_zero() {
        let jitter_nanos = jitter.as_nanos() as u64;
        actual += Duration::from_nanos(rand::thread_rng().gen_range(0..jitter_nanos));
    }

    let token = CancellationToken::new();
    let _cancel_on_drop = token.clone().drop_guard();

    let start = Instant::now();
    let cancelled = workload::sleep_for(&token, actual).await;

    let body = LatencyResponse {
        requested_duration: fmt_duration(duration),
        actual_duration: fmt_duration_ms(start.elapsed()),
        jitter: (!jitter.is_zero()).then(|| fmt_duration(jitter)),
        status: status.as_u16(),
        cancelled,
    };

    Ok((status, Json(body)).into_response())
}
