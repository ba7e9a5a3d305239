//! CPU load endpoint.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::Json;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use hotpod_core::workload::{cpu, Intensity};
use hotpod_core::OpClass;
use hotpod_web::{ApiError, ApiResult};

use crate::context::AppContext;
use crate::models::workload::CpuResponse;
use crate::params::{fmt_duration, fmt_duration_ms, get, parse_duration, parse_int};

pub async fn cpu(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<CpuResponse>> {
    let mut duration = parse_duration(&params, "duration", Duration::from_secs(1))?;

    let cores = parse_int(&params, "cores", 1)?;
    if cores < 1 {
        return Err(ApiError::invalid_parameter("cores must be at least 1"));
    }

    let intensity = match get(&params, "intensity") {
        None => Intensity::Medium,
        Some(v) => v.parse().map_err(ApiError::invalid_parameter)?,
    };

    let mut limit_applied = false;
    let max = ctx.config.limits.max_cpu_duration;
    if !max.is_zero() && duration > max {
        duration = max;
        limit_applied = true;
    }

    let _guard = ctx.tracker.acquire(OpClass::Cpu)?;

    // Dropping this handler (timeout, disconnect) cancels the blocking
    // kernels through the token.
    let token = CancellationToken::new();
    let _cancel_on_drop = token.clone().drop_guard();

    let start = Instant::now();
    let outcome = cpu::burn(&token, duration, cores as usize, intensity).await;
    let elapsed = start.elapsed();

    ctx.metrics
        .cpu_seconds_total
        .inc_by(elapsed.as_secs_f64() * cores as f64);

    Ok(Json(CpuResponse {
        requested_duration: fmt_duration(duration),
        actual_duration: fmt_duration_ms(elapsed),
        cores,
        intensity: intensity.as_str(),
        iterations: outcome.iterations,
        cancelled: outcome.cancelled,
        limit_applied,
    }))
}
