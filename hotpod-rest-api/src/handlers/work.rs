//! Composite workload endpoint.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use hotpod_config::format_size;
use hotpod_core::workload::work::{apply_variance, apply_variance_size, profile, run};
use hotpod_core::OpClass;
use hotpod_web::{ApiError, ApiResult};

use crate::context::AppContext;
use crate::models::workload::WorkResponse;
use crate::params::{fmt_duration, fmt_duration_ms, get, parse_float};

pub async fn work(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<WorkResponse>> {
    let profile_name = get(&params, "profile").unwrap_or("web");
    let mut work_profile = profile(profile_name).ok_or_else(|| {
        ApiError::invalid_parameter("profile must be web, api, worker, or heavy")
    })?;

    let variance = parse_float(&params, "variance", 0.0)?;
    if !(0.0..=1.0).contains(&variance) {
        return Err(ApiError::invalid_parameter(
            "variance must be between 0 and 1",
        ));
    }

    work_profile.cpu_duration = apply_variance(work_profile.cpu_duration, variance);
    work_profile.memory_size = apply_variance_size(work_profile.memory_size, variance);
    work_profile.latency = apply_variance(work_profile.latency, variance);

    let mut limits_applied = false;
    let max_cpu = ctx.config.limits.max_cpu_duration;
    if !max_cpu.is_zero() && work_profile.cpu_duration > max_cpu {
        work_profile.cpu_duration = max_cpu;
        limits_applied = true;
    }
    let max_memory = ctx.config.limits.max_memory_size;
    if max_memory > 0 && work_profile.memory_size > max_memory {
        work_profile.memory_size = max_memory;
        limits_applied = true;
    }

    let _guard = ctx.tracker.acquire(OpClass::Work)?;

    let token = CancellationToken::new();
    let _cancel_on_drop = token.clone().drop_guard();

    let start = Instant::now();
    let outcome = run(&token, &work_profile).await;
    let elapsed = start.elapsed();

    ctx.metrics
        .cpu_seconds_total
        .inc_by(work_profile.cpu_duration.as_secs_f64() * work_profile.cpu_cores as f64);

    Ok(Json(WorkResponse {
        profile: profile_name.to_string(),
        variance,
        actual_duration: fmt_duration_ms(elapsed),
        cpu_duration: fmt_duration(work_profile.cpu_duration),
        cpu_iterations: outcome.cpu_iterations,
        memory_size: work_profile.memory_size,
        memory_size_human: format_size(work_profile.memory_size),
        latency: fmt_duration(work_profile.latency),
        cancelled: outcome.cancelled,
        limits_applied,
    }))
}
