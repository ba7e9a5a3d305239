//! Admin endpoints for runtime control.
//!
//! Routes in this module sit behind the admin-token middleware; handlers
//! assume the caller is already authenticated.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;

use hotpod_config::{format_size, Mode};
use hotpod_core::{procinfo, ErrorRule};
use hotpod_web::{ApiError, ApiResult};

use crate::context::AppContext;
use crate::models::admin::{
    AdminConfigResponse, AdminErrorRateResponse, AdminFaultRule, AdminFaultState, AdminGcMemStats,
    AdminGcResponse, AdminLimits, AdminQueuePauseResponse, AdminQueueState, AdminReadyResponse,
    AdminResetResponse, AdminSidecarState,
};
use crate::params::{fmt_duration, get, parse_duration, parse_float};

/// Three-way readiness toggle: `state=true|false` forces the override, no
/// parameter flips between forced-not-ready and no override.
pub async fn ready(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<AdminReadyResponse>> {
    match params.get("state").map(String::as_str) {
        Some("true") => ctx.lifecycle.set_ready_override(Some(true)),
        Some("false") => ctx.lifecycle.set_ready_override(Some(false)),
        None | Some("") => {
            if ctx.lifecycle.ready_override_value().is_some() {
                ctx.lifecycle.set_ready_override(None);
            } else {
                ctx.lifecycle.set_ready_override(Some(false));
            }
        }
        Some(_) => {
            return Err(ApiError::invalid_parameter(
                "state must be true, false, or empty",
            ))
        }
    }

    Ok(Json(AdminReadyResponse {
        ready: ctx.lifecycle.is_ready(),
        override_state: ctx.lifecycle.ready_override_value(),
        state: ctx.lifecycle.state().as_str(),
    }))
}

/// Best-effort allocator release with before/after process memory stats.
pub async fn gc(State(_ctx): State<AppContext>) -> Json<AdminGcResponse> {
    let before = procinfo::memory_stats();
    let trimmed = procinfo::release_memory();
    let after = procinfo::memory_stats();

    Json(AdminGcResponse {
        before: AdminGcMemStats {
            rss_bytes: before.rss_bytes,
            vsize_bytes: before.vsize_bytes,
        },
        after: AdminGcMemStats {
            rss_bytes: after.rss_bytes,
            vsize_bytes: after.vsize_bytes,
        },
        trimmed,
    })
}

pub async fn config(State(ctx): State<AppContext>) -> Json<AdminConfigResponse> {
    let cfg = &ctx.config;

    let fault = AdminFaultState {
        global: ctx.injector.global_rule().map(fault_rule_snapshot),
        endpoints: ctx
            .injector
            .endpoint_rules()
            .into_iter()
            .map(|(endpoint, rule)| (endpoint, fault_rule_snapshot(rule)))
            .collect(),
    };

    let queue = AdminQueueState {
        available: ctx.queue.is_some(),
        depth: ctx.queue.as_ref().map(|q| q.depth()),
        paused: ctx.queue.as_ref().map(|q| q.is_paused()),
        workers: ctx.worker_pool.as_ref().map(|wp| wp.active_workers()),
    };

    let sidecar_active = cfg.server.mode == Mode::Sidecar;
    let sidecar = AdminSidecarState {
        active: sidecar_active,
        cpu_baseline: sidecar_active.then(|| fmt_duration(cfg.sidecar.cpu_baseline)),
        cpu_jitter: sidecar_active.then(|| fmt_duration(cfg.sidecar.cpu_jitter)),
        memory_baseline: sidecar_active.then(|| format_size(cfg.sidecar.memory_baseline)),
        request_overhead: sidecar_active.then(|| fmt_duration(cfg.sidecar.request_overhead)),
    };

    Json(AdminConfigResponse {
        mode: cfg.server.mode.as_str(),
        limits: AdminLimits {
            max_cpu_duration: fmt_duration(cfg.limits.max_cpu_duration),
            max_memory_size: format_size(cfg.limits.max_memory_size),
            max_io_size: format_size(cfg.limits.max_io_size),
            max_concurrent_ops: cfg.limits.max_concurrent_ops,
            request_timeout: fmt_duration(cfg.server.request_timeout),
        },
        fault,
        queue,
        sidecar,
    })
}

fn fault_rule_snapshot(rule: ErrorRule) -> AdminFaultRule {
    AdminFaultRule {
        rate: rule.rate,
        codes: rule.codes,
        expires_at: rule.expires_at.map(|t| t.to_rfc3339()),
    }
}

/// Return the target to a clean state: no fault rules, empty queue, no
/// workers, no readiness override.
pub async fn reset(State(ctx): State<AppContext>) -> Json<AdminResetResponse> {
    ctx.injector.reset();

    let queue_cleared = ctx.queue.as_ref().map(|q| q.clear()).unwrap_or(0);

    let workers_stopped = match &ctx.worker_pool {
        Some(pool) => {
            pool.stop().await;
            true
        }
        None => false,
    };

    ctx.lifecycle.set_ready_override(None);

    Json(AdminResetResponse {
        fault_reset: true,
        queue_cleared,
        workers_stopped,
        ready_override_cleared: true,
    })
}

pub async fn error_rate(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<AdminErrorRateResponse>> {
    let endpoint = get(&params, "endpoint").unwrap_or("").to_string();

    if get(&params, "rate").is_none() {
        return Err(ApiError::invalid_parameter("rate is required"));
    }
    let rate = parse_float(&params, "rate", 0.0)?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ApiError::invalid_parameter("rate must be between 0 and 1"));
    }

    let codes = match get(&params, "codes") {
        None => vec![500],
        Some(raw) => {
            let mut codes = Vec::new();
            for part in raw.split(',') {
                let code: u16 = part.trim().parse().map_err(|_| {
                    ApiError::invalid_parameter("codes must be comma-separated integers")
                })?;
                if !(100..=599).contains(&code) {
                    return Err(ApiError::invalid_parameter(
                        "codes must be valid HTTP status codes (100-599)",
                    ));
                }
                codes.push(code);
            }
            codes
        }
    };

    let duration = match get(&params, "duration") {
        None => None,
        Some(_) => Some(parse_duration(&params, "duration", Default::default())?),
    };

    let rule = ErrorRule {
        rate,
        codes: codes.clone(),
        expires_at: duration
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| Utc::now() + d),
    };

    if endpoint.is_empty() {
        ctx.injector.set_global_rule(rule);
        ctx.metrics
            .fault_error_rate
            .with_label_values(&["global"])
            .set(rate);
    } else {
        ctx.injector.set_endpoint_rule(&endpoint, rule);
        ctx.metrics
            .fault_error_rate
            .with_label_values(&[endpoint.as_str()])
            .set(rate);
    }

    Ok(Json(AdminErrorRateResponse {
        endpoint,
        rate,
        codes,
        duration: duration.map(fmt_duration),
    }))
}

pub async fn queue_pause(State(ctx): State<AppContext>) -> ApiResult<Json<AdminQueuePauseResponse>> {
    let queue = ctx.queue.as_ref().ok_or(ApiError::QueueNotAvailable)?;
    queue.pause();
    Ok(Json(AdminQueuePauseResponse { paused: true }))
}

pub async fn queue_resume(
    State(ctx): State<AppContext>,
) -> ApiResult<Json<AdminQueuePauseResponse>> {
    let queue = ctx.queue.as_ref().ok_or(ApiError::QueueNotAvailable)?;
    queue.resume();
    Ok(Json(AdminQueuePauseResponse { paused: false }))
}
