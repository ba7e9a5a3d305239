//! Work queue endpoints.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use hotpod_config::format_size;
use hotpod_core::{Item, Priority, Queue, WorkerPool};
use hotpod_web::{ApiError, ApiResult};

use crate::context::AppContext;
use crate::models::queue::{ClearResponse, EnqueueResponse, ProcessResponse, StatusResponse};
use crate::params::{fmt_duration, fmt_duration_ms, get, parse_duration, parse_int, parse_size};

/// Resolve the queue and pool, honoring the feature gate.
fn queue_parts(ctx: &AppContext) -> ApiResult<(&Arc<Queue>, &Arc<WorkerPool>)> {
    if ctx.config.server.disable_queue {
        return Err(ApiError::QueueDisabled);
    }
    match (&ctx.queue, &ctx.worker_pool) {
        (Some(queue), Some(pool)) => Ok((queue, pool)),
        _ => Err(ApiError::QueueDisabled),
    }
}

pub async fn enqueue(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<EnqueueResponse>> {
    let (queue, _pool) = queue_parts(&ctx)?;

    let count = parse_int(&params, "count", 1)?;
    if count < 1 {
        return Err(ApiError::invalid_parameter("count must be at least 1"));
    }
    if count > 10_000 {
        return Err(ApiError::invalid_parameter("count must not exceed 10000"));
    }

    let processing_time = parse_duration(&params, "processing_time", Duration::from_millis(100))?;

    let priority = match get(&params, "priority") {
        None => Priority::Normal,
        Some(v) => Priority::from_name(v)
            .ok_or_else(|| ApiError::invalid_parameter("priority must be high, normal, or low"))?,
    };

    let mut enqueued = 0;
    let mut rejected = 0;
    let batch = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let now = Instant::now();

    for i in 0..count {
        let item = Item {
            id: format!("{batch}-{i}"),
            priority,
            processing_time,
            enqueued_at: now,
        };

        if queue.enqueue(item).is_ok() {
            enqueued += 1;
        } else {
            rejected += 1;
        }
    }

    let depth = queue.depth();
    let estimated = processing_time
        .checked_mul(depth as u32)
        .unwrap_or(Duration::MAX);

    Ok(Json(EnqueueResponse {
        enqueued,
        queue_depth: depth,
        estimated_process_time: fmt_duration(estimated),
        rejected,
        rejection_reason: (rejected > 0).then_some("queue full"),
    }))
}

pub async fn process(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<ProcessResponse>> {
    let (_queue, pool) = queue_parts(&ctx)?;

    let workers = parse_int(&params, "workers", ctx.config.queue.default_workers as i64)?;
    if workers < 1 {
        return Err(ApiError::invalid_parameter("workers must be at least 1"));
    }
    if workers > 100 {
        return Err(ApiError::invalid_parameter("workers must not exceed 100"));
    }

    let cpu_per_item = parse_duration(&params, "cpu_per_item", Duration::ZERO)?;
    let memory_per_item = parse_size(&params, "memory_per_item", 0)?;

    // Workers run independently of this request's lifetime; they are stopped
    // by a later /queue/process, /admin/reset, or server shutdown.
    pool.start(
        &CancellationToken::new(),
        workers as usize,
        cpu_per_item,
        memory_per_item,
    )
    .await;

    Ok(Json(ProcessResponse {
        workers: workers as usize,
        cpu_per_item: fmt_duration(cpu_per_item),
        memory_per_item: format_size(memory_per_item),
        started: true,
    }))
}

pub async fn status(State(ctx): State<AppContext>) -> ApiResult<Json<StatusResponse>> {
    let (queue, pool) = queue_parts(&ctx)?;
    let stats = queue.stats();

    Ok(Json(StatusResponse {
        queue_depth: stats.depth,
        high_priority_depth: stats.high_depth,
        normal_priority_depth: stats.normal_depth,
        low_priority_depth: stats.low_depth,
        items_enqueued_total: stats.enqueued_total,
        items_processed_total: stats.processed_total,
        items_failed_total: stats.failed_total,
        active_workers: pool.active_workers(),
        oldest_item_age: fmt_duration_ms(stats.oldest_item_age),
        paused: stats.paused,
    }))
}

pub async fn clear(State(ctx): State<AppContext>) -> ApiResult<Json<ClearResponse>> {
    let (queue, _pool) = queue_parts(&ctx)?;

    let cleared = queue.clear();
    Ok(Json(ClearResponse {
        cleared,
        queue_depth: queue.depth(),
    }))
}
