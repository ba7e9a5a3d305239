//! File I/O load endpoint.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use hotpod_config::format_size;
use hotpod_core::workload::{io, Operation};
use hotpod_core::OpClass;
use hotpod_web::{ApiError, ApiResult};

use crate::context::AppContext;
use crate::models::workload::IoResponse;
use crate::params::{fmt_duration_ms, get, parse_bool, parse_size};

pub async fn io(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<IoResponse>> {
    let mut size = parse_size(&params, "size", 10 << 20)?;

    let operation = match get(&params, "operation") {
        None => Operation::Write,
        Some(v) => v.parse().map_err(ApiError::invalid_parameter)?,
    };

    let sync = parse_bool(&params, "sync", false)?;

    let mut limit_applied = false;
    let max = ctx.config.limits.max_io_size;
    if max > 0 && size > max {
        size = max;
        limit_applied = true;
    }

    let _guard = ctx.tracker.acquire(OpClass::Io)?;

    let token = CancellationToken::new();
    let _cancel_on_drop = token.clone().drop_guard();

    let start = Instant::now();
    let outcome = io::run(&token, &ctx.config.limits.io_path(), size, operation, sync).await;
    let elapsed = start.elapsed();

    ctx.metrics
        .io_bytes_total
        .with_label_values(&[operation.as_str()])
        .inc_by((outcome.bytes_written + outcome.bytes_read).max(0) as u64);

    Ok(Json(IoResponse {
        requested_size: size,
        requested_size_human: format_size(size),
        operation: operation.as_str(),
        sync,
        actual_duration: fmt_duration_ms(elapsed),
        bytes_written: outcome.bytes_written,
        bytes_read: outcome.bytes_read,
        cancelled: outcome.cancelled,
        limit_applied,
    }))
}
