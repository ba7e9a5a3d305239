//! Memory load endpoint.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::Json;
use tokio_util::sync::CancellationToken;

use hotpod_config::format_size;
use hotpod_core::workload::{memory, Pattern};
use hotpod_core::OpClass;
use hotpod_web::{ApiError, ApiResult};

use crate::context::AppContext;
use crate::models::workload::MemoryResponse;
use crate::params::{fmt_duration, get, parse_duration, parse_size};

pub async fn memory(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<MemoryResponse>> {
    let mut size = parse_size(&params, "size", 10 << 20)?;
    let duration = parse_duration(&params, "duration", Duration::from_secs(10))?;

    let pattern = match get(&params, "pattern") {
        None => Pattern::Random,
        Some(v) => v.parse().map_err(ApiError::invalid_parameter)?,
    };

    let mut limit_applied = false;
    let max = ctx.config.limits.max_memory_size;
    if max > 0 && size > max {
        size = max;
        limit_applied = true;
    }

    let _guard = ctx.tracker.acquire(OpClass::Memory)?;

    let token = CancellationToken::new();
    let _cancel_on_drop = token.clone().drop_guard();

    // Gauge guard so a dropped handler (timeout, disconnect) still subtracts.
    struct AllocGauge<'a>(&'a prometheus::IntGauge, i64);
    impl Drop for AllocGauge<'_> {
        fn drop(&mut self) {
            self.0.sub(self.1);
        }
    }
    ctx.metrics.memory_allocated_bytes.add(size);
    let _gauge = AllocGauge(&ctx.metrics.memory_allocated_bytes, size);

    let cancelled = memory::hold(&token, size, duration, pattern).await;

    Ok(Json(MemoryResponse {
        requested_size: size,
        requested_size_human: format_size(size),
        duration: fmt_duration(duration),
        pattern: pattern.as_str(),
        cancelled,
        limit_applied,
    }))
}
