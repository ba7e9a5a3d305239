//! Server info endpoint.

use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};

use hotpod_config::format_size;
use hotpod_core::procinfo;

use crate::context::AppContext;
use crate::models::info::{InfoConfig, InfoLifecycle, InfoResources, InfoResponse};
use crate::params::fmt_duration;

pub async fn info(State(ctx): State<AppContext>) -> Json<InfoResponse> {
    let lifecycle = &ctx.lifecycle;
    let config = &ctx.config;
    let mem = procinfo::memory_stats();

    let uptime = (Utc::now() - lifecycle.started_at())
        .to_std()
        .unwrap_or_default();

    Json(InfoResponse {
        version: ctx.version.clone(),
        uptime: fmt_duration(std::time::Duration::from_secs(uptime.as_secs())),
        lifecycle: InfoLifecycle {
            state: lifecycle.state().as_str(),
            started_at: lifecycle
                .started_at()
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            ready_at: lifecycle
                .ready_at()
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            startup_complete: lifecycle.is_ready(),
            shutting_down: lifecycle.is_shutting_down(),
            in_flight_requests: lifecycle.in_flight_requests(),
        },
        resources: InfoResources {
            cpu_cores: num_cpus::get(),
            memory_rss_bytes: mem.rss_bytes,
            memory_vsize_bytes: mem.vsize_bytes,
            threads: mem.threads,
        },
        config: InfoConfig {
            port: config.server.port,
            log_level: config.server.log_level.as_str(),
            mode: config.server.mode.as_str(),
            max_cpu_duration: fmt_duration(config.limits.max_cpu_duration),
            max_memory_size: format_size(config.limits.max_memory_size),
            max_io_size: format_size(config.limits.max_io_size),
            io_path: config.limits.io_path().display().to_string(),
            max_concurrent_ops: config.limits.max_concurrent_ops,
            request_timeout: fmt_duration(config.server.request_timeout),
            startup_delay: fmt_duration(config.lifecycle.startup_delay),
            startup_jitter: fmt_duration(config.lifecycle.startup_jitter),
            shutdown_delay: fmt_duration(config.lifecycle.shutdown_delay),
            shutdown_timeout: fmt_duration(config.lifecycle.shutdown_timeout),
            drain_immediately: config.lifecycle.drain_immediately,
        },
    })
}
