//! /info response.

use serde::Serialize;

/// Response for GET /info.
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub uptime: String,
    pub lifecycle: InfoLifecycle,
    pub resources: InfoResources,
    pub config: InfoConfig,
}

/// Lifecycle state information.
#[derive(Debug, Serialize)]
pub struct InfoLifecycle {
    pub state: &'static str,
    pub started_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<String>,
    pub startup_complete: bool,
    pub shutting_down: bool,
    pub in_flight_requests: i64,
}

/// Runtime resource information.
#[derive(Debug, Serialize)]
pub struct InfoResources {
    pub cpu_cores: usize,
    pub memory_rss_bytes: u64,
    pub memory_vsize_bytes: u64,
    pub threads: u64,
}

/// Effective configuration echo.
#[derive(Debug, Serialize)]
pub struct InfoConfig {
    pub port: u16,
    pub log_level: &'static str,
    pub mode: &'static str,
    pub max_cpu_duration: String,
    pub max_memory_size: String,
    pub max_io_size: String,
    pub io_path: String,
    pub max_concurrent_ops: i64,
    pub request_timeout: String,
    pub startup_delay: String,
    pub startup_jitter: String,
    pub shutdown_delay: String,
    pub shutdown_timeout: String,
    pub drain_immediately: bool,
}
