//! Admin endpoint responses.

use std::collections::HashMap;

use serde::Serialize;

/// Response for POST /admin/ready.
#[derive(Debug, Serialize)]
pub struct AdminReadyResponse {
    pub ready: bool,
    pub override_state: Option<bool>,
    pub state: &'static str,
}

/// Process memory stats for the GC response.
#[derive(Debug, Serialize)]
pub struct AdminGcMemStats {
    pub rss_bytes: u64,
    pub vsize_bytes: u64,
}

/// Response for POST /admin/gc.
#[derive(Debug, Serialize)]
pub struct AdminGcResponse {
    pub before: AdminGcMemStats,
    pub after: AdminGcMemStats,
    pub trimmed: bool,
}

/// Per-endpoint fault injection rule snapshot.
#[derive(Debug, Serialize)]
pub struct AdminFaultRule {
    pub rate: f64,
    pub codes: Vec<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Fault injection state.
#[derive(Debug, Serialize)]
pub struct AdminFaultState {
    pub global: Option<AdminFaultRule>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub endpoints: HashMap<String, AdminFaultRule>,
}

/// Queue state for the config response.
#[derive(Debug, Serialize)]
pub struct AdminQueueState {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<i64>,
}

/// Configured limits.
#[derive(Debug, Serialize)]
pub struct AdminLimits {
    pub max_cpu_duration: String,
    pub max_memory_size: String,
    pub max_io_size: String,
    pub max_concurrent_ops: i64,
    pub request_timeout: String,
}

/// Sidecar configuration state.
#[derive(Debug, Serialize)]
pub struct AdminSidecarState {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_baseline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_jitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_baseline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_overhead: Option<String>,
}

/// Response for GET /admin/config.
#[derive(Debug, Serialize)]
pub struct AdminConfigResponse {
    pub mode: &'static str,
    pub limits: AdminLimits,
    pub fault: AdminFaultState,
    pub queue: AdminQueueState,
    pub sidecar: AdminSidecarState,
}

/// Response for POST /admin/reset.
#[derive(Debug, Serialize)]
pub struct AdminResetResponse {
    pub fault_reset: bool,
    pub queue_cleared: usize,
    pub workers_stopped: bool,
    pub ready_override_cleared: bool,
}

/// Response for POST /admin/error-rate.
#[derive(Debug, Serialize)]
pub struct AdminErrorRateResponse {
    pub endpoint: String,
    pub rate: f64,
    pub codes: Vec<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// Response for POST /admin/queue/pause and /admin/queue/resume.
#[derive(Debug, Serialize)]
pub struct AdminQueuePauseResponse {
    pub paused: bool,
}
