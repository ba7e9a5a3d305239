//! Workload endpoint responses.

use serde::Serialize;

use super::is_false;

/// Response for /latency.
#[derive(Debug, Serialize)]
pub struct LatencyResponse {
    pub requested_duration: String,
    pub actual_duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter: Option<String>,
    pub status: u16,
    #[serde(skip_serializing_if = "is_false")]
    pub cancelled: bool,
}

/// Response for /cpu.
#[derive(Debug, Serialize)]
pub struct CpuResponse {
    pub requested_duration: String,
    pub actual_duration: String,
    pub cores: i64,
    pub intensity: &'static str,
    pub iterations: i64,
    #[serde(skip_serializing_if = "is_false")]
    pub cancelled: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub limit_applied: bool,
}

/// Response for /memory.
#[derive(Debug, Serialize)]
pub struct MemoryResponse {
    pub requested_size: i64,
    pub requested_size_human: String,
    pub duration: String,
    pub pattern: &'static str,
    #[serde(skip_serializing_if = "is_false")]
    pub cancelled: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub limit_applied: bool,
}

/// Response for /io.
#[derive(Debug, Serialize)]
pub struct IoResponse {
    pub requested_size: i64,
    pub requested_size_human: String,
    pub operation: &'static str,
    pub sync: bool,
    pub actual_duration: String,
    pub bytes_written: i64,
    pub bytes_read: i64,
    #[serde(skip_serializing_if = "is_false")]
    pub cancelled: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub limit_applied: bool,
}

/// Response for /work.
#[derive(Debug, Serialize)]
pub struct WorkResponse {
    pub profile: String,
    pub variance: f64,
    pub actual_duration: String,
    pub cpu_duration: String,
    pub cpu_iterations: i64,
    pub memory_size: i64,
    pub memory_size_human: String,
    pub latency: String,
    #[serde(skip_serializing_if = "is_false")]
    pub cancelled: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub limits_applied: bool,
}
