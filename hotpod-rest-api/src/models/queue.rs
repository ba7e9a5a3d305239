//! Queue endpoint responses.

use serde::Serialize;

/// Response for /queue/enqueue.
#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub enqueued: usize,
    pub queue_depth: usize,
    pub estimated_process_time: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub rejected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<&'static str>,
}

/// Response for /queue/process.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub workers: usize,
    pub cpu_per_item: String,
    pub memory_per_item: String,
    pub started: bool,
}

/// Response for /queue/status.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub queue_depth: usize,
    pub high_priority_depth: usize,
    pub normal_priority_depth: usize,
    pub low_priority_depth: usize,
    pub items_enqueued_total: i64,
    pub items_processed_total: i64,
    pub items_failed_total: i64,
    pub active_workers: i64,
    pub oldest_item_age: String,
    pub paused: bool,
}

/// Response for /queue/clear.
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: usize,
    pub queue_depth: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}
