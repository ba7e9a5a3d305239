//! Chaos endpoint responses.

use serde::Serialize;

use super::is_false;

/// Response for /fault/crash, sent before the process dies.
#[derive(Debug, Serialize)]
pub struct CrashResponse {
    pub message: &'static str,
    pub delay: String,
    pub exit_code: i32,
    pub scheduled: bool,
}

/// Response for /fault/hang in non-partial mode.
#[derive(Debug, Serialize)]
pub struct HangResponse {
    pub message: &'static str,
    pub duration: String,
    #[serde(skip_serializing_if = "is_false")]
    pub cancelled: bool,
}

/// Response for /fault/oom, sent before the allocations begin.
#[derive(Debug, Serialize)]
pub struct OomResponse {
    pub message: &'static str,
    pub rate: String,
    pub started: bool,
}

/// Response for /fault/error.
#[derive(Debug, Serialize)]
pub struct ErrorRollResponse {
    pub injected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: &'static str,
}
