//! Health endpoint responses.

use serde::Serialize;

/// Response for /healthz, /readyz and /startupz.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", "not_ready", or "starting"
    pub status: &'static str,
    /// Why the server is not ready (omitted when ok)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    /// Time until startup completes (only for /startupz)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<String>,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            reason: None,
            remaining: None,
        }
    }

    pub fn not_ready(reason: &'static str) -> Self {
        Self {
            status: "not_ready",
            reason: Some(reason),
            remaining: None,
        }
    }

    pub fn starting(remaining: String) -> Self {
        Self {
            status: "starting",
            reason: Some("startup in progress"),
            remaining: Some(remaining),
        }
    }
}
