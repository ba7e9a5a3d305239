//! Request metrics middleware.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::{http::Request, middleware::Next, response::Response};

use hotpod_core::Metrics;

/// Record the in-flight gauge, per-endpoint request counter, and duration
/// histogram for every request.
pub async fn record_metrics<B>(
    State(metrics): State<Arc<Metrics>>,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    metrics.in_flight_requests.inc();
    let start = Instant::now();
    let endpoint = normalize_endpoint(request.uri().path());

    let response = next.run(request).await;

    metrics.in_flight_requests.dec();
    metrics
        .requests_total
        .with_label_values(&[endpoint, response.status().as_str()])
        .inc();
    metrics
        .request_duration_seconds
        .with_label_values(&[endpoint])
        .observe(start.elapsed().as_secs_f64());

    response
}

/// Maps request paths to known routes so Prometheus label cardinality stays
/// bounded. Unknown paths are grouped as "unknown".
pub fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/healthz" => "/healthz",
        "/readyz" => "/readyz",
        "/startupz" => "/startupz",
        "/metrics" => "/metrics",
        "/info" => "/info",
        "/cpu" => "/cpu",
        "/memory" => "/memory",
        "/io" => "/io",
        "/work" => "/work",
        "/latency" => "/latency",
        p if p.starts_with("/queue/") => "/queue/*",
        p if p.starts_with("/fault/") => "/fault/*",
        p if p.starts_with("/admin/") => "/admin/*",
        _ => "unknown",
    }
}
