//! Request logging middleware.

use std::time::Instant;

use axum::{http::Request, middleware::Next, response::Response};
use tracing::info;

/// Log one line per request: method, path, status, duration.
pub async fn log_requests<B>(request: Request<B>, next: Next<B>) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration = ?start.elapsed(),
        "request"
    );

    response
}
