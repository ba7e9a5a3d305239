//! Per-request CPU overhead for sidecar mode.

use std::time::Duration;

use axum::extract::State;
use axum::{http::Request, middleware::Next, response::Response};

/// Burn a fixed slice of CPU before handling each request, modeling the
/// per-request cost of a proxy sidecar.
pub async fn request_overhead<B>(
    State(overhead): State<Duration>,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    if !overhead.is_zero() {
        let _ = tokio::task::spawn_blocking(move || {
            let deadline = std::time::Instant::now() + overhead;
            let mut x = 1.0f64;
            while std::time::Instant::now() < deadline {
                for _ in 0..1000 {
                    x = x.sin() + x.cos();
                    x = (x.abs() + 1.0).sqrt();
                }
            }
            std::hint::black_box(x);
        })
        .await;
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn overhead_delays_but_does_not_fail_requests() {
        let app: Router = Router::new()
            .route("/ok", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(
                Duration::from_millis(5),
                request_overhead,
            ));

        let start = std::time::Instant::now();
        let response = app
            .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
