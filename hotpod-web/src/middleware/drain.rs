//! Drain-check middleware: rejects new arrivals during shutdown.

use std::sync::Arc;

use axum::{http::Request, middleware::Next, response::Response};
use axum::{extract::State, response::IntoResponse};

use hotpod_core::Lifecycle;

use crate::errors::ApiError;

/// Reject new requests with 503 once the lifecycle says to drain. In-flight
/// requests are untouched.
pub async fn drain_check<B>(
    State(lifecycle): State<Arc<Lifecycle>>,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    if lifecycle.should_reject_request() {
        return ApiError::ShuttingDown.into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use hotpod_config::LifecycleConfig;
    use hotpod_core::Metrics;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    fn app(drain_immediately: bool) -> (Router, Arc<Lifecycle>) {
        let config = LifecycleConfig {
            drain_immediately,
            shutdown_timeout: Duration::from_secs(1),
            ..Default::default()
        };
        let lifecycle = Lifecycle::new(&config, Arc::new(Metrics::new().unwrap()));
        let app = Router::new()
            .route("/ok", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(lifecycle.clone(), drain_check));
        (app, lifecycle)
    }

    #[tokio::test]
    async fn passes_through_while_running() {
        let (app, _lifecycle) = app(true);
        let response = app
            .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn rejects_during_drain() {
        let (app, lifecycle) = app(true);
        lifecycle.shutdown(&CancellationToken::new()).await;

        let response = app
            .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "OPERATION_TIMEOUT");
    }

    #[tokio::test]
    async fn lets_requests_through_without_the_drain_flag() {
        let (app, lifecycle) = app(false);
        lifecycle.shutdown(&CancellationToken::new()).await;

        let response = app
            .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
