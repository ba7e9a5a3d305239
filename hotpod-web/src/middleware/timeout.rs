//! Per-request hard timeout middleware.

use std::time::Duration;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::{http::Request, middleware::Next, response::Response};

use crate::errors::ApiError;

/// Hard timeout wrapped around the entire handler. When it fires the
/// handler future is dropped, which cancels any workload it was running,
/// and the client sees an OPERATION_TIMEOUT response.
pub async fn request_timeout<B>(
    State(timeout): State<Duration>,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    if timeout.is_zero() {
        return next.run(request).await;
    }

    match tokio::time::timeout(timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => ApiError::Timeout.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app(timeout: Duration) -> Router {
        Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    "done"
                }),
            )
            .route("/fast", get(|| async { "done" }))
            .layer(middleware::from_fn_with_state(timeout, request_timeout))
    }

    #[tokio::test(start_paused = true)]
    async fn slow_handlers_get_cut_off() {
        let response = app(Duration::from_secs(1))
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "OPERATION_TIMEOUT");
    }

    #[tokio::test]
    async fn fast_handlers_pass() {
        let response = app(Duration::from_secs(5))
            .oneshot(Request::builder().uri("/fast").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_disables_the_limit() {
        let app = app(Duration::ZERO);
        let request = Request::builder().uri("/fast").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
