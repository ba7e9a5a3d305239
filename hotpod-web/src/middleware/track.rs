//! In-flight request tracking middleware.

use std::sync::Arc;

use axum::extract::State;
use axum::{http::Request, middleware::Next, response::Response};

use hotpod_core::Lifecycle;

/// Count the request as in-flight for the lifecycle's drain protocol. The
/// guard releases on every exit path, including panics unwound through us.
pub async fn track_requests<B>(
    State(lifecycle): State<Arc<Lifecycle>>,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    let _guard = lifecycle.track_request();
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use hotpod_config::LifecycleConfig;
    use hotpod_core::Metrics;
    use tower::ServiceExt;

    #[tokio::test]
    async fn in_flight_returns_to_zero_after_the_request() {
        let lifecycle = Lifecycle::new(
            &LifecycleConfig::default(),
            Arc::new(Metrics::new().unwrap()),
        );

        let observer = lifecycle.clone();
        let app = Router::new()
            .route(
                "/check",
                get(move || {
                    let observer = observer.clone();
                    async move { format!("{}", observer.in_flight_requests()) }
                }),
            )
            .layer(middleware::from_fn_with_state(
                lifecycle.clone(),
                track_requests,
            ));

        let response = app
            .oneshot(Request::builder().uri("/check").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Counted while inside the handler, released after.
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&body[..], b"1");
        assert_eq!(lifecycle.in_flight_requests(), 0);
    }
}
