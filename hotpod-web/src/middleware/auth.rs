//! Admin authentication middleware.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::{http::Request, middleware::Next, response::Response};

use crate::errors::ApiError;

/// Header carrying the admin token.
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Shared secret for admin endpoints. An empty token means open access.
#[derive(Clone)]
pub struct AdminToken(pub String);

/// Gate admin routes on the shared token.
pub async fn require_admin<B>(
    State(AdminToken(token)): State<AdminToken>,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    if token.is_empty() {
        return next.run(request).await;
    }

    let presented = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !constant_time_eq(presented.as_bytes(), token.as_bytes()) {
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}

/// Compare two byte strings without data-dependent early exit. The length
/// check leaks only the length, which the attacker already controls.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::post, Router};
    use tower::ServiceExt;

    fn app(token: &str) -> Router {
        Router::new()
            .route("/admin/reset", post(|| async { "done" }))
            .layer(middleware::from_fn_with_state(
                AdminToken(token.to_string()),
                require_admin,
            ))
    }

    fn request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/admin/reset");
        if let Some(token) = token {
            builder = builder.header(ADMIN_TOKEN_HEADER, token);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn constant_time_eq_semantics() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secres"));
        assert!(!constant_time_eq(b"secret", b"secre"));
        assert!(constant_time_eq(b"", b""));
    }

    #[tokio::test]
    async fn empty_token_means_open_access() {
        let response = app("").oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn matching_token_is_accepted() {
        let response = app("s3cret").oneshot(request(Some("s3cret"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_or_wrong_token_is_rejected() {
        let response = app("s3cret").oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app("s3cret").oneshot(request(Some("wrong"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
