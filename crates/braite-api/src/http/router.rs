//! Axum router configuration with middleware.
//!
//! Routes: `GET /`, `GET /health`, `POST /chat`, `POST /webhook/telegram`.
//! Middleware: CORS, tracing, request timing.

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::http::middleware::request_timing;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health))
        .route("/chat", post(handlers::chat::chat))
        .route("/webhook/telegram", post(handlers::webhook::telegram_webhook))
        .layer(middleware::from_fn(request_timing))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::http::handlers::test_support;
    use crate::http::middleware::REQUEST_ID_HEADER;

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value, bool) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let has_request_id = response.headers().contains_key(REQUEST_ID_HEADER);
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body, has_request_id)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn root_route() {
        let router = build_router(test_support::state());
        let (status, body, has_id) =
            send(router, Request::get("/").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "online");
        assert!(has_id);
    }

    #[tokio::test]
    async fn chat_route_answers() {
        let router = build_router(test_support::state());
        let (status, body, _) = send(
            router,
            post_json("/chat", r#"{"query":"Apa itu JKN?","session_id":"web-7"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "jawaban: Apa itu JKN?");
        assert_eq!(body["sources"], json!(["panduan.pdf (hal. 2)"]));
    }

    #[tokio::test]
    async fn chat_route_rejects_empty_query() {
        let state = test_support::state();
        let router = build_router(state.clone());
        let (status, body, _) =
            send(router, post_json("/chat", r#"{"query":"","session_id":"web-7"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
        assert!(state.history().is_empty());
    }

    #[tokio::test]
    async fn chat_route_accepts_empty_session_id() {
        let state = test_support::state();
        let router = build_router(state.clone());
        let (status, body, _) =
            send(router, post_json("/chat", r#"{"query":"Apa itu JKN?","session_id":""}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "jawaban: Apa itu JKN?");
        assert_eq!(state.history().get_or_create("").snapshot().len(), 2);
    }

    #[tokio::test]
    async fn chat_route_rejects_missing_fields() {
        let router = build_router(test_support::state());
        let (status, body, _) = send(router, post_json("/chat", r#"{"query":"Halo"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn webhook_route_always_200() {
        let router = build_router(test_support::state());
        let (status, body, _) = send(router, post_json("/webhook/telegram", "garbage")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ignored");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let router = build_router(test_support::state());
        let (status, _, _) =
            send(router, Request::get("/nope").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
