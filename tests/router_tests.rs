use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use mazadi::config::AppConfig;
use mazadi::database::DatabaseManager;
use mazadi::routes;
use mazadi::state::AppState;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Router over a pool that never connects.
fn app_with(config: AppConfig) -> Router {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(1))
        .connect_lazy(&config.database.url)
        .unwrap();
    let db = Arc::new(DatabaseManager::from_pool(pool));
    routes::app(AppState::new(db, config))
}

fn app() -> Router {
    app_with(AppConfig::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    for (method, uri) in [
        ("GET", "/notifications"),
        ("GET", "/messages/inbox"),
        ("GET", "/payments/history"),
        ("GET", "/chatbot/history"),
        ("GET", "/accounts/profile"),
    ] {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn test_bid_without_token_is_unauthorized() {
    let (status, body) = send(
        app(),
        post_json("/bid", r#"{"auction_id": 1, "amount": "10.00"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required.");
}

#[tokio::test]
async fn test_malformed_token_header_is_unauthorized() {
    let request = Request::builder()
        .uri("/watchlist")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_rejects_malformed_payload() {
    let (status, body) = send(app(), post_json("/payments/webhook", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
}

#[tokio::test]
async fn test_webhook_requires_signature_when_secret_configured() {
    let mut config = AppConfig::default();
    config.stripe.webhook_secret = "whsec_test_secret".to_string();

    let payload = r#"{"type": "payment_intent.succeeded", "data": {"object": {"id": "pi_1"}}}"#;
    let (status, body) = send(app_with(config.clone()), post_json("/payments/webhook", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_SIGNATURE");

    let request = Request::builder()
        .method("POST")
        .uri("/payments/webhook")
        .header("Stripe-Signature", "t=1,v1=deadbeef")
        .body(Body::from(payload))
        .unwrap();
    let (status, body) = send(app_with(config), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_SIGNATURE");
}

#[tokio::test]
async fn test_chat_requires_message() {
    let (status, body) = send(app(), post_json("/chatbot/api/chat", r#"{"message": "   "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message is required");
}

#[tokio::test]
async fn test_chat_rejects_invalid_json() {
    let (status, body) = send(app(), post_json("/chatbot/api/chat", "message=hello")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON data");
    assert_eq!(body["code"], "INVALID_JSON");
}

#[tokio::test]
async fn test_chat_answers_when_conversation_cannot_be_stored() {
    let body = format!(r#"{{"message": "hello", "session_id": "{}"}}"#, "s".repeat(150));
    let (status, body) = send(app(), post_json("/chatbot/api/chat", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["category"], "greetings");
    assert!(body["session_id"].as_str().unwrap().len() <= 100);
}

#[tokio::test]
async fn test_feedback_rejects_invalid_json() {
    let (status, body) = send(app(), post_json("/chatbot/api/feedback", "[")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON data");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let request = Request::builder()
        .uri("/does-not-exist")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
