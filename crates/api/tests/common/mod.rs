#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use repairdesk_api::auth::jwt::{JwtConfig, AUTH_TOKEN_HEADER};
use repairdesk_api::config::ServerConfig;
use repairdesk_api::router::build_app_router;
use repairdesk_api::state::AppState;
use repairdesk_core::error::Environment;
use repairdesk_db::MemoryRecordStore;
use repairdesk_events::EventBus;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        environment: Environment::Production,
        database_url: None,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            token_expiry_mins: 60,
        },
    }
}

/// Build the full application router over a fresh in-memory store.
///
/// Uses the same [`build_app_router`] as `main.rs`, so the middleware stack
/// under test is the production one.
pub fn build_test_app() -> Router {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> Router {
    let state = AppState::new(
        config.clone(),
        Arc::new(MemoryRecordStore::new()),
        Arc::new(EventBus::default()),
    );
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTH_TOKEN_HEADER, token);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.oneshot(request).await.expect("request should complete")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

pub const TEST_PASSWORD: &str = "Engine#1843";

pub fn registration(first: &str, email: &str, role: &str) -> Value {
    json!({
        "firstName": first,
        "lastName": "Tester",
        "email": email,
        "role": role,
        "password": TEST_PASSWORD,
    })
}

/// Register a user and log in, returning the issued token.
pub async fn register_and_login(app: &Router, email: &str, role: &str) -> String {
    let response = post_json(
        app.clone(),
        "/api/v1/users",
        registration("Test", email, role),
    )
    .await;
    assert_eq!(response.status(), 200, "registration should succeed");

    let response = post_json(
        app.clone(),
        "/api/v1/users/login",
        json!({ "email": email, "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), 200, "login should succeed");

    response
        .headers()
        .get(AUTH_TOKEN_HEADER)
        .expect("login must set the auth header")
        .to_str()
        .expect("token should be ASCII")
        .to_string()
}

pub fn device(brand: &str) -> Value {
    json!({ "brand": brand, "model": "X1", "issue": "won't boot" })
}
