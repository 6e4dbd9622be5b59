//! Rendering of envelopes and errors onto HTTP responses.

mod common;

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{body_json, build_test_app_with, get, post_json, test_config};
use http_body_util::BodyExt;
use repairdesk_api::error::AppError;
use repairdesk_api::response::EnvelopeResponse;
use repairdesk_core::envelope::ResponseEnvelope;
use repairdesk_core::error::{CoreError, Environment};
use serde_json::json;

#[tokio::test]
async fn core_error_kinds_map_to_statuses() {
    let cases = [
        (CoreError::Validation("v".into()), StatusCode::PRECONDITION_FAILED),
        (CoreError::Controller("c".into()), StatusCode::INTERNAL_SERVER_ERROR),
        (CoreError::Unauthorized("u".into()), StatusCode::UNAUTHORIZED),
        (CoreError::NotFound("n".into()), StatusCode::NOT_FOUND),
        (CoreError::Rejected("r".into()), StatusCode::BAD_REQUEST),
    ];
    for (error, expected) in cases {
        let message = error.to_string();
        let response = AppError::from(error).into_response();
        assert_eq!(response.status(), expected);

        let json = body_json(response).await;
        assert_eq!(json, json!({ "payload": null, "error": message, "status": expected.as_u16() }));
    }
}

#[tokio::test]
async fn raw_envelope_is_sent_verbatim() {
    let envelope = ResponseEnvelope::successful_with(json!("id,brand\n1,Acme"), 200, true, "text/csv");
    let response = EnvelopeResponse::new(envelope).into_response();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/csv");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"id,brand\n1,Acme");
}

#[tokio::test]
async fn unchanged_update_renders_204() {
    let envelope = ResponseEnvelope::successful_with(
        json!({ "ok": true, "nModified": 0 }),
        204,
        false,
        "application/json",
    );
    let response = EnvelopeResponse::from(envelope).into_response();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn development_errors_carry_provenance() {
    let mut config = test_config();
    config.environment = Environment::Development;
    let app = build_test_app_with(config);

    let response = post_json(app, "/api/v1/users/login", json!({})).await;
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(
        body_json(response).await["error"],
        "[UserService] loginUser: Please supply login details"
    );
}

#[tokio::test]
async fn extractor_rejections_use_the_envelope_shape() {
    let app = build_test_app_with(test_config());
    let response = get(app, "/api/v1/tickets/all?email=a@b.com").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert!(json["payload"].is_null());
    assert_eq!(json["status"], 401);
}
