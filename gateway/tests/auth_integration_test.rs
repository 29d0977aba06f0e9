//! Auth middleware behaviour on the protected routes.

mod mock_providers;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use mock_providers::{RecordingSynthesizer, app_with, secret, test_config};
use osce_gateway::ServerConfig;

fn auth_config(allowed_roles: &[&str]) -> ServerConfig {
    let mut config = test_config();
    config.auth_required = true;
    config.auth_api_secrets = vec![
        secret("web", "web-secret", Some("student")),
        secret("ops", "ops-secret", None),
    ];
    config.auth_allowed_roles = allowed_roles.iter().map(|r| r.to_string()).collect();
    config
}

fn speak(authorization: Option<&str>, uri: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::from(r#"{"text":"Hello"}"#)).unwrap()
}

async fn error_message(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_auth_disabled_passes_through() {
    let synth = RecordingSynthesizer::new();
    let (app, _state) = app_with(test_config(), synth.clone());

    let response = app.oneshot(speak(None, "/speak")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(synth.call_count(), 1);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let synth = RecordingSynthesizer::new();
    let (app, _state) = app_with(auth_config(&[]), synth.clone());

    let response = app.oneshot(speak(None, "/speak")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(response).await, "Missing authorization header");
    assert_eq!(synth.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_header_is_unauthorized() {
    let (app, _state) = app_with(auth_config(&[]), RecordingSynthesizer::new());

    let response = app
        .oneshot(speak(Some("Token web-secret"), "/speak"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        error_message(response).await,
        "Invalid authorization header format"
    );
}

#[tokio::test]
async fn test_wrong_secret_is_unauthorized() {
    let (app, _state) = app_with(auth_config(&[]), RecordingSynthesizer::new());

    let response = app
        .oneshot(speak(Some("Bearer nope"), "/speak"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(response).await, "Unauthorized: Invalid API secret");
}

#[tokio::test]
async fn test_valid_secret_from_header_or_query() {
    let synth = RecordingSynthesizer::new();
    let (app, _state) = app_with(auth_config(&[]), synth.clone());

    let response = app
        .clone()
        .oneshot(speak(Some("Bearer web-secret"), "/speak"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(speak(None, "/speak?token=ops-secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_role_not_allowed_is_forbidden() {
    let synth = RecordingSynthesizer::new();
    let (app, _state) = app_with(auth_config(&["student"]), synth.clone());

    let response = app
        .clone()
        .oneshot(speak(Some("Bearer web-secret"), "/speak"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The ops secret carries no role
    let response = app
        .oneshot(speak(Some("Bearer ops-secret"), "/speak"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(synth.call_count(), 1);
}

#[tokio::test]
async fn test_auth_required_without_secrets_is_server_error() {
    let mut config = test_config();
    config.auth_required = true;
    let (app, _state) = app_with(config, RecordingSynthesizer::new());

    let response = app
        .oneshot(speak(Some("Bearer anything"), "/speak"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        error_message(response).await,
        "Authentication service unavailable"
    );
}

#[tokio::test]
async fn test_health_check_is_public() {
    let (app, _state) = app_with(auth_config(&[]), RecordingSynthesizer::new());

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
