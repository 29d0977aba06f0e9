//! `/speak` and `/voices` behaviour through the full router.

mod mock_providers;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use mock_providers::{RecordingSynthesizer, app_with, provider_error, test_config};
use osce_gateway::core::tts::{SynthesisRequest, TTSError};

fn speak_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/speak")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_speak_returns_audio_and_caches_it() {
    let synth = RecordingSynthesizer::scripted(vec![Ok(Bytes::from_static(b"B1"))]);
    let (app, _state) = app_with(test_config(), synth.clone());

    let response = app
        .clone()
        .oneshot(speak_request(r#"{"text":"Hello","voice_id":"V1"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "2");
    assert_eq!(body_bytes(response).await, Bytes::from_static(b"B1"));

    // Immediate repeat is served from the cache
    let response = app
        .oneshot(speak_request(r#"{"text":"Hello","voice_id":"V1"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, Bytes::from_static(b"B1"));

    assert_eq!(synth.calls(), vec![SynthesisRequest::new("V1", "Hello")]);
}

#[tokio::test]
async fn test_speak_uses_default_voice() {
    let synth = RecordingSynthesizer::new();
    let mut config = test_config();
    config.default_voice_id = "house-voice".to_string();
    let (app, _state) = app_with(config, synth.clone());

    let response = app
        .oneshot(speak_request(r#"{"text":"Good morning"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_bytes(response).await,
        Bytes::from_static(b"house-voice:Good morning")
    );
    assert_eq!(synth.calls()[0].voice_id, "house-voice");
}

#[tokio::test]
async fn test_same_text_different_voices_are_cached_separately() {
    let synth = RecordingSynthesizer::new();
    let (app, state) = app_with(test_config(), synth.clone());

    for voice in ["V1", "V2", "V1", "V2"] {
        let body = format!(r#"{{"text":"Hello","voice_id":"{voice}"}}"#);
        let response = app.clone().oneshot(speak_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(synth.call_count(), 2);
    assert_eq!(state.speech.cache().len(), 2);
}

#[tokio::test]
async fn test_empty_text_is_rejected_without_provider_call() {
    let synth = RecordingSynthesizer::new();
    let (app, _state) = app_with(test_config(), synth.clone());

    for body in [r#"{"text":""}"#, r#"{"text":"   "}"#, r#"{"voice_id":"V1"}"#] {
        let response = app.clone().oneshot(speak_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Text is required" })
        );
    }

    assert_eq!(synth.call_count(), 0);
}

#[tokio::test]
async fn test_unparseable_body_is_rejected() {
    let synth = RecordingSynthesizer::new();
    let (app, _state) = app_with(test_config(), synth.clone());

    let response = app.oneshot(speak_request("{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "error": "Invalid request body" })
    );
    assert_eq!(synth.call_count(), 0);
}

#[tokio::test]
async fn test_provider_error_is_reported_and_not_cached() {
    let synth = RecordingSynthesizer::scripted(vec![provider_error("Voice not found")]);
    let (app, state) = app_with(test_config(), synth.clone());

    let response = app
        .clone()
        .oneshot(speak_request(r#"{"text":"Hello","voice_id":"missing"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "success": false, "error": "Voice not found" })
    );
    assert!(state.speech.cache().is_empty());

    // The next identical request reaches the provider again
    let response = app
        .oneshot(speak_request(r#"{"text":"Hello","voice_id":"missing"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(synth.call_count(), 2);
}

#[tokio::test]
async fn test_empty_audio_is_an_error_and_not_cached() {
    let synth = RecordingSynthesizer::scripted(vec![Ok(Bytes::new())]);
    let (app, state) = app_with(test_config(), synth.clone());

    let response = app
        .clone()
        .oneshot(speak_request(r#"{"text":"Hello"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], TTSError::EmptyAudio.client_message());
    assert!(state.speech.cache().is_empty());

    let response = app
        .oneshot(speak_request(r#"{"text":"Hello"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(synth.call_count(), 2);
}

#[tokio::test]
async fn test_list_voices() {
    let synth = RecordingSynthesizer::new();
    let (app, _state) = app_with(test_config(), synth);

    let request = Request::builder().uri("/voices").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let voices = body["elevenlabs"].as_array().unwrap();
    assert_eq!(voices.len(), 1);
    assert_eq!(voices[0]["id"], "21m00Tcm4TlvDq8ikWAM");
    assert_eq!(voices[0]["name"], "Rachel");
}

#[tokio::test]
async fn test_list_voices_provider_failure() {
    let synth = RecordingSynthesizer::with_voices(Err(TTSError::ProviderError(
        "Invalid API key".to_string(),
    )));
    let (app, _state) = app_with(test_config(), synth);

    let request = Request::builder().uri("/voices").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "error": "Invalid API key" })
    );
}
