use axum::{
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, header},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::core::tts::SPEECH_AUDIO_MIME;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// Body of `POST /speak`
#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    /// Text to synthesize
    #[serde(default)]
    pub text: Option<String>,
    /// Voice to use; falls back to the configured default
    #[serde(default)]
    pub voice_id: Option<String>,
}

/// Synthesize speech for the given text and return it as MP3.
///
/// Repeated requests for the same voice and text within the cache TTL are
/// served without calling the provider.
pub async fn speak_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpeakRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Rejected speak request body");
        AppError::BadRequest("Invalid request body".to_string())
    })?;

    let text = request
        .text
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Text is required".to_string()))?;

    let audio = state
        .speech
        .synthesize(request.voice_id.as_deref(), &text)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Speech synthesis failed"))?;

    let len = audio.len();
    let mut response = audio.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(SPEECH_AUDIO_MIME),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    Ok(response)
}
