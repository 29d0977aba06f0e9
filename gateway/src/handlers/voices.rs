use axum::{extract::State, response::Json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::tts::{TTSError, Voice};
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// Voices keyed by provider name
pub type VoicesResponse = HashMap<String, Vec<Voice>>;

/// List the voices offered by the configured speech provider
pub async fn list_voices(State(state): State<Arc<AppState>>) -> AppResult<Json<VoicesResponse>> {
    let synthesizer = state.speech.synthesizer();
    let provider = synthesizer.provider_name();

    let voices = synthesizer.list_voices().await.map_err(|e| {
        tracing::error!(provider, error = %e, "Failed to list voices");
        let message = match e {
            TTSError::ProviderError(msg) if !msg.trim().is_empty() => msg,
            _ => "Failed to fetch voices from speech provider".to_string(),
        };
        AppError::BadGateway(message)
    })?;

    tracing::debug!(provider, count = voices.len(), "Listed voices");
    Ok(Json(HashMap::from([(provider.to_string(), voices)])))
}
