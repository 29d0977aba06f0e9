//! ElevenLabs provider implementation.
//!
//! # API Reference
//!
//! - Synthesis: `POST {base}/v1/text-to-speech/{voice_id}?output_format={format}`
//! - Voices: `GET {base}/v2/voices`
//! - Auth: `xi-api-key` header

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::config::{
    ELEVENLABS_MODEL_ID, ELEVENLABS_OUTPUT_FORMAT, ElevenLabsConfig, SPEECH_AUDIO_MIME,
};
use crate::core::tts::base::{
    SpeechSynthesizer, SynthesisRequest, TTSError, TTSResult, Voice, VoiceSettings,
};

// ElevenLabs API response structures
#[derive(Debug, Deserialize)]
struct ElevenLabsVoicesResponse {
    voices: Vec<ElevenLabsVoice>,
}

#[derive(Debug, Deserialize)]
struct ElevenLabsVoice {
    voice_id: String,
    name: String,
    preview_url: Option<String>,
    description: Option<String>,
    labels: Option<HashMap<String, String>>,
    verified_languages: Option<Vec<ElevenLabsLanguage>>,
}

#[derive(Debug, Deserialize)]
struct ElevenLabsLanguage {
    language: String,
    accent: Option<String>,
}

/// ElevenLabs HTTP client.
pub struct ElevenLabsTTS {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    voice_settings: VoiceSettings,
}

impl ElevenLabsTTS {
    pub fn new(config: ElevenLabsConfig) -> TTSResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            TTSError::InvalidConfiguration(format!(
                "Invalid ElevenLabs base URL '{}': {e}",
                config.base_url
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TTSError::InvalidConfiguration(format!(
                "ElevenLabs base URL '{}' cannot be used as a base",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TTSError::InvalidConfiguration(format!("HTTP client error: {e}")))?;

        // An empty key is treated as absent
        let api_key = config.api_key.filter(|key| !key.trim().is_empty());

        Ok(Self {
            client,
            base_url,
            api_key,
            voice_settings: config.voice_settings,
        })
    }

    pub fn voice_settings(&self) -> VoiceSettings {
        self.voice_settings
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> TTSResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            TTSError::InvalidConfiguration(
                "ElevenLabs API key not configured in server environment".to_string(),
            )
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Build the synthesis request. The voice id is percent-encoded into the path.
    fn build_tts_request(&self, request: &SynthesisRequest) -> TTSResult<reqwest::RequestBuilder> {
        let api_key = self.api_key()?;
        let url = self.endpoint(&["v1", "text-to-speech", &request.voice_id]);

        let body = json!({
            "text": request.text,
            "model_id": ELEVENLABS_MODEL_ID,
            "voice_settings": {
                "stability": self.voice_settings.stability,
                "similarity_boost": self.voice_settings.similarity_boost,
            },
        });

        Ok(self
            .client
            .post(url)
            .query(&[("output_format", ELEVENLABS_OUTPUT_FORMAT)])
            .header("xi-api-key", api_key)
            .header("Accept", SPEECH_AUDIO_MIME)
            .json(&body))
    }
}

/// Pull a human readable message out of an ElevenLabs error body.
///
/// Handles `{"detail": {"message": ..}}`, `{"detail": ".."}` and the
/// validation form `{"detail": [{"msg": ..}]}`.
fn extract_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let fallback = || format!("ElevenLabs request failed with status {status}");

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        let trimmed = body.trim();
        return if trimmed.is_empty() {
            fallback()
        } else {
            trimmed.to_string()
        };
    };

    let detail = &value["detail"];
    let message = detail["message"]
        .as_str()
        .or_else(|| detail.as_str())
        .or_else(|| detail[0]["msg"].as_str())
        .or_else(|| value["message"].as_str());

    match message {
        Some(msg) if !msg.trim().is_empty() => msg.to_string(),
        _ => fallback(),
    }
}

fn classify_gender(voice: &ElevenLabsVoice) -> String {
    let from_text = |text: &str| {
        let lower = text.to_lowercase();
        if lower.contains("female") || lower.contains("feminine") {
            Some("Female".to_string())
        } else if lower.contains("male") || lower.contains("masculine") {
            Some("Male".to_string())
        } else {
            None
        }
    };

    voice
        .labels
        .as_ref()
        .and_then(|labels| labels.get("gender").and_then(|g| from_text(g)))
        .or_else(|| voice.description.as_deref().and_then(from_text))
        .unwrap_or_else(|| "Unknown".to_string())
}

impl From<ElevenLabsVoice> for Voice {
    fn from(voice: ElevenLabsVoice) -> Self {
        let gender = classify_gender(&voice);

        let (language, accent) = voice
            .verified_languages
            .as_ref()
            .and_then(|langs| langs.first())
            .map(|lang| {
                (
                    lang.language.clone(),
                    lang.accent.clone().unwrap_or_else(|| "Unknown".to_string()),
                )
            })
            .or_else(|| {
                voice
                    .labels
                    .as_ref()
                    .and_then(|labels| labels.get("accent"))
                    .map(|accent| ("Unknown".to_string(), accent.clone()))
            })
            .unwrap_or_else(|| ("Unknown".to_string(), "Unknown".to_string()));

        Voice {
            id: voice.voice_id,
            sample: voice.preview_url.unwrap_or_default(),
            name: voice.name,
            accent,
            gender,
            language,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsTTS {
    fn provider_name(&self) -> &'static str {
        "elevenlabs"
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<Bytes> {
        let http_request = self.build_tts_request(request)?;

        tracing::debug!(
            voice_id = %request.voice_id,
            model = ELEVENLABS_MODEL_ID,
            chars = request.text.chars().count(),
            "Sending ElevenLabs synthesis request"
        );

        let response = http_request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(status, &body);
            tracing::warn!(
                status = %status,
                voice_id = %request.voice_id,
                error = %message,
                "ElevenLabs synthesis failed"
            );
            return Err(TTSError::ProviderError(message));
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            tracing::warn!(voice_id = %request.voice_id, "ElevenLabs returned empty audio");
            return Err(TTSError::EmptyAudio);
        }

        Ok(audio)
    }

    async fn list_voices(&self) -> TTSResult<Vec<Voice>> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .get(self.endpoint(&["v2", "voices"]))
            .header("xi-api-key", api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TTSError::ProviderError(extract_error_message(status, &body)));
        }

        let payload: ElevenLabsVoicesResponse = response
            .json()
            .await
            .map_err(|e| TTSError::ProviderError(format!("Invalid voices response: {e}")))?;

        Ok(payload.voices.into_iter().map(Voice::from).collect())
    }
}
