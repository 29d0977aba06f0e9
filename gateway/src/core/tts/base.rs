//! Provider-neutral text-to-speech types.
//!
//! The [`SpeechSynthesizer`] trait is the seam between the speech service and
//! a concrete provider client. Production uses [`super::ElevenLabsTTS`]; tests
//! plug in a recording double.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Errors produced on the synthesis path
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TTSError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The provider answered with a failure status or an unusable payload
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// The provider could not be reached
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The provider call succeeded but produced zero bytes of audio
    #[error("Provider returned empty audio")]
    EmptyAudio,
}

pub type TTSResult<T> = Result<T, TTSError>;

impl TTSError {
    /// Message safe to hand back to an HTTP client.
    ///
    /// Provider messages are passed through; everything else collapses to a
    /// generic failure message.
    pub fn client_message(&self) -> String {
        match self {
            TTSError::ProviderError(msg) if !msg.trim().is_empty() => msg.clone(),
            TTSError::EmptyAudio => "No audio data received from speech provider".to_string(),
            _ => "Failed to generate speech".to_string(),
        }
    }
}

impl From<reqwest::Error> for TTSError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            TTSError::NetworkError(err.to_string())
        } else {
            TTSError::ProviderError(err.to_string())
        }
    }
}

/// Voice-quality parameters sent with every synthesis request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

/// A single synthesis request with the voice already resolved
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub voice_id: String,
    pub text: String,
}

impl SynthesisRequest {
    pub fn new(voice_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            voice_id: voice_id.into(),
            text: text.into(),
        }
    }
}

/// Voice metadata returned by the voice listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    /// Provider voice identifier
    pub id: String,
    /// URL to sample audio
    pub sample: String,
    /// Display name of the voice
    pub name: String,
    /// Accent or dialect
    pub accent: String,
    /// Gender of the voice
    pub gender: String,
    /// Language supported by the voice
    pub language: String,
}

/// A text-to-speech provider.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Short provider name used in logs and voice listings
    fn provider_name(&self) -> &'static str;

    /// Synthesize `request.text` with `request.voice_id`, returning encoded audio.
    ///
    /// Implementations must return [`TTSError::EmptyAudio`] rather than an empty
    /// buffer.
    async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<Bytes>;

    /// List the voices available to this account.
    async fn list_voices(&self) -> TTSResult<Vec<Voice>> {
        Ok(Vec::new())
    }
}
