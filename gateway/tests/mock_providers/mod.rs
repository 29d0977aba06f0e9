//! In-process providers and app builders shared by the integration tests.

// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;

use osce_gateway::ServerConfig;
use osce_gateway::config::AuthApiSecret;
use osce_gateway::core::tts::{SpeechSynthesizer, SynthesisRequest, TTSError, TTSResult, Voice};
use osce_gateway::routes;
use osce_gateway::state::AppState;

/// Synthesizer that replays scripted results and records every request.
///
/// Once the script is exhausted it answers `"{voice_id}:{text}"`.
pub struct RecordingSynthesizer {
    script: Mutex<VecDeque<TTSResult<Bytes>>>,
    calls: Mutex<Vec<SynthesisRequest>>,
    voices: TTSResult<Vec<Voice>>,
}

impl RecordingSynthesizer {
    pub fn new() -> Arc<Self> {
        Self::scripted(Vec::new())
    }

    pub fn scripted(script: Vec<TTSResult<Bytes>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            voices: Ok(vec![sample_voice()]),
        })
    }

    pub fn with_voices(voices: TTSResult<Vec<Voice>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            voices,
        })
    }

    pub fn calls(&self) -> Vec<SynthesisRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynthesizer {
    fn provider_name(&self) -> &'static str {
        "elevenlabs"
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> TTSResult<Bytes> {
        self.calls.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(Bytes::from(format!("{}:{}", request.voice_id, request.text))),
        }
    }

    async fn list_voices(&self) -> TTSResult<Vec<Voice>> {
        self.voices.clone()
    }
}

pub fn sample_voice() -> Voice {
    Voice {
        id: "21m00Tcm4TlvDq8ikWAM".to_string(),
        sample: "https://example.com/rachel.mp3".to_string(),
        name: "Rachel".to_string(),
        accent: "American".to_string(),
        gender: "Female".to_string(),
        language: "en".to_string(),
    }
}

pub fn provider_error(message: &str) -> TTSResult<Bytes> {
    Err(TTSError::ProviderError(message.to_string()))
}

/// Minimal configuration: auth disabled, no storage, no provider key
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config
}

pub fn secret(id: &str, secret: &str, role: Option<&str>) -> AuthApiSecret {
    AuthApiSecret {
        id: id.to_string(),
        secret: secret.to_string(),
        role: role.map(str::to_string),
    }
}

/// Build the full application router around `synthesizer`
pub fn app_with(config: ServerConfig, synthesizer: Arc<RecordingSynthesizer>) -> (Router, Arc<AppState>) {
    let state = AppState::with_synthesizer(config, synthesizer);
    (routes::create_app(state.clone()), state)
}
