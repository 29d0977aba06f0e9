//! Cache-first synthesis.
//!
//! [`SpeechService::synthesize`] checks the [`TtsResponseCache`] and only
//! calls the provider on a miss. Provider failures and empty audio are never
//! cached.

use std::sync::Arc;

use bytes::Bytes;

use super::base::{SpeechSynthesizer, SynthesisRequest, TTSError, TTSResult};
use crate::core::cache::{CacheKey, TtsResponseCache};

pub struct SpeechService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    cache: Arc<TtsResponseCache>,
    default_voice_id: String,
}

impl SpeechService {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        cache: Arc<TtsResponseCache>,
        default_voice_id: impl Into<String>,
    ) -> Self {
        Self {
            synthesizer,
            cache,
            default_voice_id: default_voice_id.into(),
        }
    }

    pub fn cache(&self) -> &Arc<TtsResponseCache> {
        &self.cache
    }

    pub fn synthesizer(&self) -> &Arc<dyn SpeechSynthesizer> {
        &self.synthesizer
    }

    pub fn default_voice_id(&self) -> &str {
        &self.default_voice_id
    }

    /// Requested voice, or the default when absent or blank
    pub fn resolve_voice<'a>(&'a self, voice_id: Option<&'a str>) -> &'a str {
        match voice_id.map(str::trim) {
            Some(voice) if !voice.is_empty() => voice,
            _ => &self.default_voice_id,
        }
    }

    /// Returns audio for `text` in the resolved voice, from cache when possible.
    pub async fn synthesize(&self, voice_id: Option<&str>, text: &str) -> TTSResult<Bytes> {
        let voice_id = self.resolve_voice(voice_id);
        let cache_key = CacheKey::new(voice_id, text).digest();

        if let Some(audio) = self.cache.get(voice_id, text) {
            tracing::debug!(
                voice_id = %voice_id,
                cache_key = %cache_key,
                bytes = audio.len(),
                "TTS cache hit"
            );
            return Ok(audio);
        }

        tracing::debug!(
            voice_id = %voice_id,
            cache_key = %cache_key,
            provider = self.synthesizer.provider_name(),
            "TTS cache miss, calling provider"
        );

        let request = SynthesisRequest::new(voice_id, text);
        let audio = self.synthesizer.synthesize(&request).await?;
        if audio.is_empty() {
            return Err(TTSError::EmptyAudio);
        }

        if self.cache.put(voice_id, text, audio.clone()) {
            tracing::info!(
                voice_id = %voice_id,
                cache_key = %cache_key,
                bytes = audio.len(),
                "Cached synthesized audio"
            );
        }

        Ok(audio)
    }
}
