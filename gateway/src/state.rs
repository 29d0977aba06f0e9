use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::cache::TtsResponseCache;
use crate::core::tts::{
    ElevenLabsConfig, ElevenLabsTTS, SpeechService, SpeechSynthesizer, TTSResult,
};
use crate::core::video::VideoStore;

/// Application state shared by every handler
pub struct AppState {
    pub config: ServerConfig,
    /// Cache-first synthesis over the configured provider
    pub speech: SpeechService,
    /// None when no storage directory is configured
    pub video_store: Option<VideoStore>,
}

impl AppState {
    /// Build the state with the ElevenLabs synthesizer described by `config`.
    ///
    /// A missing API key is not an error here; synthesis calls report it.
    pub fn new(config: ServerConfig) -> TTSResult<Arc<Self>> {
        let provider = ElevenLabsTTS::new(ElevenLabsConfig {
            api_key: config.elevenlabs_api_key.clone(),
            base_url: config.elevenlabs_base_url.clone(),
            timeout: config.provider_timeout(),
            ..Default::default()
        })?;

        if !provider.has_api_key() {
            tracing::warn!("ELEVENLABS_API_KEY is not set; speech synthesis requests will fail");
        }

        Ok(Self::with_synthesizer(config, Arc::new(provider)))
    }

    /// Build the state around an arbitrary synthesizer
    pub fn with_synthesizer(
        config: ServerConfig,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Arc<Self> {
        let cache = Arc::new(TtsResponseCache::new(config.tts_cache_ttl()));
        let speech = SpeechService::new(synthesizer, cache, config.default_voice_id.clone());
        let video_store = config
            .video_storage_path
            .as_ref()
            .map(|path| VideoStore::new(path.clone(), config.max_video_upload_bytes));

        tracing::info!(
            provider = speech.synthesizer().provider_name(),
            cache_ttl_seconds = config.tts_cache_ttl_seconds,
            video_storage = video_store.is_some(),
            "Application state initialized"
        );

        Arc::new(Self {
            config,
            speech,
            video_store,
        })
    }

    /// Stops background work owned by the state
    pub async fn shutdown(&self) {
        self.speech.cache().shutdown().await;
    }
}
