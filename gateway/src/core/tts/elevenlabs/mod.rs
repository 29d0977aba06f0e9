//! ElevenLabs TTS provider module.
//!
//! Wraps the ElevenLabs REST API:
//!
//! - `POST /v1/text-to-speech/{voice_id}?output_format=...` for synthesis
//! - `GET /v2/voices` for the voice catalogue
//!
//! # Example
//!
//! ```rust,ignore
//! use osce_gateway::core::tts::{ElevenLabsConfig, ElevenLabsTTS, SpeechSynthesizer, SynthesisRequest};
//!
//! let tts = ElevenLabsTTS::new(ElevenLabsConfig {
//!     api_key: Some("xi-...".to_string()),
//!     ..Default::default()
//! })?;
//! let audio = tts
//!     .synthesize(&SynthesisRequest::new("21m00Tcm4TlvDq8ikWAM", "Hello, doctor."))
//!     .await?;
//! ```

mod config;
mod provider;

pub use config::{
    DEFAULT_ELEVENLABS_VOICE_ID, ELEVENLABS_API_URL, ELEVENLABS_MODEL_ID, ELEVENLABS_OUTPUT_FORMAT,
    ElevenLabsConfig, SPEECH_AUDIO_MIME,
};
pub use provider::ElevenLabsTTS;
