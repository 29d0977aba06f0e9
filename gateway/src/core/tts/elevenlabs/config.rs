//! Configuration types for the ElevenLabs text-to-speech API.
//!
//! The gateway always synthesizes with a fixed model, output encoding and
//! voice settings. The constants below name them; [`ElevenLabsConfig`] carries
//! the connection settings loaded from [`crate::config::ServerConfig`].

use std::time::Duration;

use crate::core::tts::base::VoiceSettings;

/// Default ElevenLabs API origin
pub const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io";

/// Voice used when a request does not name one ("Rachel")
pub const DEFAULT_ELEVENLABS_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Synthesis model used for all patient speech
pub const ELEVENLABS_MODEL_ID: &str = "eleven_multilingual_v2";

/// `output_format` query value: MP3, 44.1kHz, 128kbps
pub const ELEVENLABS_OUTPUT_FORMAT: &str = "mp3_44100_128";

/// MIME type of [`ELEVENLABS_OUTPUT_FORMAT`]
pub const SPEECH_AUDIO_MIME: &str = "audio/mpeg";

// =============================================================================
// Client configuration
// =============================================================================

/// Settings for [`super::ElevenLabsTTS`]
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// API key; `None` leaves the client constructed but unable to synthesize
    pub api_key: Option<String>,
    /// API origin without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    pub voice_settings: VoiceSettings,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: ELEVENLABS_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            voice_settings: VoiceSettings::default(),
        }
    }
}
