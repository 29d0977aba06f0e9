mod base;
pub mod elevenlabs;
pub mod service;

pub use base::{
    SpeechSynthesizer, SynthesisRequest, TTSError, TTSResult, Voice, VoiceSettings,
};
pub use elevenlabs::{
    DEFAULT_ELEVENLABS_VOICE_ID, ELEVENLABS_API_URL, ELEVENLABS_MODEL_ID, ELEVENLABS_OUTPUT_FORMAT,
    ElevenLabsConfig, ElevenLabsTTS, SPEECH_AUDIO_MIME,
};
pub use service::SpeechService;
