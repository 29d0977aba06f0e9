pub mod cache;
pub mod tts;
pub mod video;

pub use cache::{CacheKey, DEFAULT_TTS_CACHE_TTL, TtsResponseCache};
pub use tts::{
    ElevenLabsTTS, SpeechService, SpeechSynthesizer, SynthesisRequest, TTSError, TTSResult, Voice,
};
pub use video::{RangeRequest, VideoError, VideoStore};
