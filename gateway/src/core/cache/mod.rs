//! In-process caches.

pub mod response_cache;

pub use response_cache::{CacheKey, DEFAULT_TTS_CACHE_TTL, TtsResponseCache};
