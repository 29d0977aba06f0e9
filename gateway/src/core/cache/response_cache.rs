//! Short-lived cache of synthesized audio keyed by `(voice_id, text)`.
//!
//! Entries expire a fixed TTL after insertion. Reads never extend an entry's
//! lifetime. Each insertion schedules an expiry task on a [`TaskTracker`]
//! owned by the cache; [`TtsResponseCache::shutdown`] cancels and joins all of
//! them.
//!
//! Only completed results are cached. Two concurrent misses for the same key
//! both reach the provider; the second `put` is discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use xxhash_rust::xxh3::xxh3_128;

/// Default lifetime of a cached audio buffer
pub const DEFAULT_TTS_CACHE_TTL: Duration = Duration::from_secs(300);

/// Composite cache key. The same text in two voices yields two keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    voice_id: String,
    text: String,
}

impl CacheKey {
    pub fn new(voice_id: &str, text: &str) -> Self {
        Self {
            voice_id: voice_id.to_string(),
            text: text.to_string(),
        }
    }

    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }

    /// Stable hex digest of the key, for logs that must not carry the text
    pub fn digest(&self) -> String {
        let mut s = String::with_capacity(self.voice_id.len() + self.text.len() + 1);
        s.push_str(&self.voice_id);
        s.push('\u{0}');
        s.push_str(&self.text);
        format!("{:032x}", xxh3_128(s.as_bytes()))
    }
}

struct CacheEntry {
    /// Identifies the insertion so a stale timer never removes a newer entry
    id: u64,
    audio: Bytes,
    inserted_at: Instant,
    expiry: CancellationToken,
}

/// Owned TTL cache for text-to-speech responses.
pub struct TtsResponseCache {
    entries: Arc<DashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    next_id: AtomicU64,
    timers: TaskTracker,
    shutdown: CancellationToken,
}

impl TtsResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            next_id: AtomicU64::new(0),
            timers: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached audio for the key if it is younger than the TTL.
    pub fn get(&self, voice_id: &str, text: &str) -> Option<Bytes> {
        let key = CacheKey::new(voice_id, text);
        let entry = self.entries.get(&key)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.audio.clone())
    }

    /// Stores `audio` unless a live entry already exists for the key.
    ///
    /// Returns `true` when the buffer was stored. Empty buffers and writes
    /// after [`shutdown`](Self::shutdown) are ignored. Must be called from
    /// within a tokio runtime.
    pub fn put(&self, voice_id: &str, text: &str, audio: Bytes) -> bool {
        if audio.is_empty() || self.shutdown.is_cancelled() {
            return false;
        }

        let key = CacheKey::new(voice_id, text);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let inserted_at = Instant::now();
        let expiry = self.shutdown.child_token();
        let entry = CacheEntry {
            id,
            audio,
            inserted_at,
            expiry: expiry.clone(),
        };

        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().inserted_at.elapsed() < self.ttl {
                    return false;
                }
                // Expired but its timer has not run yet
                let stale = occupied.insert(entry);
                stale.expiry.cancel();
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
            }
        }

        self.schedule_expiry(key, id, inserted_at + self.ttl, expiry);
        true
    }

    fn schedule_expiry(&self, key: CacheKey, id: u64, deadline: Instant, expiry: CancellationToken) {
        let entries = Arc::clone(&self.entries);
        self.timers.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    if entries.remove_if(&key, |_, entry| entry.id == id).is_some() {
                        tracing::debug!(cache_key = %key.digest(), "TTS cache entry expired");
                    }
                }
                _ = expiry.cancelled() => {}
            }
        });
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry and cancels the pending expiry tasks.
    pub fn clear(&self) {
        self.entries.retain(|_, entry| {
            entry.expiry.cancel();
            false
        });
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Cancels all expiry tasks, waits for them to finish and empties the cache.
    /// Later calls to [`put`](Self::put) store nothing.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.timers.close();
        self.timers.wait().await;
        self.entries.clear();
        tracing::info!("TTS response cache shut down");
    }
}

impl Default for TtsResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTS_CACHE_TTL)
    }
}

impl Drop for TtsResponseCache {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
