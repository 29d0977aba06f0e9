//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `speak` - Text-to-speech REST API
//! - `videos` - Video upload and ranged download
//! - `voices` - Voice listing endpoint

pub mod api;
pub mod speak;
pub mod videos;
pub mod voices;
