//! Configuration module for the OSCE gateway
//!
//! Server configuration comes from .env files, YAML files and environment
//! variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Applying YAML overrides on top of the environment
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use osce_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config = ServerConfig::from_file(&PathBuf::from("config.yaml"))?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::core::cache::DEFAULT_TTS_CACHE_TTL;
use crate::core::tts::elevenlabs::{DEFAULT_ELEVENLABS_VOICE_ID, ELEVENLABS_API_URL};

mod env;
mod merge;
mod validation;
mod yaml;

/// Default upper bound for a single video upload (500 MiB)
pub const DEFAULT_MAX_VIDEO_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Default timeout for outbound provider requests
pub const DEFAULT_PROVIDER_TIMEOUT_SECONDS: u64 = 30;

/// TLS configuration for HTTPS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// API secret authentication entry with a client identifier and optional role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthApiSecret {
    pub id: String,
    pub secret: String,
    pub role: Option<String>,
}

/// Server configuration
///
/// Contains everything needed to run the gateway:
/// - Server settings (host, port, TLS)
/// - ElevenLabs provider settings and the default voice
/// - TTS response cache lifetime
/// - Video storage location and upload limit
/// - Authentication settings
/// - Security settings (CORS, rate limiting)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Provider settings
    pub elevenlabs_api_key: Option<String>,
    /// Base URL of the ElevenLabs API, overridable for tests and proxies
    pub elevenlabs_base_url: String,
    /// Voice used when a request does not name one
    pub default_voice_id: String,
    pub provider_timeout_seconds: u64,

    // TTS cache
    pub tts_cache_ttl_seconds: u64,

    // Video storage
    /// Directory for recorded videos. If None, the video routes answer 503.
    pub video_storage_path: Option<PathBuf>,
    pub max_video_upload_bytes: u64,

    // Authentication configuration
    pub auth_api_secrets: Vec<AuthApiSecret>,
    pub auth_required: bool,
    /// Roles accepted by the auth middleware. Empty accepts any role.
    pub auth_allowed_roles: Vec<String>,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            tls: None,
            elevenlabs_api_key: None,
            elevenlabs_base_url: ELEVENLABS_API_URL.to_string(),
            default_voice_id: DEFAULT_ELEVENLABS_VOICE_ID.to_string(),
            provider_timeout_seconds: DEFAULT_PROVIDER_TIMEOUT_SECONDS,
            tts_cache_ttl_seconds: DEFAULT_TTS_CACHE_TTL.as_secs(),
            video_storage_path: None,
            max_video_upload_bytes: DEFAULT_MAX_VIDEO_UPLOAD_BYTES,
            auth_api_secrets: Vec::new(),
            auth_required: false,
            auth_allowed_roles: Vec::new(),
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
        }
    }
}

/// Zeroize secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.elevenlabs_api_key {
            key.zeroize();
        }
        for secret in &mut self.auth_api_secrets {
            secret.secret.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// The .env file is loaded by `main` before this is called, so real
    /// environment variables take precedence over .env values.
    ///
    /// # Errors
    /// Returns an error if a variable has an invalid format or the resulting
    /// configuration fails validation.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        validation::validate_auth_api_secrets(&self.auth_api_secrets)?;
        validation::validate_auth_required(self.auth_required, &self.auth_api_secrets)?;
        validation::validate_positive("TTS_CACHE_TTL_SECONDS", self.tts_cache_ttl_seconds)?;
        validation::validate_positive("PROVIDER_TIMEOUT_SECONDS", self.provider_timeout_seconds)?;
        validation::validate_positive("MAX_VIDEO_UPLOAD_BYTES", self.max_video_upload_bytes)?;
        validation::validate_positive(
            "RATE_LIMIT_REQUESTS_PER_SECOND",
            self.rate_limit_requests_per_second.into(),
        )?;
        validation::validate_positive("RATE_LIMIT_BURST_SIZE", self.rate_limit_burst_size.into())?;
        Ok(())
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Check if API secret authentication is configured
    pub fn has_api_secret_auth(&self) -> bool {
        !self.auth_api_secrets.is_empty()
    }

    pub fn tts_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.tts_cache_ttl_seconds)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_seconds)
    }
}

pub(crate) fn parse_auth_api_secrets_json(
    json_str: &str,
) -> Result<Vec<AuthApiSecret>, Box<dyn std::error::Error>> {
    #[derive(serde::Deserialize)]
    struct AuthApiSecretJson {
        id: String,
        secret: String,
        #[serde(default)]
        role: Option<String>,
    }

    let secrets: Vec<AuthApiSecretJson> = serde_json::from_str(json_str)
        .map_err(|e| format!("Invalid AUTH_API_SECRETS_JSON format: {e}"))?;

    Ok(secrets
        .into_iter()
        .map(|entry| AuthApiSecret {
            id: entry.id,
            secret: entry.secret,
            role: entry.role.filter(|r| !r.trim().is_empty()),
        })
        .collect())
}
