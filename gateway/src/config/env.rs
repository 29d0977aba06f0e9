use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use super::{AuthApiSecret, ServerConfig, TlsConfig, parse_auth_api_secrets_json};

/// Read a variable, treating unset and blank values the same
pub(super) fn env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parse<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(key) {
        Some(value) => value
            .parse()
            .map_err(|e| format!("Invalid {key} value '{value}': {e}").into()),
        None => Ok(default),
    }
}

fn env_bool(key: &str, default: bool) -> Result<bool, Box<dyn std::error::Error>> {
    match env_var(key) {
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(format!("Invalid {key} value '{value}': expected true or false").into()),
        },
        None => Ok(default),
    }
}

/// Split a comma-separated list, dropping blank items
pub(super) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn tls_from_env() -> Result<Option<TlsConfig>, Box<dyn std::error::Error>> {
    match (env_var("TLS_CERT_PATH"), env_var("TLS_KEY_PATH")) {
        (Some(cert), Some(key)) => Ok(Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        })),
        (None, None) => Ok(None),
        _ => Err("TLS_CERT_PATH and TLS_KEY_PATH must be set together".into()),
    }
}

fn auth_api_secrets_from_env() -> Result<Vec<AuthApiSecret>, Box<dyn std::error::Error>> {
    if let Some(json) = env_var("AUTH_API_SECRETS_JSON") {
        return parse_auth_api_secrets_json(&json);
    }

    Ok(env_var("AUTH_API_SECRET")
        .map(|secret| AuthApiSecret {
            id: env_var("AUTH_API_SECRET_ID").unwrap_or_else(|| "default".to_string()),
            secret,
            role: env_var("AUTH_API_SECRET_ROLE"),
        })
        .into_iter()
        .collect())
}

/// Build a configuration from environment variables, falling back to defaults
pub(super) fn load_from_env() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = ServerConfig::default();

    if let Some(host) = env_var("HOST") {
        config.host = host;
    }
    config.port = env_parse("PORT", config.port)?;
    config.tls = tls_from_env()?;

    config.elevenlabs_api_key = env_var("ELEVENLABS_API_KEY");
    if let Some(url) = env_var("ELEVENLABS_BASE_URL") {
        config.elevenlabs_base_url = url;
    }
    if let Some(voice) = env_var("ELEVENLABS_VOICE_ID") {
        config.default_voice_id = voice;
    }
    config.provider_timeout_seconds =
        env_parse("PROVIDER_TIMEOUT_SECONDS", config.provider_timeout_seconds)?;
    config.tts_cache_ttl_seconds = env_parse("TTS_CACHE_TTL_SECONDS", config.tts_cache_ttl_seconds)?;

    config.video_storage_path = env_var("VIDEO_STORAGE_PATH").map(PathBuf::from);
    config.max_video_upload_bytes =
        env_parse("MAX_VIDEO_UPLOAD_BYTES", config.max_video_upload_bytes)?;

    config.auth_required = env_bool("AUTH_REQUIRED", config.auth_required)?;
    config.auth_api_secrets = auth_api_secrets_from_env()?;
    config.auth_allowed_roles = env_var("AUTH_ALLOWED_ROLES")
        .map(|roles| split_list(&roles))
        .unwrap_or_default();

    config.cors_allowed_origins = env_var("CORS_ALLOWED_ORIGINS");
    config.rate_limit_requests_per_second = env_parse(
        "RATE_LIMIT_REQUESTS_PER_SECOND",
        config.rate_limit_requests_per_second,
    )?;
    config.rate_limit_burst_size = env_parse("RATE_LIMIT_BURST_SIZE", config.rate_limit_burst_size)?;

    Ok(config)
}
