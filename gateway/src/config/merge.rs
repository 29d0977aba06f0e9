use std::path::PathBuf;

use super::env::{load_from_env, split_list};
use super::yaml::YamlConfig;
use super::{AuthApiSecret, ServerConfig, TlsConfig};

/// Load the environment configuration and apply YAML overrides on top
pub(super) fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = load_from_env()?;
    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(tls) = server.tls {
            match (tls.enabled, tls.cert_path, tls.key_path) {
                (Some(false), _, _) => config.tls = None,
                (_, Some(cert), Some(key)) => {
                    config.tls = Some(TlsConfig {
                        cert_path: PathBuf::from(cert),
                        key_path: PathBuf::from(key),
                    })
                }
                (Some(true), _, _) => {
                    return Err("server.tls requires both cert_path and key_path".into());
                }
                _ => {}
            }
        }
    }

    if let Some(providers) = yaml.providers {
        if let Some(key) = providers.elevenlabs_api_key.filter(|k| !k.trim().is_empty()) {
            config.elevenlabs_api_key = Some(key);
        }
        if let Some(url) = providers.elevenlabs_base_url {
            config.elevenlabs_base_url = url;
        }
        if let Some(timeout) = providers.timeout_seconds {
            config.provider_timeout_seconds = timeout;
        }
    }

    if let Some(tts) = yaml.tts {
        if let Some(voice) = tts.default_voice_id.filter(|v| !v.trim().is_empty()) {
            config.default_voice_id = voice.trim().to_string();
        }
        if let Some(ttl) = tts.cache_ttl_seconds {
            config.tts_cache_ttl_seconds = ttl;
        }
    }

    if let Some(videos) = yaml.videos {
        if let Some(path) = videos.storage_path {
            config.video_storage_path = Some(PathBuf::from(path));
        }
        if let Some(max) = videos.max_upload_bytes {
            config.max_video_upload_bytes = max;
        }
    }

    if let Some(auth) = yaml.auth {
        if let Some(required) = auth.required {
            config.auth_required = required;
        }
        if !auth.api_secrets.is_empty() {
            config.auth_api_secrets = auth
                .api_secrets
                .into_iter()
                .map(|entry| AuthApiSecret {
                    id: entry.id,
                    secret: entry.secret,
                    role: entry.role.filter(|r| !r.trim().is_empty()),
                })
                .collect();
        } else if let Some(secret) = auth.api_secret {
            config.auth_api_secrets = vec![AuthApiSecret {
                id: "default".to_string(),
                secret,
                role: None,
            }];
        }
        if let Some(roles) = auth.allowed_roles {
            config.auth_allowed_roles = split_list(&roles.join(","));
        }
    }

    if let Some(security) = yaml.security {
        if let Some(origins) = security.cors_allowed_origins {
            config.cors_allowed_origins = Some(origins);
        }
        if let Some(rps) = security.rate_limit_requests_per_second {
            config.rate_limit_requests_per_second = rps;
        }
        if let Some(burst) = security.rate_limit_burst_size {
            config.rate_limit_burst_size = burst;
        }
    }

    Ok(config)
}
