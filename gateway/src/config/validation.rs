use std::collections::HashSet;

use super::AuthApiSecret;

/// Validate API secret entries: non-empty id and secret, unique ids
pub(super) fn validate_auth_api_secrets(
    secrets: &[AuthApiSecret],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut seen = HashSet::new();
    for entry in secrets {
        if entry.id.trim().is_empty() {
            return Err("Auth API secret id must not be empty".into());
        }
        if entry.secret.trim().is_empty() {
            return Err(format!("Auth API secret for id '{}' must not be empty", entry.id).into());
        }
        if !seen.insert(entry.id.as_str()) {
            return Err(format!("Duplicate auth API secret id '{}'", entry.id).into());
        }
    }
    Ok(())
}

/// Validate that authentication can work when it is required
pub(super) fn validate_auth_required(
    auth_required: bool,
    secrets: &[AuthApiSecret],
) -> Result<(), Box<dyn std::error::Error>> {
    if auth_required && secrets.is_empty() {
        return Err(
            "AUTH_REQUIRED is enabled but no API secret is configured \
             (set AUTH_API_SECRETS_JSON or AUTH_API_SECRET)"
                .into(),
        );
    }
    Ok(())
}

pub(super) fn validate_positive(name: &str, value: u64) -> Result<(), Box<dyn std::error::Error>> {
    if value == 0 {
        return Err(format!("{name} must be greater than zero").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(id: &str, secret: &str) -> AuthApiSecret {
        AuthApiSecret {
            id: id.to_string(),
            secret: secret.to_string(),
            role: None,
        }
    }

    #[test]
    fn test_validate_auth_api_secrets() {
        assert!(validate_auth_api_secrets(&[]).is_ok());
        assert!(validate_auth_api_secrets(&[secret("a", "x"), secret("b", "y")]).is_ok());

        let err = validate_auth_api_secrets(&[secret(" ", "x")]).unwrap_err();
        assert!(err.to_string().contains("id must not be empty"));

        let err = validate_auth_api_secrets(&[secret("a", "")]).unwrap_err();
        assert!(err.to_string().contains("'a'"));

        let err = validate_auth_api_secrets(&[secret("a", "x"), secret("a", "y")]).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_validate_auth_required() {
        assert!(validate_auth_required(false, &[]).is_ok());
        assert!(validate_auth_required(true, &[secret("a", "x")]).is_ok());
        assert!(validate_auth_required(true, &[]).is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("X", 1).is_ok());
        let err = validate_positive("TTS_CACHE_TTL_SECONDS", 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TTS_CACHE_TTL_SECONDS must be greater than zero"
        );
    }
}
