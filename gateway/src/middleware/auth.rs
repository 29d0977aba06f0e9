use crate::auth::{Auth, match_api_secret};
use crate::errors::auth_error::AuthError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Extract authentication token from request
///
/// Supported sources, in order:
/// 1. Authorization header: `Authorization: Bearer <token>` (preferred)
/// 2. Query parameter: `?token=<token>` (for media elements that cannot set headers)
fn extract_token(request: &Request) -> Result<String, AuthError> {
    if let Some(auth_header) = request.headers().get("authorization") {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        return match auth_str.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(AuthError::InvalidAuthHeader),
        };
    }

    if let Some(query) = request.uri().query() {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key == "token" && !value.is_empty() {
                tracing::debug!("Token extracted from query parameter");
                return Ok(value.into_owned());
            }
        }
    }

    Err(AuthError::MissingAuthHeader)
}

/// Authentication middleware that validates bearer tokens against API secrets
///
/// The middleware:
/// 1. Passes the request through with [`Auth::empty`] when auth is disabled
/// 2. Extracts the token from the Authorization header or query parameter
/// 3. Compares it in constant time with the configured API secrets
/// 4. Rejects secrets whose role is not in `auth_allowed_roles` (when set)
/// 5. Inserts the matched [`Auth`] into request extensions
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let config = &state.config;
    if !config.auth_required {
        tracing::debug!("Authentication disabled, inserting empty Auth context");
        request.extensions_mut().insert(Auth::empty());
        return Ok(next.run(request).await);
    }

    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    if !config.has_api_secret_auth() {
        return Err(AuthError::ConfigError(
            "Authentication required but no API secret configured".to_string(),
        ));
    }

    let token = extract_token(&request).inspect_err(|e| {
        tracing::warn!(method = %method, path = %path, error = %e, "Missing or malformed credentials");
    })?;

    let Some(secret) = match_api_secret(&token, &config.auth_api_secrets) else {
        tracing::warn!(method = %method, path = %path, "API secret authentication failed: token mismatch");
        return Err(AuthError::Unauthorized("Invalid API secret".to_string()));
    };

    if !config.auth_allowed_roles.is_empty() {
        let allowed = secret
            .role
            .as_ref()
            .is_some_and(|role| config.auth_allowed_roles.iter().any(|r| r == role));
        if !allowed {
            tracing::warn!(
                method = %method,
                path = %path,
                auth_id = %secret.id,
                role = ?secret.role,
                "Role not allowed"
            );
            return Err(AuthError::RoleNotAllowed(
                secret.role.clone().unwrap_or_else(|| "none".to_string()),
            ));
        }
    }

    tracing::info!(method = %method, path = %path, auth_id = %secret.id, "API secret authentication successful");
    request
        .extensions_mut()
        .insert(Auth::new(secret.id.clone(), secret.role.clone()));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str, authorization: Option<&str>) -> Request {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_token_from_header() {
        let token = extract_token(&request("/speak", Some("Bearer abc"))).unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn test_extract_token_rejects_other_schemes() {
        assert!(matches!(
            extract_token(&request("/speak", Some("Basic abc"))),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            extract_token(&request("/speak", Some("Bearer  "))),
            Err(AuthError::InvalidAuthHeader)
        ));
    }

    #[test]
    fn test_extract_token_from_query() {
        let token = extract_token(&request("/videos/a.webm?x=1&token=q%20t", None)).unwrap();
        assert_eq!(token, "q t");
    }

    #[test]
    fn test_extract_token_missing() {
        assert!(matches!(
            extract_token(&request("/speak", None)),
            Err(AuthError::MissingAuthHeader)
        ));
        assert!(matches!(
            extract_token(&request("/speak?token=", None)),
            Err(AuthError::MissingAuthHeader)
        ));
    }
}
