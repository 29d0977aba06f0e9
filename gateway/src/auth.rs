//! Request identity and API secret matching.

use subtle::ConstantTimeEq;

use crate::config::AuthApiSecret;

/// Identity attached to an authenticated request.
///
/// Inserted into request extensions by the auth middleware; handlers read it
/// through `Extension<Auth>`. When authentication is disabled the middleware
/// inserts [`Auth::empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Auth {
    /// Identifier of the matched API secret
    pub id: Option<String>,
    /// Role attached to the matched API secret
    pub role: Option<String>,
}

impl Auth {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(id: impl Into<String>, role: Option<String>) -> Self {
        Self {
            id: Some(id.into()),
            role,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }
}

/// Find the configured secret matching `token`.
///
/// Every entry is compared in constant time and the loop never exits early,
/// so timing does not reveal which entry matched or how many bytes agreed.
pub fn match_api_secret<'a>(token: &str, secrets: &'a [AuthApiSecret]) -> Option<&'a AuthApiSecret> {
    let mut matched = None;
    for entry in secrets {
        if bool::from(entry.secret.as_bytes().ct_eq(token.as_bytes())) && matched.is_none() {
            matched = Some(entry);
        }
    }
    matched
}
