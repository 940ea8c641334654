//! Bearer credential handed out by the session-auth collaborator.

use secrecy::{ExposeSecret, SecretString};

/// Bearer token used for both the REST API and the chat socket.
///
/// The token is wrapped in a [`SecretString`] and never appears in `Debug`
/// output or tracing logs.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Expose the raw token for an `Authorization` header or socket URI.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether the token is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.expose().trim().is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl From<SecretString> for Credential {
    fn from(secret: SecretString) -> Self {
        Self(secret)
    }
}
