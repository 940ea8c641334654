//! Credential source backed by an environment variable.

use gigloom_core::auth::SessionAuth;
use gigloom_types::auth::Credential;

/// Default variable holding the bearer token.
pub const TOKEN_VAR: &str = "GIGLOOM_TOKEN";

/// Reads the bearer token from the environment on every lookup, so a token
/// refreshed by the shell is picked up by the next session.
#[derive(Debug, Clone)]
pub struct EnvSessionAuth {
    var: String,
}

impl EnvSessionAuth {
    pub fn new() -> Self {
        Self::with_var(TOKEN_VAR)
    }

    pub fn with_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvSessionAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionAuth for EnvSessionAuth {
    fn credential(&self) -> Option<Credential> {
        // Unset, non-unicode and blank values all mean "signed out".
        let token = std::env::var(&self.var).ok()?;
        let credential = Credential::new(token);
        (!credential.is_blank()).then_some(credential)
    }
}
