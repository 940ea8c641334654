//! Session-auth collaborator.
//!
//! Supplies the bearer credential shared by the REST and socket
//! collaborators. Token storage and renewal live outside this crate.

use gigloom_types::auth::Credential;

/// Source of the current bearer credential.
pub trait SessionAuth: Send + Sync {
    /// The credential, or `None` when the user is not signed in.
    fn credential(&self) -> Option<Credential>;
}

/// A fixed credential (or none), resolved once by the caller.
#[derive(Debug, Clone, Default)]
pub struct StaticSessionAuth {
    credential: Option<Credential>,
}

impl StaticSessionAuth {
    pub fn new(credential: Option<Credential>) -> Self {
        Self { credential }
    }
}

impl SessionAuth for StaticSessionAuth {
    fn credential(&self) -> Option<Credential> {
        self.credential.clone().filter(|c| !c.is_blank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_counts_as_signed_out() {
        let auth = StaticSessionAuth::new(Some(Credential::new("  ")));
        assert!(auth.credential().is_none());
    }

    #[test]
    fn returns_configured_token() {
        let auth = StaticSessionAuth::new(Some(Credential::new("tok")));
        assert_eq!(auth.credential().unwrap().expose(), "tok");
        assert!(StaticSessionAuth::default().credential().is_none());
    }
}
