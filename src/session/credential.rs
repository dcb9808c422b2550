//! Session capability handed to the chat core by the authentication layer.

use std::fmt;

/// Opaque bearer token plus the display name of the authenticated user.
///
/// The token is never printed by `Debug`.
#[derive(Clone, Eq, PartialEq)]
pub struct Credential {
    token: String,
    display_name: String,
}

impl Credential {
    /// Build a credential. Returns `None` if the token is empty or blank.
    #[must_use]
    pub fn new(token: impl Into<String>, display_name: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return None;
        }
        Some(Self {
            token,
            display_name: display_name.into(),
        })
    }

    /// Raw bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Name shown in greetings.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Logout action owned by the authentication layer.
pub trait AuthSession: Send + Sync {
    /// Revoke the stored credential.
    fn logout(&self);
}

/// Auth session whose logout only drops the in-memory credential.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalAuthSession;

impl AuthSession for LocalAuthSession {
    fn logout(&self) {
        tracing::debug!("local credential discarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_is_no_credential() {
        assert!(Credential::new("", "ann").is_none());
        assert!(Credential::new("   ", "ann").is_none());
    }

    #[test]
    fn test_bearer_header_value() {
        let credential = Credential::new("tok1", "ann").unwrap();
        assert_eq!(credential.bearer(), "Bearer tok1");
        assert_eq!(credential.display_name(), "ann");
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("secret-token", "ann").unwrap();
        let printed = format!("{credential:?}");
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("ann"));
    }
}
