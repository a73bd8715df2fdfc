//! Session credential shared with the Transport Client
//!
//! Injected once per transport instance. The auth collaborator writes a new
//! token on login or refresh and clears it on logout; the next request picks
//! up the change.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Shared, refreshable bearer token
///
/// Clone is cheap; every clone observes the same token.
#[derive(Clone, Default)]
pub struct Credentials {
    token: Arc<RwLock<Option<String>>>,
}

impl Credentials {
    /// Credentials holding `token`
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        let credentials = Self::default();
        credentials.set(token);
        credentials
    }

    /// Credentials with no token
    #[inline]
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Replace the token; an empty string clears it
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        *self.token.write() = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
    }

    /// Drop the token
    pub fn clear(&self) {
        *self.token.write() = None;
    }

    /// Current token, if any
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Whether a token is present
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_token() {
        let credentials = Credentials::anonymous();
        let transport_copy = credentials.clone();

        credentials.set("abc");
        assert_eq!(transport_copy.bearer().as_deref(), Some("abc"));

        credentials.clear();
        assert!(!transport_copy.is_authenticated());
    }

    #[test]
    fn empty_token_means_no_credential() {
        assert!(!Credentials::new("").is_authenticated());
        assert!(Credentials::new("abc").is_authenticated());
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", Credentials::new("secret-token"));
        assert!(!rendered.contains("secret-token"));
    }
}
