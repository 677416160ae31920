use thiserror::Error;

/// Errors raised while producing a usable access token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No refresh token is stored; the interactive authorization flow has
    /// never completed (or was logged out).
    #[error("no refresh token stored")]
    MissingCredential,

    /// The identity provider rejected the refresh token itself. The session
    /// credential has been cleared; only re-authorization recovers.
    #[error("refresh token rejected: {0}")]
    RefreshRevoked(String),

    /// Network trouble, a 5xx, or rate limiting at the token endpoint.
    /// Stored credentials are untouched and a later retry may succeed.
    #[error("token refresh failed: {0}")]
    Transient(String),
}

impl AuthError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => {
                "Not connected to the calendar yet. Run 'voxnote auth login' first."
            }
            AuthError::RefreshRevoked(_) => {
                "Calendar access was revoked. Run 'voxnote auth login' to re-authorize."
            }
            AuthError::Transient(_) => {
                "Temporary problem reaching the identity provider. Try again later."
            }
        }
    }

    /// True when only a fresh interactive authorization can recover
    pub fn needs_authorization(&self) -> bool {
        matches!(
            self,
            AuthError::MissingCredential | AuthError::RefreshRevoked(_)
        )
    }

    /// True when retrying later without user action may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Transient(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_authorization() {
        assert!(AuthError::MissingCredential.needs_authorization());
        assert!(AuthError::RefreshRevoked("invalid_grant".into()).needs_authorization());
        assert!(!AuthError::Transient("timeout".into()).needs_authorization());
    }

    #[test]
    fn test_is_transient() {
        assert!(AuthError::Transient("503".into()).is_transient());
        assert!(!AuthError::MissingCredential.is_transient());
    }

    #[test]
    fn test_user_messages_are_actionable() {
        assert!(AuthError::MissingCredential
            .user_message()
            .contains("auth login"));
        assert!(AuthError::RefreshRevoked("x".into())
            .user_message()
            .contains("re-authorize"));
    }
}
