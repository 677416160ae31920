//! Session-scoped token manager.
//!
//! Owns the [`Credential`] for one process run and hands out access tokens,
//! refreshing through the provider when the stored token is expired. Never
//! retries on its own; callers decide what a failure means for their batch.

use crate::credentials::Credential;
use crate::error::AuthError;
use crate::oauth::OAuthProvider;

pub struct TokenManager {
    provider: OAuthProvider,
    credential: Credential,
}

impl TokenManager {
    /// Build a manager talking to the default provider endpoints
    pub fn new(credential: Credential) -> Self {
        let provider = OAuthProvider::new(
            credential.client_id.clone(),
            credential.client_secret.clone(),
        );
        Self {
            provider,
            credential,
        }
    }

    /// Build a manager with an explicit provider (custom endpoints)
    pub fn with_provider(credential: Credential, provider: OAuthProvider) -> Self {
        Self {
            provider,
            credential,
        }
    }

    /// Whether a refresh token is present at all
    pub fn is_authorized(&self) -> bool {
        self.credential.refresh_token.is_some()
    }

    /// Read access to the session credential
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Produce a valid access token, refreshing if necessary.
    ///
    /// The happy path with an unexpired token performs no network call.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn ensure_valid_token(&mut self) -> Result<String, AuthError> {
        if self.credential.refresh_token.is_none() {
            return Err(AuthError::MissingCredential);
        }

        if let Some(token) = self.credential.valid_access_token() {
            return Ok(token.to_string());
        }

        self.refresh_now().await
    }

    /// Force a refresh regardless of the stored expiry.
    ///
    /// Used when the calendar service rejects a token the expiry said was
    /// still good.
    pub async fn refresh_now(&mut self) -> Result<String, AuthError> {
        let refresh_token = self
            .credential
            .refresh_token
            .clone()
            .ok_or(AuthError::MissingCredential)?;

        match self.provider.refresh(&refresh_token).await {
            Ok(tokens) => {
                tracing::info!("Access token refreshed");
                self.credential
                    .set_access_token(tokens.access_token.clone(), tokens.expires_in);
                // Providers rarely rotate the refresh token; keep the old one
                // when the response omits it.
                if let Some(new_refresh) = tokens.refresh_token {
                    self.credential.refresh_token = Some(new_refresh);
                }
                Ok(tokens.access_token)
            }
            Err(err @ AuthError::RefreshRevoked(_)) => {
                tracing::warn!("Refresh token revoked; clearing session credential");
                self.credential.revoke();
                Err(err)
            }
            Err(err) => Err(err),
        }
    }
}
