use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use voxnote_core::secrets::{SecretStore, CLIENT_ID, CLIENT_SECRET, REFRESH_TOKEN};

/// Safety margin so a token about to expire is not handed to a request
/// that will outlive it.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth credential state for one session.
///
/// Loaded from the layered secret store at process start. The access token
/// and expiry live only in memory; they are never written back to the store.
#[derive(Debug, Clone)]
pub struct Credential {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: Option<String>,
    pub access_token: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: None,
            access_token: None,
            expiry: None,
        }
    }

    /// Assemble the credential from the secret store.
    ///
    /// Client id and secret are required; the refresh token is optional and
    /// simply leaves the credential unauthorized when absent.
    pub fn from_secrets(store: &SecretStore) -> Result<Self> {
        let client_id = store
            .get(CLIENT_ID)
            .with_context(|| format!("Missing required secret: {}", CLIENT_ID))?;
        let client_secret = store
            .get(CLIENT_SECRET)
            .with_context(|| format!("Missing required secret: {}", CLIENT_SECRET))?;

        let mut credential = Self::new(client_id, client_secret);
        credential.refresh_token = store.get(REFRESH_TOKEN);
        Ok(credential)
    }

    /// The current access token, if one is stored and not about to expire
    pub fn valid_access_token(&self) -> Option<&str> {
        if self.is_expired() {
            return None;
        }
        self.access_token.as_deref()
    }

    /// Check whether the stored access token is expired (or missing)
    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Some(expiry) => Utc::now() >= expiry - Duration::seconds(EXPIRY_MARGIN_SECS),
            None => true,
        }
    }

    /// Record a freshly minted access token and its lifetime
    pub fn set_access_token(&mut self, token: String, expires_in_secs: u64) {
        self.access_token = Some(token);
        self.expiry = Some(Utc::now() + Duration::seconds(expires_in_secs as i64));
    }

    /// Drop the session token state, keeping the refresh token
    pub fn clear_session(&mut self) {
        self.access_token = None;
        self.expiry = None;
    }

    /// Drop everything the provider no longer honors: access token, expiry,
    /// and the refresh token itself
    pub fn revoke(&mut self) {
        self.clear_session();
        self.refresh_token = None;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_fresh_credential_is_expired() {
        let cred = Credential::new("id", "secret");
        assert!(cred.is_expired());
        assert!(cred.valid_access_token().is_none());
    }

    #[test]
    fn test_set_access_token_provides_valid_window() {
        let mut cred = Credential::new("id", "secret");
        cred.set_access_token("tok".to_string(), 3600);
        assert!(!cred.is_expired());
        assert_eq!(cred.valid_access_token(), Some("tok"));
    }

    #[test]
    fn test_expiry_margin_counts_as_expired() {
        let mut cred = Credential::new("id", "secret");
        // Expires inside the safety margin
        cred.access_token = Some("tok".to_string());
        cred.expiry = Some(Utc::now() + Duration::seconds(10));
        assert!(cred.is_expired());
        assert!(cred.valid_access_token().is_none());
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let mut cred = Credential::new("id", "secret");
        cred.access_token = Some("tok".to_string());
        cred.expiry = Some(Utc::now() - Duration::seconds(1));
        assert!(cred.is_expired());
    }

    #[test]
    fn test_revoke_clears_all_token_state() {
        let mut cred = Credential::new("id", "secret");
        cred.refresh_token = Some("refresh".to_string());
        cred.set_access_token("tok".to_string(), 3600);

        cred.revoke();
        assert!(cred.access_token.is_none());
        assert!(cred.expiry.is_none());
        assert!(cred.refresh_token.is_none());
        // Client identity survives revocation
        assert_eq!(cred.client_id, "id");
    }

    #[test]
    fn test_from_secrets_requires_client_pair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(
            &path,
            "GOOGLE_CLIENT_ID = \"cid\"\nGOOGLE_CLIENT_SECRET = \"csec\"\nGOOGLE_REFRESH_TOKEN = \"rt\"\n",
        )
        .unwrap();
        let store = SecretStore::open_at(path).unwrap();

        let cred = Credential::from_secrets(&store).unwrap();
        assert_eq!(cred.client_id, "cid");
        assert_eq!(cred.client_secret, "csec");
        assert_eq!(cred.refresh_token.as_deref(), Some("rt"));
        assert!(cred.access_token.is_none());
    }
}
