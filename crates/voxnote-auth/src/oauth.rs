//! OAuth2 endpoint plumbing: consent URL, code exchange, token refresh.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::AuthError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Out-of-band redirect: the provider displays the authorization code for the
/// user to paste instead of calling back into a web server.
pub const OOB_REDIRECT: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Token endpoint response for both code exchange and refresh
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
}

/// Error body the token endpoint returns on failure
#[derive(Debug, Default, Deserialize)]
struct TokenErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

/// Calendar provider OAuth2 endpoints for one registered client.
///
/// Endpoint URLs are plain fields so deployments (and tests) can point them
/// somewhere else.
pub struct OAuthProvider {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    http: reqwest::Client,
}

impl OAuthProvider {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            redirect_uri: OOB_REDIRECT.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Generate the consent URL for the authorization flow.
    /// Returns (url, state) where state should be verified on callback.
    pub fn authorization_url(&self) -> (String, String) {
        let state = uuid::Uuid::new_v4().to_string();

        let url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type=offline&prompt=consent",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(CALENDAR_SCOPE),
            urlencoding::encode(&state),
        );

        (url, state)
    }

    /// Exchange an authorization code for tokens (first-time flow).
    #[tracing::instrument(skip(self, code), level = "info")]
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", &self.redirect_uri),
            ])
            .send()
            .await
            .context("Failed to send token request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Token exchange failed: {}", error_text);
        }

        response
            .json::<TokenResponse>()
            .await
            .context("Failed to parse token response")
    }

    /// Mint a new access token from the refresh token.
    ///
    /// Failures are classified per the recovery they need: a rejected refresh
    /// token is `RefreshRevoked`, everything else is `Transient`.
    #[tracing::instrument(skip(self, refresh_token), level = "info")]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Transient(format!("request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<TokenResponse>()
                .await
                .map_err(|e| AuthError::Transient(format!("malformed token response: {}", e)));
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_refresh_failure(status, &body))
    }
}

/// Decide what a failed refresh means for the stored credential.
///
/// Only a positive "invalid_grant" / expired-or-revoked signal on a 4xx
/// counts as revocation; anything ambiguous stays transient so credentials
/// are not thrown away on a flaky network or provider hiccup.
fn classify_refresh_failure(status: reqwest::StatusCode, body: &str) -> AuthError {
    if status.is_client_error() {
        let parsed: TokenErrorBody = serde_json::from_str(body).unwrap_or_default();
        let code = parsed.error.unwrap_or_default();
        let description = parsed.error_description.unwrap_or_default();
        let description_lower = description.to_lowercase();

        if code == "invalid_grant"
            || description_lower.contains("expired")
            || description_lower.contains("revoked")
        {
            let detail = if description.is_empty() { code } else { description };
            return AuthError::RefreshRevoked(detail);
        }
    }

    AuthError::Transient(format!("token endpoint returned {}", status))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_authorization_url_contains_scope_and_offline_access() {
        let provider = OAuthProvider::new("test_client_id", "test_client_secret");
        let (url, _state) = provider.authorization_url();
        assert!(url.contains("scope="));
        assert!(url.contains("calendar"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
    }

    #[test]
    fn test_authorization_url_defaults_to_oob_redirect() {
        let provider = OAuthProvider::new("test_client_id", "test_client_secret");
        let (url, _state) = provider.authorization_url();
        assert!(url.contains(&*urlencoding::encode(OOB_REDIRECT)));
    }

    #[test]
    fn test_authorization_url_uses_configured_redirect() {
        let mut provider = OAuthProvider::new("test_client_id", "test_client_secret");
        provider.redirect_uri = "https://example.com/callback".to_string();
        let (url, _state) = provider.authorization_url();
        assert!(url.contains(&*urlencoding::encode("https://example.com/callback")));
    }

    #[test]
    fn test_state_is_unique() {
        let provider = OAuthProvider::new("test_client_id", "test_client_secret");
        let (_, state1) = provider.authorization_url();
        let (_, state2) = provider.authorization_url();
        assert_ne!(state1, state2);
    }

    #[test]
    fn test_classify_invalid_grant_as_revoked() {
        let err = classify_refresh_failure(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error": "invalid_grant", "error_description": "Token has been expired or revoked."}"#,
        );
        assert!(matches!(err, AuthError::RefreshRevoked(_)));
    }

    #[test]
    fn test_classify_server_error_as_transient() {
        let err = classify_refresh_failure(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "backend unavailable",
        );
        assert!(matches!(err, AuthError::Transient(_)));
    }

    #[test]
    fn test_classify_unreadable_client_error_as_transient() {
        let err = classify_refresh_failure(reqwest::StatusCode::BAD_REQUEST, "not json");
        assert!(matches!(err, AuthError::Transient(_)));
    }

    #[tokio::test]
    async fn test_refresh_success_parses_tokens() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh_token",
                "expires_in": 3599,
                "token_type": "Bearer",
                "scope": "https://www.googleapis.com/auth/calendar"
            })))
            .mount(&mock_server)
            .await;

        let mut provider = OAuthProvider::new("cid", "csec");
        provider.token_url = format!("{}/token", mock_server.uri());

        let tokens = provider.refresh("stored_refresh").await.unwrap();
        assert_eq!(tokens.access_token, "fresh_token");
        assert_eq!(tokens.expires_in, 3599);
        assert!(tokens.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_refresh_invalid_grant_is_revoked() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Bad Request"
            })))
            .mount(&mock_server)
            .await;

        let mut provider = OAuthProvider::new("cid", "csec");
        provider.token_url = format!("{}/token", mock_server.uri());

        let err = provider.refresh("dead_refresh").await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshRevoked(_)));
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "first_token",
                "refresh_token": "first_refresh",
                "expires_in": 3599,
                "token_type": "Bearer",
                "scope": "https://www.googleapis.com/auth/calendar"
            })))
            .mount(&mock_server)
            .await;

        let mut provider = OAuthProvider::new("cid", "csec");
        provider.token_url = format!("{}/token", mock_server.uri());

        let tokens = provider.exchange_code("pasted-code").await.unwrap();
        assert_eq!(tokens.access_token, "first_token");
        assert_eq!(tokens.refresh_token.as_deref(), Some("first_refresh"));
    }
}
