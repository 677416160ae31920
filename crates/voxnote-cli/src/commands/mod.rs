//! Subcommand implementations.

use anyhow::Result;
use voxnote_auth::{Credential, OAuthProvider, TokenManager};
use voxnote_calendar::{CalendarClient, CalendarError};
use voxnote_core::{Config, SecretStore};

pub mod auth;
pub mod event;
pub mod sync;
pub mod task;

/// Load the validated configuration and the secret store.
pub(crate) fn load_environment() -> Result<(Config, SecretStore)> {
    let (config, _) = Config::load_validated()?;
    let secrets = SecretStore::open()?;
    Ok((config, secrets))
}

/// Build a calendar session from stored credentials.
///
/// The token manager holds the refresh token for the lifetime of the command;
/// nothing it mints is written back to disk.
pub(crate) fn calendar_session(
    config: &Config,
    secrets: &SecretStore,
) -> Result<(TokenManager, CalendarClient)> {
    let credential = Credential::from_secrets(secrets)?;
    let mut provider = OAuthProvider::new(
        credential.client_id.clone(),
        credential.client_secret.clone(),
    );
    if let Some(redirect) = &config.auth.redirect_uri {
        provider.redirect_uri = redirect.clone();
    }
    let tokens = TokenManager::with_provider(credential, provider);
    let client = CalendarClient::new(&config.calendar.calendar_id);
    Ok((tokens, client))
}

/// Delete the remote counterpart of a record that is about to be removed
/// locally. Runs before the local removal so a failure keeps the record;
/// otherwise the next pull would re-import the orphaned remote event.
/// An event that is already gone remotely counts as success.
pub(crate) async fn remove_remote_event(
    config: &Config,
    secrets: &SecretStore,
    external_id: &str,
) -> Result<()> {
    let (mut tokens, client) = calendar_session(config, secrets)?;
    let token = tokens.ensure_valid_token().await?;
    match client.delete_event(&token, external_id).await {
        Ok(()) | Err(CalendarError::NotFound(_)) => {
            tracing::debug!("Remote event {external_id} deleted");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
