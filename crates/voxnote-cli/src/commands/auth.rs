//! Calendar authorization: login, logout, status.
//!
//! Login runs the out-of-band OAuth flow: open the consent URL, paste the
//! code back, exchange it for a refresh token. Only the refresh token is
//! persisted; access tokens stay in memory for the lifetime of a command.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Subcommand;
use voxnote_auth::{Credential, OAuthProvider};
use voxnote_core::secrets::{mask, REFRESH_TOKEN, REQUIRED_SECRETS};
use voxnote_core::{Config, SecretStore};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Authorize calendar access and store the refresh token
    Login,
    /// Remove the stored refresh token
    Logout,
    /// Show which credentials are configured (values are masked)
    Status,
}

/// Run the auth command.
pub async fn run(action: AuthAction) -> Result<()> {
    match action {
        AuthAction::Login => login().await,
        AuthAction::Logout => logout(),
        AuthAction::Status => status(),
    }
}

async fn login() -> Result<()> {
    let (config, mut secrets) = super::load_environment()?;
    let credential = Credential::from_secrets(&secrets)?;

    let mut provider = OAuthProvider::new(
        credential.client_id.clone(),
        credential.client_secret.clone(),
    );
    if let Some(redirect) = &config.auth.redirect_uri {
        provider.redirect_uri = redirect.clone();
    }

    let (url, _state) = provider.authorization_url();
    println!("Open this URL in your browser and authorize access:");
    println!("\n  {url}\n");
    if webbrowser::open(&url).is_ok() {
        println!("(opened in your default browser)");
    }

    print!("Paste the authorization code: ");
    io::stdout().flush()?;
    let mut code = String::new();
    io::stdin().read_line(&mut code)?;
    let code = code.trim();
    if code.is_empty() {
        anyhow::bail!("no authorization code entered");
    }

    let token = provider.exchange_code(code).await?;
    let refresh = token.refresh_token.context(
        "Provider returned no refresh token; revoke this app's access in your account settings and try again",
    )?;
    secrets.set(REFRESH_TOKEN, &refresh)?;

    println!("Authorized. Refresh token stored in {}", secrets.path().display());
    Ok(())
}

fn logout() -> Result<()> {
    let mut secrets = SecretStore::open()?;
    if !secrets.is_set(REFRESH_TOKEN) {
        println!("Not logged in.");
        return Ok(());
    }
    secrets.remove(REFRESH_TOKEN)?;
    println!("Logged out. The refresh token was removed from {}", secrets.path().display());
    Ok(())
}

fn status() -> Result<()> {
    let config = Config::load()?;
    let secrets = SecretStore::open()?;
    let validation = config.validate();

    println!("Calendar:    {}", config.calendar.calendar_id);
    println!("Data dir:    {}", config.data_dir.display());
    println!("Secrets:     {}", secrets.path().display());
    println!();

    for key in REQUIRED_SECRETS {
        match secrets.get(key) {
            Some(value) => println!("{key}: {}", mask(&value)),
            None => println!("{key}: (not set)"),
        }
    }
    match secrets.get(REFRESH_TOKEN) {
        Some(value) => println!("{REFRESH_TOKEN}: {}", mask(&value)),
        None => println!("{REFRESH_TOKEN}: (not set; run 'voxnote auth login')"),
    }

    if !validation.warnings.is_empty() || !validation.errors.is_empty() {
        println!();
        for warning in &validation.warnings {
            println!("warning: {warning}");
        }
        for error in &validation.errors {
            println!("error: {error}");
        }
    }

    Ok(())
}
