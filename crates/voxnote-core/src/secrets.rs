//! Layered secret lookup: secrets file first, process environment second.
//!
//! Deployments either keep a `secrets.toml` next to the config file or export
//! the same keys as environment variables. Keys absent from both layers are
//! simply absent; nothing here invents defaults for credentials.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// API key for the speech-to-text service
pub const STT_API_KEY: &str = "OPENAI_API_KEY";
/// OAuth client id for the calendar provider
pub const CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
/// OAuth client secret for the calendar provider
pub const CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
/// Long-lived refresh token, present only after first authorization
pub const REFRESH_TOKEN: &str = "GOOGLE_REFRESH_TOKEN";

/// Secrets that must be present for the application to work
pub const REQUIRED_SECRETS: [&str; 3] = [STT_API_KEY, CLIENT_ID, CLIENT_SECRET];

/// File-and-environment layered secret store
pub struct SecretStore {
    path: PathBuf,
    values: toml::Table,
}

impl SecretStore {
    /// Open the store at the default per-user location
    pub fn open() -> Result<Self> {
        Self::open_at(Self::default_path()?)
    }

    /// Open the store at an explicit path (missing file is an empty store)
    pub fn open_at(path: PathBuf) -> Result<Self> {
        let values = if path.exists() {
            let contents = fs::read_to_string(&path).context("Failed to read secrets file")?;
            contents
                .parse::<toml::Table>()
                .context("Failed to parse secrets file")?
        } else {
            toml::Table::new()
        };

        Ok(Self { path, values })
    }

    fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("voxnote");

        Ok(config_dir.join("secrets.toml"))
    }

    /// Look up a secret: file layer first, then the process environment.
    /// Empty values count as absent in both layers.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.values.get(key).and_then(|v| v.as_str()) {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }

        match std::env::var(key) {
            Ok(value) if !value.is_empty() => Some(value),
            _ => None,
        }
    }

    /// Check whether a secret is present in either layer
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Store a secret in the file layer
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values
            .insert(key.to_string(), toml::Value::String(value.to_string()));
        self.write_file()?;
        tracing::info!("Stored secret: {}", key);
        Ok(())
    }

    /// Remove a secret from the file layer (environment is untouched)
    pub fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.write_file()?;
            tracing::info!("Removed secret: {}", key);
        }
        Ok(())
    }

    /// Required secrets missing from both layers
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_SECRETS
            .iter()
            .filter(|key| !self.is_set(key))
            .copied()
            .collect()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(&self.values)
            .context("Failed to serialize secrets")?;

        fs::write(&self.path, contents).context("Failed to write secrets file")?;

        Ok(())
    }
}

/// Mask a secret for display: short values are fully hidden
pub fn mask(value: &str) -> String {
    if value.chars().count() > 10 {
        let prefix: String = value.chars().take(10).collect();
        format!("{}...", prefix)
    } else {
        "***".to_string()
    }
}
