pub mod config;
pub mod secrets;

pub use config::{AuthConfig, CalendarConfig, Config, SyncConfig, ValidationResult};
pub use secrets::{SecretStore, CLIENT_ID, CLIENT_SECRET, REFRESH_TOKEN, STT_API_KEY};

use anyhow::Result;

/// Initialize logging for the application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("voxnote core initialized");
    Ok(())
}
