//! Insta Downloader - mock Instagram downloader service
//!
//! Serves the download API and session endpoints used by the web front end.

use anyhow::Result;
use insta_downloader::config::{self, TomlPreferenceStore};
use insta_downloader::{server, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Starting Insta Downloader v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let settings = config::load_or_create_default()?;
    info!("Configuration loaded from {:?}", config::config_path());

    let preference_store = TomlPreferenceStore::new(config::preferences_path());
    let state = Arc::new(AppState::new(settings, Box::new(preference_store))?);
    info!("Preferences loaded: {:?}", *state.preferences.read());

    server::run(state).await
}
