//! Configuration management for Insta Downloader

mod preferences;
mod settings;

pub use preferences::*;
pub use settings::*;

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("insta-downloader")
}

/// Get the configuration file path
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the preferences file path
pub fn preferences_path() -> PathBuf {
    config_dir().join("preferences.toml")
}

/// Load configuration from the default location or create it
pub fn load_or_create_default() -> Result<Settings> {
    load_or_create(&config_path())
}

/// Load configuration from `path`, writing defaults there if it is missing
pub fn load_or_create(path: &Path) -> Result<Settings> {
    let settings = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        let settings = Settings::default();
        save(path, &settings)?;
        settings
    };

    settings.validate()?;
    Ok(settings)
}

/// Save configuration to file
pub fn save(path: &Path, settings: &Settings) -> Result<()> {
    // Ensure config directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(settings)?;
    fs::write(path, content)?;

    Ok(())
}
