//! UI preferences (language and theme) and where they are persisted

use anyhow::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Interface language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    /// Writing direction of the language
    pub fn direction(&self) -> &'static str {
        match self {
            Self::En => "ltr",
            Self::Ar => "rtl",
        }
    }

    /// Message shown when a submitted URL is rejected
    pub fn invalid_url_message(&self) -> &'static str {
        match self {
            Self::En => "Please enter a valid Instagram URL",
            Self::Ar => "يرجى إدخال رابط إنستغرام صحيح",
        }
    }
}

/// Colour theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// User-facing preferences shared by every session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub language: Language,
    pub theme: Theme,
}

/// Persistence for [`Preferences`]
pub trait PreferenceStore: Send + Sync {
    /// Load stored preferences, falling back to defaults when none exist
    fn load(&self) -> Result<Preferences>;

    fn save(&self, preferences: &Preferences) -> Result<()>;
}

/// Stores preferences in a TOML file
pub struct TomlPreferenceStore {
    path: PathBuf,
}

impl TomlPreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStore for TomlPreferenceStore {
    fn load(&self) -> Result<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    fn save(&self, preferences: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string_pretty(preferences)?)?;
        Ok(())
    }
}

/// Keeps preferences in memory only
#[derive(Default)]
pub struct MemoryPreferenceStore {
    stored: Mutex<Option<Preferences>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// What was last saved, if anything
    pub fn stored(&self) -> Option<Preferences> {
        *self.stored.lock()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Preferences> {
        Ok(self.stored.lock().unwrap_or_default())
    }

    fn save(&self, preferences: &Preferences) -> Result<()> {
        *self.stored.lock() = Some(*preferences);
        Ok(())
    }
}
