//! Insta Downloader - demo back end for an Instagram downloader
//!
//! Resolves Instagram URLs to mock media metadata and walks clients through
//! simulated download sessions, reporting progress over a WebSocket.

pub mod config;
pub mod media;
pub mod server;
pub mod session;

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::config::{Language, PreferenceStore, Preferences, Settings};
use crate::media::MockCatalog;
use crate::session::SessionManager;

/// Application state shared across all components
pub struct AppState {
    pub settings: Settings,
    pub preferences: RwLock<Preferences>,
    pub preference_store: Box<dyn PreferenceStore>,
    pub catalog: MockCatalog,
    pub sessions: SessionManager,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build the state, loading preferences from `preference_store`
    pub fn new(settings: Settings, preference_store: Box<dyn PreferenceStore>) -> Result<Self> {
        settings.validate()?;
        let preferences = preference_store.load()?;
        let catalog = MockCatalog::default();
        let sessions = SessionManager::new(catalog.clone(), settings.simulation.clone());

        Ok(Self {
            settings,
            preferences: RwLock::new(preferences),
            preference_store,
            catalog,
            sessions,
            started_at: Utc::now(),
        })
    }

    /// Language currently selected for user-facing messages
    pub fn language(&self) -> Language {
        self.preferences.read().language
    }
}
