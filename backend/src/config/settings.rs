//! Settings data structures

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Main application settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerSettings,

    /// Timing of the mock lookup and the simulated download
    #[serde(default)]
    pub simulation: SimulationSettings,
}

impl Settings {
    /// Reject values the session simulator cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.simulation.validate()
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host to bind to (0.0.0.0 for LAN access)
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8787,
        }
    }
}

/// Simulation timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Artificial delay before a lookup answers
    pub lookup_delay_ms: u64,

    /// Interval between progress ticks
    pub tick_interval_ms: u64,

    /// Percentage points added per tick
    pub progress_step: u8,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            lookup_delay_ms: 1000,
            tick_interval_ms: 300,
            progress_step: 10,
        }
    }
}

impl SimulationSettings {
    pub fn lookup_delay(&self) -> Duration {
        Duration::from_millis(self.lookup_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.tick_interval_ms == 0 {
            return Err(SettingsError::ZeroTickInterval);
        }
        if !(1..=100).contains(&self.progress_step) {
            return Err(SettingsError::ProgressStep(self.progress_step));
        }
        Ok(())
    }
}

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("simulation.tick_interval_ms must be greater than zero")]
    ZeroTickInterval,

    #[error("simulation.progress_step must be between 1 and 100, got {0}")]
    ProgressStep(u8),
}
