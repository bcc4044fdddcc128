//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables (`CHEFWIRE_*`)

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ChefwireError, Result};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Session timing configuration
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ChefwireError::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| ChefwireError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(secs) = std::env::var("CHEFWIRE_HEARTBEAT_INTERVAL_SECS") {
            if let Ok(secs) = secs.parse() {
                config.session.heartbeat_interval_secs = secs;
            }
        }
        if let Ok(secs) = std::env::var("CHEFWIRE_LIVENESS_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.session.liveness_timeout_secs = secs;
            }
        }

        config
    }

    /// Default config file location under the user config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chefwire").join("config.toml"))
    }

    /// Load from the default path if present, falling back to defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(path).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

/// Heartbeat and liveness timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds between liveness probes
    pub heartbeat_interval_secs: u64,

    /// Seconds after a probe before the peer counts as unresponsive
    pub liveness_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 30,
            liveness_timeout_secs: 10,
        }
    }
}

impl SessionConfig {
    /// Heartbeat period as a [`Duration`]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    /// Liveness deadline as a [`Duration`]
    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_secs(self.liveness_timeout_secs)
    }
}
