//! Configuration for the game-actor layer.
//!
//! Extends the core `[logging]` and `[map]` tables with the `[actors]`
//! table that seeds new game-actor proxies.

use serde::{Deserialize, Serialize};

use delta_core::config::{LoggingConfig, MapConfig};

use crate::ownership::{LocalActorUpdatePolicy, Ownership};

/// Full configuration, loadable from `delta.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Map container settings.
    #[serde(default)]
    pub map: MapConfig,
    /// Defaults applied to new game-actor proxies.
    #[serde(default)]
    pub actors: ActorDefaults,
}

impl GameConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `GameError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::GameError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// Initial state of new game-actor proxies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorDefaults {
    /// Initial ownership.
    #[serde(default)]
    pub ownership: Ownership,
    /// Policy for remote updates to local actors.
    #[serde(default)]
    pub local_update_policy: LocalActorUpdatePolicy,
    /// Properties accepted under `accept_with_property_filter`.
    #[serde(default)]
    pub local_update_accept_list: Vec<String>,
}
