//! Configuration for the core layer.
//!
//! Maps directly to the `[logging]` and `[map]` tables of `delta.toml`.

use serde::{Deserialize, Serialize};

/// Core configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Map container settings.
    #[serde(default)]
    pub map: MapConfig,
}

impl CoreConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::CoreError::Config(e.to_string()))
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

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive: trace, debug, info, warn, error (or a full `EnvFilter` string).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Map container settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Number of preset camera slots a new map starts with.
    #[serde(default = "default_preset_camera_slots")]
    pub preset_camera_slots: usize,
    /// Version recorded for libraries added by library-list correction.
    #[serde(default = "default_library_version")]
    pub default_library_version: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            preset_camera_slots: default_preset_camera_slots(),
            default_library_version: default_library_version(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_preset_camera_slots() -> usize {
    10
}
fn default_library_version() -> String {
    "1.0".to_string()
}
