//! Log subscriber bootstrap.

use tracing_subscriber::EnvFilter;

use delta_core::config::LoggingConfig;

use crate::error::{GameError, Result};

/// Install the global `tracing` subscriber described by `config`.
///
/// `RUST_LOG`, when set, overrides the configured level.
///
/// # Errors
/// Returns `GameError::Logging` for an invalid filter or when a global
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| GameError::Logging(e.to_string()))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    installed.map_err(|e| GameError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_is_reported() {
        // RUST_LOG takes precedence over the configured level.
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            level: "delta=loud".to_string(),
            json: false,
        };
        assert!(matches!(init(&config), Err(GameError::Logging(_))));
    }

    #[test]
    fn second_install_is_an_error_not_a_panic() {
        let config = LoggingConfig::default();
        let _ = init(&config);
        assert!(matches!(init(&config), Err(GameError::Logging(_))));
    }
}
