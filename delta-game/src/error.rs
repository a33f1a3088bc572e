//! Error types for the game-actor layer.

use thiserror::Error;

use delta_core::CoreError;

/// Top-level error type for game-actor operations.
#[derive(Error, Debug)]
pub enum GameError {
    /// The proxy is not in the state the operation needs.
    #[error("Invalid actor state: {0}")]
    InvalidActorState(String),

    /// A name did not match any value of an enumeration.
    #[error("Unknown {kind} value: {value}")]
    UnknownEnumValue {
        /// Enumeration being parsed.
        kind: &'static str,
        /// Rejected text.
        value: String,
    },

    /// Message encoding or decoding failed.
    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The global log subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(String),

    /// Reflection-layer failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, GameError>;
