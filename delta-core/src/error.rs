//! Error types for the Delta core library.

use thiserror::Error;

use crate::property::DataType;
use crate::types::UniqueId;

/// Top-level error type for reflection and map operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A value of the wrong data type was assigned to a property.
    #[error("Type mismatch on property '{property}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Property being assigned.
        property: String,
        /// Declared data type of the property.
        expected: DataType,
        /// Data type of the offered value.
        found: DataType,
    },

    /// Attempted to assign a read-only property.
    #[error("Property is read-only: {0}")]
    ReadOnlyProperty(String),

    /// An enumeration property was given a value outside its domain.
    #[error("Invalid value '{value}' for enumeration property '{property}'")]
    InvalidEnumValue {
        /// Property being assigned.
        property: String,
        /// Rejected value.
        value: String,
    },

    /// An actor-object reference cannot be resolved from a bare id.
    #[error("Cannot resolve actor reference {0} without a registry")]
    UnresolvedActorReference(UniqueId),

    /// No creator is registered for the actor type.
    #[error("Unknown actor type: {0}")]
    UnknownActorType(String),

    /// A string could not be parsed as a unique id.
    #[error("Invalid unique id: {0}")]
    InvalidId(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, CoreError>;
