//! Core value types shared by the reflection layer and the map.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Globally unique identifier of an actor, game event or prototype.
///
/// The nil UUID is the "null" id and stands for "no reference".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UniqueId(pub Uuid);

impl UniqueId {
    /// Create a new random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The null id.
    #[must_use]
    pub const fn null() -> Self {
        Self(Uuid::nil())
    }

    /// Whether this is the null id.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for UniqueId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UniqueId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::null());
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| CoreError::InvalidId(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Math
// ---------------------------------------------------------------------------

/// A 3-component vector (positions, scales).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Vec3 {
    /// Construct from components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A rotation quaternion. All-zero means "unset".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
    /// W component.
    pub w: f32,
}

/// An RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Default for Rgba {
    fn default() -> Self {
        Self {
            r: 1.0,
            g: 1.0,
            b: 1.0,
            a: 1.0,
        }
    }
}
