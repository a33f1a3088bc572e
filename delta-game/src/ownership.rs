//! Actor ownership and local-update policy enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GameError;

/// Which simulation peer is authoritative for an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    /// Owned by the server and published to the network.
    ServerPublished,
    /// Owned by the server, not published.
    #[default]
    ServerLocal,
    /// Exists only on one client.
    ClientLocal,
    /// Exists locally on both client and server.
    ClientAndServerLocal,
    /// Not managed by the game manager at all.
    NotManaged,
    /// Template for creating other actors.
    Prototype,
}

impl Ownership {
    /// Every value, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::ServerPublished,
        Self::ServerLocal,
        Self::ClientLocal,
        Self::ClientAndServerLocal,
        Self::NotManaged,
        Self::Prototype,
    ];

    /// Display name, as shown in editors and stored in maps.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ServerPublished => "Server+Published",
            Self::ServerLocal => "Server Local",
            Self::ClientLocal => "Client Local",
            Self::ClientAndServerLocal => "Client and Server Local",
            Self::NotManaged => "Not Managed",
            Self::Prototype => "PROTOTYPE",
        }
    }

    /// Parse a display name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.name() == name)
    }

    /// Whether actors with this ownership are published on the network.
    #[must_use]
    pub fn is_published(self) -> bool {
        matches!(self, Self::ServerPublished)
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Ownership {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| GameError::UnknownEnumValue {
            kind: "ownership",
            value: s.to_string(),
        })
    }
}

/// How a local actor treats updates that arrive for it from elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalActorUpdatePolicy {
    /// Drop every update.
    IgnoreAll,
    /// Apply every update.
    #[default]
    AcceptAll,
    /// Apply only properties on the accept list.
    AcceptWithPropertyFilter,
}

impl LocalActorUpdatePolicy {
    /// Every value, in declaration order.
    pub const ALL: [Self; 3] = [Self::IgnoreAll, Self::AcceptAll, Self::AcceptWithPropertyFilter];

    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::IgnoreAll => "IGNORE_ALL",
            Self::AcceptAll => "ACCEPT_ALL",
            Self::AcceptWithPropertyFilter => "ACCEPT_WITH_PROPERTY_FILTER",
        }
    }

    /// Parse a display name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for LocalActorUpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LocalActorUpdatePolicy {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| GameError::UnknownEnumValue {
            kind: "local actor update policy",
            value: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for o in Ownership::ALL {
            assert_eq!(o.name().parse::<Ownership>().unwrap(), o);
        }
        for p in LocalActorUpdatePolicy::ALL {
            assert_eq!(p.to_string().parse::<LocalActorUpdatePolicy>().unwrap(), p);
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(Ownership::ServerPublished.to_string(), "Server+Published");
        assert_eq!(Ownership::ClientAndServerLocal.to_string(), "Client and Server Local");
        assert_eq!(LocalActorUpdatePolicy::AcceptWithPropertyFilter.name(), "ACCEPT_WITH_PROPERTY_FILTER");
    }

    #[test]
    fn unknown_names_fail() {
        assert!(matches!("Server".parse::<Ownership>(), Err(GameError::UnknownEnumValue { .. })));
        assert!(LocalActorUpdatePolicy::from_name("accept_all").is_none());
    }

    #[test]
    fn defaults() {
        assert_eq!(Ownership::default(), Ownership::ServerLocal);
        assert_eq!(LocalActorUpdatePolicy::default(), LocalActorUpdatePolicy::AcceptAll);
        assert!(Ownership::ServerPublished.is_published());
        assert!(!Ownership::ServerLocal.is_published());
    }
}
