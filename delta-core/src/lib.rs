//! # Delta Core Library
//!
//! Actor reflection layer and the map registry of the simulation engine.
//!
//! A [`Map`] is the authoritative container of every actor in a scene:
//!
//! - **Registry** — actors keyed by [`UniqueId`], looked up by id or by
//!   wildcard name / type / category / class / placeability filters.
//! - **Naming** — `Prefix_NN` names, per-prefix high-water marks and
//!   optional renumbering on insertion.
//! - **Referential integrity** — removing an actor clears every actor
//!   reference property that pointed at it.
//! - **Libraries** — ordered library list with versions.
//! - **Groups, preset cameras, game events** and descriptive metadata.
//!
//! Actors are shared through [`ActorPtr`] (`Rc<RefCell<dyn BaseActorObject>>`).
//! The engine is single-threaded: a map and its actors are owned and used
//! from one simulation thread.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actor;
pub mod actor_type;
pub mod config;
pub mod error;
pub mod factory;
pub mod game_event;
pub mod map;
pub mod naming;
pub mod property;
pub mod types;

pub use actor::{ActorComponentContainer, ActorCore, ActorIterator, ActorPtr, BaseActorObject, BasicActor, WeakActor};
pub use actor_type::{ActorType, ActorTypePtr, SharedClassInfo};
pub use config::CoreConfig;
pub use error::CoreError;
pub use factory::ActorFactory;
pub use game_event::{GameEvent, GameEventManager};
pub use map::{Map, PlaceableFilter, PresetCameraData, ProxyQuery};
pub use property::{ActorProperty, DataType, PropertyContainer, PropertyPtr, PropertyValue};
pub use types::*;
