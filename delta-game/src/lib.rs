//! # Delta Game Library
//!
//! Networked game-actor proxies on top of the `delta-core` map registry.
//!
//! - **Proxies** — [`GameActorProxy`] wraps a [`GameActor`] with ownership,
//!   remote / published flags and a local update policy.
//! - **Update protocol** — full and partial actor updates are populated
//!   from properties and applied back with per-property outcomes
//!   ([`ActorUpdateReport`]).
//! - **Invokables** — named handlers dispatched by message type, globally,
//!   about another actor, or about the actor itself.
//! - **Components** — [`ActorComponent`]s attach to a proxy, expose their
//!   properties on it and follow its world lifecycle.
//! - **Game manager** — the [`GameManager`] capability proxies call into,
//!   and [`LocalGameManager`], a single-threaded FIFO implementation.
//!
//! ## Quick Start
//!
//! ```rust
//! use delta_core::{ActorType, BaseActorObject};
//! use delta_core::property::{GenericProperty, PropertyValue};
//! use delta_game::{GameActorProxy, LocalGameManager, MessageType};
//!
//! let manager = LocalGameManager::new();
//! let tank = GameActorProxy::new(ActorType::new("Tank", "vehicles", "").into_ptr(), "Tank_01")
//!     .with_property(GenericProperty::new("Label", PropertyValue::String("alpha".into())).into_ptr())
//!     .into_ptr();
//! manager.add_actor(&tank, false)?;
//! manager.process_messages();
//!
//! tank.borrow().notify_full_actor_update();
//! let pending = manager.pending_messages();
//! let update = pending.last().and_then(|m| m.actor_update()).expect("update queued");
//! assert_eq!(pending[0].message_type(), &MessageType::InfoActorUpdated);
//! assert!(update.update_parameter("Label").is_some());
//! assert_eq!(pending[0].about_actor_id(), tank.borrow().id());
//! # Ok::<(), delta_game::GameError>(())
//! ```

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod component;
pub mod config;
pub mod error;
pub mod game_actor;
pub mod invokable;
pub mod logging;
pub mod manager;
pub mod message;
pub mod ownership;
pub mod proxy;

pub use component::{ActorComponent, ComponentBase};
pub use config::{ActorDefaults, GameConfig};
pub use error::{GameError, Result};
pub use game_actor::{GameActor, GameActorDrawable};
pub use invokable::Invokable;
pub use manager::{GameManager, LocalGameManager};
pub use message::{ActorUpdateMessage, Message, MessagePayload, MessageType, SimTimestamp, TickData, UpdateParameter};
pub use ownership::{LocalActorUpdatePolicy, Ownership};
pub use proxy::{
    ActorUpdateReport, GameActorProxy, GameActorProxyPtr, NameUpdateOutcome, ParentUpdateOutcome,
    PropertyUpdateOutcome,
};
