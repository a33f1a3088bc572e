//! Actor factory: libraries of actor types and their creators.
//!
//! The factory is an explicit context object passed to whoever needs to
//! create actors or resolve which library provides a type.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, warn};

use crate::actor::ActorPtr;
use crate::actor_type::{ActorType, ActorTypePtr};
use crate::error::{CoreError, Result};

/// Builds a new actor of the given type.
pub type ActorCreator = Box<dyn Fn(ActorTypePtr) -> ActorPtr>;

struct FactoryEntry {
    library: String,
    actor_type: ActorTypePtr,
    creator: ActorCreator,
}

/// Registry of actor types grouped by library.
#[derive(Default)]
pub struct ActorFactory {
    entries: BTreeMap<String, FactoryEntry>,
}

impl ActorFactory {
    /// An empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `actor_type` as provided by `library`.
    ///
    /// A type registered twice replaces the earlier registration.
    pub fn register(
        &mut self,
        library: &str,
        actor_type: ActorTypePtr,
        creator: impl Fn(ActorTypePtr) -> ActorPtr + 'static,
    ) {
        let key = actor_type.full_name();
        let entry = FactoryEntry {
            library: library.to_string(),
            actor_type,
            creator: Box::new(creator),
        };
        if let Some(old) = self.entries.insert(key.clone(), entry) {
            warn!(actor_type = %key, old_library = %old.library, library, "Replaced actor type registration");
        } else {
            debug!(actor_type = %key, library, "Registered actor type");
        }
    }

    /// Remove every type provided by `library`. Returns how many were removed.
    pub fn unregister_library(&mut self, library: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.library != library);
        before - self.entries.len()
    }

    /// Create an actor of `actor_type`.
    ///
    /// # Errors
    /// Returns `CoreError::UnknownActorType` when no library provides it.
    pub fn create_actor(&self, actor_type: &ActorType) -> Result<ActorPtr> {
        let entry = self
            .entries
            .get(&actor_type.full_name())
            .ok_or_else(|| CoreError::UnknownActorType(actor_type.full_name()))?;
        Ok((entry.creator)(entry.actor_type.clone()))
    }

    /// Library that provides `actor_type`.
    #[must_use]
    pub fn library_for_type(&self, actor_type: &ActorType) -> Option<&str> {
        self.entries
            .get(&actor_type.full_name())
            .map(|e| e.library.as_str())
    }

    /// Registered type by category and name.
    #[must_use]
    pub fn find_actor_type(&self, category: &str, name: &str) -> Option<ActorTypePtr> {
        self.entries
            .get(&format!("{category}.{name}"))
            .map(|e| e.actor_type.clone())
    }

    /// All registered types.
    #[must_use]
    pub fn actor_types(&self) -> Vec<ActorTypePtr> {
        self.entries.values().map(|e| e.actor_type.clone()).collect()
    }
}

impl fmt::Debug for ActorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, e)| (k, &e.library)))
            .finish()
    }
}
