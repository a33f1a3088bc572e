//! Named game events owned by a map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use tracing::warn;

use crate::types::UniqueId;

/// A named trigger that actors can fire and listen for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    id: UniqueId,
    name: String,
    description: String,
}

impl GameEvent {
    /// New event with a fresh id.
    #[must_use]
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            id: UniqueId::new(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    /// Event id.
    #[must_use]
    pub fn id(&self) -> UniqueId {
        self.id
    }

    /// Event name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Event description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Set of game events keyed by id.
#[derive(Debug, Clone, Default)]
pub struct GameEventManager {
    events: BTreeMap<UniqueId, GameEvent>,
}

impl GameEventManager {
    /// An empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event. An id already present is logged and kept unchanged.
    pub fn add_event(&mut self, event: GameEvent) -> bool {
        if self.events.contains_key(&event.id) {
            warn!(event = %event.id, name = %event.name, "Game event already registered");
            return false;
        }
        self.events.insert(event.id, event);
        true
    }

    /// Remove by id.
    pub fn remove_event(&mut self, id: &UniqueId) -> Option<GameEvent> {
        self.events.remove(id)
    }

    /// Remove every event.
    pub fn clear_all_events(&mut self) {
        self.events.clear();
    }

    /// Find by id.
    #[must_use]
    pub fn find_event(&self, id: &UniqueId) -> Option<&GameEvent> {
        self.events.get(id)
    }

    /// First event with `name`.
    #[must_use]
    pub fn find_event_by_name(&self, name: &str) -> Option<&GameEvent> {
        self.events.values().find(|e| e.name == name)
    }

    /// All events.
    pub fn all_events(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.values()
    }

    /// Number of events.
    #[must_use]
    pub fn num_events(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_find_remove() {
        let mut mgr = GameEventManager::new();
        let ev = GameEvent::new("Boom", "explosion");
        let id = ev.id();
        assert!(mgr.add_event(ev.clone()));
        assert!(!mgr.add_event(ev));
        assert_eq!(mgr.num_events(), 1);
        assert_eq!(mgr.find_event_by_name("Boom").unwrap().id(), id);
        assert_eq!(mgr.find_event(&id).unwrap().description(), "explosion");
        assert!(mgr.remove_event(&id).is_some());
        assert_eq!(mgr.num_events(), 0);
    }

    #[test]
    fn clear_removes_everything() {
        let mut mgr = GameEventManager::new();
        mgr.add_event(GameEvent::new("A", ""));
        mgr.add_event(GameEvent::new("B", ""));
        mgr.clear_all_events();
        assert_eq!(mgr.all_events().count(), 0);
    }
}
