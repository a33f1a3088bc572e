//! Parent/child actor hierarchy, property copying and cloning.

use std::rc::Rc;

use tracing::{debug, error, warn};

use delta_core::actor::{same_actor, ActorComponentContainer, ActorPtr};
use delta_core::actor_type::ActorTypePtr;
use delta_core::factory::ActorFactory;

use super::GameActorProxy;

impl GameActorProxy {
    /// Current parent, if any and still alive.
    #[must_use]
    pub fn parent_actor(&self) -> Option<ActorPtr> {
        self.parent.as_ref().and_then(std::rc::Weak::upgrade)
    }

    /// Direct children, in attachment order.
    #[must_use]
    pub fn child_actors(&self) -> Vec<ActorPtr> {
        self.children.clone()
    }

    /// Re-parent under `new_parent`, or detach with `None`.
    ///
    /// Refused (returning false) when the proxy has no handle to itself,
    /// when the new parent cannot hold children, or when the move would
    /// make the proxy its own ancestor.
    pub fn set_parent_actor(&mut self, new_parent: Option<&ActorPtr>) -> bool {
        let Some(me) = self.self_actor() else {
            warn!(actor = self.core.name(), "Proxy has no shared handle, cannot join a hierarchy");
            return false;
        };
        let current = self.parent_actor();
        if let (Some(current), Some(new_parent)) = (&current, new_parent) {
            if same_actor(current, new_parent) {
                return true;
            }
        }

        if let Some(new_parent) = new_parent {
            if is_ancestor_or_self(&me, new_parent) {
                warn!(actor = self.core.name(), "Refusing to parent an actor under its own descendant");
                return false;
            }
            let Ok(mut parent) = new_parent.try_borrow_mut() else {
                warn!(actor = self.core.name(), "New parent is busy, cannot attach");
                return false;
            };
            let Some(container) = parent.as_component_container_mut() else {
                warn!(actor = self.core.name(), "New parent cannot hold child actors");
                return false;
            };
            container.insert_child_actor(me.clone());
        }

        if let Some(current) = current {
            // The old parent is borrowed when it is detaching its own children.
            if let Ok(mut parent) = current.try_borrow_mut() {
                if let Some(container) = parent.as_component_container_mut() {
                    container.remove_child_actor(&me);
                }
            }
        }

        self.parent = new_parent.map(Rc::downgrade);
        true
    }

    /// Detach every child, optionally deleting each from the game manager.
    ///
    /// Returns the number of children detached.
    pub fn detach_child_actors(&mut self, delete_from_gm: bool) -> usize {
        let children = std::mem::take(&mut self.children);
        let gm = self.game_manager();
        for child in &children {
            let id = match child.try_borrow_mut() {
                Ok(mut c) => {
                    if let Some(container) = c.as_component_container_mut() {
                        container.set_parent_base_actor(None);
                    }
                    c.id()
                }
                Err(_) => {
                    warn!(actor = self.core.name(), "Child actor busy while detaching");
                    continue;
                }
            };
            if delete_from_gm {
                if let Some(gm) = &gm {
                    gm.delete_actor(id);
                }
            }
        }
        debug!(actor = self.core.name(), count = children.len(), "Detached child actors");
        children.len()
    }

    /// Copy same-named, writable property values from `other`, then copy
    /// component properties pairwise between components of the same type.
    ///
    /// Returns the number of values copied onto this proxy's own list.
    pub fn copy_properties_from(&self, other: &GameActorProxy) -> usize {
        let copied = self.core.properties().copy_properties_from(other.core.properties());
        for (index, source) in other.components.iter().enumerate() {
            let source_type = source.component_type();
            let sources_before = other.components[..index]
                .iter()
                .filter(|c| c.component_type() == source_type)
                .count();
            if let Some(dest) = self
                .components
                .iter()
                .filter(|c| c.component_type() == source_type)
                .nth(sources_before)
            {
                dest.properties().copy_properties_from(source.properties());
            }
        }
        copied
    }

    /// Create a copy of this actor through `factory`.
    ///
    /// Components the factory did not build are cloned onto the copy,
    /// then property values are copied, then every child is cloned and
    /// attached to the copy. Returns `None` (with an error logged) when the
    /// factory cannot build the type or does not build a game actor proxy.
    #[must_use]
    pub fn clone_game_actor(&self, factory: &ActorFactory) -> Option<ActorPtr> {
        let copy = match factory.create_actor(self.core.actor_type()) {
            Ok(copy) => copy,
            Err(e) => {
                error!(actor = self.core.name(), error = %e, "Clone of actor proxy failed");
                return None;
            }
        };

        {
            let mut guard = copy.borrow_mut();
            let Some(clone) = guard.as_any_mut().downcast_mut::<GameActorProxy>() else {
                error!(actor = self.core.name(), "Factory did not create a game actor proxy");
                return None;
            };
            clone.core.set_name(self.core.name());

            for component in &self.components {
                if clone.has_component(component.component_type()) {
                    continue;
                }
                match component.clone_component() {
                    Some(new_component) => {
                        new_component.properties().copy_properties_from(component.properties());
                        clone.add_component(new_component);
                    }
                    None => error!(
                        component = %component.component_type(),
                        "Attempt to clone an actor component failed"
                    ),
                }
            }

            clone.copy_properties_from(self);
        }

        for child in &self.children {
            let Ok(child) = child.try_borrow() else {
                continue;
            };
            let Some(child) = child.as_any().downcast_ref::<GameActorProxy>() else {
                continue;
            };
            if let Some(child_copy) = child.clone_game_actor(factory) {
                let mut guard = child_copy.borrow_mut();
                if let Some(c) = guard.as_any_mut().downcast_mut::<GameActorProxy>() {
                    c.set_parent_actor(Some(&copy));
                }
            }
        }
        Some(copy)
    }
}

/// Whether `me` is `candidate` or one of its ancestors.
fn is_ancestor_or_self(me: &ActorPtr, candidate: &ActorPtr) -> bool {
    let mut cursor = Some(candidate.clone());
    while let Some(actor) = cursor {
        if same_actor(&actor, me) {
            return true;
        }
        cursor = actor
            .try_borrow()
            .ok()
            .and_then(|a| a.as_component_container().and_then(|c| c.parent_base_actor()));
    }
    false
}

impl ActorComponentContainer for GameActorProxy {
    fn parent_base_actor(&self) -> Option<ActorPtr> {
        self.parent_actor()
    }

    fn set_parent_base_actor(&mut self, parent: Option<&ActorPtr>) -> bool {
        match parent {
            None => self.set_parent_actor(None),
            Some(parent) => {
                let is_proxy = parent
                    .try_borrow()
                    .is_ok_and(|p| p.as_any().is::<GameActorProxy>());
                is_proxy && self.set_parent_actor(Some(parent))
            }
        }
    }

    fn child_actors(&self) -> Vec<ActorPtr> {
        self.children.clone()
    }

    fn insert_child_actor(&mut self, child: ActorPtr) {
        self.children.push(child);
    }

    fn remove_child_actor(&mut self, child: &ActorPtr) -> bool {
        let before = self.children.len();
        self.children.retain(|c| !same_actor(c, child));
        self.children.len() != before
    }

    fn component_actor_types(&self) -> Vec<ActorTypePtr> {
        self.components.iter().map(|c| c.component_type().clone()).collect()
    }
}
