//! The base actor object contract, actor hierarchies and a plain actor.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::actor_type::{ActorTypePtr, SharedClassInfo};
use crate::property::{PropertyContainer, PropertyPtr};
use crate::types::UniqueId;

/// Shared, mutable handle to any actor.
pub type ActorPtr = Rc<RefCell<dyn BaseActorObject>>;

/// Non-owning handle to an actor.
pub type WeakActor = Weak<RefCell<dyn BaseActorObject>>;

// ---------------------------------------------------------------------------
// Actor core state
// ---------------------------------------------------------------------------

/// State every actor carries: identity, type, class info and properties.
#[derive(Debug, Clone)]
pub struct ActorCore {
    id: UniqueId,
    name: String,
    actor_type: ActorTypePtr,
    class_info: SharedClassInfo,
    placeable: bool,
    properties: PropertyContainer,
}

impl ActorCore {
    /// Fresh core with a random id; the class info starts as the type's.
    #[must_use]
    pub fn new(actor_type: ActorTypePtr, name: &str) -> Self {
        Self {
            id: UniqueId::new(),
            name: name.to_string(),
            class_info: actor_type.shared_class_info().clone(),
            actor_type,
            placeable: true,
            properties: PropertyContainer::new(),
        }
    }

    /// Actor id.
    #[must_use]
    pub fn id(&self) -> UniqueId {
        self.id
    }

    /// Replace the actor id.
    pub fn set_id(&mut self, id: UniqueId) {
        self.id = id;
    }

    /// Actor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the actor.
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Actor type.
    #[must_use]
    pub fn actor_type(&self) -> &ActorTypePtr {
        &self.actor_type
    }

    /// Runtime class info of this actor.
    #[must_use]
    pub fn class_info(&self) -> &SharedClassInfo {
        &self.class_info
    }

    /// Mutable class info, used by subclasses to register their class name.
    pub fn class_info_mut(&mut self) -> &mut SharedClassInfo {
        &mut self.class_info
    }

    /// Whether the actor can be placed in the world.
    #[must_use]
    pub fn is_placeable(&self) -> bool {
        self.placeable
    }

    /// Set the placeable flag.
    pub fn set_placeable(&mut self, placeable: bool) {
        self.placeable = placeable;
    }

    /// Properties.
    #[must_use]
    pub fn properties(&self) -> &PropertyContainer {
        &self.properties
    }

    /// Mutable properties.
    pub fn properties_mut(&mut self) -> &mut PropertyContainer {
        &mut self.properties
    }
}

// ---------------------------------------------------------------------------
// Base actor object
// ---------------------------------------------------------------------------

/// Contract every actor stored in a map fulfils.
pub trait BaseActorObject: Any + fmt::Debug {
    /// Shared actor state.
    fn core(&self) -> &ActorCore;

    /// Mutable shared actor state.
    fn core_mut(&mut self) -> &mut ActorCore;

    /// Called when the actor is removed from its map.
    fn on_remove(&self) {}

    /// Whether this actor can serve as the map's environment actor.
    fn is_environment_actor(&self) -> bool {
        false
    }

    /// This actor as a parent/child container, if it is one.
    fn as_component_container(&self) -> Option<&dyn ActorComponentContainer> {
        None
    }

    /// Mutable container view, if it is one.
    fn as_component_container_mut(&mut self) -> Option<&mut dyn ActorComponentContainer> {
        None
    }

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Actor id.
    fn id(&self) -> UniqueId {
        self.core().id()
    }

    /// Replace the actor id.
    fn set_id(&mut self, id: UniqueId) {
        self.core_mut().set_id(id);
    }

    /// Actor name.
    fn name(&self) -> &str {
        self.core().name()
    }

    /// Rename the actor.
    fn set_name(&mut self, name: &str) {
        self.core_mut().set_name(name);
    }

    /// Actor type.
    fn actor_type(&self) -> &ActorTypePtr {
        self.core().actor_type()
    }

    /// Whether the actor can be placed in the world.
    fn is_placeable(&self) -> bool {
        self.core().is_placeable()
    }

    /// Whether the actor's class is `class_name` or derives from it.
    fn is_instance_of(&self, class_name: &str) -> bool {
        self.core().class_info().is_instance_of(class_name)
    }

    /// Property by name.
    fn property(&self, name: &str) -> Option<PropertyPtr> {
        self.core().properties().property(name)
    }

    /// All properties.
    fn properties(&self) -> &PropertyContainer {
        self.core().properties()
    }
}

/// An actor that can own child actors and components.
pub trait ActorComponentContainer {
    /// Current parent, if any and still alive.
    fn parent_base_actor(&self) -> Option<ActorPtr>;

    /// Re-parent under `parent`, or detach with `None`.
    ///
    /// Returns false when the new parent cannot hold children.
    fn set_parent_base_actor(&mut self, parent: Option<&ActorPtr>) -> bool;

    /// Direct children, in insertion order.
    fn child_actors(&self) -> Vec<ActorPtr>;

    /// Append a child without touching the child's parent link.
    fn insert_child_actor(&mut self, child: ActorPtr);

    /// Remove `child` (by identity) without touching the child's parent link.
    ///
    /// The child may be mutably borrowed by the caller, so implementations
    /// must not borrow it.
    fn remove_child_actor(&mut self, child: &ActorPtr) -> bool;

    /// Types of the components attached to this actor.
    fn component_actor_types(&self) -> Vec<ActorTypePtr> {
        Vec::new()
    }
}

/// Whether two handles point at the same actor.
#[must_use]
pub fn same_actor(a: &ActorPtr, b: &ActorPtr) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

// ---------------------------------------------------------------------------
// Hierarchy iteration
// ---------------------------------------------------------------------------

/// Pre-order walk over an actor and all of its descendants.
pub struct ActorIterator {
    stack: Vec<ActorPtr>,
}

impl ActorIterator {
    /// Walk starting at `root` (yielded first).
    #[must_use]
    pub fn new(root: ActorPtr) -> Self {
        Self { stack: vec![root] }
    }
}

impl Iterator for ActorIterator {
    type Item = ActorPtr;

    fn next(&mut self) -> Option<ActorPtr> {
        let next = self.stack.pop()?;
        let children = {
            let actor = next.borrow();
            actor
                .as_component_container()
                .map(|c| c.child_actors())
                .unwrap_or_default()
        };
        self.stack.extend(children.into_iter().rev());
        Some(next)
    }
}

// ---------------------------------------------------------------------------
// Plain actor
// ---------------------------------------------------------------------------

/// A plain, non-container actor.
#[derive(Debug)]
pub struct BasicActor {
    core: ActorCore,
    environment: bool,
}

impl BasicActor {
    /// New actor of `actor_type` named `name`.
    #[must_use]
    pub fn new(actor_type: ActorTypePtr, name: &str) -> Self {
        Self {
            core: ActorCore::new(actor_type, name),
            environment: false,
        }
    }

    /// Flag this actor as an environment actor.
    #[must_use]
    pub fn as_environment(mut self) -> Self {
        self.environment = true;
        self
    }

    /// Add a property, builder style.
    #[must_use]
    pub fn with_property(mut self, property: PropertyPtr) -> Self {
        self.core.properties_mut().add_property(property);
        self
    }

    /// Wrap in a shared handle.
    #[must_use]
    pub fn into_ptr(self) -> ActorPtr {
        Rc::new(RefCell::new(self))
    }
}

impl BaseActorObject for BasicActor {
    fn core(&self) -> &ActorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActorCore {
        &mut self.core
    }

    fn is_environment_actor(&self) -> bool {
        self.environment
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_type::ActorType;

    /// Minimal container used to exercise the iterator.
    #[derive(Debug)]
    struct Group {
        core: ActorCore,
        children: Vec<ActorPtr>,
    }

    impl BaseActorObject for Group {
        fn core(&self) -> &ActorCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut ActorCore {
            &mut self.core
        }
        fn as_component_container(&self) -> Option<&dyn ActorComponentContainer> {
            Some(self)
        }
        fn as_component_container_mut(&mut self) -> Option<&mut dyn ActorComponentContainer> {
            Some(self)
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl ActorComponentContainer for Group {
        fn parent_base_actor(&self) -> Option<ActorPtr> {
            None
        }
        fn set_parent_base_actor(&mut self, _parent: Option<&ActorPtr>) -> bool {
            true
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
    }

    fn group(name: &str) -> ActorPtr {
        let t = ActorType::new("Group", "test", "").into_ptr();
        Rc::new(RefCell::new(Group {
            core: ActorCore::new(t, name),
            children: Vec::new(),
        }))
    }

    #[test]
    fn iterator_is_pre_order() {
        let root = group("root");
        let a = group("a");
        let b = group("b");
        let a1 = group("a1");
        a.borrow_mut().as_component_container_mut().unwrap().insert_child_actor(a1);
        {
            let mut r = root.borrow_mut();
            let c = r.as_component_container_mut().unwrap();
            c.insert_child_actor(a);
            c.insert_child_actor(b);
        }
        let names: Vec<String> = ActorIterator::new(root).map(|n| n.borrow().name().to_string()).collect();
        assert_eq!(names, ["root", "a", "a1", "b"]);
    }

    #[test]
    fn plain_actor_is_a_leaf() {
        let t = ActorType::new("Thing", "test", "").with_class_name("Thing").into_ptr();
        let actor = BasicActor::new(t, "x").into_ptr();
        assert_eq!(ActorIterator::new(actor.clone()).count(), 1);
        assert!(actor.borrow().is_instance_of("Thing"));
        assert!(!actor.borrow().is_environment_actor());
    }

    #[test]
    fn same_actor_compares_identity() {
        let t = ActorType::new("Thing", "test", "").into_ptr();
        let a = BasicActor::new(t.clone(), "x").into_ptr();
        let b = BasicActor::new(t, "x").into_ptr();
        assert!(same_actor(&a, &a.clone()));
        assert!(!same_actor(&a, &b));
    }
}
