//! Actor type descriptors and class-hierarchy information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Shared handle to an immutable actor type.
pub type ActorTypePtr = Rc<ActorType>;

/// Runtime class name plus every ancestor class name.
///
/// Used for `is_instance_of`-style checks and for the map's class-name cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedClassInfo {
    class_name: String,
    class_hierarchy: BTreeSet<String>,
}

impl SharedClassInfo {
    /// Class info for a root class.
    #[must_use]
    pub fn new(class_name: &str) -> Self {
        let mut info = Self::default();
        info.set_class_name(class_name);
        info
    }

    /// Set the most-derived class name; it joins the hierarchy.
    pub fn set_class_name(&mut self, class_name: &str) {
        self.class_name = class_name.to_string();
        if !class_name.is_empty() {
            self.class_hierarchy.insert(class_name.to_string());
        }
    }

    /// The most-derived class name. May be empty.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// All class names, own and inherited.
    #[must_use]
    pub fn class_hierarchy(&self) -> &BTreeSet<String> {
        &self.class_hierarchy
    }

    /// Whether `class_name` is this class or one of its ancestors.
    #[must_use]
    pub fn is_instance_of(&self, class_name: &str) -> bool {
        self.class_hierarchy.contains(class_name)
    }
}

/// Describes a kind of actor: name, dotted category, optional parent type.
///
/// Two types are equal when their full names (`category.name`) are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorType {
    name: String,
    category: String,
    description: String,
    parent: Option<ActorTypePtr>,
    class_info: SharedClassInfo,
}

impl ActorType {
    /// A root actor type.
    #[must_use]
    pub fn new(name: &str, category: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            parent: None,
            class_info: SharedClassInfo::default(),
        }
    }

    /// Derive from `parent`, inheriting its class hierarchy.
    #[must_use]
    pub fn with_parent(mut self, parent: ActorTypePtr) -> Self {
        for class in parent.class_info.class_hierarchy() {
            self.class_info.class_hierarchy.insert(class.clone());
        }
        if self.class_info.class_name.is_empty() {
            self.class_info.class_name = parent.class_info.class_name.clone();
        }
        self.parent = Some(parent);
        self
    }

    /// Set the runtime class name of actors of this type.
    #[must_use]
    pub fn with_class_name(mut self, class_name: &str) -> Self {
        self.class_info.set_class_name(class_name);
        self
    }

    /// Wrap in a shared handle.
    #[must_use]
    pub fn into_ptr(self) -> ActorTypePtr {
        Rc::new(self)
    }

    /// Type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted category, e.g. `dtcore.Lights`.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Free-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parent type, if any.
    #[must_use]
    pub fn parent_actor_type(&self) -> Option<&ActorTypePtr> {
        self.parent.as_ref()
    }

    /// `category.name`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.category, self.name)
    }

    /// Class info shared by actors of this type.
    #[must_use]
    pub fn shared_class_info(&self) -> &SharedClassInfo {
        &self.class_info
    }

    /// Whether this type equals `other` or derives from it.
    #[must_use]
    pub fn instance_of(&self, other: &ActorType) -> bool {
        self.ancestry().any(|t| t == other)
    }

    /// This type followed by each parent type up to the root.
    pub fn ancestry(&self) -> impl Iterator<Item = &ActorType> {
        std::iter::successors(Some(self), |t| t.parent.as_deref())
    }
}

impl PartialEq for ActorType {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category && self.name == other.name
    }
}

impl Eq for ActorType {}

impl Hash for ActorType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.category.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_category_and_name() {
        let t = ActorType::new("Tank", "vehicles.ground", "");
        assert_eq!(t.full_name(), "vehicles.ground.Tank");
        assert_eq!(t.to_string(), "vehicles.ground.Tank");
    }

    #[test]
    fn instance_of_walks_parents() {
        let base = ActorType::new("Vehicle", "vehicles", "").into_ptr();
        let tank = ActorType::new("Tank", "vehicles.ground", "").with_parent(base.clone());
        assert!(tank.instance_of(&base));
        assert!(tank.instance_of(&tank));
        assert!(!base.instance_of(&tank));
        assert_eq!(tank.ancestry().count(), 2);
    }

    #[test]
    fn class_hierarchy_is_inherited() {
        let base = ActorType::new("Vehicle", "vehicles", "")
            .with_class_name("VehicleActor")
            .into_ptr();
        let tank = ActorType::new("Tank", "vehicles", "")
            .with_parent(base)
            .with_class_name("TankActor");
        let info = tank.shared_class_info();
        assert_eq!(info.class_name(), "TankActor");
        assert!(info.is_instance_of("VehicleActor"));
        assert!(info.is_instance_of("TankActor"));
        assert!(!info.is_instance_of("Light"));
    }

    #[test]
    fn equality_ignores_description() {
        let a = ActorType::new("Tank", "vehicles", "one");
        let b = ActorType::new("Tank", "vehicles", "two");
        assert_eq!(a, b);
        assert_ne!(a, ActorType::new("Tank", "other", "one"));
    }
}
