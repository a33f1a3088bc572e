//! Actor components: pluggable behaviour objects with their own properties.
//!
//! A component's properties are shared handles, so the owning proxy can
//! expose them in its own property list while the component keeps them.

use std::fmt;

use delta_core::actor::ActorCore;
use delta_core::actor_type::ActorTypePtr;
use delta_core::property::{PropertyContainer, PropertyPtr};

use crate::game_actor::GameActor;

/// State shared by every component.
#[derive(Debug, Clone)]
pub struct ComponentBase {
    component_type: ActorTypePtr,
    properties: PropertyContainer,
    in_gm: bool,
}

impl ComponentBase {
    /// Base for a component of `component_type` with no properties.
    #[must_use]
    pub fn new(component_type: ActorTypePtr) -> Self {
        Self {
            component_type,
            properties: PropertyContainer::new(),
            in_gm: false,
        }
    }

    /// Add a property, builder style.
    #[must_use]
    pub fn with_property(mut self, property: PropertyPtr) -> Self {
        self.properties.add_property(property);
        self
    }

    /// Component type.
    #[must_use]
    pub fn component_type(&self) -> &ActorTypePtr {
        &self.component_type
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

/// A component attached to a game actor proxy.
///
/// Hooks fire in a fixed order; see
/// [`GameActorProxy::add_component`](crate::proxy::GameActorProxy::add_component)
/// and [`GameActorProxy::remove_component`](crate::proxy::GameActorProxy::remove_component).
pub trait ActorComponent: fmt::Debug {
    /// Shared state.
    fn base(&self) -> &ComponentBase;

    /// Mutable shared state.
    fn base_mut(&mut self) -> &mut ComponentBase;

    /// Component type.
    fn component_type(&self) -> &ActorTypePtr {
        self.base().component_type()
    }

    /// Properties.
    fn properties(&self) -> &PropertyContainer {
        self.base().properties()
    }

    /// Whether the owning actor is live in a game manager.
    fn is_in_gm(&self) -> bool {
        self.base().in_gm
    }

    /// Set the in-GM flag.
    fn set_is_in_gm(&mut self, in_gm: bool) {
        self.base_mut().in_gm = in_gm;
    }

    /// Attached to an actor.
    fn on_added_to_actor(&mut self, _actor: &ActorCore) {}

    /// Attached to an actor that has a game actor.
    fn on_added_to_game_actor(&mut self, _game_actor: &mut dyn GameActor) {}

    /// Detached from the game actor.
    fn on_removed_from_game_actor(&mut self, _game_actor: &mut dyn GameActor) {}

    /// Detached from the actor.
    fn on_removed_from_actor(&mut self, _actor: &ActorCore) {}

    /// The owning actor entered the world.
    fn on_entered_world(&mut self) {}

    /// The owning actor left the world.
    fn on_removed_from_world(&mut self) {}

    /// Append the names of properties this component sends in partial updates.
    fn partial_update_properties(&self, names: &mut Vec<String>) {
        names.extend(
            self.properties()
                .properties()
                .iter()
                .filter(|p| p.send_in_partial_update())
                .map(|p| p.name().to_string()),
        );
    }

    /// Resolve a renamed property.
    fn deprecated_property(&self, name: &str) -> Option<PropertyPtr> {
        self.properties().deprecated_property(name)
    }

    /// Fresh copy of this component, if it supports cloning.
    fn clone_component(&self) -> Option<Box<dyn ActorComponent>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delta_core::actor_type::ActorType;
    use delta_core::property::{GenericProperty, PropertyValue};

    #[derive(Debug)]
    struct Health {
        base: ComponentBase,
    }

    impl ActorComponent for Health {
        fn base(&self) -> &ComponentBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut ComponentBase {
            &mut self.base
        }
    }

    #[test]
    fn partial_properties_follow_flags() {
        let t = ActorType::new("Health", "components", "").into_ptr();
        let mut health = Health {
            base: ComponentBase::new(t)
                .with_property(GenericProperty::new("Hp", PropertyValue::Int(10)).with_partial_update(true).into_ptr())
                .with_property(GenericProperty::new("Max", PropertyValue::Int(10)).into_ptr()),
        };
        let mut names = vec!["Existing".to_string()];
        health.partial_update_properties(&mut names);
        assert_eq!(names, ["Existing", "Hp"]);

        assert!(!health.is_in_gm());
        health.set_is_in_gm(true);
        assert!(health.is_in_gm());
        assert!(health.clone_component().is_none());
    }

    #[test]
    fn deprecated_lookup_uses_aliases() {
        let t = ActorType::new("Health", "components", "").into_ptr();
        let mut base = ComponentBase::new(t).with_property(GenericProperty::new("Hp", PropertyValue::Int(1)).into_ptr());
        base.properties_mut().add_deprecated_alias("HitPoints", "Hp");
        let health = Health { base };
        assert_eq!(health.deprecated_property("HitPoints").unwrap().name(), "Hp");
        assert_eq!(health.component_type().name(), "Health");
    }
}
