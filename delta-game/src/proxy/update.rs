//! Actor update protocol: populating outbound updates and applying inbound ones.

use tracing::{debug, error, warn};

use delta_core::actor::BaseActorObject;
use delta_core::property::{DataType, PropertyPtr};
use delta_core::types::UniqueId;

use super::{GameActorProxy, PROPERTY_NAME};
use crate::message::{ActorUpdateMessage, Message, MessageType, UpdateParameter};
use crate::ownership::LocalActorUpdatePolicy;

/// What happened to one update parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyUpdateOutcome {
    /// The value was assigned.
    Applied,
    /// Not on the accept list of a filtering local actor.
    SkippedFiltered,
    /// The property is read-only.
    SkippedReadOnly,
    /// No property, current or deprecated, has this name.
    NotFound,
    /// Actor reference to an actor the game manager does not know; the
    /// reference was cleared.
    UnresolvedReference,
    /// Actor reference could not be resolved without a game manager.
    NoGameManager,
    /// Assignment failed.
    Failed(String),
}

/// What happened to the actor name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameUpdateOutcome {
    /// The name was set.
    Applied,
    /// "Name" is not on the accept list.
    SkippedFiltered,
    /// Empty names only apply on creation.
    SkippedEmpty,
}

/// What happened to the parent link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentUpdateOutcome {
    /// Already the requested parent (or already parentless).
    Unchanged,
    /// Detached from its parent.
    Cleared,
    /// Attached to the requested parent.
    Attached,
    /// The parent id is not known to the game manager.
    NotFound,
    /// No game manager to resolve the parent through.
    NoGameManager,
    /// The parent refused the child (cycle or not a container).
    Refused,
}

/// Result of [`GameActorProxy::apply_actor_update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorUpdateReport {
    /// The whole message was discarded by `IGNORE_ALL`.
    pub dropped: bool,
    /// Name handling, when the message carried an update.
    pub name: Option<NameUpdateOutcome>,
    /// Parent handling, when the update carried a parent id.
    pub parent: Option<ParentUpdateOutcome>,
    /// Per-parameter outcome, in message order.
    pub properties: Vec<(String, PropertyUpdateOutcome)>,
}

impl ActorUpdateReport {
    /// Outcome for the parameter `name`.
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&PropertyUpdateOutcome> {
        self.properties.iter().find(|(n, _)| n == name).map(|(_, o)| o)
    }

    /// Number of parameters that were applied.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.properties
            .iter()
            .filter(|(_, o)| *o == PropertyUpdateOutcome::Applied)
            .count()
    }
}

impl GameActorProxy {
    // -----------------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------------

    /// Fill `message` with this actor's state.
    ///
    /// An empty `property_names` selects every property flagged for full
    /// updates; otherwise only the named ones (unknown names are ignored).
    /// Read-only properties and the reserved "Name" property are never
    /// included. Properties that cannot be snapshotted are skipped.
    pub fn populate_actor_update(&self, message: &mut Message, property_names: &[String]) {
        let id = self.core.id();
        message.set_sending_actor_id(id);
        message.set_about_actor_id(id);
        if message.actor_update().is_none() {
            message.set_actor_update(ActorUpdateMessage::default());
        }
        let parent_id = self
            .parent_actor()
            .and_then(|p| p.try_borrow().ok().map(|p| p.id()));
        let Some(update) = message.actor_update_mut() else {
            return;
        };

        update.name = self.core.name().to_string();
        update.actor_type_name = self.core.actor_type().name().to_string();
        update.actor_type_category = self.core.actor_type().category().to_string();
        if let Some((proto_id, proto_name)) = self.prototype() {
            update.prototype_id = Some(proto_id);
            update.prototype_name = proto_name.to_string();
        }
        if let Some(parent_id) = parent_id {
            update.parent_id = Some(parent_id);
        }

        let check_full = property_names.is_empty();
        let selected: Vec<PropertyPtr> = if check_full {
            self.core.properties().properties().to_vec()
        } else {
            property_names.iter().filter_map(|n| self.core.properties().property(n)).collect()
        };

        for property in selected {
            if property.is_read_only()
                || (check_full && !property.send_in_full_update())
                || property.name() == PROPERTY_NAME
            {
                continue;
            }
            match UpdateParameter::from_property(property.as_ref()) {
                Ok(parameter) => update.add_update_parameter(parameter),
                Err(e) => debug!(property = property.name(), error = %e, "Property skipped in actor update"),
            }
        }
    }

    /// Send a full update through the game manager.
    ///
    /// Does nothing for remote actors or without a game manager.
    pub fn notify_full_actor_update(&self) {
        let Some(gm) = self.game_manager() else {
            return;
        };
        if self.is_remote() {
            return;
        }
        let mut message = Message::new(MessageType::InfoActorUpdated);
        self.populate_actor_update(&mut message, &[]);
        gm.send_message(message);
    }

    /// Send an update restricted to `property_names`.
    pub fn notify_partial_actor_update_with(&self, property_names: &[String], flag_as_partial: bool) {
        let Some(gm) = self.game_manager() else {
            return;
        };
        if self.is_remote() {
            return;
        }
        let mut message = Message::new(MessageType::InfoActorUpdated);
        self.populate_actor_update(&mut message, property_names);
        if let Some(update) = message.actor_update_mut() {
            update.partial = flag_as_partial;
        }
        gm.send_message(message);
    }

    /// Send an update of the properties components and the proxy flag for
    /// partial updates.
    pub fn notify_partial_actor_update(&self, flag_as_partial: bool) {
        let mut names = Vec::new();
        for component in self.components() {
            component.partial_update_properties(&mut names);
        }
        names.extend(self.partial_update_properties());
        self.notify_partial_actor_update_with(&names, flag_as_partial);
    }

    /// Names of this proxy's properties flagged for partial updates.
    #[must_use]
    pub fn partial_update_properties(&self) -> Vec<String> {
        self.core
            .properties()
            .properties()
            .iter()
            .filter(|p| p.send_in_partial_update())
            .map(|p| p.name().to_string())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------------

    /// Apply an actor update message to this proxy.
    ///
    /// With `check_local_update_policy`, a local actor whose policy is
    /// `IgnoreAll` drops the whole message. A local actor with
    /// `AcceptWithPropertyFilter` only takes properties (and the name) on its
    /// accept list. Per-parameter failures are logged and reported, never
    /// propagated.
    pub fn apply_actor_update(&mut self, message: &Message, check_local_update_policy: bool) -> ActorUpdateReport {
        let mut report = ActorUpdateReport::default();
        let Some(update) = message.actor_update() else {
            warn!(actor = self.core.name(), message_type = %message.message_type(), "Message carries no actor update");
            return report;
        };

        let is_local = !self.is_remote();
        let policy = self.local_actor_update_policy();
        let filter = is_local && policy == LocalActorUpdatePolicy::AcceptWithPropertyFilter;

        if check_local_update_policy && is_local && policy == LocalActorUpdatePolicy::IgnoreAll {
            debug!(
                actor_type = %self.core.actor_type(),
                actor = self.core.name(),
                "Ignoring update message on local actor"
            );
            report.dropped = true;
            return report;
        }

        report.name = Some(if filter && !self.should_accept_property_in_local_update(PROPERTY_NAME) {
            NameUpdateOutcome::SkippedFiltered
        } else if *message.message_type() == MessageType::InfoActorCreated || !update.name.is_empty() {
            debug!(actor_type = %self.core.actor_type(), name = %update.name, "Setting actor name");
            self.core.set_name(&update.name);
            NameUpdateOutcome::Applied
        } else {
            NameUpdateOutcome::SkippedEmpty
        });

        if let Some(parent_id) = update.parent_id {
            report.parent = Some(self.apply_parent_update(parent_id));
        }

        for parameter in update.update_parameters() {
            let outcome = self.apply_update_parameter(parameter, filter);
            report.properties.push((parameter.name.clone(), outcome));
        }
        report
    }

    fn apply_parent_update(&mut self, parent_id: UniqueId) -> ParentUpdateOutcome {
        let current = self.parent_actor();
        if parent_id.is_null() {
            if current.is_none() {
                return ParentUpdateOutcome::Unchanged;
            }
            self.set_parent_actor(None);
            return ParentUpdateOutcome::Cleared;
        }

        let current_id = current.and_then(|p| p.try_borrow().ok().map(|p| p.id()));
        if current_id == Some(parent_id) {
            return ParentUpdateOutcome::Unchanged;
        }

        let Some(gm) = self.game_manager() else {
            error!(actor = self.core.name(), %parent_id, "Cannot resolve parent actor without a game manager");
            return ParentUpdateOutcome::NoGameManager;
        };
        match gm.find_game_actor_by_id(parent_id) {
            Some(parent) => {
                if self.set_parent_actor(Some(&parent)) {
                    ParentUpdateOutcome::Attached
                } else {
                    ParentUpdateOutcome::Refused
                }
            }
            None => {
                error!(
                    actor_type = %self.core.actor_type(),
                    actor = self.core.name(),
                    %parent_id,
                    "Setting the parent actor failed because the parent actor could not be found"
                );
                ParentUpdateOutcome::NotFound
            }
        }
    }

    fn apply_update_parameter(&self, parameter: &UpdateParameter, filter: bool) -> PropertyUpdateOutcome {
        let name = parameter.name.as_str();
        if filter && !self.should_accept_property_in_local_update(name) {
            debug!(
                actor_type = %self.core.actor_type(),
                property = name,
                "Ignoring property: actor is local, filtering, and the property is not on the accept list"
            );
            return PropertyUpdateOutcome::SkippedFiltered;
        }

        let Some(property) = self.property(name).or_else(|| self.deprecated_property(name)) else {
            warn!(actor_type = %self.core.actor_type(), property = name, "Property was not found on actor type");
            return PropertyUpdateOutcome::NotFound;
        };

        if property.is_read_only() {
            debug!(property = name, value = %parameter.value, "Not setting read only property");
            return PropertyUpdateOutcome::SkippedReadOnly;
        }

        debug!(actor_type = %self.core.actor_type(), property = name, value = %parameter.value, "Setting property");

        if parameter.data_type == DataType::Actor {
            if let Some(reference) = property.as_actor_reference() {
                let Some(gm) = self.game_manager() else {
                    error!(
                        actor_type = %self.core.actor_type(),
                        actor_id = %self.core.id(),
                        "Game actor proxy could not access the game manager"
                    );
                    return PropertyUpdateOutcome::NoGameManager;
                };
                let id = parameter.value.as_id().unwrap_or_else(UniqueId::null);
                if id.is_null() {
                    reference.set_target(None);
                    return PropertyUpdateOutcome::Applied;
                }
                return match gm.find_game_actor_by_id(id) {
                    Some(target) => {
                        // The target may be this proxy, already mutably borrowed.
                        reference.set_target_with_id(&target, id);
                        PropertyUpdateOutcome::Applied
                    }
                    None => {
                        reference.set_target(None);
                        PropertyUpdateOutcome::UnresolvedReference
                    }
                };
            }
        }

        match parameter.apply_to(property.as_ref()) {
            Ok(()) => PropertyUpdateOutcome::Applied,
            Err(e) => {
                error!(actor_type = %self.core.actor_type(), property = name, error = %e, "Failed to apply update parameter");
                PropertyUpdateOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::{GameActorProxyPtr, PROPERTY_IS_REMOTE};
    use delta_core::actor_type::ActorType;
    use delta_core::property::{ActorProperty, GenericProperty, PropertyValue};

    fn proxy() -> GameActorProxyPtr {
        let t = ActorType::new("Tank", "vehicles", "").into_ptr();
        GameActorProxy::new(t, "Tank_01")
            .with_property(GenericProperty::new("Speed", PropertyValue::Float(0.0)).into_ptr())
            .with_property(GenericProperty::new("Color", PropertyValue::String("red".into())).into_ptr())
            .with_property(
                GenericProperty::new("Secret", PropertyValue::Int(7))
                    .with_full_update(false)
                    .with_partial_update(true)
                    .into_ptr(),
            )
            .into_ptr()
    }

    fn update(name: &str, params: &[(&str, PropertyValue)]) -> Message {
        let mut message = Message::new(MessageType::InfoActorUpdated);
        let mut body = ActorUpdateMessage {
            name: name.to_string(),
            ..ActorUpdateMessage::default()
        };
        for (n, v) in params {
            body.add_update_parameter(UpdateParameter::new(n, v.clone()));
        }
        message.set_actor_update(body);
        message
    }

    #[test]
    fn populate_skips_read_only_and_unflagged() {
        let p = proxy();
        let p = p.borrow();
        let mut message = Message::new(MessageType::InfoActorUpdated);
        p.populate_actor_update(&mut message, &[]);

        let body = message.actor_update().unwrap();
        assert_eq!(body.name, "Tank_01");
        assert_eq!(body.actor_type_category, "vehicles");
        assert!(body.update_parameter("Speed").is_some());
        assert!(body.update_parameter("Secret").is_none());
        assert!(body.update_parameter(PROPERTY_IS_REMOTE).is_none());
        assert!(body.update_parameter("Initial Ownership").is_some());
        assert_eq!(message.sending_actor_id(), p.id());
        assert_eq!(message.about_actor_id(), p.id());
    }

    #[test]
    fn populate_named_properties_ignores_full_flag() {
        let p = proxy();
        let p = p.borrow();
        let mut message = Message::new(MessageType::InfoActorUpdated);
        let names = vec!["Secret".to_string(), "Missing".to_string()];
        p.populate_actor_update(&mut message, &names);
        let body = message.actor_update().unwrap();
        assert_eq!(body.update_parameters().len(), 1);
        assert_eq!(body.update_parameter("Secret").unwrap().value, PropertyValue::Int(7));
        assert_eq!(p.partial_update_properties(), ["Secret"]);
    }

    #[test]
    fn ignore_all_drops_everything() {
        let p = proxy();
        let mut p = p.borrow_mut();
        p.set_local_actor_update_policy(LocalActorUpdatePolicy::IgnoreAll);
        let report = p.apply_actor_update(&update("Renamed", &[("Speed", PropertyValue::Float(3.0))]), true);
        assert!(report.dropped);
        assert_eq!(p.name(), "Tank_01");
        assert_eq!(p.property("Speed").unwrap().value(), PropertyValue::Float(0.0));

        // Without the policy check the update goes through.
        let report = p.apply_actor_update(&update("Renamed", &[("Speed", PropertyValue::Float(3.0))]), false);
        assert!(!report.dropped);
        assert_eq!(report.outcome("Speed"), Some(&PropertyUpdateOutcome::Applied));
    }

    #[test]
    fn remote_actors_ignore_policy() {
        let p = proxy();
        let mut p = p.borrow_mut();
        p.set_remote(true);
        p.set_local_actor_update_policy(LocalActorUpdatePolicy::IgnoreAll);
        let report = p.apply_actor_update(&update("", &[("Speed", PropertyValue::Float(3.0))]), true);
        assert!(!report.dropped);
        assert_eq!(report.applied_count(), 1);
    }

    #[test]
    fn accept_list_filters_properties_and_name() {
        let p = proxy();
        let mut p = p.borrow_mut();
        p.set_local_actor_update_policy(LocalActorUpdatePolicy::AcceptWithPropertyFilter);
        p.add_property_to_local_update_accept_filter("Speed");
        let report = p.apply_actor_update(
            &update(
                "Other",
                &[
                    ("Speed", PropertyValue::Float(9.0)),
                    ("Color", PropertyValue::String("blue".into())),
                ],
            ),
            true,
        );
        assert_eq!(report.name, Some(NameUpdateOutcome::SkippedFiltered));
        assert_eq!(report.outcome("Speed"), Some(&PropertyUpdateOutcome::Applied));
        assert_eq!(report.outcome("Color"), Some(&PropertyUpdateOutcome::SkippedFiltered));
        assert_eq!(p.property("Color").unwrap().value(), PropertyValue::String("red".into()));
        assert_eq!(p.name(), "Tank_01");
    }

    #[test]
    fn empty_name_only_applies_on_creation() {
        let p = proxy();
        let mut p = p.borrow_mut();
        let report = p.apply_actor_update(&update("", &[]), true);
        assert_eq!(report.name, Some(NameUpdateOutcome::SkippedEmpty));
        assert_eq!(p.name(), "Tank_01");

        let mut created = Message::new(MessageType::InfoActorCreated);
        created.set_actor_update(ActorUpdateMessage::default());
        let report = p.apply_actor_update(&created, true);
        assert_eq!(report.name, Some(NameUpdateOutcome::Applied));
        assert_eq!(p.name(), "");
    }

    #[test]
    fn per_parameter_outcomes() {
        let p = proxy();
        let mut p = p.borrow_mut();
        p.core_mut().properties_mut().add_deprecated_alias("Velocity", "Speed");
        let report = p.apply_actor_update(
            &update(
                "Tank_01",
                &[
                    ("Velocity", PropertyValue::Float(4.0)),
                    ("Nope", PropertyValue::Int(1)),
                    (PROPERTY_IS_REMOTE, PropertyValue::Boolean(true)),
                    ("Color", PropertyValue::Int(3)),
                ],
            ),
            true,
        );
        assert_eq!(report.outcome("Velocity"), Some(&PropertyUpdateOutcome::Applied));
        assert_eq!(p.property("Speed").unwrap().value(), PropertyValue::Float(4.0));
        assert_eq!(report.outcome("Nope"), Some(&PropertyUpdateOutcome::NotFound));
        assert_eq!(report.outcome(PROPERTY_IS_REMOTE), Some(&PropertyUpdateOutcome::SkippedReadOnly));
        assert!(matches!(report.outcome("Color"), Some(PropertyUpdateOutcome::Failed(_))));
        assert!(!p.is_remote());
    }

    #[test]
    fn actor_reference_without_game_manager() {
        let t = ActorType::new("Tank", "vehicles", "").into_ptr();
        let p = GameActorProxy::new(t, "Tank")
            .with_property(delta_core::property::ActorActorProperty::new("Leader", "").into_ptr())
            .into_ptr();
        let mut p = p.borrow_mut();
        let report = p.apply_actor_update(&update("Tank", &[("Leader", PropertyValue::Actor(UniqueId::new()))]), true);
        assert_eq!(report.outcome("Leader"), Some(&PropertyUpdateOutcome::NoGameManager));
    }

    #[test]
    fn non_update_message_is_ignored() {
        let p = proxy();
        let report = p.borrow_mut().apply_actor_update(&Message::new(MessageType::TickLocal), true);
        assert_eq!(report, ActorUpdateReport::default());
    }
}
