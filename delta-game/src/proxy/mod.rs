//! The game actor proxy: a managed actor taking part in the simulation.
//!
//! A [`GameActorProxy`] wraps an optional [`GameActor`], carries the
//! ownership / remote / published flags, a table of named invokables,
//! per-message-type handlers, attached components and a parent/child
//! hierarchy. It talks to its [`GameManager`] through a non-owning link.
//!
//! Protocol failures (no game manager, unknown invokable, duplicate
//! registration) are logged and the call returns without effect.
//!
//! Proxies are built, then wrapped with [`GameActorProxy::into_ptr`], which
//! gives the proxy a handle to itself (needed for hierarchy operations) and
//! runs initialisation.

mod hierarchy;
mod update;

pub use update::{ActorUpdateReport, NameUpdateOutcome, ParentUpdateOutcome, PropertyUpdateOutcome};

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, error, warn};

use delta_core::actor::{ActorComponentContainer, ActorCore, ActorPtr, BaseActorObject, WeakActor};
use delta_core::actor_type::{ActorType, ActorTypePtr};
use delta_core::property::{DataType, FunctorProperty, PropertyPtr, PropertyValue};
use delta_core::types::UniqueId;
use delta_core::CoreError;

use crate::component::ActorComponent;
use crate::config::ActorDefaults;
use crate::error::{GameError, Result};
use crate::game_actor::GameActorDrawable;
use crate::invokable::{Invokable, PROCESS_MESSAGE_INVOKABLE, TICK_LOCAL_INVOKABLE, TICK_REMOTE_INVOKABLE};
use crate::manager::GameManager;
use crate::message::MessageType;
use crate::ownership::{LocalActorUpdatePolicy, Ownership};

/// Class name registered by every game actor proxy.
pub const GAME_ACTOR_PROXY_CLASS: &str = "dtGame::GameActorProxy";

/// Reserved name of the actor-name pseudo property in updates and accept lists.
pub const PROPERTY_NAME: &str = "Name";

/// Built-in property names.
pub const PROPERTY_IS_GAME_ACTOR: &str = "IsGameActor";
/// Read-only remote flag.
pub const PROPERTY_IS_REMOTE: &str = "IsRemote";
/// Read-only published flag.
pub const PROPERTY_IS_PUBLISHED: &str = "IsPublished";
/// Initial ownership enumeration.
pub const PROPERTY_INITIAL_OWNERSHIP: &str = "Initial Ownership";
/// Local update policy enumeration.
pub const PROPERTY_LOCAL_UPDATE_POLICY: &str = "Local Actor Update Policy";

/// Shared handle to a proxy; coerces to [`ActorPtr`].
pub type GameActorProxyPtr = Rc<RefCell<GameActorProxy>>;

type WorldHook = Box<dyn FnMut(&mut GameActorProxy)>;

/// Flags the built-in properties read and write.
#[derive(Debug, Default)]
struct ProxyFlags {
    ownership: Cell<Ownership>,
    update_policy: Cell<LocalActorUpdatePolicy>,
    remote: Cell<bool>,
    published: Cell<bool>,
}

/// A managed simulation actor.
pub struct GameActorProxy {
    core: ActorCore,
    self_ref: Weak<RefCell<GameActorProxy>>,
    drawable: Option<GameActorDrawable>,
    components: Vec<Box<dyn ActorComponent>>,
    game_manager: Option<Weak<dyn GameManager>>,
    flags: Rc<ProxyFlags>,
    in_gm: bool,
    deleted: bool,
    initialized: bool,
    invokables: BTreeMap<String, Rc<Invokable>>,
    message_handlers: BTreeMap<MessageType, Vec<Rc<Invokable>>>,
    accept_list: BTreeSet<String>,
    parent: Option<WeakActor>,
    children: Vec<ActorPtr>,
    prototype: Option<(UniqueId, String)>,
    entered_world_hook: Option<WorldHook>,
    removed_from_world_hook: Option<WorldHook>,
}

impl GameActorProxy {
    /// New, uninitialised proxy of `actor_type` named `name`.
    #[must_use]
    pub fn new(actor_type: ActorTypePtr, name: &str) -> Self {
        let mut core = ActorCore::new(actor_type, name);
        core.class_info_mut().set_class_name(GAME_ACTOR_PROXY_CLASS);
        Self {
            core,
            self_ref: Weak::new(),
            drawable: None,
            components: Vec::new(),
            game_manager: None,
            flags: Rc::new(ProxyFlags::default()),
            in_gm: false,
            deleted: false,
            initialized: false,
            invokables: BTreeMap::new(),
            message_handlers: BTreeMap::new(),
            accept_list: BTreeSet::new(),
            parent: None,
            children: Vec::new(),
            prototype: None,
            entered_world_hook: None,
            removed_from_world_hook: None,
        }
    }

    /// Wrap a game actor.
    #[must_use]
    pub fn with_drawable(mut self, drawable: GameActorDrawable) -> Self {
        self.drawable = Some(drawable);
        self
    }

    /// Seed ownership, update policy and accept list from configuration.
    #[must_use]
    pub fn with_defaults(mut self, defaults: &ActorDefaults) -> Self {
        self.flags.ownership.set(defaults.ownership);
        self.flags.update_policy.set(defaults.local_update_policy);
        self.accept_list.extend(defaults.local_update_accept_list.iter().cloned());
        self
    }

    /// Add a property, builder style.
    #[must_use]
    pub fn with_property(mut self, property: PropertyPtr) -> Self {
        self.core.properties_mut().add_property(property);
        self
    }

    /// Register an additional class name (e.g. of a subclass-like wrapper).
    #[must_use]
    pub fn with_class_name(mut self, class_name: &str) -> Self {
        self.core.class_info_mut().set_class_name(class_name);
        self
    }

    /// Wrap in a shared handle and initialise.
    #[must_use]
    pub fn into_ptr(self) -> GameActorProxyPtr {
        let ptr = Rc::new_cyclic(|weak| {
            let mut proxy = self;
            proxy.self_ref = weak.clone();
            RefCell::new(proxy)
        });
        ptr.borrow_mut().init();
        ptr
    }

    /// Build built-in properties, default invokables and default components.
    ///
    /// Runs once; later calls are ignored.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.build_property_map();
        self.build_invokables();
        let defaults = self
            .drawable
            .as_ref()
            .and_then(|d| d.try_borrow().ok().map(|ga| ga.default_components()))
            .unwrap_or_default();
        for component in defaults {
            self.add_component(component);
        }
    }

    fn build_property_map(&mut self) {
        let props = self.core.properties_mut();
        props.add_property(
            FunctorProperty::getter_only(PROPERTY_IS_GAME_ACTOR, DataType::Boolean, || PropertyValue::Boolean(true))
                .with_label("Is Game Actor")
                .with_description("Read only property that always returns true")
                .into_ptr(),
        );

        let flags = self.flags.clone();
        props.add_property(
            FunctorProperty::getter_only(PROPERTY_IS_REMOTE, DataType::Boolean, move || {
                PropertyValue::Boolean(flags.remote.get())
            })
            .with_label("Is Remote")
            .with_description("Whether the actor mirrors state owned elsewhere")
            .into_ptr(),
        );

        let flags = self.flags.clone();
        props.add_property(
            FunctorProperty::getter_only(PROPERTY_IS_PUBLISHED, DataType::Boolean, move || {
                PropertyValue::Boolean(flags.published.get())
            })
            .with_label("Is Published")
            .with_description("Whether the actor has been published to the network")
            .into_ptr(),
        );

        let (get, set) = (self.flags.clone(), self.flags.clone());
        props.add_property(
            FunctorProperty::new(
                PROPERTY_INITIAL_OWNERSHIP,
                DataType::Enumeration,
                move || PropertyValue::Enumeration(get.ownership.get().name().to_string()),
                move |value| {
                    let name = value.as_str().unwrap_or_default();
                    let ownership = Ownership::from_name(name).ok_or_else(|| CoreError::InvalidEnumValue {
                        property: PROPERTY_INITIAL_OWNERSHIP.to_string(),
                        value: name.to_string(),
                    })?;
                    set.ownership.set(ownership);
                    Ok(())
                },
            )
            .with_description("Who owns the actor when it is first added to the game manager")
            .into_ptr(),
        );

        let (get, set) = (self.flags.clone(), self.flags.clone());
        props.add_property(
            FunctorProperty::new(
                PROPERTY_LOCAL_UPDATE_POLICY,
                DataType::Enumeration,
                move || PropertyValue::Enumeration(get.update_policy.get().name().to_string()),
                move |value| {
                    let name = value.as_str().unwrap_or_default();
                    let policy =
                        LocalActorUpdatePolicy::from_name(name).ok_or_else(|| CoreError::InvalidEnumValue {
                            property: PROPERTY_LOCAL_UPDATE_POLICY.to_string(),
                            value: name.to_string(),
                        })?;
                    set.update_policy.set(policy);
                    Ok(())
                },
            )
            .with_description("How a local actor handles incoming actor updates")
            .into_ptr(),
        );
    }

    fn build_invokables(&mut self) {
        let Some(drawable) = self.drawable.clone() else {
            return;
        };
        let drawable = &drawable;

        let target = Rc::downgrade(drawable);
        self.add_invokable(Invokable::new(PROCESS_MESSAGE_INVOKABLE, move |message| {
            if let Some(actor) = target.upgrade() {
                match actor.try_borrow_mut() {
                    Ok(mut actor) => actor.process_message(message),
                    Err(_) => warn!(message_type = %message.message_type(), "Game actor busy, message not processed"),
                }
            }
        }));

        let target = Rc::downgrade(drawable);
        self.add_invokable(Invokable::new(TICK_LOCAL_INVOKABLE, move |message| {
            if let Some(actor) = target.upgrade() {
                if let Ok(mut actor) = actor.try_borrow_mut() {
                    actor.on_tick_local(message);
                }
            }
        }));

        let target = Rc::downgrade(drawable);
        self.add_invokable(Invokable::new(TICK_REMOTE_INVOKABLE, move |message| {
            if let Some(actor) = target.upgrade() {
                if let Ok(mut actor) = actor.try_borrow_mut() {
                    actor.on_tick_remote(message);
                }
            }
        }));
    }

    // -----------------------------------------------------------------------
    // Handles and game manager
    // -----------------------------------------------------------------------

    /// Handle to this proxy, once wrapped with [`into_ptr`](Self::into_ptr).
    #[must_use]
    pub fn self_ptr(&self) -> Option<GameActorProxyPtr> {
        self.self_ref.upgrade()
    }

    /// This proxy as a generic actor handle.
    #[must_use]
    pub fn self_actor(&self) -> Option<ActorPtr> {
        self.self_ptr().map(|p| p as ActorPtr)
    }

    /// The wrapped game actor, if any.
    #[must_use]
    pub fn drawable(&self) -> Option<&GameActorDrawable> {
        self.drawable.as_ref()
    }

    /// The wrapped game actor.
    ///
    /// # Errors
    /// Returns `GameError::InvalidActorState` when the proxy wraps no game actor.
    pub fn game_actor(&self) -> Result<GameActorDrawable> {
        self.drawable.clone().ok_or_else(|| {
            GameError::InvalidActorState(format!(
                "The drawable for {} is not a game actor, but game_actor() was called",
                self.core.name()
            ))
        })
    }

    /// The game manager this proxy belongs to, if it is still alive.
    #[must_use]
    pub fn game_manager(&self) -> Option<Rc<dyn GameManager>> {
        self.game_manager.as_ref().and_then(Weak::upgrade)
    }

    /// Link to (or unlink from) a game manager. The link does not keep it alive.
    pub fn set_game_manager(&mut self, game_manager: Option<&Rc<dyn GameManager>>) {
        self.game_manager = game_manager.map(Rc::downgrade);
    }

    /// Whether the proxy is live in a game manager.
    #[must_use]
    pub fn is_in_gm(&self) -> bool {
        self.in_gm
    }

    /// Set the in-GM flag. Always clears the deleted flag.
    pub fn set_is_in_gm(&mut self, in_gm: bool) {
        self.in_gm = in_gm;
        self.deleted = false;
    }

    /// Whether the proxy has been deleted from its game manager.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Set the deleted flag.
    pub fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    // -----------------------------------------------------------------------
    // Ownership and update policy
    // -----------------------------------------------------------------------

    /// Whether this proxy mirrors an actor owned elsewhere.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.flags.remote.get()
    }

    /// Set the remote flag. Not validated against the ownership.
    pub fn set_remote(&mut self, remote: bool) {
        self.flags.remote.set(remote);
    }

    /// Whether the actor is published.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.flags.published.get()
    }

    /// Set the published flag. Not validated against the ownership.
    pub fn set_published(&mut self, published: bool) {
        self.flags.published.set(published);
    }

    /// Ownership applied when the actor is first added.
    #[must_use]
    pub fn initial_ownership(&self) -> Ownership {
        self.flags.ownership.get()
    }

    /// Set the initial ownership.
    pub fn set_initial_ownership(&mut self, ownership: Ownership) {
        self.flags.ownership.set(ownership);
    }

    /// How incoming updates are treated while the actor is local.
    #[must_use]
    pub fn local_actor_update_policy(&self) -> LocalActorUpdatePolicy {
        self.flags.update_policy.get()
    }

    /// Set the local update policy.
    pub fn set_local_actor_update_policy(&mut self, policy: LocalActorUpdatePolicy) {
        self.flags.update_policy.set(policy);
    }

    /// Accept `property` under `AcceptWithPropertyFilter`.
    pub fn add_property_to_local_update_accept_filter(&mut self, property: &str) {
        self.accept_list.insert(property.to_string());
    }

    /// Stop accepting `property`.
    pub fn remove_property_from_local_update_accept_filter(&mut self, property: &str) {
        self.accept_list.remove(property);
    }

    /// Whether `property` is on the accept list.
    #[must_use]
    pub fn should_accept_property_in_local_update(&self, property: &str) -> bool {
        self.accept_list.contains(property)
    }

    /// Prototype id and name, if this actor was created from one.
    #[must_use]
    pub fn prototype(&self) -> Option<(UniqueId, &str)> {
        self.prototype.as_ref().map(|(id, name)| (*id, name.as_str()))
    }

    /// Record the prototype this actor was created from.
    pub fn set_prototype(&mut self, prototype: Option<(UniqueId, &str)>) {
        self.prototype = prototype.map(|(id, name)| (id, name.to_string()));
    }

    // -----------------------------------------------------------------------
    // Invokables
    // -----------------------------------------------------------------------

    /// Register an invokable. A duplicate name is logged and the new one dropped.
    pub fn add_invokable(&mut self, invokable: Invokable) -> bool {
        if self.invokables.contains_key(invokable.name()) {
            error!(
                actor = self.core.name(),
                invokable = invokable.name(),
                "Could not add new invokable because an invokable with that name already exists"
            );
            return false;
        }
        self.invokables.insert(invokable.name().to_string(), Rc::new(invokable));
        true
    }

    /// Remove an invokable by name.
    pub fn remove_invokable(&mut self, name: &str) -> bool {
        self.invokables.remove(name).is_some()
    }

    /// Invokable by name.
    #[must_use]
    pub fn invokable(&self, name: &str) -> Option<Rc<Invokable>> {
        self.invokables.get(name).cloned()
    }

    /// All invokables, ordered by name.
    #[must_use]
    pub fn invokables(&self) -> Vec<Rc<Invokable>> {
        self.invokables.values().cloned().collect()
    }

    /// Handlers registered for messages of `message_type` about this actor.
    #[must_use]
    pub fn message_handlers(&self, message_type: &MessageType) -> Vec<Rc<Invokable>> {
        self.message_handlers.get(message_type).cloned().unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Message registration
    // -----------------------------------------------------------------------

    /// Have the game manager route every `message_type` message to `invokable`.
    ///
    /// Requires the proxy to be in a game manager; otherwise logs and does nothing.
    pub fn register_for_messages(&self, message_type: &MessageType, invokable: &str) -> bool {
        match self.live_game_manager(message_type, invokable) {
            Some(gm) => {
                gm.register_for_messages(message_type, self.core.id(), invokable);
                true
            }
            None => false,
        }
    }

    /// Have the game manager route `message_type` messages about `target` to `invokable`.
    pub fn register_for_messages_about_other_actor(
        &self,
        message_type: &MessageType,
        target: UniqueId,
        invokable: &str,
    ) -> bool {
        match self.live_game_manager(message_type, invokable) {
            Some(gm) => {
                gm.register_for_messages_about_actor(message_type, target, self.core.id(), invokable);
                true
            }
            None => false,
        }
    }

    /// Handle `message_type` messages about this actor with `invokable`.
    ///
    /// The invokable must already exist; no game manager is needed.
    pub fn register_for_messages_about_self(&mut self, message_type: &MessageType, invokable: &str) -> bool {
        let Some(handler) = self.invokable(invokable) else {
            error!(
                actor = self.core.name(),
                invokable,
                "Could not register invokable as a handler because no invokable with that name exists"
            );
            return false;
        };
        self.message_handlers.entry(message_type.clone()).or_default().push(handler);
        true
    }

    /// Undo [`register_for_messages`](Self::register_for_messages).
    pub fn unregister_for_messages(&self, message_type: &MessageType, invokable: &str) {
        if let Some(gm) = self.game_manager() {
            gm.unregister_for_messages(message_type, self.core.id(), invokable);
        }
    }

    /// Undo [`register_for_messages_about_other_actor`](Self::register_for_messages_about_other_actor).
    pub fn unregister_for_messages_about_other_actor(
        &self,
        message_type: &MessageType,
        target: UniqueId,
        invokable: &str,
    ) {
        if let Some(gm) = self.game_manager() {
            gm.unregister_for_messages_about_actor(message_type, target, self.core.id(), invokable);
        }
    }

    /// Remove one self-scoped registration of `invokable`; absent entries are ignored.
    pub fn unregister_for_messages_about_self(&mut self, message_type: &MessageType, invokable: &str) {
        if let Some(handlers) = self.message_handlers.get_mut(message_type) {
            if let Some(index) = handlers.iter().position(|h| h.name() == invokable) {
                handlers.remove(index);
            }
            if handlers.is_empty() {
                self.message_handlers.remove(message_type);
            }
        }
    }

    fn live_game_manager(&self, message_type: &MessageType, invokable: &str) -> Option<Rc<dyn GameManager>> {
        if !self.in_gm {
            error!(
                actor = self.core.name(),
                message_type = %message_type,
                invokable,
                "Could not register for messages because the actor is not in the game manager yet"
            );
            return None;
        }
        let gm = self.game_manager();
        if gm.is_none() {
            error!(actor = self.core.name(), "Actor is flagged in the game manager but has no game manager");
        }
        gm
    }

    // -----------------------------------------------------------------------
    // World entry and exit
    // -----------------------------------------------------------------------

    /// Hook run last when the actor enters the world.
    pub fn set_entered_world_hook(&mut self, hook: impl FnMut(&mut GameActorProxy) + 'static) {
        self.entered_world_hook = Some(Box::new(hook));
    }

    /// Hook run last when the actor leaves the world.
    pub fn set_removed_from_world_hook(&mut self, hook: impl FnMut(&mut GameActorProxy) + 'static) {
        self.removed_from_world_hook = Some(Box::new(hook));
    }

    /// Fire world entry: game actor, then components, then this proxy's hook.
    pub fn invoke_entered_world(&mut self) {
        if let Some(drawable) = &self.drawable {
            match drawable.try_borrow_mut() {
                Ok(mut ga) => ga.on_entered_world(),
                Err(_) => warn!(actor = self.core.name(), "Game actor busy, skipping world entry hook"),
            }
        }
        for component in &mut self.components {
            component.set_is_in_gm(true);
            component.on_entered_world();
        }
        if let Some(mut hook) = self.entered_world_hook.take() {
            hook(self);
            if self.entered_world_hook.is_none() {
                self.entered_world_hook = Some(hook);
            }
        }
    }

    /// Fire world exit: game actor, then components, then this proxy's hook.
    pub fn invoke_removed_from_world(&mut self) {
        if let Some(drawable) = &self.drawable {
            match drawable.try_borrow_mut() {
                Ok(mut ga) => ga.on_removed_from_world(),
                Err(_) => warn!(actor = self.core.name(), "Game actor busy, skipping world exit hook"),
            }
        }
        for component in &mut self.components {
            component.set_is_in_gm(false);
            component.on_removed_from_world();
        }
        if let Some(mut hook) = self.removed_from_world_hook.take() {
            hook(self);
            if self.removed_from_world_hook.is_none() {
                self.removed_from_world_hook = Some(hook);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Components
    // -----------------------------------------------------------------------

    /// Attach a component.
    ///
    /// Order: attach, expose the component's properties on this proxy,
    /// `on_added_to_actor`, `on_added_to_game_actor` (when there is a game
    /// actor), then, if the proxy is already in a game manager, flag the
    /// component in-GM and fire its world entry.
    pub fn add_component(&mut self, component: Box<dyn ActorComponent>) {
        self.components.push(component);
        let Some(component) = self.components.last_mut() else {
            return;
        };

        for property in component.properties().properties() {
            if !self.core.properties().has_property(property.name()) {
                self.core.properties_mut().add_property(property.clone());
            }
        }

        component.on_added_to_actor(&self.core);
        if let Some(drawable) = &self.drawable {
            if let Ok(mut ga) = drawable.try_borrow_mut() {
                component.on_added_to_game_actor(&mut *ga);
            }
        }

        if self.in_gm {
            component.set_is_in_gm(true);
            component.on_entered_world();
        }
        debug!(actor = self.core.name(), component = %component.component_type(), "Component added");
    }

    /// Detach the first component of `component_type`.
    ///
    /// Mirror of [`add_component`](Self::add_component): world exit (when
    /// either side is in-GM), `on_removed_from_game_actor`,
    /// `on_removed_from_actor`, property removal, then detach.
    pub fn remove_component(&mut self, component_type: &ActorType) -> Option<Box<dyn ActorComponent>> {
        let index = self
            .components
            .iter()
            .position(|c| **c.component_type() == *component_type)?;
        let component = &mut self.components[index];

        if component.is_in_gm() || self.in_gm {
            component.set_is_in_gm(false);
            component.on_removed_from_world();
        }
        if let Some(drawable) = &self.drawable {
            if let Ok(mut ga) = drawable.try_borrow_mut() {
                component.on_removed_from_game_actor(&mut *ga);
            }
        }
        component.on_removed_from_actor(&self.core);

        for property in component.properties().properties() {
            self.core.properties_mut().remove_property_instance(property);
        }

        let removed = self.components.remove(index);
        debug!(actor = self.core.name(), component = %removed.component_type(), "Component removed");
        Some(removed)
    }

    /// Detach every component, in attachment order.
    pub fn remove_all_components(&mut self) -> Vec<Box<dyn ActorComponent>> {
        let mut removed = Vec::with_capacity(self.components.len());
        while let Some(first) = self.components.first().map(|c| c.component_type().clone()) {
            match self.remove_component(&first) {
                Some(component) => removed.push(component),
                None => break,
            }
        }
        removed
    }

    /// Attached components.
    pub fn components(&self) -> impl Iterator<Item = &dyn ActorComponent> {
        self.components.iter().map(|c| &**c)
    }

    /// First component of `component_type`.
    #[must_use]
    pub fn component(&self, component_type: &ActorType) -> Option<&dyn ActorComponent> {
        self.components()
            .find(|c| **c.component_type() == *component_type)
    }

    /// Mutable first component of `component_type`.
    pub fn component_mut(&mut self, component_type: &ActorType) -> Option<&mut Box<dyn ActorComponent>> {
        self.components
            .iter_mut()
            .find(|c| **c.component_type() == *component_type)
    }

    /// Whether a component of `component_type` is attached.
    #[must_use]
    pub fn has_component(&self, component_type: &ActorType) -> bool {
        self.component(component_type).is_some()
    }

    /// Resolve a renamed property on this proxy or any of its components.
    #[must_use]
    pub fn deprecated_property(&self, name: &str) -> Option<PropertyPtr> {
        self.core.properties().deprecated_property(name).or_else(|| {
            self.components
                .iter()
                .find_map(|c| c.properties().property(name).or_else(|| c.deprecated_property(name)))
        })
    }
}

impl BaseActorObject for GameActorProxy {
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

impl fmt::Debug for GameActorProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameActorProxy")
            .field("core", &self.core)
            .field("ownership", &self.flags.ownership.get())
            .field("update_policy", &self.flags.update_policy.get())
            .field("remote", &self.flags.remote.get())
            .field("published", &self.flags.published.get())
            .field("in_gm", &self.in_gm)
            .field("deleted", &self.deleted)
            .field("invokables", &self.invokables.keys().collect::<Vec<_>>())
            .field("components", &self.components.len())
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

impl Drop for GameActorProxy {
    fn drop(&mut self) {
        self.remove_all_components();
    }
}

/// Run `f` on the proxy behind a generic actor handle.
///
/// Returns `None` when the actor is not a proxy or is already mutably borrowed.
pub fn with_proxy<R>(actor: &ActorPtr, f: impl FnOnce(&GameActorProxy) -> R) -> Option<R> {
    let guard = actor.try_borrow().ok()?;
    guard.as_any().downcast_ref::<GameActorProxy>().map(f)
}

/// Mutable variant of [`with_proxy`].
pub fn with_proxy_mut<R>(actor: &ActorPtr, f: impl FnOnce(&mut GameActorProxy) -> R) -> Option<R> {
    let mut guard = actor.try_borrow_mut().ok()?;
    guard.as_any_mut().downcast_mut::<GameActorProxy>().map(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentBase;
    use crate::game_actor::GameActor;
    use crate::message::Message;
    use delta_core::property::{ActorProperty, GenericProperty};

    #[derive(Debug, Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl GameActor for Recorder {
        fn on_entered_world(&mut self) {
            self.events.borrow_mut().push("actor entered".into());
        }
        fn on_removed_from_world(&mut self) {
            self.events.borrow_mut().push("actor removed".into());
        }
        fn on_tick_local(&mut self, _tick: &Message) {
            self.events.borrow_mut().push("tick local".into());
        }
        fn process_message(&mut self, message: &Message) {
            self.events.borrow_mut().push(format!("process {}", message.message_type()));
        }
    }

    #[derive(Debug)]
    struct Probe {
        base: ComponentBase,
        events: Rc<RefCell<Vec<String>>>,
    }

    impl Probe {
        fn new(events: Rc<RefCell<Vec<String>>>) -> Self {
            let t = ActorType::new("Probe", "components", "").into_ptr();
            Self {
                base: ComponentBase::new(t)
                    .with_property(GenericProperty::new("Range", PropertyValue::Float(5.0)).into_ptr()),
                events,
            }
        }
        fn log(&self, what: &str) {
            let has_range = !self.base.properties().is_empty();
            self.events.borrow_mut().push(format!("{what} ({has_range})"));
        }
    }

    impl ActorComponent for Probe {
        fn base(&self) -> &ComponentBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut ComponentBase {
            &mut self.base
        }
        fn on_added_to_actor(&mut self, actor: &ActorCore) {
            let exposed = actor.properties().has_property("Range");
            self.events.borrow_mut().push(format!("added to actor, exposed={exposed}"));
        }
        fn on_added_to_game_actor(&mut self, _game_actor: &mut dyn GameActor) {
            self.log("added to game actor");
        }
        fn on_removed_from_game_actor(&mut self, _game_actor: &mut dyn GameActor) {
            self.log("removed from game actor");
        }
        fn on_removed_from_actor(&mut self, actor: &ActorCore) {
            let exposed = actor.properties().has_property("Range");
            self.events.borrow_mut().push(format!("removed from actor, exposed={exposed}"));
        }
        fn on_entered_world(&mut self) {
            self.events.borrow_mut().push("component entered".into());
        }
        fn on_removed_from_world(&mut self) {
            self.events.borrow_mut().push("component removed".into());
        }
    }

    fn tank_type() -> ActorTypePtr {
        ActorType::new("Tank", "vehicles", "").into_ptr()
    }

    #[test]
    fn built_in_properties_reflect_state() {
        let proxy = GameActorProxy::new(tank_type(), "Tank").into_ptr();
        let mut p = proxy.borrow_mut();
        assert_eq!(p.property(PROPERTY_IS_GAME_ACTOR).unwrap().value(), PropertyValue::Boolean(true));
        assert!(p.property(PROPERTY_IS_REMOTE).unwrap().is_read_only());

        p.set_remote(true);
        assert_eq!(p.property(PROPERTY_IS_REMOTE).unwrap().value(), PropertyValue::Boolean(true));

        let ownership = p.property(PROPERTY_INITIAL_OWNERSHIP).unwrap();
        ownership.set_value(PropertyValue::Enumeration("Client Local".into())).unwrap();
        assert_eq!(p.initial_ownership(), Ownership::ClientLocal);
        assert!(ownership.set_value(PropertyValue::Enumeration("Nobody".into())).is_err());

        p.set_local_actor_update_policy(LocalActorUpdatePolicy::IgnoreAll);
        assert_eq!(
            p.property(PROPERTY_LOCAL_UPDATE_POLICY).unwrap().value(),
            PropertyValue::Enumeration("IGNORE_ALL".into())
        );
        assert!(p.is_instance_of(GAME_ACTOR_PROXY_CLASS));
    }

    #[test]
    fn default_invokables_need_a_game_actor() {
        let bare = GameActorProxy::new(tank_type(), "Bare").into_ptr();
        assert!(bare.borrow().invokables().is_empty());
        assert!(bare.borrow().game_actor().is_err());

        let events = Rc::new(RefCell::new(Vec::new()));
        let drawable = Rc::new(RefCell::new(Recorder { events: events.clone() }));
        let proxy = GameActorProxy::new(tank_type(), "Tank").with_drawable(drawable).into_ptr();
        let names: Vec<String> = proxy.borrow().invokables().iter().map(|i| i.name().to_string()).collect();
        assert_eq!(names, [PROCESS_MESSAGE_INVOKABLE, TICK_LOCAL_INVOKABLE, TICK_REMOTE_INVOKABLE]);

        let tick = proxy.borrow().invokable(TICK_LOCAL_INVOKABLE).unwrap();
        tick.invoke(&Message::new(MessageType::TickLocal));
        let process = proxy.borrow().invokable(PROCESS_MESSAGE_INVOKABLE).unwrap();
        process.invoke(&Message::new(MessageType::InfoGameEvent));
        assert_eq!(*events.borrow(), ["tick local", "process Game Event"]);
    }

    #[test]
    fn duplicate_invokable_keeps_first() {
        let proxy = GameActorProxy::new(tank_type(), "Tank").into_ptr();
        let mut p = proxy.borrow_mut();
        let hits = Rc::new(Cell::new(0));
        let first = hits.clone();
        assert!(p.add_invokable(Invokable::new("Fire", move |_| first.set(1))));
        let second = hits.clone();
        assert!(!p.add_invokable(Invokable::new("Fire", move |_| second.set(2))));
        assert_eq!(p.invokables().len(), 1);
        p.invokable("Fire").unwrap().invoke(&Message::new(MessageType::TickLocal));
        assert_eq!(hits.get(), 1);
        assert!(p.remove_invokable("Fire"));
        assert!(p.invokable("Fire").is_none());
    }

    #[test]
    fn registration_requires_game_manager() {
        let proxy = GameActorProxy::new(tank_type(), "Tank").into_ptr();
        let mut p = proxy.borrow_mut();
        p.add_invokable(Invokable::new("Handle", |_| {}));
        assert!(!p.register_for_messages(&MessageType::TickLocal, "Handle"));
        assert!(!p.register_for_messages_about_other_actor(&MessageType::InfoActorUpdated, UniqueId::new(), "Handle"));

        // Self-scoped registration only needs the invokable.
        assert!(!p.register_for_messages_about_self(&MessageType::InfoActorUpdated, "Missing"));
        assert!(p.register_for_messages_about_self(&MessageType::InfoActorUpdated, "Handle"));
        assert!(p.register_for_messages_about_self(&MessageType::InfoActorUpdated, "Handle"));
        assert_eq!(p.message_handlers(&MessageType::InfoActorUpdated).len(), 2);

        p.unregister_for_messages_about_self(&MessageType::InfoActorUpdated, "Handle");
        assert_eq!(p.message_handlers(&MessageType::InfoActorUpdated).len(), 1);
        p.unregister_for_messages_about_self(&MessageType::InfoActorUpdated, "Handle");
        p.unregister_for_messages_about_self(&MessageType::InfoActorUpdated, "Handle");
        assert!(p.message_handlers(&MessageType::InfoActorUpdated).is_empty());
    }

    #[test]
    fn set_is_in_gm_clears_deleted() {
        let mut p = GameActorProxy::new(tank_type(), "Tank");
        p.set_deleted(true);
        p.set_is_in_gm(true);
        assert!(!p.is_deleted());
        assert!(p.is_in_gm());
    }

    #[test]
    fn component_hooks_fire_in_order() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let drawable = Rc::new(RefCell::new(Recorder { events: events.clone() }));
        let proxy = GameActorProxy::new(tank_type(), "Tank").with_drawable(drawable).into_ptr();
        let mut p = proxy.borrow_mut();

        p.add_component(Box::new(Probe::new(events.clone())));
        assert!(p.properties().has_property("Range"));
        assert_eq!(*events.borrow(), ["added to actor, exposed=true", "added to game actor (true)"]);
        events.borrow_mut().clear();

        p.set_is_in_gm(true);
        p.set_entered_world_hook({
            let events = events.clone();
            move |_| events.borrow_mut().push("proxy entered".into())
        });
        p.invoke_entered_world();
        assert_eq!(*events.borrow(), ["actor entered", "component entered", "proxy entered"]);
        events.borrow_mut().clear();

        let probe_type = ActorType::new("Probe", "components", "");
        let removed = p.remove_component(&probe_type).unwrap();
        assert!(!removed.is_in_gm());
        assert!(!p.properties().has_property("Range"));
        assert_eq!(
            *events.borrow(),
            [
                "component removed",
                "removed from game actor (true)",
                "removed from actor, exposed=true"
            ]
        );
        assert!(p.remove_component(&probe_type).is_none());
    }

    #[test]
    fn component_added_in_gm_enters_world() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let proxy = GameActorProxy::new(tank_type(), "Tank").into_ptr();
        let mut p = proxy.borrow_mut();
        p.set_is_in_gm(true);
        p.add_component(Box::new(Probe::new(events.clone())));
        assert_eq!(*events.borrow(), ["added to actor, exposed=true", "component entered"]);
        let probe_type = ActorType::new("Probe", "components", "");
        assert!(p.component(&probe_type).unwrap().is_in_gm());
    }

    #[test]
    fn exposed_property_does_not_shadow_own() {
        let own = GenericProperty::new("Range", PropertyValue::Float(1.0)).into_ptr();
        let proxy = GameActorProxy::new(tank_type(), "Tank").with_property(own.clone()).into_ptr();
        let mut p = proxy.borrow_mut();
        p.add_component(Box::new(Probe::new(Rc::default())));
        assert!(Rc::ptr_eq(&p.property("Range").unwrap(), &own));
        p.remove_all_components();
        assert!(Rc::ptr_eq(&p.property("Range").unwrap(), &own));
    }

    #[test]
    fn deprecated_lookup_searches_components() {
        let proxy = GameActorProxy::new(tank_type(), "Tank").into_ptr();
        let mut p = proxy.borrow_mut();
        let mut probe = Probe::new(Rc::default());
        probe.base.properties_mut().add_deprecated_alias("Radius", "Range");
        p.add_component(Box::new(probe));
        assert_eq!(p.deprecated_property("Radius").unwrap().name(), "Range");
        assert!(p.deprecated_property("Nothing").is_none());
    }

    #[test]
    fn with_proxy_downcasts() {
        let proxy = GameActorProxy::new(tank_type(), "Tank").into_ptr();
        let actor: ActorPtr = proxy.clone();
        assert_eq!(with_proxy(&actor, GameActorProxy::is_remote), Some(false));
        with_proxy_mut(&actor, |p| p.set_remote(true));
        assert!(proxy.borrow().is_remote());
        assert!(same_self(&proxy));
    }

    fn same_self(proxy: &GameActorProxyPtr) -> bool {
        proxy.borrow().self_ptr().is_some_and(|me| Rc::ptr_eq(&me, proxy))
    }
}
