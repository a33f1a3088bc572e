//! Typed, named actor properties and property containers.
//!
//! Properties are shared (`Rc<dyn ActorProperty>`) so that a component's
//! property can also be exposed on the actor that owns the component.
//! Assignment goes through `&self`; each implementation keeps its value
//! behind interior mutability.

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::{error, warn};

use crate::actor::{ActorPtr, WeakActor};
use crate::error::{CoreError, Result};
use crate::types::{Rgba, UniqueId, Vec3};

/// Shared handle to a property.
pub type PropertyPtr = Rc<dyn ActorProperty>;

// ---------------------------------------------------------------------------
// Data types and values
// ---------------------------------------------------------------------------

/// Data type of a property or an update parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    /// `bool`.
    Boolean,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// UTF-8 string.
    String,
    /// One of a fixed set of named values.
    Enumeration,
    /// 3-component vector.
    Vec3,
    /// RGBA color.
    RgbaColor,
    /// Reference to another actor.
    Actor,
    /// Reference to a game event.
    GameEvent,
}

impl DataType {
    /// Upper-case display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Int => "INT",
            Self::Long => "LONG",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::String => "STRING",
            Self::Enumeration => "ENUMERATION",
            Self::Vec3 => "VEC3",
            Self::RgbaColor => "RGBACOLOR",
            Self::Actor => "ACTOR",
            Self::GameEvent => "GAME_EVENT",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A tagged property value.
///
/// Reference values carry a [`UniqueId`]; the null id is an empty reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    /// `bool`.
    Boolean(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Enumeration value name.
    Enumeration(String),
    /// 3-component vector.
    Vec3(Vec3),
    /// RGBA color.
    RgbaColor(Rgba),
    /// Actor reference by id.
    Actor(UniqueId),
    /// Game event reference by id.
    GameEvent(UniqueId),
}

impl PropertyValue {
    /// The data type this value belongs to.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Boolean(_) => DataType::Boolean,
            Self::Int(_) => DataType::Int,
            Self::Long(_) => DataType::Long,
            Self::Float(_) => DataType::Float,
            Self::Double(_) => DataType::Double,
            Self::String(_) => DataType::String,
            Self::Enumeration(_) => DataType::Enumeration,
            Self::Vec3(_) => DataType::Vec3,
            Self::RgbaColor(_) => DataType::RgbaColor,
            Self::Actor(_) => DataType::Actor,
            Self::GameEvent(_) => DataType::GameEvent,
        }
    }

    /// Default value for a data type.
    #[must_use]
    pub fn default_for(data_type: DataType) -> Self {
        match data_type {
            DataType::Boolean => Self::Boolean(false),
            DataType::Int => Self::Int(0),
            DataType::Long => Self::Long(0),
            DataType::Float => Self::Float(0.0),
            DataType::Double => Self::Double(0.0),
            DataType::String => Self::String(String::new()),
            DataType::Enumeration => Self::Enumeration(String::new()),
            DataType::Vec3 => Self::Vec3(Vec3::default()),
            DataType::RgbaColor => Self::RgbaColor(Rgba::default()),
            DataType::Actor => Self::Actor(UniqueId::null()),
            DataType::GameEvent => Self::GameEvent(UniqueId::null()),
        }
    }

    /// The string payload of a string or enumeration value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Enumeration(s) => Some(s),
            _ => None,
        }
    }

    /// The id payload of an actor or game-event value.
    #[must_use]
    pub fn as_id(&self) -> Option<UniqueId> {
        match self {
            Self::Actor(id) | Self::GameEvent(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) | Self::Enumeration(v) => f.write_str(v),
            Self::Vec3(v) => write!(f, "{} {} {}", v.x, v.y, v.z),
            Self::RgbaColor(c) => write!(f, "{} {} {} {}", c.r, c.g, c.b, c.a),
            Self::Actor(id) | Self::GameEvent(id) => {
                if id.is_null() {
                    Ok(())
                } else {
                    write!(f, "{id}")
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property trait
// ---------------------------------------------------------------------------

/// A named, typed, assignable attribute of an actor or component.
pub trait ActorProperty: fmt::Debug {
    /// Descriptive metadata and flags.
    fn meta(&self) -> &PropertyMeta;

    /// Current value.
    fn value(&self) -> PropertyValue;

    /// Assign a new value.
    ///
    /// # Errors
    /// Fails on read-only properties, type mismatches and values outside
    /// the property's domain.
    fn set_value(&self, value: PropertyValue) -> Result<()>;

    /// Take the value of `source`, a property of the same kind.
    ///
    /// # Errors
    /// As [`ActorProperty::set_value`].
    fn copy_from(&self, source: &dyn ActorProperty) -> Result<()> {
        self.set_value(source.value())
    }

    /// Downcast to an actor-object reference property.
    fn as_actor_reference(&self) -> Option<&ActorActorProperty> {
        None
    }

    /// Downcast to an actor-id reference property.
    fn as_actor_id_reference(&self) -> Option<&ActorIdActorProperty> {
        None
    }

    /// Unique name within the owning container.
    fn name(&self) -> &str {
        &self.meta().name
    }

    /// Declared data type.
    fn data_type(&self) -> DataType {
        self.meta().data_type
    }

    /// Whether remote or scripted assignment is refused.
    fn is_read_only(&self) -> bool {
        self.meta().read_only
    }

    /// Whether the property is included in full actor updates.
    fn send_in_full_update(&self) -> bool {
        self.meta().send_in_full_update
    }

    /// Whether the property is included in argument-less partial updates.
    fn send_in_partial_update(&self) -> bool {
        self.meta().send_in_partial_update
    }
}

/// Name, label, description, data type and flags of a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMeta {
    /// Unique name.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// Description.
    pub description: String,
    /// Editor grouping.
    pub group: String,
    /// Declared data type.
    pub data_type: DataType,
    /// Read-only flag.
    pub read_only: bool,
    /// Included in full updates (default true).
    pub send_in_full_update: bool,
    /// Included in partial updates (default false).
    pub send_in_partial_update: bool,
}

impl PropertyMeta {
    /// Metadata with default flags; label defaults to the name.
    #[must_use]
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            description: String::new(),
            group: String::new(),
            data_type,
            read_only: false,
            send_in_full_update: true,
            send_in_partial_update: false,
        }
    }

    fn check_assignable(&self, value: &PropertyValue) -> Result<()> {
        if self.read_only {
            return Err(CoreError::ReadOnlyProperty(self.name.clone()));
        }
        if value.data_type() != self.data_type {
            return Err(CoreError::TypeMismatch {
                property: self.name.clone(),
                expected: self.data_type,
                found: value.data_type(),
            });
        }
        Ok(())
    }
}

macro_rules! meta_builders {
    () => {
        /// Set the label.
        #[must_use]
        pub fn with_label(mut self, label: &str) -> Self {
            self.meta.label = label.to_string();
            self
        }

        /// Set the description.
        #[must_use]
        pub fn with_description(mut self, description: &str) -> Self {
            self.meta.description = description.to_string();
            self
        }

        /// Set the editor group.
        #[must_use]
        pub fn with_group(mut self, group: &str) -> Self {
            self.meta.group = group.to_string();
            self
        }

        /// Mark read-only.
        #[must_use]
        pub fn read_only(mut self) -> Self {
            self.meta.read_only = true;
            self
        }

        /// Include or exclude from full updates.
        #[must_use]
        pub fn with_full_update(mut self, send: bool) -> Self {
            self.meta.send_in_full_update = send;
            self
        }

        /// Include or exclude from partial updates.
        #[must_use]
        pub fn with_partial_update(mut self, send: bool) -> Self {
            self.meta.send_in_partial_update = send;
            self
        }

        /// Wrap in a shared handle.
        #[must_use]
        pub fn into_ptr(self) -> PropertyPtr {
            Rc::new(self)
        }
    };
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

/// Property with a stored value.
#[derive(Debug)]
pub struct GenericProperty {
    meta: PropertyMeta,
    value: RefCell<PropertyValue>,
    allowed: Option<Vec<String>>,
}

impl GenericProperty {
    /// Property holding `initial`; its data type is taken from the value.
    #[must_use]
    pub fn new(name: &str, initial: PropertyValue) -> Self {
        Self {
            meta: PropertyMeta::new(name, initial.data_type()),
            value: RefCell::new(initial),
            allowed: None,
        }
    }

    /// Enumeration property restricted to `options`.
    #[must_use]
    pub fn enumeration(name: &str, options: &[&str], initial: &str) -> Self {
        Self {
            meta: PropertyMeta::new(name, DataType::Enumeration),
            value: RefCell::new(PropertyValue::Enumeration(initial.to_string())),
            allowed: Some(options.iter().map(|o| (*o).to_string()).collect()),
        }
    }

    meta_builders!();
}

impl ActorProperty for GenericProperty {
    fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    fn value(&self) -> PropertyValue {
        self.value.borrow().clone()
    }

    fn set_value(&self, value: PropertyValue) -> Result<()> {
        self.meta.check_assignable(&value)?;
        if let (Some(allowed), PropertyValue::Enumeration(v)) = (&self.allowed, &value) {
            if !allowed.iter().any(|a| a == v) {
                return Err(CoreError::InvalidEnumValue {
                    property: self.meta.name.clone(),
                    value: v.clone(),
                });
            }
        }
        *self.value.borrow_mut() = value;
        Ok(())
    }
}

type Getter = Box<dyn Fn() -> PropertyValue>;
type Setter = Box<dyn Fn(PropertyValue) -> Result<()>>;

/// Property backed by accessor closures; read-only when it has no setter.
pub struct FunctorProperty {
    meta: PropertyMeta,
    getter: Getter,
    setter: Option<Setter>,
}

impl FunctorProperty {
    /// Read-write property.
    #[must_use]
    pub fn new(
        name: &str,
        data_type: DataType,
        getter: impl Fn() -> PropertyValue + 'static,
        setter: impl Fn(PropertyValue) -> Result<()> + 'static,
    ) -> Self {
        Self {
            meta: PropertyMeta::new(name, data_type),
            getter: Box::new(getter),
            setter: Some(Box::new(setter)),
        }
    }

    /// Read-only property.
    #[must_use]
    pub fn getter_only(name: &str, data_type: DataType, getter: impl Fn() -> PropertyValue + 'static) -> Self {
        let mut meta = PropertyMeta::new(name, data_type);
        meta.read_only = true;
        Self {
            meta,
            getter: Box::new(getter),
            setter: None,
        }
    }

    meta_builders!();
}

impl fmt::Debug for FunctorProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctorProperty")
            .field("meta", &self.meta)
            .field("has_setter", &self.setter.is_some())
            .finish_non_exhaustive()
    }
}

impl ActorProperty for FunctorProperty {
    fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    fn value(&self) -> PropertyValue {
        (self.getter)()
    }

    fn set_value(&self, value: PropertyValue) -> Result<()> {
        self.meta.check_assignable(&value)?;
        match &self.setter {
            Some(setter) => setter(value),
            None => Err(CoreError::ReadOnlyProperty(self.meta.name.clone())),
        }
    }
}

/// Actor reference stored as an id.
#[derive(Debug)]
pub struct ActorIdActorProperty {
    meta: PropertyMeta,
    desired_class: String,
    actor_id: Cell<UniqueId>,
}

impl ActorIdActorProperty {
    /// Empty reference; `desired_class` names the class the target should be.
    #[must_use]
    pub fn new(name: &str, desired_class: &str) -> Self {
        Self {
            meta: PropertyMeta::new(name, DataType::Actor),
            desired_class: desired_class.to_string(),
            actor_id: Cell::new(UniqueId::null()),
        }
    }

    /// Class name the referenced actor is expected to be an instance of.
    #[must_use]
    pub fn desired_class(&self) -> &str {
        &self.desired_class
    }

    /// Referenced id; null when empty.
    #[must_use]
    pub fn actor_id(&self) -> UniqueId {
        self.actor_id.get()
    }

    /// Replace the referenced id.
    pub fn set_actor_id(&self, id: UniqueId) {
        self.actor_id.set(id);
    }

    meta_builders!();
}

impl ActorProperty for ActorIdActorProperty {
    fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    fn value(&self) -> PropertyValue {
        PropertyValue::Actor(self.actor_id.get())
    }

    fn set_value(&self, value: PropertyValue) -> Result<()> {
        self.meta.check_assignable(&value)?;
        if let PropertyValue::Actor(id) = value {
            self.actor_id.set(id);
        }
        Ok(())
    }

    fn as_actor_id_reference(&self) -> Option<&ActorIdActorProperty> {
        Some(self)
    }
}

/// Actor reference stored as a (weak) handle to the target actor.
#[derive(Debug)]
pub struct ActorActorProperty {
    meta: PropertyMeta,
    desired_class: String,
    target: RefCell<Option<WeakActor>>,
    target_id: Cell<UniqueId>,
}

impl ActorActorProperty {
    /// Empty reference; `desired_class` names the class the target should be.
    #[must_use]
    pub fn new(name: &str, desired_class: &str) -> Self {
        Self {
            meta: PropertyMeta::new(name, DataType::Actor),
            desired_class: desired_class.to_string(),
            target: RefCell::new(None),
            target_id: Cell::new(UniqueId::null()),
        }
    }

    /// Class name the referenced actor is expected to be an instance of.
    #[must_use]
    pub fn desired_class(&self) -> &str {
        &self.desired_class
    }

    /// Referenced actor, if set and still alive.
    #[must_use]
    pub fn target(&self) -> Option<ActorPtr> {
        self.target.borrow().as_ref().and_then(std::rc::Weak::upgrade)
    }

    /// Point at `actor`, or clear with `None`.
    ///
    /// If `actor` is mutably borrowed its id cannot be read; the cached id
    /// is kept when the target is unchanged. Use
    /// [`ActorActorProperty::set_target_with_id`] when the id is known.
    pub fn set_target(&self, actor: Option<&ActorPtr>) {
        match actor {
            Some(actor) => {
                let id = match actor.try_borrow() {
                    Ok(a) => a.id(),
                    Err(_) if self.refers_to(actor) => self.target_id.get(),
                    Err(_) => {
                        warn!(property = self.name(), "Actor reference target is busy, its id is not cached yet");
                        UniqueId::null()
                    }
                };
                self.set_target_with_id(actor, id);
            }
            None => {
                self.target_id.set(UniqueId::null());
                *self.target.borrow_mut() = None;
            }
        }
    }

    /// Point at `actor`, whose id is `id`. Does not borrow `actor`.
    pub fn set_target_with_id(&self, actor: &ActorPtr, id: UniqueId) {
        self.target_id.set(id);
        *self.target.borrow_mut() = Some(Rc::downgrade(actor));
    }

    /// Whether this property points at exactly `actor`.
    #[must_use]
    pub fn refers_to(&self, actor: &ActorPtr) -> bool {
        self.target
            .borrow()
            .as_ref()
            .is_some_and(|weak| std::ptr::addr_eq(weak.as_ptr(), Rc::as_ptr(actor)))
    }

    meta_builders!();
}

impl ActorProperty for ActorActorProperty {
    fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    fn value(&self) -> PropertyValue {
        match self.target() {
            Some(actor) => {
                let id = actor.try_borrow().map_or_else(|_| self.target_id.get(), |a| a.id());
                PropertyValue::Actor(id)
            }
            None => PropertyValue::Actor(UniqueId::null()),
        }
    }

    fn set_value(&self, value: PropertyValue) -> Result<()> {
        self.meta.check_assignable(&value)?;
        match value {
            PropertyValue::Actor(id) if id.is_null() => {
                self.set_target(None);
                Ok(())
            }
            PropertyValue::Actor(id) if id == self.target_id.get() && self.target().is_some() => Ok(()),
            PropertyValue::Actor(id) => Err(CoreError::UnresolvedActorReference(id)),
            _ => Ok(()),
        }
    }

    fn copy_from(&self, source: &dyn ActorProperty) -> Result<()> {
        let value = source.value();
        let Some(reference) = source.as_actor_reference() else {
            return self.set_value(value);
        };
        self.meta.check_assignable(&value)?;
        match (reference.target(), value.as_id()) {
            (Some(target), Some(id)) => self.set_target_with_id(&target, id),
            _ => self.set_target(None),
        }
        Ok(())
    }

    fn as_actor_reference(&self) -> Option<&ActorActorProperty> {
        Some(self)
    }
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// Ordered set of properties with unique names.
#[derive(Debug, Clone, Default)]
pub struct PropertyContainer {
    properties: Vec<PropertyPtr>,
    deprecated: BTreeMap<String, String>,
}

impl PropertyContainer {
    /// An empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property. A duplicate name is logged and refused.
    pub fn add_property(&mut self, property: PropertyPtr) -> bool {
        if self.has_property(property.name()) {
            error!(property = property.name(), "Property already exists in container, ignoring");
            return false;
        }
        self.properties.push(property);
        true
    }

    /// Remove by name.
    pub fn remove_property(&mut self, name: &str) -> Option<PropertyPtr> {
        let index = self.properties.iter().position(|p| p.name() == name)?;
        Some(self.properties.remove(index))
    }

    /// Remove `property` only if the container holds this very instance.
    pub fn remove_property_instance(&mut self, property: &PropertyPtr) -> bool {
        let before = self.properties.len();
        self.properties.retain(|p| !Rc::ptr_eq(p, property));
        self.properties.len() != before
    }

    /// Look up by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<PropertyPtr> {
        self.properties.iter().find(|p| p.name() == name).cloned()
    }

    /// Whether a property with `name` exists.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name() == name)
    }

    /// Properties in insertion order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyPtr] {
        &self.properties
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the container is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Map an old property name onto a current one.
    pub fn add_deprecated_alias(&mut self, old_name: &str, current_name: &str) {
        self.deprecated.insert(old_name.to_string(), current_name.to_string());
    }

    /// Resolve a property that was renamed.
    #[must_use]
    pub fn deprecated_property(&self, old_name: &str) -> Option<PropertyPtr> {
        self.deprecated.get(old_name).and_then(|current| self.property(current))
    }

    /// Copy values of same-named, writable properties from `other`.
    ///
    /// Returns the number of values copied; failures are logged.
    pub fn copy_properties_from(&self, other: &PropertyContainer) -> usize {
        let mut copied = 0;
        for source in &other.properties {
            let Some(dest) = self.property(source.name()) else {
                continue;
            };
            if dest.is_read_only() || Rc::ptr_eq(&dest, source) {
                continue;
            }
            match dest.copy_from(source.as_ref()) {
                Ok(()) => copied += 1,
                Err(e) => warn!(property = source.name(), error = %e, "Failed to copy property value"),
            }
        }
        copied
    }
}
