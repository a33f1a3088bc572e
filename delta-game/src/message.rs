//! Messages exchanged between actors and the game manager.
//!
//! Every message has a type, a sending and an "about" actor id, a
//! simulation timestamp and a payload. Actor updates carry a list of named,
//! typed parameters snapshotted from actor properties. Messages encode to
//! JSON for transport and logging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use delta_core::property::{ActorProperty, DataType, PropertyValue};
use delta_core::types::UniqueId;
use delta_core::CoreError;

use crate::error::Result;

// ---------------------------------------------------------------------------
// Message types
// ---------------------------------------------------------------------------

/// Kind of a message; handlers register against these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Per-frame tick for local actors.
    TickLocal,
    /// Per-frame tick for remote actors.
    TickRemote,
    /// End of the frame.
    TickEndOfFrame,
    /// An actor was created; carries a full actor update.
    InfoActorCreated,
    /// An actor changed; carries a full or partial actor update.
    InfoActorUpdated,
    /// An actor was deleted.
    InfoActorDeleted,
    /// An actor was published to the network.
    InfoActorPublished,
    /// A game event fired.
    InfoGameEvent,
    /// Application-defined message.
    Custom(String),
}

impl MessageType {
    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::TickLocal => "Tick Local",
            Self::TickRemote => "Tick Remote",
            Self::TickEndOfFrame => "Tick End of Frame",
            Self::InfoActorCreated => "Actor Created",
            Self::InfoActorUpdated => "Actor Updated",
            Self::InfoActorDeleted => "Actor Deleted",
            Self::InfoActorPublished => "Actor Published",
            Self::InfoGameEvent => "Game Event",
            Self::Custom(name) => name,
        }
    }

    /// Whether messages of this type carry an actor update.
    #[must_use]
    pub fn is_actor_update(&self) -> bool {
        matches!(self, Self::InfoActorCreated | Self::InfoActorUpdated)
    }

    /// Whether messages of this type carry tick data.
    #[must_use]
    pub fn is_tick(&self) -> bool {
        matches!(self, Self::TickLocal | Self::TickRemote | Self::TickEndOfFrame)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// When a message was created, in simulation and wall-clock terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimTimestamp {
    /// Simulation frame number.
    pub tick: u64,
    /// Simulation time in seconds.
    pub sim_time: f64,
    /// Wall-clock time.
    pub real_time: DateTime<Utc>,
}

impl SimTimestamp {
    /// Timestamp for `tick` at the current wall-clock time.
    #[must_use]
    pub fn now(tick: u64, sim_time: f64) -> Self {
        Self {
            tick,
            sim_time,
            real_time: Utc::now(),
        }
    }
}

/// Frame timing carried by tick messages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickData {
    /// Simulated seconds since the last frame.
    pub delta_sim_time: f32,
    /// Real seconds since the last frame.
    pub delta_real_time: f32,
    /// Simulation time scale.
    pub sim_time_scale: f32,
}

impl Default for TickData {
    fn default() -> Self {
        Self {
            delta_sim_time: 0.0,
            delta_real_time: 0.0,
            sim_time_scale: 1.0,
        }
    }
}

/// One named, typed value in an actor update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateParameter {
    /// Property name.
    pub name: String,
    /// Declared data type.
    pub data_type: DataType,
    /// Value snapshot.
    pub value: PropertyValue,
}

impl UpdateParameter {
    /// Parameter holding `value`.
    #[must_use]
    pub fn new(name: &str, value: PropertyValue) -> Self {
        Self {
            name: name.to_string(),
            data_type: value.data_type(),
            value,
        }
    }

    /// Snapshot a property's current value.
    ///
    /// # Errors
    /// Fails when the property reports a value of a different type than it declares.
    pub fn from_property(property: &dyn ActorProperty) -> std::result::Result<Self, CoreError> {
        let value = property.value();
        if value.data_type() != property.data_type() {
            return Err(CoreError::TypeMismatch {
                property: property.name().to_string(),
                expected: property.data_type(),
                found: value.data_type(),
            });
        }
        Ok(Self {
            name: property.name().to_string(),
            data_type: property.data_type(),
            value,
        })
    }

    /// Assign this value to `property`.
    ///
    /// # Errors
    /// Propagates the property's assignment error.
    pub fn apply_to(&self, property: &dyn ActorProperty) -> std::result::Result<(), CoreError> {
        property.set_value(self.value.clone())
    }
}

/// State snapshot of one actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorUpdateMessage {
    /// Actor name.
    pub name: String,
    /// Actor type name.
    pub actor_type_name: String,
    /// Actor type category.
    pub actor_type_category: String,
    /// Prototype the actor was created from.
    pub prototype_id: Option<UniqueId>,
    /// Name of that prototype.
    pub prototype_name: String,
    /// Parent actor; a null id means "no parent".
    pub parent_id: Option<UniqueId>,
    /// Whether only some properties are included.
    pub partial: bool,
    /// Snapshotted property values; prefer `add_update_parameter`, which replaces by name.
    pub parameters: Vec<UpdateParameter>,
}

impl ActorUpdateMessage {
    /// Add a parameter, replacing any with the same name.
    pub fn add_update_parameter(&mut self, parameter: UpdateParameter) {
        match self.parameters.iter_mut().find(|p| p.name == parameter.name) {
            Some(existing) => *existing = parameter,
            None => self.parameters.push(parameter),
        }
    }

    /// Parameter by name.
    #[must_use]
    pub fn update_parameter(&self, name: &str) -> Option<&UpdateParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Parameters in insertion order.
    #[must_use]
    pub fn update_parameters(&self) -> &[UpdateParameter] {
        &self.parameters
    }
}

/// Message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessagePayload {
    /// No body.
    Empty,
    /// Frame timing.
    Tick(TickData),
    /// Actor state.
    ActorUpdate(ActorUpdateMessage),
    /// A fired game event.
    GameEvent {
        /// Event id.
        event_id: UniqueId,
    },
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A routed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    message_type: MessageType,
    sending_actor_id: UniqueId,
    about_actor_id: UniqueId,
    timestamp: SimTimestamp,
    payload: MessagePayload,
}

impl Message {
    /// Message of `message_type` with null ids and the payload its type implies.
    #[must_use]
    pub fn new(message_type: MessageType) -> Self {
        let payload = if message_type.is_actor_update() {
            MessagePayload::ActorUpdate(ActorUpdateMessage::default())
        } else if message_type.is_tick() {
            MessagePayload::Tick(TickData::default())
        } else {
            MessagePayload::Empty
        };
        Self {
            message_type,
            sending_actor_id: UniqueId::null(),
            about_actor_id: UniqueId::null(),
            timestamp: SimTimestamp::now(0, 0.0),
            payload,
        }
    }

    /// Tick message with `data`.
    #[must_use]
    pub fn tick(message_type: MessageType, data: TickData) -> Self {
        let mut message = Self::new(message_type);
        message.payload = MessagePayload::Tick(data);
        message
    }

    /// Game-event message.
    #[must_use]
    pub fn game_event(event_id: UniqueId) -> Self {
        let mut message = Self::new(MessageType::InfoGameEvent);
        message.payload = MessagePayload::GameEvent { event_id };
        message
    }

    /// Message type.
    #[must_use]
    pub fn message_type(&self) -> &MessageType {
        &self.message_type
    }

    /// Actor that sent the message.
    #[must_use]
    pub fn sending_actor_id(&self) -> UniqueId {
        self.sending_actor_id
    }

    /// Set the sending actor.
    pub fn set_sending_actor_id(&mut self, id: UniqueId) {
        self.sending_actor_id = id;
    }

    /// Actor the message is about.
    #[must_use]
    pub fn about_actor_id(&self) -> UniqueId {
        self.about_actor_id
    }

    /// Set the actor the message is about.
    pub fn set_about_actor_id(&mut self, id: UniqueId) {
        self.about_actor_id = id;
    }

    /// Creation time.
    #[must_use]
    pub fn timestamp(&self) -> &SimTimestamp {
        &self.timestamp
    }

    /// Replace the creation time.
    pub fn set_timestamp(&mut self, timestamp: SimTimestamp) {
        self.timestamp = timestamp;
    }

    /// Body.
    #[must_use]
    pub fn payload(&self) -> &MessagePayload {
        &self.payload
    }

    /// Actor update body, if this message carries one.
    #[must_use]
    pub fn actor_update(&self) -> Option<&ActorUpdateMessage> {
        match &self.payload {
            MessagePayload::ActorUpdate(update) => Some(update),
            _ => None,
        }
    }

    /// Mutable actor update body.
    pub fn actor_update_mut(&mut self) -> Option<&mut ActorUpdateMessage> {
        match &mut self.payload {
            MessagePayload::ActorUpdate(update) => Some(update),
            _ => None,
        }
    }

    /// Replace the body with an actor update.
    pub fn set_actor_update(&mut self, update: ActorUpdateMessage) {
        self.payload = MessagePayload::ActorUpdate(update);
    }

    /// Tick body, if this message carries one.
    #[must_use]
    pub fn tick_data(&self) -> Option<&TickData> {
        match &self.payload {
            MessagePayload::Tick(data) => Some(data),
            _ => None,
        }
    }

    /// Encode as JSON.
    ///
    /// # Errors
    /// Returns `GameError::Codec` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    ///
    /// # Errors
    /// Returns `GameError::Codec` if the text is not a valid message.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
