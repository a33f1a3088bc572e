//! The game manager capability and a single-threaded in-process implementation.
//!
//! Proxies reach their manager through [`GameManager`] only, holding a
//! non-owning link. [`LocalGameManager`] keeps live proxies by id, queues
//! outbound messages FIFO and dispatches them on
//! [`process_messages`](LocalGameManager::process_messages).

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::{Rc, Weak};

use tracing::{debug, error, info, warn};

use delta_core::actor::{ActorPtr, BaseActorObject};
use delta_core::types::UniqueId;

use crate::error::{GameError, Result};
use crate::invokable::Invokable;
use crate::message::{Message, MessageType, SimTimestamp, TickData};
use crate::proxy::GameActorProxyPtr;

/// What a game actor proxy needs from its game manager.
pub trait GameManager {
    /// Queue a message for dispatch.
    fn send_message(&self, message: Message);

    /// Live game actor by id.
    fn find_game_actor_by_id(&self, id: UniqueId) -> Option<ActorPtr>;

    /// Route every `message_type` message to `listener`'s `invokable`.
    fn register_for_messages(&self, message_type: &MessageType, listener: UniqueId, invokable: &str);

    /// Route `message_type` messages about `about` to `listener`'s `invokable`.
    fn register_for_messages_about_actor(
        &self,
        message_type: &MessageType,
        about: UniqueId,
        listener: UniqueId,
        invokable: &str,
    );

    /// Undo [`register_for_messages`](Self::register_for_messages). Unknown entries are ignored.
    fn unregister_for_messages(&self, message_type: &MessageType, listener: UniqueId, invokable: &str);

    /// Undo [`register_for_messages_about_actor`](Self::register_for_messages_about_actor).
    fn unregister_for_messages_about_actor(
        &self,
        message_type: &MessageType,
        about: UniqueId,
        listener: UniqueId,
        invokable: &str,
    );

    /// Remove an actor from the simulation.
    fn delete_actor(&self, id: UniqueId);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Registration {
    message_type: MessageType,
    about: Option<UniqueId>,
    listener: UniqueId,
    invokable: String,
}

/// Single-threaded game manager with a FIFO message queue.
#[derive(Debug)]
pub struct LocalGameManager {
    self_ref: Weak<LocalGameManager>,
    actors: RefCell<BTreeMap<UniqueId, GameActorProxyPtr>>,
    queue: RefCell<VecDeque<Message>>,
    registrations: RefCell<Vec<Registration>>,
    tick: Cell<u64>,
    sim_time: Cell<f64>,
}

impl LocalGameManager {
    /// New, empty manager.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|weak| Self {
            self_ref: weak.clone(),
            actors: RefCell::new(BTreeMap::new()),
            queue: RefCell::new(VecDeque::new()),
            registrations: RefCell::new(Vec::new()),
            tick: Cell::new(0),
            sim_time: Cell::new(0.0),
        })
    }

    fn as_dyn(&self) -> Option<Rc<dyn GameManager>> {
        self.self_ref.upgrade().map(|me| me as Rc<dyn GameManager>)
    }

    /// Attach `proxy`: link it to this manager, flag it in-GM, fire world
    /// entry, queue an actor-created message (local actors only) and
    /// optionally publish it.
    ///
    /// # Errors
    /// Returns `GameError::InvalidActorState` if an actor with the same id is
    /// already attached, the proxy is busy, or a remote actor is published.
    pub fn add_actor(&self, proxy: &GameActorProxyPtr, publish: bool) -> Result<()> {
        let Ok(mut p) = proxy.try_borrow_mut() else {
            return Err(GameError::InvalidActorState("proxy is busy".to_string()));
        };
        let id = p.id();
        if publish && p.is_remote() {
            return Err(GameError::InvalidActorState(format!("remote actor {id} cannot be published")));
        }
        if self.actors.borrow().contains_key(&id) {
            return Err(GameError::InvalidActorState(format!(
                "actor {id} is already in the game manager"
            )));
        }

        p.set_game_manager(self.as_dyn().as_ref());
        p.set_is_in_gm(true);
        self.actors.borrow_mut().insert(id, proxy.clone());
        p.invoke_entered_world();

        if !p.is_remote() {
            let mut created = Message::new(MessageType::InfoActorCreated);
            p.populate_actor_update(&mut created, &[]);
            self.send_message(created);
        }

        if publish {
            p.set_published(true);
            let mut published = Message::new(MessageType::InfoActorPublished);
            published.set_sending_actor_id(id);
            published.set_about_actor_id(id);
            self.send_message(published);
        }
        info!(actor = p.name(), %id, publish, "Actor added to game manager");
        Ok(())
    }

    /// Attached proxy by id.
    #[must_use]
    pub fn game_actor(&self, id: UniqueId) -> Option<GameActorProxyPtr> {
        self.actors.borrow().get(&id).cloned()
    }

    /// Number of attached actors.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.actors.borrow().len()
    }

    /// Messages waiting for dispatch, oldest first.
    #[must_use]
    pub fn pending_messages(&self) -> Vec<Message> {
        self.queue.borrow().iter().cloned().collect()
    }

    /// Current simulation frame.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick.get()
    }

    /// Advance simulation time by `delta_seconds` and queue local and remote ticks.
    pub fn send_tick(&self, delta_seconds: f32) {
        self.tick.set(self.tick.get() + 1);
        self.sim_time.set(self.sim_time.get() + f64::from(delta_seconds));
        let data = TickData {
            delta_sim_time: delta_seconds,
            delta_real_time: delta_seconds,
            sim_time_scale: 1.0,
        };
        self.send_message(Message::tick(MessageType::TickLocal, data));
        self.send_message(Message::tick(MessageType::TickRemote, data));
    }

    /// Dispatch queued messages until the queue is empty, including messages
    /// queued by handlers along the way. Returns the number dispatched.
    pub fn process_messages(&self) -> usize {
        let mut dispatched = 0;
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(message) = next else {
                break;
            };
            self.dispatch(&message);
            dispatched += 1;
        }
        dispatched
    }

    fn dispatch(&self, message: &Message) {
        let about = message.about_actor_id();
        let about_proxy = if about.is_null() { None } else { self.game_actor(about) };

        if let Some(proxy) = &about_proxy {
            if *message.message_type() == MessageType::InfoActorUpdated {
                if let Ok(mut p) = proxy.try_borrow_mut() {
                    if p.is_remote() {
                        p.apply_actor_update(message, false);
                    }
                }
            }
        }

        let mut handlers: Vec<Rc<Invokable>> = Vec::new();
        if let Some(proxy) = &about_proxy {
            if let Ok(p) = proxy.try_borrow() {
                handlers.extend(p.message_handlers(message.message_type()));
            }
        }

        let matching: Vec<Registration> = self
            .registrations
            .borrow()
            .iter()
            .filter(|r| &r.message_type == message.message_type())
            .filter(|r| r.about.is_none_or(|target| target == about))
            .cloned()
            .collect();
        for registration in matching {
            let Some(listener) = self.game_actor(registration.listener) else {
                continue;
            };
            let Ok(listener) = listener.try_borrow() else {
                warn!(invokable = %registration.invokable, "Listener busy, message not delivered");
                continue;
            };
            match listener.invokable(&registration.invokable) {
                Some(invokable) => handlers.push(invokable),
                None => warn!(
                    actor = listener.name(),
                    invokable = %registration.invokable,
                    "Registered invokable no longer exists"
                ),
            }
        }

        debug!(message_type = %message.message_type(), handlers = handlers.len(), "Dispatching message");
        for handler in handlers {
            handler.invoke(message);
        }
    }

    fn register(&self, registration: Registration) {
        let mut registrations = self.registrations.borrow_mut();
        if !registrations.contains(&registration) {
            registrations.push(registration);
        }
    }

    fn unregister(&self, registration: &Registration) {
        self.registrations.borrow_mut().retain(|r| r != registration);
    }
}

impl GameManager for LocalGameManager {
    fn send_message(&self, mut message: Message) {
        message.set_timestamp(SimTimestamp::now(self.tick.get(), self.sim_time.get()));
        self.queue.borrow_mut().push_back(message);
    }

    fn find_game_actor_by_id(&self, id: UniqueId) -> Option<ActorPtr> {
        self.game_actor(id).map(|p| p as ActorPtr)
    }

    fn register_for_messages(&self, message_type: &MessageType, listener: UniqueId, invokable: &str) {
        self.register(Registration {
            message_type: message_type.clone(),
            about: None,
            listener,
            invokable: invokable.to_string(),
        });
    }

    fn register_for_messages_about_actor(
        &self,
        message_type: &MessageType,
        about: UniqueId,
        listener: UniqueId,
        invokable: &str,
    ) {
        self.register(Registration {
            message_type: message_type.clone(),
            about: Some(about),
            listener,
            invokable: invokable.to_string(),
        });
    }

    fn unregister_for_messages(&self, message_type: &MessageType, listener: UniqueId, invokable: &str) {
        self.unregister(&Registration {
            message_type: message_type.clone(),
            about: None,
            listener,
            invokable: invokable.to_string(),
        });
    }

    fn unregister_for_messages_about_actor(
        &self,
        message_type: &MessageType,
        about: UniqueId,
        listener: UniqueId,
        invokable: &str,
    ) {
        self.unregister(&Registration {
            message_type: message_type.clone(),
            about: Some(about),
            listener,
            invokable: invokable.to_string(),
        });
    }

    fn delete_actor(&self, id: UniqueId) {
        let Some(proxy) = self.actors.borrow_mut().remove(&id) else {
            warn!(%id, "Delete requested for an actor not in the game manager");
            return;
        };
        self.registrations.borrow_mut().retain(|r| r.listener != id);

        let mut deleted = Message::new(MessageType::InfoActorDeleted);
        deleted.set_sending_actor_id(id);
        deleted.set_about_actor_id(id);
        self.send_message(deleted);

        match proxy.try_borrow_mut() {
            Ok(mut p) => {
                p.invoke_removed_from_world();
                p.set_is_in_gm(false);
                p.set_deleted(true);
                p.set_game_manager(None);
                info!(actor = p.name(), %id, "Actor deleted from game manager");
            }
            Err(_) => error!(%id, "Actor busy while being deleted, world exit hooks skipped"),
        }
    }
}
