//! The simulation-side object a [`GameActorProxy`](crate::proxy::GameActorProxy) wraps.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::component::ActorComponent;
use crate::message::Message;

/// Shared handle to a game actor.
pub type GameActorDrawable = Rc<RefCell<dyn GameActor>>;

/// Behaviour hooks of a game actor. Every hook defaults to a no-op.
pub trait GameActor: fmt::Debug {
    /// The actor entered the world.
    fn on_entered_world(&mut self) {}

    /// The actor left the world.
    fn on_removed_from_world(&mut self) {}

    /// Local tick.
    fn on_tick_local(&mut self, _tick: &Message) {}

    /// Remote tick.
    fn on_tick_remote(&mut self, _tick: &Message) {}

    /// Generic message handler.
    fn process_message(&mut self, _message: &Message) {}

    /// Components the proxy attaches when it is initialised.
    fn default_components(&self) -> Vec<Box<dyn ActorComponent>> {
        Vec::new()
    }
}
