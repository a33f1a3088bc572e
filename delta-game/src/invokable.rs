//! Named callables bound to an actor and invoked on message dispatch.

use std::fmt;
use std::rc::Rc;

use crate::message::Message;

/// Name of the default invokable that forwards messages to the game actor.
pub const PROCESS_MESSAGE_INVOKABLE: &str = "Process Message";
/// Name of the default local tick invokable.
pub const TICK_LOCAL_INVOKABLE: &str = "Tick Local";
/// Name of the default remote tick invokable.
pub const TICK_REMOTE_INVOKABLE: &str = "Tick Remote";

type Handler = Rc<dyn Fn(&Message)>;

/// A named message handler.
#[derive(Clone)]
pub struct Invokable {
    name: String,
    handler: Handler,
}

impl Invokable {
    /// Bind `handler` under `name`.
    pub fn new(name: &str, handler: impl Fn(&Message) + 'static) -> Self {
        Self {
            name: name.to_string(),
            handler: Rc::new(handler),
        }
    }

    /// Invokable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the handler.
    pub fn invoke(&self, message: &Message) {
        (self.handler)(message);
    }
}

impl fmt::Debug for Invokable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invokable").field("name", &self.name).finish_non_exhaustive()
    }
}
