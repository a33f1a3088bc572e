//! Shared helpers for the game-layer integration tests.

#![allow(dead_code)]

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::Registry;

/// Records every event's level and message while a closure runs.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<(Level, String)>>>,
}

impl LogCapture {
    /// Run `f` with a capturing subscriber installed on this thread.
    pub fn run<R>(f: impl FnOnce() -> R) -> (R, Self) {
        let capture = Self::default();
        let subscriber = Registry::default().with(capture.clone());
        let out = tracing::subscriber::with_default(subscriber, f);
        (out, capture)
    }

    /// Messages logged at `level` containing `needle`.
    pub fn count(&self, level: Level, needle: &str) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, m)| *l == level && m.contains(needle))
            .count()
    }

    /// Every message logged at `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        self.records.lock().unwrap().push((*event.metadata().level(), message));
    }
}
