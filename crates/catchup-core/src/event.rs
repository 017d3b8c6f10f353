//! Side-channel events collected while reducing
//!
//! Reducers stay `(state, action) -> state`. A reducer that wants to report
//! something (a milestone, an achievement) captures a clone of an
//! [`EventSink`] and pushes into it; the engine drains the sink after every
//! operation and hands the events back in the result.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// A notable occurrence reported by a reducer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// What happened
    pub kind: String,
    /// Event parameters
    pub payload: IndexMap<String, Value>,
}

impl Event {
    /// Create an event with no payload
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: IndexMap::new(),
        }
    }

    /// Add a payload entry
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Get a payload entry
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}

/// Shared append/drain buffer of [`Event`]s
///
/// Clones share the same buffer. The sink is single-threaded; it is meant
/// to be handed to a reducer closure and to the engine that drives it.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    buffer: Rc<RefCell<Vec<Event>>>,
}

impl EventSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&self, event: Event) {
        self.buffer.borrow_mut().push(event);
    }

    /// Take every buffered event, oldest first
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.buffer.borrow_mut())
    }

    /// Number of buffered events
    pub fn len(&self) -> usize {
        self.buffer.borrow().len()
    }

    /// Check if nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.buffer.borrow().is_empty()
    }
}
