//! Actions consumed by a reducer

use serde::{Deserialize, Serialize};

/// An input to the reducer
///
/// `Tick` is the only variant the engine understands. Everything else is a
/// caller-defined action carried opaquely in `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action<A> {
    /// Advance the simulation by one fixed step of `dt_ms` milliseconds
    Tick(u64),
    /// Caller-defined action
    Custom(A),
}

impl<A> Action<A> {
    /// Check if this is a tick
    pub fn is_tick(&self) -> bool {
        matches!(self, Action::Tick(_))
    }

    /// Step size of a tick, if this is one
    pub fn tick_dt_ms(&self) -> Option<u64> {
        match self {
            Action::Tick(dt_ms) => Some(*dt_ms),
            Action::Custom(_) => None,
        }
    }

    /// The caller-defined payload, if this is not a tick
    pub fn custom(&self) -> Option<&A> {
        match self {
            Action::Tick(_) => None,
            Action::Custom(action) => Some(action),
        }
    }
}

impl<A> From<A> for Action<A> {
    fn from(action: A) -> Self {
        Action::Custom(action)
    }
}
