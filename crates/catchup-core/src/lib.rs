//! Catchup Core - Deterministic fixed-step engine with offline catch-up
//!
//! This crate provides the simulation core for incremental/idle systems:
//! - `Engine` - owns one state and drives a caller-supplied `Reducer`
//! - `Action` - the built-in `Tick` step plus caller-defined actions
//! - `EngineConfig` - step size and catch-up bounds, validated up front
//! - `Clock` - where "now" comes from (`SystemClock`, `ManualClock`)
//! - `Session` - an engine kept in step with its last-observed timestamp
//!
//! ## Offline catch-up
//!
//! Given the last time the state was brought up to date and the current
//! time, [`Engine::apply_offline`] replays the gap as whole fixed-size ticks,
//! clamped to `max_offline_ms`, capped at `max_ticks_total`, and applied in
//! chunks of `max_ticks_per_chunk`. The result is the same state live
//! ticking would have produced for the same number of ticks.
//!
//! ```
//! use catchup_core::{Action, Engine, EngineConfig};
//!
//! let config = EngineConfig::new(1_000, 4_000, 2, 10).unwrap();
//! let reducer = |gold: &i64, action: &Action<()>| match action {
//!     Action::Tick(_) => gold + 1,
//!     Action::Custom(()) => *gold,
//! };
//! let mut engine: Engine<i64, (), _> = Engine::new(config, reducer, 0);
//!
//! let result = engine.apply_offline(0, 10_000);
//! assert_eq!(result.clamped_delta_ms, 4_000);
//! assert_eq!(result.ticks_applied, 2);
//! assert!(result.was_clamped && result.was_capped);
//! assert_eq!(result.state, 2);
//! ```

mod action;
mod clock;
mod config;
mod delta;
mod engine;
mod error;
mod event;
mod reducer;
mod result;
mod session;

pub use action::Action;
pub use clock::{Clock, ManualClock, SystemClock, TimestampMs};
pub use config::EngineConfig;
pub use delta::{numeric_delta, DeltaFn, ResourceDelta};
pub use engine::Engine;
pub use error::{Error, Result};
pub use event::{Event, EventSink};
pub use reducer::Reducer;
pub use result::{ChunkProgress, OfflineResult, TickResult};
pub use session::Session;
