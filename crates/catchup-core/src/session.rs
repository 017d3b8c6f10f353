//! An engine paired with its last-observed timestamp
//!
//! Catching up through a [`Session`] keeps the baseline timestamp in step
//! with the state: the baseline only moves by the time that was actually
//! applied, so time lost to clamping, capping or a partial tick is carried
//! into the next catch-up instead of being dropped.

use crate::{ChunkProgress, Clock, Engine, OfflineResult, Reducer, TickResult, TimestampMs};
use tracing::debug;

/// An [`Engine`] with a tracked last-observed timestamp and a [`Clock`]
#[derive(Debug)]
pub struct Session<S, A, R, C> {
    engine: Engine<S, A, R>,
    clock: C,
    last_observed_ms: TimestampMs,
}

impl<S, A, R, C> Session<S, A, R, C>
where
    S: Clone,
    R: Reducer<S, A>,
    C: Clock,
{
    /// Resume a session whose state was last brought up to date at `last_observed_ms`
    pub fn new(engine: Engine<S, A, R>, clock: C, last_observed_ms: TimestampMs) -> Self {
        Self {
            engine,
            clock,
            last_observed_ms,
        }
    }

    /// Start a fresh session observed at the clock's current time
    pub fn start(engine: Engine<S, A, R>, clock: C) -> Self {
        let now = clock.now_ms();
        Self::new(engine, clock, now)
    }

    /// Catch up to the clock's current time
    pub fn apply_offline(&mut self) -> OfflineResult<S> {
        let now = self.clock.now_ms();
        self.apply_offline_at(now)
    }

    /// Catch up to an explicit timestamp
    pub fn apply_offline_at(&mut self, now_ms: TimestampMs) -> OfflineResult<S> {
        self.apply_offline_at_with(now_ms, |_| {})
    }

    /// Catch up to an explicit timestamp, reporting after each chunk
    pub fn apply_offline_at_with<F>(
        &mut self,
        now_ms: TimestampMs,
        on_chunk: F,
    ) -> OfflineResult<S>
    where
        F: FnMut(&ChunkProgress),
    {
        let result = self
            .engine
            .apply_offline_with(self.last_observed_ms, now_ms, on_chunk);
        let next = result.next_last_observed(self.last_observed_ms);
        debug!(
            from = self.last_observed_ms,
            to = next,
            unapplied_ms = result.unapplied_delta_ms(),
            "session baseline advanced"
        );
        self.last_observed_ms = next;
        result
    }

    /// Apply one caller-defined action; the baseline is not touched
    pub fn dispatch(&mut self, action: A) -> TickResult<S> {
        self.engine.dispatch(action)
    }

    /// Current state
    pub fn state(&self) -> &S {
        self.engine.state()
    }

    /// Timestamp the state is up to date with
    pub fn last_observed_ms(&self) -> TimestampMs {
        self.last_observed_ms
    }

    /// The wrapped engine
    pub fn engine(&self) -> &Engine<S, A, R> {
        &self.engine
    }

    /// The session's clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable access to the clock, e.g. to move a [`ManualClock`](crate::ManualClock)
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Split into engine, clock and baseline
    pub fn into_parts(self) -> (Engine<S, A, R>, C, TimestampMs) {
        (self.engine, self.clock, self.last_observed_ms)
    }
}
