//! Fixed-step engine with bounded offline catch-up

use crate::{
    Action, ChunkProgress, DeltaFn, EngineConfig, Error, EventSink, OfflineResult, Reducer,
    ResourceDelta, Result, TickResult, TimestampMs,
};
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace, warn};

/// Owns one state value and drives it through a [`Reducer`]
///
/// Every transition replaces the state with the reducer's output. The engine
/// never inspects the state or the caller's actions; it only decides how
/// many `Tick`s to feed the reducer.
pub struct Engine<S, A, R> {
    config: EngineConfig,
    reducer: R,
    state: S,
    /// Ticks applied over the engine's lifetime
    total_ticks: u64,
    resource_delta: Option<DeltaFn<S>>,
    event_sink: Option<EventSink>,
    _action: PhantomData<fn(A)>,
}

impl<S, A, R> Engine<S, A, R>
where
    S: Clone,
    R: Reducer<S, A>,
{
    /// Create an engine owning `initial_state`
    pub fn new(config: EngineConfig, reducer: R, initial_state: S) -> Self {
        Self {
            config,
            reducer,
            state: initial_state,
            total_ticks: 0,
            resource_delta: None,
            event_sink: None,
            _action: PhantomData,
        }
    }

    /// Report a resource delta with every result
    pub fn with_resource_delta<F>(mut self, summarize: F) -> Self
    where
        F: Fn(&S, &S) -> ResourceDelta + 'static,
    {
        self.resource_delta = Some(Box::new(summarize));
        self
    }

    /// Drain `sink` into every result
    pub fn with_event_sink(mut self, sink: EventSink) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Current state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Consume the engine, keeping its state
    pub fn into_state(self) -> S {
        self.state
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ticks applied since the engine was created
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Attached event sink, if any
    pub fn event_sink(&self) -> Option<&EventSink> {
        self.event_sink.as_ref()
    }

    /// Apply `count` ticks of the configured step size
    pub fn tick(&mut self, count: u64) -> TickResult<S> {
        let before = self.snapshot_for_delta();
        self.run_ticks(self.config.dt_ms(), count);
        self.finish(before, count)
    }

    /// Apply `count` ticks of `custom_dt_ms` each
    ///
    /// The configured step size is left untouched.
    pub fn step(&mut self, custom_dt_ms: u64, count: u64) -> Result<TickResult<S>> {
        if custom_dt_ms == 0 {
            return Err(Error::InvalidArgument(
                "custom step size must be positive".to_string(),
            ));
        }
        let before = self.snapshot_for_delta();
        self.run_ticks(custom_dt_ms, count);
        Ok(self.finish(before, count))
    }

    /// Apply one caller-defined action
    pub fn dispatch(&mut self, action: A) -> TickResult<S> {
        let before = self.snapshot_for_delta();
        self.apply(&Action::Custom(action));
        self.finish(before, 0)
    }

    /// Apply `actions` once each, in order
    ///
    /// Replaying the same actions against the same starting state always
    /// produces the same state. `ticks_applied` counts the `Tick` actions.
    pub fn replay<I>(&mut self, actions: I) -> TickResult<S>
    where
        I: IntoIterator<Item = Action<A>>,
    {
        let before = self.snapshot_for_delta();
        let mut ticks = 0u64;
        for action in actions {
            if action.is_tick() {
                ticks += 1;
            }
            self.apply(&action);
        }
        self.finish(before, ticks)
    }

    /// Apply as many whole ticks as fit in `delta_ms`
    ///
    /// Non-positive durations apply nothing. The sub-tick remainder is dropped.
    pub fn tick_for_duration(&mut self, delta_ms: i64) -> TickResult<S> {
        let count = if delta_ms <= 0 {
            0
        } else {
            delta_ms.unsigned_abs() / self.config.dt_ms()
        };
        self.tick(count)
    }

    /// Catch up on the time between two observations
    pub fn apply_offline(
        &mut self,
        last_observed_ms: TimestampMs,
        now_ms: TimestampMs,
    ) -> OfflineResult<S> {
        self.apply_offline_with(last_observed_ms, now_ms, |_| {})
    }

    /// Catch up on the time between two observations, reporting after each chunk
    ///
    /// 1. The requested delta `now - last` is clamped into `[0, max_offline_ms]`;
    ///    a clock that went backwards yields zero ticks.
    /// 2. The clamped delta is floored to whole ticks and capped at `max_ticks_total`.
    /// 3. Ticks are applied in chunks of at most `max_ticks_per_chunk`,
    ///    calling `on_chunk` after each one.
    ///
    /// Chunk size only changes how the work is sliced, never the final state.
    pub fn apply_offline_with<F>(
        &mut self,
        last_observed_ms: TimestampMs,
        now_ms: TimestampMs,
        mut on_chunk: F,
    ) -> OfflineResult<S>
    where
        F: FnMut(&ChunkProgress),
    {
        let dt_ms = self.config.dt_ms();
        // Validated to fit in an i64 by EngineConfig::new
        let max_offline_ms = i64::try_from(self.config.max_offline_ms()).unwrap_or(i64::MAX);

        let requested_delta_ms = now_ms.saturating_sub(last_observed_ms);
        let clamped_delta_ms = requested_delta_ms.clamp(0, max_offline_ms).unsigned_abs();
        let ticks_requested = clamped_delta_ms / dt_ms;
        let ticks_capped = ticks_requested.min(self.config.max_ticks_total());

        if requested_delta_ms < 0 {
            warn!(
                last_observed_ms,
                now_ms, requested_delta_ms, "clock moved backwards, skipping catch-up"
            );
        }

        let before = self.snapshot_for_delta();
        let per_chunk = self.config.max_ticks_per_chunk();
        let mut remaining = ticks_capped;
        let mut chunks = 0u64;
        while remaining > 0 {
            let ticks_in_chunk = remaining.min(per_chunk);
            self.run_ticks(dt_ms, ticks_in_chunk);
            remaining -= ticks_in_chunk;

            let progress = ChunkProgress {
                chunk_index: chunks,
                ticks_in_chunk,
                ticks_applied: ticks_capped - remaining,
                ticks_total: ticks_capped,
            };
            trace!(
                chunk = progress.chunk_index,
                ticks = ticks_in_chunk,
                applied = progress.ticks_applied,
                total = ticks_capped,
                "applied offline chunk"
            );
            on_chunk(&progress);
            chunks += 1;
        }

        let ticks_applied = ticks_capped;
        let applied_delta_ms = ticks_applied * dt_ms;
        let was_clamped = requested_delta_ms != clamped_delta_ms as i64;
        let was_capped = ticks_requested != ticks_capped;

        if was_capped {
            debug!(
                ticks_requested,
                ticks_capped, "offline ticks capped by max_ticks_total"
            );
        }
        debug!(
            requested_delta_ms,
            clamped_delta_ms,
            ticks_applied,
            chunks,
            applied_delta_ms,
            was_clamped,
            was_capped,
            "offline catch-up finished"
        );

        let TickResult {
            state,
            resources_delta,
            events,
            ..
        } = self.finish(before, ticks_applied);

        OfflineResult {
            state,
            ticks_applied,
            chunks,
            dt_ms,
            requested_delta_ms,
            clamped_delta_ms,
            ticks_requested,
            ticks_capped,
            applied_delta_ms,
            was_clamped,
            was_capped,
            resources_delta,
            events,
        }
    }

    /// Feed one action to the reducer and replace the state
    fn apply(&mut self, action: &Action<A>) {
        self.state = self.reducer.reduce(&self.state, action);
        if action.is_tick() {
            self.total_ticks += 1;
        }
    }

    fn run_ticks(&mut self, dt_ms: u64, count: u64) {
        let tick = Action::Tick(dt_ms);
        for _ in 0..count {
            self.apply(&tick);
        }
    }

    /// Copy of the current state, only kept when a summarizer needs it
    fn snapshot_for_delta(&self) -> Option<S> {
        self.resource_delta.as_ref().map(|_| self.state.clone())
    }

    fn finish(&self, before: Option<S>, ticks_applied: u64) -> TickResult<S> {
        let resources_delta = match (&self.resource_delta, before) {
            (Some(summarize), Some(before)) => summarize(&before, &self.state),
            _ => ResourceDelta::new(),
        };
        let events = self
            .event_sink
            .as_ref()
            .map(EventSink::drain)
            .unwrap_or_default();

        TickResult {
            state: self.state.clone(),
            ticks_applied,
            resources_delta,
            events,
        }
    }
}

impl<S: fmt::Debug, A, R> fmt::Debug for Engine<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("total_ticks", &self.total_ticks)
            .field("has_resource_delta", &self.resource_delta.is_some())
            .field("event_sink", &self.event_sink)
            .finish()
    }
}
