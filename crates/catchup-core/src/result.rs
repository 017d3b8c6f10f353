//! Results returned by engine operations
//!
//! Results are snapshots: they carry a copy of the state after the
//! operation, never a log of intermediate states.

use crate::{Event, ResourceDelta, TimestampMs};

/// Result of `tick`, `step`, `dispatch`, `replay` and `tick_for_duration`
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult<S> {
    /// State after the operation
    pub state: S,
    /// Number of `Tick` actions applied
    pub ticks_applied: u64,
    /// Summarized change, empty without a summarizer
    pub resources_delta: ResourceDelta,
    /// Events drained from the sink, empty without a sink
    pub events: Vec<Event>,
}

/// Result of an offline catch-up, with the diagnostics of every stage
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineResult<S> {
    /// State after catch-up
    pub state: S,
    /// Ticks actually applied, always equal to `ticks_capped`
    pub ticks_applied: u64,
    /// Chunk iterations used to apply the ticks
    pub chunks: u64,
    /// Step size each tick advanced
    pub dt_ms: u64,
    /// `now - last_observed`, negative if the clock went backwards
    pub requested_delta_ms: i64,
    /// Requested delta clamped into `[0, max_offline_ms]`
    pub clamped_delta_ms: u64,
    /// Whole ticks fitting in the clamped delta
    pub ticks_requested: u64,
    /// `ticks_requested` limited by `max_ticks_total`
    pub ticks_capped: u64,
    /// `ticks_applied * dt_ms`
    pub applied_delta_ms: u64,
    /// The requested delta fell outside `[0, max_offline_ms]`
    pub was_clamped: bool,
    /// `max_ticks_total` cut the tick count
    pub was_capped: bool,
    /// Summarized change, empty without a summarizer
    pub resources_delta: ResourceDelta,
    /// Events drained from the sink, empty without a sink
    pub events: Vec<Event>,
}

impl<S> OfflineResult<S> {
    /// The clock moved backwards between the two observations
    pub fn was_backwards(&self) -> bool {
        self.requested_delta_ms < 0
    }

    /// Clamped time not covered by applied ticks
    ///
    /// Covers both ticks dropped by `max_ticks_total` and the sub-tick
    /// remainder; see [`lost_to_cap_ms`](Self::lost_to_cap_ms) and
    /// [`sub_tick_remainder_ms`](Self::sub_tick_remainder_ms) for the split.
    pub fn unapplied_delta_ms(&self) -> u64 {
        self.clamped_delta_ms - self.applied_delta_ms
    }

    /// Part of the unapplied time dropped because of `max_ticks_total`
    pub fn lost_to_cap_ms(&self) -> u64 {
        (self.ticks_requested - self.ticks_capped) * self.dt_ms
    }

    /// Part of the unapplied time shorter than one tick
    pub fn sub_tick_remainder_ms(&self) -> u64 {
        self.clamped_delta_ms - self.ticks_requested * self.dt_ms
    }

    /// Baseline for the next catch-up: `prev` advanced by the applied time only
    pub fn next_last_observed(&self, prev: TimestampMs) -> TimestampMs {
        prev.saturating_add_unsigned(self.applied_delta_ms)
    }
}

/// Progress report passed to the chunk callback of
/// [`Engine::apply_offline_with`](crate::Engine::apply_offline_with)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkProgress {
    /// Zero-based index of the chunk just applied
    pub chunk_index: u64,
    /// Ticks applied by this chunk
    pub ticks_in_chunk: u64,
    /// Ticks applied so far, this chunk included
    pub ticks_applied: u64,
    /// Ticks this catch-up will apply in total
    pub ticks_total: u64,
}

impl ChunkProgress {
    /// Check if this was the last chunk
    pub fn is_last(&self) -> bool {
        self.ticks_applied == self.ticks_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline(clamped: u64, requested_ticks: u64, capped: u64) -> OfflineResult<()> {
        OfflineResult {
            state: (),
            ticks_applied: capped,
            chunks: 1,
            dt_ms: 1000,
            requested_delta_ms: clamped as i64,
            clamped_delta_ms: clamped,
            ticks_requested: requested_ticks,
            ticks_capped: capped,
            applied_delta_ms: capped * 1000,
            was_clamped: false,
            was_capped: capped != requested_ticks,
            resources_delta: ResourceDelta::new(),
            events: Vec::new(),
        }
    }

    #[test]
    fn test_unapplied_split() {
        // 4.5s requested at 1s per tick, capped to 2 ticks
        let result = offline(4500, 4, 2);
        assert_eq!(result.unapplied_delta_ms(), 2500);
        assert_eq!(result.lost_to_cap_ms(), 2000);
        assert_eq!(result.sub_tick_remainder_ms(), 500);
    }

    #[test]
    fn test_next_last_observed() {
        let result = offline(4500, 4, 2);
        assert_eq!(result.next_last_observed(10_000), 12_000);
        assert_eq!(result.next_last_observed(i64::MAX - 1), i64::MAX);
    }

    #[test]
    fn test_backwards() {
        let mut result = offline(0, 0, 0);
        assert!(!result.was_backwards());
        result.requested_delta_ms = -1;
        assert!(result.was_backwards());
    }

    #[test]
    fn test_chunk_progress_last() {
        let progress = ChunkProgress {
            chunk_index: 2,
            ticks_in_chunk: 1,
            ticks_applied: 5,
            ticks_total: 5,
        };
        assert!(progress.is_last());
    }
}
