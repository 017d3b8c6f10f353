//! Time sources for offline catch-up
//!
//! The engine never reads time on its own. A [`Clock`] is only consulted by
//! [`Session`](crate::Session) when the caller asks it to catch up "now".
//! - `SystemClock` - wall-clock milliseconds since the Unix epoch
//! - `ManualClock` - a clock the caller sets explicitly, for tests and replays

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch
pub type TimestampMs = i64;

/// A source of the current time in whole milliseconds
pub trait Clock {
    /// Current time, milliseconds since the Unix epoch
    fn now_ms(&self) -> TimestampMs;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> TimestampMs {
        (**self).now_ms()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now_ms(&self) -> TimestampMs {
        (**self).now_ms()
    }
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> TimestampMs {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to
///
/// Unlike a simulation clock this one is allowed to move backwards, so tests
/// can exercise the backwards-clock path of offline catch-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualClock {
    now_ms: TimestampMs,
}

impl ManualClock {
    /// Create a clock reading `now_ms`
    pub fn new(now_ms: TimestampMs) -> Self {
        Self { now_ms }
    }

    /// Jump to an absolute time
    pub fn set(&mut self, now_ms: TimestampMs) {
        self.now_ms = now_ms;
    }

    /// Move the clock by `delta_ms` (may be negative)
    pub fn advance(&mut self, delta_ms: i64) {
        self.now_ms = self.now_ms.saturating_add(delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> TimestampMs {
        self.now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let mut clock = ManualClock::new(1_000);
        assert_eq!(clock.now_ms(), 1_000);

        clock.advance(500);
        assert_eq!(clock.now_ms(), 1_500);

        clock.advance(-2_000);
        assert_eq!(clock.now_ms(), -500);

        clock.set(42);
        assert_eq!(clock.now_ms(), 42);
    }

    #[test]
    fn test_manual_clock_saturates() {
        let mut clock = ManualClock::new(i64::MAX - 1);
        clock.advance(10);
        assert_eq!(clock.now_ms(), i64::MAX);
    }

    #[test]
    fn test_clock_through_references() {
        fn read<C: Clock>(clock: C) -> TimestampMs {
            clock.now_ms()
        }

        let clock = ManualClock::new(7);
        let boxed: Box<dyn Clock> = Box::new(clock);
        assert_eq!(read(&clock), 7);
        assert_eq!(read(boxed), 7);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
