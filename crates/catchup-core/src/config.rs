//! Engine configuration - fixed step size and catch-up bounds
//!
//! Every field is validated when the config is built, whether through
//! [`EngineConfig::new`] or deserialization, so an invalid config never
//! reaches an [`Engine`](crate::Engine).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for an [`Engine`](crate::Engine)
///
/// # Example
///
/// ```
/// use catchup_core::EngineConfig;
///
/// // One tick per second, at most an hour of catch-up, applied 600 ticks at a time
/// let config = EngineConfig::new(1_000, 3_600_000, 3_600, 600).unwrap();
/// assert_eq!(config.dt_ms(), 1_000);
///
/// assert!(EngineConfig::new(0, 3_600_000, 3_600, 600).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEngineConfig", into = "RawEngineConfig")]
pub struct EngineConfig {
    dt_ms: u64,
    max_offline_ms: u64,
    max_ticks_total: u64,
    max_ticks_per_chunk: u64,
}

impl EngineConfig {
    /// Create a validated configuration
    ///
    /// # Arguments
    ///
    /// * `dt_ms` - Fixed step size in milliseconds, must be positive
    /// * `max_offline_ms` - Longest gap offline catch-up will honor
    /// * `max_ticks_total` - Most ticks a single catch-up may apply
    /// * `max_ticks_per_chunk` - Ticks applied per inner batch, must be positive
    pub fn new(
        dt_ms: u64,
        max_offline_ms: u64,
        max_ticks_total: u64,
        max_ticks_per_chunk: u64,
    ) -> Result<Self> {
        if dt_ms == 0 {
            return Err(Error::invalid_config("dt_ms", "must be positive"));
        }
        if max_offline_ms > i64::MAX as u64 {
            return Err(Error::invalid_config(
                "max_offline_ms",
                "must fit in a signed millisecond timestamp",
            ));
        }
        if max_ticks_per_chunk == 0 {
            return Err(Error::invalid_config(
                "max_ticks_per_chunk",
                "must be positive",
            ));
        }
        Ok(Self {
            dt_ms,
            max_offline_ms,
            max_ticks_total,
            max_ticks_per_chunk,
        })
    }

    /// Parse a configuration from RON text
    ///
    /// ```
    /// use catchup_core::EngineConfig;
    ///
    /// let config = EngineConfig::from_ron_str(
    ///     "(dt_ms: 500, max_offline_ms: 60000, max_ticks_total: 120, max_ticks_per_chunk: 10)",
    /// )
    /// .unwrap();
    /// assert_eq!(config.max_ticks_total(), 120);
    /// ```
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Fixed step size in milliseconds
    pub fn dt_ms(&self) -> u64 {
        self.dt_ms
    }

    /// Longest offline gap honored by catch-up, in milliseconds
    pub fn max_offline_ms(&self) -> u64 {
        self.max_offline_ms
    }

    /// Most ticks a single catch-up may apply
    pub fn max_ticks_total(&self) -> u64 {
        self.max_ticks_total
    }

    /// Ticks applied per chunk during catch-up
    pub fn max_ticks_per_chunk(&self) -> u64 {
        self.max_ticks_per_chunk
    }
}

/// Unvalidated wire form of [`EngineConfig`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEngineConfig {
    dt_ms: u64,
    max_offline_ms: u64,
    max_ticks_total: u64,
    max_ticks_per_chunk: u64,
}

impl TryFrom<RawEngineConfig> for EngineConfig {
    type Error = Error;

    fn try_from(raw: RawEngineConfig) -> Result<Self> {
        EngineConfig::new(
            raw.dt_ms,
            raw.max_offline_ms,
            raw.max_ticks_total,
            raw.max_ticks_per_chunk,
        )
    }
}

impl From<EngineConfig> for RawEngineConfig {
    fn from(config: EngineConfig) -> Self {
        Self {
            dt_ms: config.dt_ms,
            max_offline_ms: config.max_offline_ms,
            max_ticks_total: config.max_ticks_total,
            max_ticks_per_chunk: config.max_ticks_per_chunk,
        }
    }
}
