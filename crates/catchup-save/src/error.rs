//! Error types for catchup-save
//!
//! Schema mismatches and malformed payloads are separate enums so callers
//! can tell "this save is from a build we cannot read" apart from "this save
//! is damaged".

use thiserror::Error;

/// Result type for save operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while capturing, encoding or decoding saves
#[derive(Debug, Error)]
pub enum Error {
    /// The payload's schema version cannot be brought to the current one
    #[error("schema mismatch: {0}")]
    Schema(#[from] SchemaError),

    /// The payload is not shaped like a save
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Core error
    #[error("core error: {0}")]
    Core(#[from] catchup_core::Error),
}

impl Error {
    /// Check if this is a schema mismatch
    pub fn is_schema(&self) -> bool {
        matches!(self, Error::Schema(_))
    }

    /// Check if this is a format error
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }
}

/// Schema version problems
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Versions start at zero
    #[error("schema version {0} is negative")]
    NegativeVersion(i64),

    /// Saves from a newer schema are never downgraded
    #[error("schema version {found} is newer than supported version {supported}")]
    NewerThanSupported { found: i64, supported: u32 },

    /// A step of the migration chain is missing
    #[error("no migration from schema version {from} (migrating to {target})")]
    MissingMigration { from: u32, target: u32 },
}

/// Malformed payloads
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The envelope has no state payload
    #[error("missing state payload under key {0:?}")]
    MissingState(String),

    /// The state payload is not a map
    #[error("state payload under key {0:?} is not a map")]
    StateNotMap(String),

    /// Neither the envelope nor the caller supplied a last-observed time
    #[error("missing last-observed timestamp under key {0:?} and no fallback given")]
    MissingLastObserved(String),

    /// The last-observed timestamp is present but not an integer
    #[error("invalid last-observed timestamp: {0}")]
    InvalidLastObserved(String),

    /// Last-observed timestamps start at zero
    #[error("last-observed timestamp {0} is negative")]
    NegativeLastObserved(i64),

    /// A state could not be turned into a map
    #[error("failed to encode state: {0}")]
    Encode(String),

    /// A map could not be turned into a state
    #[error("failed to decode state: {0}")]
    Decode(String),

    /// Save text could not be parsed
    #[error("failed to parse save text: {0}")]
    Parse(String),
}

// Compile-time check that Error is Send + Sync.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
