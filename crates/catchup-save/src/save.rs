//! Save records and the persisted envelope
//!
//! A save bundles a state with the timestamp it was last brought up to date
//! and the schema version it was written with:
//!
//! ```text
//! { "schemaVersion": 2, "lastObservedMs": 1700000000000, "state": { ... } }
//! ```

use crate::{FormatError, JsonMap, MigrationCodec, Result, SaveFormat};
use catchup_core::{Clock, Engine, EngineConfig, Reducer, Session, TimestampMs};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// An immutable saved state
///
/// Saves are only produced by [`SaveCodec::capture`] and
/// [`SaveCodec::decode`]; there is no way to change one afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Save<S> {
    state: S,
    last_observed_ms: TimestampMs,
    schema_version: u32,
}

impl<S> Save<S> {
    /// The saved state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// When the state was last brought up to date, never negative
    pub fn last_observed_ms(&self) -> TimestampMs {
        self.last_observed_ms
    }

    /// Schema version the save was written with
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Take the state out of the save
    pub fn into_state(self) -> S {
        self.state
    }

    /// Split into state and last-observed timestamp
    pub fn into_parts(self) -> (S, TimestampMs) {
        (self.state, self.last_observed_ms)
    }

    /// Build a session that continues from this save
    ///
    /// The save's timestamp becomes the session baseline, so the next
    /// catch-up covers the time since the save was taken.
    pub fn resume<A, R, C>(self, config: EngineConfig, reducer: R, clock: C) -> Session<S, A, R, C>
    where
        S: Clone,
        R: Reducer<S, A>,
        C: Clock,
    {
        let engine = Engine::new(config, reducer, self.state);
        Session::new(engine, clock, self.last_observed_ms)
    }
}

/// Key names of the persisted envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeKeys {
    /// Key holding the schema version
    pub schema_version: String,
    /// Key holding the last-observed timestamp
    pub last_observed_ms: String,
    /// Key holding the state payload
    pub state: String,
}

impl Default for EnvelopeKeys {
    fn default() -> Self {
        Self {
            schema_version: "schemaVersion".to_string(),
            last_observed_ms: "lastObservedMs".to_string(),
            state: "state".to_string(),
        }
    }
}

/// Captures, encodes and decodes [`Save`]s for one state type
#[derive(Debug)]
pub struct SaveCodec<S> {
    codec: MigrationCodec<S>,
    keys: EnvelopeKeys,
}

impl<S> SaveCodec<S> {
    /// Wrap a state codec using the default envelope keys
    pub fn new(codec: MigrationCodec<S>) -> Self {
        Self {
            codec,
            keys: EnvelopeKeys::default(),
        }
    }

    /// Use custom envelope keys
    pub fn with_keys(mut self, keys: EnvelopeKeys) -> Self {
        self.keys = keys;
        self
    }

    /// The wrapped state codec
    pub fn codec(&self) -> &MigrationCodec<S> {
        &self.codec
    }

    /// Envelope key names
    pub fn keys(&self) -> &EnvelopeKeys {
        &self.keys
    }

    /// Schema version new saves are written with
    pub fn schema_version(&self) -> u32 {
        self.codec.schema_version()
    }

    /// Record `state` as up to date at `last_observed_ms`
    pub fn capture(&self, state: S, last_observed_ms: TimestampMs) -> Result<Save<S>> {
        if last_observed_ms < 0 {
            return Err(catchup_core::Error::InvalidArgument(format!(
                "last-observed timestamp {last_observed_ms} is negative"
            ))
            .into());
        }
        Ok(Save {
            state,
            last_observed_ms,
            schema_version: self.codec.schema_version(),
        })
    }

    /// Record a session's current state and baseline
    pub fn capture_session<A, R, C>(&self, session: &Session<S, A, R, C>) -> Result<Save<S>>
    where
        S: Clone,
        R: Reducer<S, A>,
        C: Clock,
    {
        self.capture(session.state().clone(), session.last_observed_ms())
    }

    /// Build the envelope for a save
    pub fn encode(&self, save: &Save<S>) -> Result<JsonMap> {
        let state = self.codec.encode_state(&save.state)?;
        let mut envelope = JsonMap::new();
        envelope.insert(
            self.keys.schema_version.clone(),
            Value::from(save.schema_version),
        );
        envelope.insert(
            self.keys.last_observed_ms.clone(),
            Value::from(save.last_observed_ms),
        );
        envelope.insert(self.keys.state.clone(), Value::Object(state));
        Ok(envelope)
    }

    /// Read a save back from its envelope
    ///
    /// A missing or non-integer schema version is read as version 0. The
    /// timestamp comes from the envelope, or from `fallback_last_observed_ms`
    /// when the envelope has none; with neither, decoding fails.
    pub fn decode(
        &self,
        mut envelope: JsonMap,
        fallback_last_observed_ms: Option<TimestampMs>,
    ) -> Result<Save<S>> {
        let version = match envelope.get(&self.keys.schema_version).and_then(Value::as_i64) {
            Some(version) => version,
            None => {
                debug!(key = %self.keys.schema_version, "no schema version in save, assuming 0");
                0
            }
        };

        let state = match envelope.remove(&self.keys.state) {
            Some(Value::Object(state)) => state,
            Some(_) => return Err(FormatError::StateNotMap(self.keys.state.clone()).into()),
            None => return Err(FormatError::MissingState(self.keys.state.clone()).into()),
        };

        let last_observed_ms = match envelope.get(&self.keys.last_observed_ms) {
            Some(value) => value.as_i64().ok_or_else(|| {
                FormatError::InvalidLastObserved(format!(
                    "{:?} holds {value}, expected an integer",
                    self.keys.last_observed_ms
                ))
            })?,
            None => fallback_last_observed_ms.ok_or_else(|| {
                FormatError::MissingLastObserved(self.keys.last_observed_ms.clone())
            })?,
        };
        if last_observed_ms < 0 {
            return Err(FormatError::NegativeLastObserved(last_observed_ms).into());
        }

        let state = self.codec.decode_state(state, version)?;
        Ok(Save {
            state,
            last_observed_ms,
            schema_version: self.codec.schema_version(),
        })
    }

    /// Encode a save and write it as text
    pub fn to_text(&self, save: &Save<S>, format: SaveFormat) -> Result<String> {
        format.write(&self.encode(save)?)
    }

    /// Parse text and decode the save it holds
    pub fn from_text(
        &self,
        text: &str,
        format: SaveFormat,
        fallback_last_observed_ms: Option<TimestampMs>,
    ) -> Result<Save<S>> {
        self.decode(format.read(text)?, fallback_last_observed_ms)
    }
}
