//! Versioned state codec
//!
//! A [`MigrationCodec`] knows the current schema version, how to turn a
//! state into a map and back, and the [`MigrationChain`] that upgrades maps
//! written by older schemas.

use crate::{FormatError, JsonMap, MigrationChain, Result, SchemaError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Turns a map at the current schema into a state
pub type DecodeFn<S> = Box<dyn Fn(JsonMap) -> Result<S>>;

/// Turns a state into a map at the current schema
pub type EncodeFn<S> = Box<dyn Fn(&S) -> Result<JsonMap>>;

/// Encoder, decoder and migrations for one state type
pub struct MigrationCodec<S> {
    schema_version: u32,
    from_json: DecodeFn<S>,
    to_json: EncodeFn<S>,
    migrations: MigrationChain,
}

impl<S> MigrationCodec<S> {
    /// Create a codec from an explicit decoder and encoder
    pub fn with_codecs<D, E>(schema_version: u32, from_json: D, to_json: E) -> Self
    where
        D: Fn(JsonMap) -> Result<S> + 'static,
        E: Fn(&S) -> Result<JsonMap> + 'static,
    {
        Self {
            schema_version,
            from_json: Box::new(from_json),
            to_json: Box::new(to_json),
            migrations: MigrationChain::new(),
        }
    }

    /// Use `migrations` to upgrade older payloads
    pub fn with_migrations(mut self, migrations: MigrationChain) -> Self {
        self.migrations = migrations;
        self
    }

    /// Schema version this codec reads and writes
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Registered migrations
    pub fn migrations(&self) -> &MigrationChain {
        &self.migrations
    }

    /// Bring a payload written at `from_version` up to the current schema
    ///
    /// Steps run one version at a time. A payload already at the current
    /// version is returned untouched. Newer payloads are rejected rather
    /// than guessed at, and a missing step fails when it is reached.
    pub fn migrate(&self, json: JsonMap, from_version: i64) -> Result<JsonMap> {
        if from_version < 0 {
            return Err(SchemaError::NegativeVersion(from_version).into());
        }
        let target = self.schema_version;
        let from = u32::try_from(from_version)
            .ok()
            .filter(|v| *v <= target)
            .ok_or(SchemaError::NewerThanSupported {
                found: from_version,
                supported: target,
            })?;

        let mut json = json;
        for version in from..target {
            let step = self
                .migrations
                .get(version)
                .ok_or(SchemaError::MissingMigration {
                    from: version,
                    target,
                })?;
            debug!(from = version, to = version + 1, "migrating state payload");
            json = step(json);
        }
        Ok(json)
    }

    /// Encode a state at the current schema
    pub fn encode_state(&self, state: &S) -> Result<JsonMap> {
        (self.to_json)(state)
    }

    /// Migrate a payload written at `from_version`, then decode it
    pub fn decode_state(&self, json: JsonMap, from_version: i64) -> Result<S> {
        let json = self.migrate(json, from_version)?;
        (self.from_json)(json)
    }
}

impl<S: Serialize + 'static> MigrationCodec<S> {
    /// Create a codec with an explicit decoder, encoding through the state's `Serialize`
    pub fn new<D>(schema_version: u32, from_json: D) -> Self
    where
        D: Fn(JsonMap) -> Result<S> + 'static,
    {
        Self::with_codecs(schema_version, from_json, serde_encode::<S>)
    }
}

impl<S: Serialize + DeserializeOwned + 'static> MigrationCodec<S> {
    /// Create a codec using the state's `Serialize` and `Deserialize` impls
    pub fn serde(schema_version: u32) -> Self {
        Self::with_codecs(schema_version, serde_decode::<S>, serde_encode::<S>)
    }
}

impl<S> fmt::Debug for MigrationCodec<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationCodec")
            .field("schema_version", &self.schema_version)
            .field("migrations", &self.migrations)
            .finish_non_exhaustive()
    }
}

/// Encode a state through its `Serialize` impl; it must serialize to a map
pub fn serde_encode<S: Serialize>(state: &S) -> Result<JsonMap> {
    match serde_json::to_value(state) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(FormatError::Encode(format!(
            "state serialized to {} instead of a map",
            json_type_name(&other)
        ))
        .into()),
        Err(e) => Err(FormatError::Encode(e.to_string()).into()),
    }
}

/// Decode a state through its `Deserialize` impl
pub fn serde_decode<S: DeserializeOwned>(json: JsonMap) -> Result<S> {
    serde_json::from_value(Value::Object(json))
        .map_err(|e| FormatError::Decode(e.to_string()).into())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Wallet {
        gold: i64,
        rate: i64,
    }

    fn map(value: Value) -> JsonMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn chain() -> MigrationChain {
        MigrationChain::new()
            .with(0, |mut m: JsonMap| {
                if let Some(coins) = m.remove("coins") {
                    m.insert("gold".into(), coins);
                }
                m
            })
            .with(1, |mut m: JsonMap| {
                m.entry("rate").or_insert(json!(1));
                m
            })
    }

    #[test]
    fn test_migrate_walks_every_step() {
        let codec = MigrationCodec::<Wallet>::serde(2).with_migrations(chain());
        let migrated = codec.migrate(map(json!({"coins": 5})), 0).unwrap();
        assert_eq!(migrated, map(json!({"gold": 5, "rate": 1})));

        let migrated = codec.migrate(map(json!({"gold": 5})), 1).unwrap();
        assert_eq!(migrated, map(json!({"gold": 5, "rate": 1})));
    }

    #[test]
    fn test_migrate_current_version_is_noop() {
        let codec = MigrationCodec::<Wallet>::serde(2).with_migrations(chain());
        let payload = map(json!({"coins": 5, "unknown": [1, 2]}));
        assert_eq!(codec.migrate(payload.clone(), 2).unwrap(), payload);
    }

    #[test]
    fn test_migrate_rejects_negative_version() {
        let codec = MigrationCodec::<Wallet>::serde(2).with_migrations(chain());
        let err = codec.migrate(JsonMap::new(), -1).unwrap_err();
        assert!(matches!(err, Error::Schema(SchemaError::NegativeVersion(-1))));
    }

    #[test]
    fn test_migrate_rejects_newer_version() {
        let codec = MigrationCodec::<Wallet>::serde(2).with_migrations(chain());
        let err = codec.migrate(JsonMap::new(), 3).unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::NewerThanSupported {
                found: 3,
                supported: 2
            })
        ));

        let err = codec.migrate(JsonMap::new(), i64::MAX).unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn test_migrate_missing_step() {
        let codec = MigrationCodec::<Wallet>::serde(3).with_migrations(chain());
        let err = codec.migrate(map(json!({"coins": 5})), 0).unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::MissingMigration { from: 2, target: 3 })
        ));

        // Starting past the gap is fine
        let codec = MigrationCodec::<Wallet>::serde(3).with_migrations(
            MigrationChain::new().with(2, |m| m),
        );
        assert!(codec.migrate(JsonMap::new(), 2).is_ok());
        assert!(codec.migrate(JsonMap::new(), 1).is_err());
    }

    #[test]
    fn test_decode_state_migrates_first() {
        let codec = MigrationCodec::<Wallet>::serde(2).with_migrations(chain());
        let wallet = codec.decode_state(map(json!({"coins": 5})), 0).unwrap();
        assert_eq!(wallet, Wallet { gold: 5, rate: 1 });
    }

    #[test]
    fn test_decode_error_is_format_error() {
        let codec = MigrationCodec::<Wallet>::serde(0);
        let err = codec.decode_state(map(json!({"gold": "lots"})), 0).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_custom_decoder_with_default_encoder() {
        let codec = MigrationCodec::new(0, |m: JsonMap| {
            let gold = m.get("gold").and_then(Value::as_i64).unwrap_or(0);
            Ok(Wallet { gold, rate: 1 })
        });
        let encoded = codec.encode_state(&Wallet { gold: 3, rate: 2 }).unwrap();
        assert_eq!(encoded, map(json!({"gold": 3, "rate": 2})));
        assert_eq!(
            codec.decode_state(map(json!({})), 0).unwrap(),
            Wallet { gold: 0, rate: 1 }
        );
    }

    #[test]
    fn test_encode_rejects_non_map_state() {
        let err = serde_encode(&42i64).unwrap_err();
        assert!(matches!(err, Error::Format(FormatError::Encode(_))));
    }
}
