//! Catchup Save - Versioned persistence for catchup engines
//!
//! This crate builds on `catchup-core` to provide:
//!
//! - **MigrationChain**: pure map transforms keyed by the schema version they upgrade from
//! - **MigrationCodec**: encode/decode a state at the current schema, migrating older payloads
//! - **SaveCodec**: bundle state, last-observed timestamp and schema version into one envelope
//! - **SaveFormat**: JSON and RON text for envelopes
//!
//! # Example
//!
//! ```
//! use catchup_save::{JsonMap, MigrationChain, MigrationCodec, SaveCodec};
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Purse { gold: i64, rate: i64 }
//!
//! let migrations = MigrationChain::new()
//!     .with(0, |mut m: JsonMap| {
//!         if let Some(coins) = m.remove("coins") {
//!             m.insert("gold".into(), coins);
//!         }
//!         m
//!     })
//!     .with(1, |mut m: JsonMap| {
//!         m.entry("rate").or_insert(json!(1));
//!         m
//!     });
//! let codec = SaveCodec::new(MigrationCodec::<Purse>::serde(2).with_migrations(migrations));
//!
//! let old = json!({"schemaVersion": 0, "lastObservedMs": 1000, "state": {"coins": 5}});
//! let save = codec.decode(old.as_object().unwrap().clone(), None).unwrap();
//! assert_eq!(save.state(), &Purse { gold: 5, rate: 1 });
//! assert_eq!(save.schema_version(), 2);
//! ```

mod codec;
mod error;
mod format;
mod migration;
mod save;

pub use codec::{serde_decode, serde_encode, DecodeFn, EncodeFn, MigrationCodec};
pub use error::{Error, FormatError, Result, SchemaError};
pub use format::SaveFormat;
pub use migration::{JsonMap, MigrationChain, MigrationFn};
pub use save::{EnvelopeKeys, Save, SaveCodec};
