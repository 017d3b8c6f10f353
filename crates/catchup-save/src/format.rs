//! Text encodings for save envelopes

use crate::{FormatError, JsonMap, Result};
use serde_json::Value;

/// Text format of a serialized envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveFormat {
    /// Compact JSON
    #[default]
    Json,
    /// Indented JSON
    JsonPretty,
    /// RON format (Rust Object Notation)
    Ron,
}

impl SaveFormat {
    /// Serialize an envelope to text
    pub fn write(self, envelope: &JsonMap) -> Result<String> {
        let text = match self {
            SaveFormat::Json => serde_json::to_string(envelope).map_err(|e| e.to_string()),
            SaveFormat::JsonPretty => {
                serde_json::to_string_pretty(envelope).map_err(|e| e.to_string())
            }
            SaveFormat::Ron => {
                ron::ser::to_string_pretty(envelope, ron::ser::PrettyConfig::default())
                    .map_err(|e| e.to_string())
            }
        };
        text.map_err(|e| FormatError::Encode(e).into())
    }

    /// Parse text into an envelope; the top level must be a map
    pub fn read(self, text: &str) -> Result<JsonMap> {
        let value: Value = match self {
            SaveFormat::Json | SaveFormat::JsonPretty => {
                serde_json::from_str(text).map_err(|e| FormatError::Parse(e.to_string()))?
            }
            SaveFormat::Ron => {
                ron::from_str(text).map_err(|e| FormatError::Parse(e.to_string()))?
            }
        };
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(FormatError::Parse("top level is not a map".to_string()).into()),
        }
    }
}
