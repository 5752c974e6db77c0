//! Payload text deserialization.
//!
//! A deserializer returns `Ok(None)` when the text holds no document at all,
//! which the validator reports as [`ValidatorError::EmptyDocument`].

use serde_json::Value;

use crate::document::yaml_to_json_value;
use crate::error::ValidatorError;

/// Turns payload text into a JSON tree.
pub trait PayloadDeserializer {
    /// Parse `text`. `Ok(None)` means there was no document.
    fn deserialize(&self, text: &str) -> Result<Option<Value>, ValidatorError>;
}

/// Strict JSON. The default for text payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDeserializer;

impl PayloadDeserializer for JsonDeserializer {
    fn deserialize(&self, text: &str) -> Result<Option<Value>, ValidatorError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(text)?))
    }
}

/// YAML restricted to its JSON-compatible subset.
///
/// Floats go through `f64` while the YAML is parsed, so their written digits
/// are not kept: `float`/`double` checks see the shortest form of the `f64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDeserializer;

impl PayloadDeserializer for YamlDeserializer {
    fn deserialize(&self, text: &str) -> Result<Option<Value>, ValidatorError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
        yaml_to_json_value(&yaml).map(Some)
    }
}
