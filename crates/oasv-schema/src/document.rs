//! # Schema Documents
//!
//! A [`SchemaDocument`] is a parsed, transformed Swagger spec together with
//! the identity that keys its compiled schemas in the cache. It is built
//! once per validator and never mutated afterwards.

use std::io::Read;

use oasv_core::{DefinitionPointer, DocumentId};
use serde_json::Value;

use crate::error::ValidatorError;
use crate::transform::{transform, TransformationTable};

/// Serialization of a spec or payload text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    /// JSON text.
    Json,
    /// YAML text (JSON-compatible subset).
    Yaml,
}

impl SpecFormat {
    /// Parse text in this format into a JSON tree.
    ///
    /// # Errors
    ///
    /// Returns `Json`/`Yaml` for malformed text and `UnsupportedYaml` for
    /// YAML without a JSON equivalent.
    pub fn parse(self, text: &str) -> Result<Value, ValidatorError> {
        match self {
            SpecFormat::Json => Ok(serde_json::from_str(text)?),
            SpecFormat::Yaml => {
                let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
                yaml_to_json_value(&yaml)
            }
        }
    }

    /// Read all of `reader` and parse it.
    pub fn parse_reader(self, mut reader: impl Read) -> Result<Value, ValidatorError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.parse(&text)
    }
}

/// A transformed Swagger document with a per-instance identity.
#[derive(Debug)]
pub struct SchemaDocument {
    id: DocumentId,
    root: Value,
}

impl SchemaDocument {
    /// Transform `root` with `table` and assign a fresh identity.
    pub fn new(mut root: Value, table: &TransformationTable) -> Self {
        transform(&mut root, table);
        let id = DocumentId::new();
        tracing::debug!(document = %id, "schema document loaded");
        Self { id, root }
    }

    /// Identity used for cache keys.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The transformed tree.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The node `pointer` addresses, if any.
    pub fn resolve(&self, pointer: &DefinitionPointer) -> Option<&Value> {
        self.root.pointer(pointer.as_str())
    }

    /// Names of the members of `definitions`, sorted.
    pub fn definition_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .root
            .get("definitions")
            .and_then(Value::as_object)
            .map(|defs| defs.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Swagger specs written in YAML use only the JSON-compatible subset; tags
/// are dropped and scalar map keys are stringified.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, ValidatorError> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| {
                        ValidatorError::UnsupportedYaml(format!("cannot represent float {f} in JSON"))
                    })
            } else {
                Err(ValidatorError::UnsupportedYaml(format!("unsupported number: {n:?}")))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, ValidatorError> =
                seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(ValidatorError::UnsupportedYaml(format!(
                            "unsupported map key: {other:?}"
                        )))
                    }
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
