//! Validator configuration.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```yaml
//! deep_check: false
//! report_level: info
//! transformations:
//!   - from: x-oneof
//!     to: x-oneOf
//! ```

use oasv_core::Severity;
use serde::{Deserialize, Serialize};

use crate::document::yaml_to_json_value;
use crate::error::ValidatorError;
use crate::transform::{Transformation, TransformationTable};

/// Settings applied when a validator is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Custom renamings applied before the built-ins.
    pub transformations: Vec<Transformation>,
    /// Deep check used by calls that do not pass one.
    pub deep_check: bool,
    /// Findings less severe than this are left out of reports.
    pub report_level: Severity,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            transformations: Vec::new(),
            deep_check: false,
            report_level: Severity::Info,
        }
    }
}

impl ValidatorConfig {
    /// Parse a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, ValidatorError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a YAML configuration.
    pub fn from_yaml(text: &str) -> Result<Self, ValidatorError> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
        if yaml.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(yaml_to_json_value(&yaml)?)?)
    }

    /// The custom renamings merged with the built-ins.
    pub fn transformation_table(&self) -> TransformationTable {
        TransformationTable::with_custom(self.transformations.iter().cloned())
    }
}
