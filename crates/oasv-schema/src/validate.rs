//! # Swagger Validator
//!
//! [`SwaggerValidator`] binds one transformed Swagger document to a schema
//! cache and validates payloads against the document's definitions.
//!
//! ## Usage
//!
//! ```no_run
//! use oasv_schema::SwaggerValidator;
//!
//! let spec = std::fs::read_to_string("spec.yaml")?;
//! let validator = SwaggerValidator::from_yaml(&spec)?;
//! let report = validator.validate_str(r#"{"name": "Rex"}"#, "/definitions/Pet")?;
//! if !report.is_success() {
//!     eprintln!("{report}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! A validator is immutable once built and can be shared across threads.
//! Clones share the document identity and therefore its compiled schemas.

use std::io::Read;
use std::sync::Arc;

use oasv_core::{DefinitionPointer, Severity, ValidationReport};
use serde_json::Value;

use crate::compiler::SchemaCache;
use crate::config::ValidatorConfig;
use crate::deserialize::{JsonDeserializer, PayloadDeserializer};
use crate::document::{SchemaDocument, SpecFormat};
use crate::error::ValidatorError;
use crate::transform::Transformation;

/// Validates payloads against the definitions of one Swagger document.
#[derive(Debug, Clone)]
pub struct SwaggerValidator {
    document: Arc<SchemaDocument>,
    cache: Arc<SchemaCache>,
    config: ValidatorConfig,
}

impl SwaggerValidator {
    /// Build from a JSON spec with the built-in transformations.
    pub fn from_json(text: &str) -> Result<Self, ValidatorError> {
        Self::from_text(SpecFormat::Json, text)
    }

    /// Build from a YAML spec with the built-in transformations.
    pub fn from_yaml(text: &str) -> Result<Self, ValidatorError> {
        Self::from_text(SpecFormat::Yaml, text)
    }

    /// Build from spec text in `format`.
    pub fn from_text(format: SpecFormat, text: &str) -> Result<Self, ValidatorError> {
        Ok(Self::builder(format.parse(text)?).build())
    }

    /// Build from a reader over a JSON spec.
    pub fn from_json_reader(reader: impl Read) -> Result<Self, ValidatorError> {
        Ok(Self::builder(SpecFormat::Json.parse_reader(reader)?).build())
    }

    /// Build from a reader over a YAML spec.
    pub fn from_yaml_reader(reader: impl Read) -> Result<Self, ValidatorError> {
        Ok(Self::builder(SpecFormat::Yaml.parse_reader(reader)?).build())
    }

    /// Build from a parsed spec and custom `from → to` renamings.
    ///
    /// Custom renamings are applied before the built-ins; a custom entry for
    /// a built-in vendor key is overridden by the built-in.
    pub fn from_value<I, K, V>(tree: Value, custom_transformations: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::builder(tree)
            .transformations(
                custom_transformations
                    .into_iter()
                    .map(|(from, to)| Transformation::new(from, to)),
            )
            .build()
    }

    /// Start building a validator over `tree`.
    pub fn builder(tree: Value) -> SwaggerValidatorBuilder {
        SwaggerValidatorBuilder {
            tree,
            config: ValidatorConfig::default(),
            cache: None,
        }
    }

    /// The transformed document.
    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    /// The cache compiled definitions are kept in.
    pub fn cache(&self) -> &Arc<SchemaCache> {
        &self.cache
    }

    /// The configuration the validator was built with.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate JSON payload text against the definition at `pointer`.
    ///
    /// # Errors
    ///
    /// `EmptyPayload` for the empty string, `EmptyDocument` for text with no
    /// document, `Json` for malformed text, and the errors of
    /// [`Self::validate`].
    pub fn validate_str(
        &self,
        payload: &str,
        pointer: &str,
    ) -> Result<ValidationReport, ValidatorError> {
        self.validate_str_with(payload, pointer, &JsonDeserializer)
    }

    /// Validate payload text parsed by `deserializer`.
    pub fn validate_str_with(
        &self,
        payload: &str,
        pointer: &str,
        deserializer: &dyn PayloadDeserializer,
    ) -> Result<ValidationReport, ValidatorError> {
        if payload.is_empty() {
            return Err(ValidatorError::EmptyPayload);
        }
        let tree = deserializer
            .deserialize(payload)?
            .ok_or(ValidatorError::EmptyDocument)?;
        self.validate(&tree, pointer)
    }

    /// Validate a parsed payload with the configured deep check.
    pub fn validate(
        &self,
        payload: &Value,
        pointer: &str,
    ) -> Result<ValidationReport, ValidatorError> {
        self.validate_with(payload, pointer, self.config.deep_check)
    }

    /// Validate a parsed payload against the definition at `pointer`.
    ///
    /// The definition is compiled on first use and cached for the lifetime
    /// of the cache.
    ///
    /// # Errors
    ///
    /// `UnknownDefinition` if `pointer` is malformed or does not resolve,
    /// `SchemaCompile` if the definition does not compile.
    pub fn validate_with(
        &self,
        payload: &Value,
        pointer: &str,
        deep_check: bool,
    ) -> Result<ValidationReport, ValidatorError> {
        let pointer =
            DefinitionPointer::parse(pointer).map_err(|_| ValidatorError::UnknownDefinition {
                pointer: pointer.to_string(),
            })?;
        let unit = self.cache.get_or_compile(&self.document, &pointer)?;
        Ok(unit.validate(payload, deep_check, self.config.report_level))
    }
}

/// Builder for [`SwaggerValidator`].
#[derive(Debug)]
pub struct SwaggerValidatorBuilder {
    tree: Value,
    config: ValidatorConfig,
    cache: Option<Arc<SchemaCache>>,
}

impl SwaggerValidatorBuilder {
    /// Replace the whole configuration.
    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Add one custom renaming.
    pub fn transformation(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.config
            .transformations
            .push(Transformation::new(from, to));
        self
    }

    /// Add custom renamings.
    pub fn transformations(mut self, entries: impl IntoIterator<Item = Transformation>) -> Self {
        self.config.transformations.extend(entries);
        self
    }

    /// Default deep check for calls that do not pass one.
    pub fn deep_check(mut self, deep_check: bool) -> Self {
        self.config.deep_check = deep_check;
        self
    }

    /// Leave findings below `level` out of reports.
    pub fn report_level(mut self, level: Severity) -> Self {
        self.config.report_level = level;
        self
    }

    /// Use `cache` instead of the process-wide cache.
    pub fn cache(mut self, cache: Arc<SchemaCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Transform the document and build the validator.
    pub fn build(self) -> SwaggerValidator {
        let table = self.config.transformation_table();
        let document = SchemaDocument::new(self.tree, &table);
        SwaggerValidator {
            document: Arc::new(document),
            cache: self.cache.unwrap_or_else(SchemaCache::shared),
            config: self.config,
        }
    }
}
