//! # oasv-schema — Swagger 2.0 Payload Validation
//!
//! Validates JSON payloads against the `definitions` of a Swagger (OpenAPI
//! v2.0) document, treating the document as a JSON Schema Draft 4 dialect.
//!
//! ## Pipeline
//!
//! 1. **Transform** ([`transform`]). Vendor keys such as `x-oneOf` under
//!    `definitions` are renamed to the JSON Schema keywords Swagger leaves
//!    out. Custom renamings run before the built-ins.
//! 2. **Compile** ([`compiler`]). A definition is compiled on first use into
//!    a Draft 4 validator extended with the Swagger `format` values, an
//!    `integer` type without a 64-bit limit and the annotation keywords
//!    ([`keywords`], [`formats`]), then cached by
//!    document identity and pointer.
//! 3. **Validate** ([`validate`]). The payload runs through the compiled
//!    definition. The report lists engine failures followed by warnings;
//!    without deep check, findings nested under a failed instance are
//!    dropped.
//!
//! ## Crate Policy
//!
//! - Depends only on `oasv-core` internally.
//! - Payload problems are findings in a report. Only structural problems
//!   (bad input text, unknown definitions, schemas that do not compile)
//!   are errors.
//! - No network access: external `$ref`s are refused.

pub mod compiler;
pub mod config;
pub mod deserialize;
pub mod document;
pub mod error;
pub mod formats;
pub mod keywords;
mod session;
pub mod transform;
pub mod validate;

pub use compiler::{CacheKey, CompiledSchema, SchemaCache};
pub use config::ValidatorConfig;
pub use deserialize::{JsonDeserializer, PayloadDeserializer, YamlDeserializer};
pub use document::{SchemaDocument, SpecFormat};
pub use error::ValidatorError;
pub use formats::{FormatViolation, SwaggerFormat};
pub use keywords::{KeywordDescriptor, ValueKind, ANNOTATION_KEYWORDS};
pub use transform::{Transformation, TransformationTable, BUILTIN_TRANSFORMATIONS};
pub use validate::{SwaggerValidator, SwaggerValidatorBuilder};

pub use oasv_core::{DefinitionPointer, DocumentId, Finding, Severity, ValidationReport};
