//! # Validator Errors
//!
//! Structural and input problems abort a call and surface here. Problems
//! with the payload's content never do: they are findings in the
//! [`ValidationReport`](oasv_core::ValidationReport).

use thiserror::Error;

/// Errors returned by validator construction and validation entry points.
#[derive(Error, Debug)]
pub enum ValidatorError {
    /// The text payload was the empty string. Raised before any parsing.
    #[error("payload is empty")]
    EmptyPayload,

    /// The text payload was non-empty but held no document (e.g. only
    /// whitespace).
    #[error("payload contains no document")]
    EmptyDocument,

    /// Malformed JSON, from the payload or the spec.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML, from the payload or the spec.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Well-formed YAML that has no JSON equivalent.
    #[error("unsupported YAML: {0}")]
    UnsupportedYaml(String),

    /// The definition pointer is malformed or does not resolve inside the
    /// document.
    #[error("unknown definition {pointer}")]
    UnknownDefinition {
        /// The pointer as supplied by the caller.
        pointer: String,
    },

    /// The schema engine rejected the definition (invalid schema syntax,
    /// unresolvable `$ref`, a Swagger keyword with a value of the wrong type).
    #[error("failed to compile schema at {pointer}: {reason}")]
    SchemaCompile {
        /// The definition pointer being compiled.
        pointer: String,
        /// Reason reported by the engine.
        reason: String,
    },

    /// IO error reading a spec.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
