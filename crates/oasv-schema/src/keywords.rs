//! # Swagger Keywords
//!
//! Keywords registered with the JSON Schema engine on top of Draft 4.
//!
//! ## `format`
//!
//! The Swagger formats (see [`crate::formats`]) are checked here. Errors
//! travel through the engine so that they take part in `oneOf`/`anyOf`
//! evaluation like any other keyword failure. Warnings cannot: the engine has
//! no notion of a non-failing finding, so they go to the active
//! validation session and the keyword reports success. Every other
//! format value is delegated to the engine's own Draft 4 format checks.
//!
//! ## `type`
//!
//! Draft 4 `integer` as the engine implements it stops at 64 bits, while
//! Swagger payloads may carry wider integers that the int32/int64 formats
//! then flag as overflow. The keyword accepts any number written as a plain
//! integer literal for `integer` and leaves every other type to the engine.
//!
//! ## Annotation keywords
//!
//! `example`, `xml`, `externalDocs`, `readOnly` and `discriminator` carry no
//! validation semantics. They are recognised so that a value of the wrong
//! type fails compilation instead of being silently ignored.

use jsonschema::paths::{LazyLocation, Location};
use jsonschema::{Keyword, ValidationError, ValidationOptions, Validator};
use serde_json::{json, Map, Value};

use crate::formats::{is_integer_literal, SwaggerFormat};
use crate::session;

/// Signature of a custom keyword factory as the engine expects it.
pub type KeywordFactory = for<'a> fn(
    &'a Map<String, Value>,
    &'a Value,
    Location,
) -> Result<Box<dyn Keyword>, ValidationError<'a>>;

/// JSON type a keyword value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Any JSON value.
    Any,
    /// A JSON object.
    Object,
    /// `true` or `false`.
    Boolean,
    /// A JSON string.
    String,
}

impl ValueKind {
    /// Whether `value` is of this kind.
    pub fn admits(self, value: &Value) -> bool {
        match self {
            ValueKind::Any => true,
            ValueKind::Object => value.is_object(),
            ValueKind::Boolean => value.is_boolean(),
            ValueKind::String => value.is_string(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ValueKind::Any => "any value",
            ValueKind::Object => "an object",
            ValueKind::Boolean => "a boolean",
            ValueKind::String => "a string",
        }
    }
}

/// A Swagger keyword registered with the engine.
#[derive(Clone, Copy)]
pub struct KeywordDescriptor {
    /// Keyword name as it appears in a schema.
    pub name: &'static str,
    /// Accepted value type.
    pub accepts: ValueKind,
    /// Factory handed to the engine.
    pub factory: KeywordFactory,
}

impl std::fmt::Debug for KeywordDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordDescriptor")
            .field("name", &self.name)
            .field("accepts", &self.accepts)
            .finish_non_exhaustive()
    }
}

/// Annotation keywords Swagger adds to the schema object.
pub static ANNOTATION_KEYWORDS: [KeywordDescriptor; 5] = [
    KeywordDescriptor {
        name: "discriminator",
        accepts: ValueKind::String,
        factory: discriminator_keyword,
    },
    KeywordDescriptor {
        name: "example",
        accepts: ValueKind::Any,
        factory: example_keyword,
    },
    KeywordDescriptor {
        name: "externalDocs",
        accepts: ValueKind::Object,
        factory: external_docs_keyword,
    },
    KeywordDescriptor {
        name: "readOnly",
        accepts: ValueKind::Boolean,
        factory: read_only_keyword,
    },
    KeywordDescriptor {
        name: "xml",
        accepts: ValueKind::Object,
        factory: xml_keyword,
    },
];

/// Register `type`, `format` and the annotation keywords on `options`.
pub fn register(options: &mut ValidationOptions) {
    options.with_keyword("type", type_keyword);
    options.with_keyword("format", format_keyword);
    for descriptor in ANNOTATION_KEYWORDS.iter() {
        options.with_keyword(descriptor.name, descriptor.factory);
    }
}

/// Look up an annotation keyword by name.
pub fn descriptor(name: &str) -> Option<&'static KeywordDescriptor> {
    ANNOTATION_KEYWORDS.iter().find(|d| d.name == name)
}

struct Annotation;

impl Keyword for Annotation {
    fn validate<'i>(
        &self,
        _instance: &'i Value,
        _location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        Ok(())
    }

    fn is_valid(&self, _instance: &Value) -> bool {
        true
    }
}

fn annotation<'a>(
    name: &str,
    value: &'a Value,
    path: Location,
) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    match descriptor(name) {
        Some(d) if !d.accepts.admits(value) => Err(ValidationError::custom(
            Location::new(),
            path,
            value,
            format!("{name} must be {}", d.accepts.describe()),
        )),
        _ => Ok(Box::new(Annotation)),
    }
}

fn discriminator_keyword<'a>(
    _parent: &'a Map<String, Value>,
    value: &'a Value,
    path: Location,
) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    annotation("discriminator", value, path)
}

fn example_keyword<'a>(
    _parent: &'a Map<String, Value>,
    value: &'a Value,
    path: Location,
) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    annotation("example", value, path)
}

fn external_docs_keyword<'a>(
    _parent: &'a Map<String, Value>,
    value: &'a Value,
    path: Location,
) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    annotation("externalDocs", value, path)
}

fn read_only_keyword<'a>(
    _parent: &'a Map<String, Value>,
    value: &'a Value,
    path: Location,
) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    annotation("readOnly", value, path)
}

fn xml_keyword<'a>(
    _parent: &'a Map<String, Value>,
    value: &'a Value,
    path: Location,
) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    annotation("xml", value, path)
}

struct TypeKeyword {
    admits_integer: bool,
    engine: Validator,
    schema_path: Location,
}

fn type_keyword<'a>(
    _parent: &'a Map<String, Value>,
    value: &'a Value,
    path: Location,
) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    let engine = jsonschema::draft4::new(&json!({ "type": value }))
        .map_err(|e| ValidationError::custom(Location::new(), path.clone(), value, e.to_string()))?;
    let admits_integer = match value {
        Value::String(name) => name == "integer",
        Value::Array(names) => names.iter().any(|name| name.as_str() == Some("integer")),
        _ => false,
    };
    Ok(Box::new(TypeKeyword {
        admits_integer,
        engine,
        schema_path: path,
    }))
}

impl Keyword for TypeKeyword {
    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        if self.is_valid(instance) {
            return Ok(());
        }
        let message = self
            .engine
            .iter_errors(instance)
            .next()
            .map_or_else(|| format!("{instance} has the wrong type"), |e| e.to_string());
        Err(ValidationError::custom(
            self.schema_path.clone(),
            location.into(),
            instance,
            message,
        ))
    }

    fn is_valid(&self, instance: &Value) -> bool {
        match instance {
            Value::Number(n) if self.admits_integer && is_integer_literal(n) => true,
            _ => self.engine.is_valid(instance),
        }
    }
}

enum FormatCheck {
    Swagger(SwaggerFormat),
    Engine(Validator),
}

struct FormatKeyword {
    check: FormatCheck,
    schema_path: Location,
}

fn format_keyword<'a>(
    _parent: &'a Map<String, Value>,
    value: &'a Value,
    path: Location,
) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    let Some(name) = value.as_str() else {
        return Err(ValidationError::custom(
            Location::new(),
            path,
            value,
            "format must be a string",
        ));
    };
    let check = match SwaggerFormat::from_name(name) {
        Some(format) => FormatCheck::Swagger(format),
        None => FormatCheck::Engine(jsonschema::draft4::new(&json!({ "format": name })).map_err(
            |e| ValidationError::custom(Location::new(), path.clone(), value, e.to_string()),
        )?),
    };
    Ok(Box::new(FormatKeyword {
        check,
        schema_path: path,
    }))
}

impl Keyword for FormatKeyword {
    fn validate<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> Result<(), ValidationError<'i>> {
        let instance_path: Location = location.into();
        match &self.check {
            FormatCheck::Swagger(format) => {
                let Some(violation) = format.check(instance) else {
                    return Ok(());
                };
                let failure = violation.severity.is_failure();
                let message = violation.message.clone();
                session::record(
                    violation.into_finding(instance_path.to_string(), self.schema_path.to_string()),
                );
                if failure {
                    Err(ValidationError::custom(
                        self.schema_path.clone(),
                        instance_path,
                        instance,
                        message,
                    ))
                } else {
                    Ok(())
                }
            }
            FormatCheck::Engine(validator) => match validator.iter_errors(instance).next() {
                Some(error) => Err(ValidationError::custom(
                    self.schema_path.clone(),
                    instance_path,
                    instance,
                    error.to_string(),
                )),
                None => Ok(()),
            },
        }
    }

    fn is_valid(&self, instance: &Value) -> bool {
        match &self.check {
            FormatCheck::Swagger(format) => format
                .check(instance)
                .map_or(true, |violation| !violation.severity.is_failure()),
            FormatCheck::Engine(validator) => validator.is_valid(instance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ValidationSession;

    fn build(schema: Value) -> Result<Validator, String> {
        let mut options = jsonschema::options();
        options.with_draft(jsonschema::Draft::Draft4);
        register(&mut options);
        options.build(&schema).map_err(|e| e.to_string())
    }

    #[test]
    fn test_value_kinds() {
        assert!(ValueKind::Any.admits(&Value::Null));
        assert!(ValueKind::Object.admits(&json!({})));
        assert!(!ValueKind::Object.admits(&json!([])));
        assert!(ValueKind::Boolean.admits(&json!(false)));
        assert!(!ValueKind::String.admits(&json!(1)));
    }

    #[test]
    fn test_descriptor_lookup() {
        assert_eq!(descriptor("readOnly").map(|d| d.accepts), Some(ValueKind::Boolean));
        assert_eq!(descriptor("example").map(|d| d.accepts), Some(ValueKind::Any));
        assert!(descriptor("nullable").is_none());
    }

    #[test]
    fn test_annotations_accept_well_typed_values() {
        let validator = build(json!({
            "type": "object",
            "discriminator": "kind",
            "externalDocs": {"url": "https://example.com"},
            "xml": {"name": "user"},
            "example": [1, 2, 3],
            "properties": {"kind": {"type": "string", "readOnly": true}}
        }))
        .unwrap();
        assert!(validator.is_valid(&json!({"kind": "cat"})));
        assert!(!validator.is_valid(&json!({"kind": 1})));
    }

    #[test]
    fn test_annotations_reject_wrong_types() {
        for schema in [
            json!({"readOnly": "yes"}),
            json!({"discriminator": {"propertyName": "kind"}}),
            json!({"xml": "user"}),
            json!({"externalDocs": ["https://example.com"]}),
        ] {
            assert!(build(schema.clone()).is_err(), "{schema} compiled");
        }
    }

    #[test]
    fn test_byte_format_fails_validation() {
        let validator = build(json!({"type": "string", "format": "byte"})).unwrap();
        assert!(validator.is_valid(&json!("aGVsbG8=")));
        assert!(!validator.is_valid(&json!("not base64!")));
        let errors: Vec<String> = validator
            .iter_errors(&json!("not base64!"))
            .map(|e| e.to_string())
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("base64"));
    }

    #[test]
    fn test_overflow_is_recorded_not_raised() {
        let validator = build(json!({"type": "integer", "format": "int32"})).unwrap();
        let session = ValidationSession::begin();
        assert_eq!(validator.iter_errors(&json!(3_000_000_000i64)).count(), 0);
        let findings = session.finish();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].key, "warn.format.int32.overflow");
    }

    #[test]
    fn test_other_formats_are_delegated() {
        let validator = build(json!({"type": "string", "format": "email"})).unwrap();
        assert!(validator.is_valid(&json!("user@example.com")));
        assert!(!validator.is_valid(&json!("not an email")));

        let unknown = build(json!({"format": "made-up"})).unwrap();
        assert!(unknown.is_valid(&json!("anything")));
    }

    #[test]
    fn test_integer_type_is_not_limited_to_64_bits() {
        let validator = build(json!({"type": "integer"})).unwrap();
        let wide: Value = serde_json::from_str("99999999999999999999").unwrap();
        assert!(validator.is_valid(&wide));
        assert!(validator.is_valid(&serde_json::from_str("-99999999999999999999").unwrap()));
        assert!(!validator.is_valid(&serde_json::from_str("2.5").unwrap()));
        assert!(!validator.is_valid(&json!("7")));

        let either = build(json!({"type": ["integer", "string"]})).unwrap();
        assert!(either.is_valid(&wide));
        assert!(either.is_valid(&json!("x")));
        assert!(!either.is_valid(&json!(null)));
    }

    #[test]
    fn test_other_types_are_delegated() {
        let validator = build(json!({"type": "number"})).unwrap();
        assert!(validator.is_valid(&serde_json::from_str("99999999999999999999.5").unwrap()));
        assert!(!validator.is_valid(&json!("1")));

        let errors: Vec<_> = build(json!({"type": "string"}))
            .unwrap()
            .iter_errors(&json!(1))
            .map(|e| (e.schema_path.to_string(), e.to_string()))
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "/type");
        assert!(errors[0].1.contains("string"));
    }

    #[test]
    fn test_type_must_be_well_formed() {
        assert!(build(json!({"type": "integr"})).is_err());
        assert!(build(json!({"type": 3})).is_err());
    }

    #[test]
    fn test_format_must_be_a_string() {
        assert!(build(json!({"format": 32})).is_err());
    }
}
