//! Integration tests: vendor keyword rewriting end to end.

use oasv_schema::{SchemaCache, SwaggerValidator, TransformationTable};
use serde_json::{json, Value};
use std::sync::Arc;

#[test]
fn test_one_of() {
    let validator = SwaggerValidator::from_yaml(include_str!("fixtures/oneOf/spec.yaml")).unwrap();

    let report = validator
        .validate_str(include_str!("fixtures/oneOf/valid.json"), "/definitions/User")
        .unwrap();
    assert!(report.is_success());
    assert!(report.is_empty());

    let report = validator
        .validate_str(include_str!("fixtures/oneOf/valid2.json"), "/definitions/User")
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.warnings().count(), 0);

    let report = validator
        .validate_str(include_str!("fixtures/oneOf/invalid.json"), "/definitions/User")
        .unwrap();
    assert!(!report.is_success());
    assert_eq!(report.len(), 1, "{report}");
    assert_eq!(report.findings()[0].key, "err.oneOf");
    assert_eq!(report.findings()[0].instance_path, "");
}

#[test]
fn test_all_of() {
    let validator = SwaggerValidator::from_yaml(include_str!("fixtures/allOf/spec.yaml")).unwrap();

    let report = validator
        .validate_str(include_str!("fixtures/allOf/valid.json"), "/definitions/Dog")
        .unwrap();
    assert!(report.is_success());
    assert!(report.is_empty());

    let report = validator
        .validate_str(include_str!("fixtures/allOf/invalid.json"), "/definitions/Dog")
        .unwrap();
    assert!(!report.is_success());
    assert_eq!(report.len(), 1, "{report}");
    assert!(report.findings()[0].message.contains("barks"));
}

#[test]
fn test_transform_correctly() {
    let validator = SwaggerValidator::from_json_reader(
        include_str!("fixtures/transformations/spec-before.json").as_bytes(),
    )
    .unwrap();
    let expected: Value =
        serde_json::from_str(include_str!("fixtures/transformations/spec-after.json")).unwrap();
    assert_eq!(validator.document().root(), &expected);
}

#[test]
fn test_transform_nested_properties() {
    let validator =
        SwaggerValidator::from_json(include_str!("fixtures/nested/spec-nested.json")).unwrap();
    let report = validator
        .validate_str(r#"{"someProperty": [{}]}"#, "/definitions/MyModel")
        .unwrap();
    assert!(!report.is_success());
    assert_eq!(report.findings()[0].key, "err.oneOf");
    assert_eq!(report.findings()[0].instance_path, "/someProperty/0");
    assert!(report.to_string().contains("error: "));
}

#[test]
fn test_vendor_and_canonical_spellings_validate_alike() {
    let vendor = json!({
        "definitions": {"User": {"x-oneOf": [{"required": ["email"]}, {"required": ["phone"]}]}}
    });
    let canonical = json!({
        "definitions": {"User": {"oneOf": [{"required": ["email"]}, {"required": ["phone"]}]}}
    });
    let cache = Arc::new(SchemaCache::new());
    let vendor = SwaggerValidator::builder(vendor).cache(Arc::clone(&cache)).build();
    let canonical = SwaggerValidator::builder(canonical).cache(cache).build();

    for payload in [
        json!({}),
        json!({"email": "a@example.com"}),
        json!({"email": "a@example.com", "phone": "1"}),
    ] {
        for deep_check in [false, true] {
            assert_eq!(
                vendor.validate_with(&payload, "/definitions/User", deep_check).unwrap(),
                canonical.validate_with(&payload, "/definitions/User", deep_check).unwrap(),
            );
        }
    }
}

#[test]
fn test_builtins_override_custom_target() {
    let spec = json!({"definitions": {"User": {"x-oneOf": [{"required": ["a"]}, {"required": ["b"]}]}}});
    // A custom entry cannot redirect a built-in vendor key.
    let validator = SwaggerValidator::from_value(spec, [("x-oneOf", "anyOf")]);
    assert!(validator.document().root()["definitions"]["User"]["oneOf"].is_array());
    let report = validator
        .validate(&json!({"a": 1, "b": 2}), "/definitions/User")
        .unwrap();
    assert!(!report.is_success());
}

#[test]
fn test_builtin_table_is_default() {
    let validator = SwaggerValidator::from_value(json!({}), std::iter::empty::<(&str, &str)>());
    assert_eq!(
        validator.config().transformation_table(),
        TransformationTable::builtin()
    );
}
