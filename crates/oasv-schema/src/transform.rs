//! # Vendor Keyword Transformation
//!
//! Swagger 2.0 only admits a subset of JSON Schema Draft 4 inside
//! `definitions`. Authors who need the rest spell it with an `x-` prefix
//! (`x-oneOf`, `x-not`, ...) so the document stays valid Swagger. Before
//! compilation those vendor keys are renamed to their canonical keywords.
//!
//! ## Semantics
//!
//! - Only the members of the top-level `definitions` are visited. Every
//!   other part of the document is left untouched.
//! - Every descendant of a definition is visited, objects member-wise and
//!   arrays element-wise, regardless of which keyword holds it.
//! - At each object, table entries are applied in table order. A present
//!   vendor key is moved to its canonical key; the value itself is not
//!   copied. If the canonical key was already present it is overwritten,
//!   so the last applicable entry wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Vendor keys always rewritten, in application order.
pub const BUILTIN_TRANSFORMATIONS: [(&str, &str); 12] = [
    ("x-additionalItems", "additionalItems"),
    ("x-contains", "contains"),
    ("x-patternProperties", "patternProperties"),
    ("x-dependencies", "dependencies"),
    ("x-propertyNames", "propertyNames"),
    ("x-if", "if"),
    ("x-then", "then"),
    ("x-else", "else"),
    ("x-allOf", "allOf"),
    ("x-anyOf", "anyOf"),
    ("x-oneOf", "oneOf"),
    ("x-not", "not"),
];

/// One vendor-key → canonical-key renaming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    /// Key to look for.
    pub from: String,
    /// Key to move the value to.
    pub to: String,
}

impl Transformation {
    /// Create a renaming.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Ordered, immutable table of renamings.
///
/// Keys are unique. When a custom table is merged with the built-ins, the
/// custom entries come first and keep their position, but a built-in entry
/// for the same vendor key replaces the custom target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationTable {
    entries: Vec<Transformation>,
}

impl TransformationTable {
    /// The built-in table alone.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_TRANSFORMATIONS
                .iter()
                .map(|(from, to)| Transformation::new(*from, *to))
                .collect(),
        }
    }

    /// Custom entries followed by the built-ins, built-ins winning on
    /// collision. An empty custom table yields exactly [`Self::builtin`].
    pub fn with_custom<I>(custom: I) -> Self
    where
        I: IntoIterator<Item = Transformation>,
    {
        let mut table = Self {
            entries: Vec::new(),
        };
        for entry in custom {
            table.put(entry);
        }
        for (from, to) in BUILTIN_TRANSFORMATIONS {
            table.put(Transformation::new(from, to));
        }
        table
    }

    fn put(&mut self, entry: Transformation) {
        match self.entries.iter_mut().find(|e| e.from == entry.from) {
            Some(existing) => existing.to = entry.to,
            None => self.entries.push(entry),
        }
    }

    /// Canonical key for a vendor key, if the table has one.
    pub fn get(&self, from: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.from == from)
            .map(|e| e.to.as_str())
    }

    /// Entries in application order.
    pub fn entries(&self) -> &[Transformation] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TransformationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Rewrite vendor keys under `definitions` in place.
///
/// Returns the number of keys renamed. A document without `definitions`
/// passes through unchanged.
pub fn transform(document: &mut Value, table: &TransformationTable) -> usize {
    let renamed = match document.get_mut("definitions") {
        Some(Value::Object(definitions)) => definitions
            .values_mut()
            .map(|definition| transform_node(definition, table))
            .sum(),
        Some(Value::Array(definitions)) => definitions
            .iter_mut()
            .map(|definition| transform_node(definition, table))
            .sum(),
        _ => 0,
    };

    if renamed > 0 {
        tracing::debug!(renamed, "rewrote vendor keywords in definitions");
    }
    renamed
}

fn transform_node(node: &mut Value, table: &TransformationTable) -> usize {
    let mut renamed = 0;
    match node {
        Value::Object(members) => {
            for entry in table.entries() {
                if let Some(value) = members.remove(&entry.from) {
                    members.insert(entry.to.clone(), value);
                    renamed += 1;
                }
            }
            for child in members.values_mut() {
                renamed += transform_node(child, table);
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                renamed += transform_node(child, table);
            }
        }
        _ => {}
    }
    renamed
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_builtin_table_order() {
        let table = TransformationTable::builtin();
        assert_eq!(table.len(), 12);
        assert_eq!(table.entries()[0].from, "x-additionalItems");
        assert_eq!(table.entries()[11].to, "not");
        assert_eq!(table, TransformationTable::with_custom(Vec::new()));
    }

    #[test]
    fn test_custom_entries_precede_builtins() {
        let table =
            TransformationTable::with_custom(vec![Transformation::new("x-oneof", "x-oneOf")]);
        assert_eq!(table.len(), 13);
        assert_eq!(table.entries()[0], Transformation::new("x-oneof", "x-oneOf"));
        assert_eq!(table.get("x-oneOf"), Some("oneOf"));
    }

    #[test]
    fn test_builtins_win_on_collision() {
        let table = TransformationTable::with_custom(vec![
            Transformation::new("x-oneOf", "anyOf"),
            Transformation::new("x-nullable", "nullable"),
        ]);
        assert_eq!(table.len(), 13);
        // Position from the custom table, target from the built-ins.
        assert_eq!(table.entries()[0], Transformation::new("x-oneOf", "oneOf"));
        assert_eq!(table.entries()[1].from, "x-nullable");
    }

    #[test]
    fn test_later_custom_entry_replaces_earlier() {
        let table = TransformationTable::with_custom(vec![
            Transformation::new("x-a", "one"),
            Transformation::new("x-a", "two"),
        ]);
        assert_eq!(table.get("x-a"), Some("two"));
        assert_eq!(table.len(), 13);
    }

    #[test]
    fn test_document_without_definitions_is_unchanged() {
        let mut doc = json!({"swagger": "2.0", "paths": {"/": {"x-oneOf": []}}});
        let before = doc.clone();
        assert_eq!(transform(&mut doc, &TransformationTable::builtin()), 0);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_renames_nested_vendor_keys() {
        let mut doc = json!({
            "definitions": {
                "Pet": {
                    "x-oneOf": [{"$ref": "#/definitions/Cat"}, {"$ref": "#/definitions/Dog"}],
                    "properties": {
                        "tags": {
                            "type": "array",
                            "items": {"x-anyOf": [{"type": "string"}, {"type": "integer"}]}
                        }
                    }
                },
                "Cat": {"x-not": {"required": ["bark"]}}
            },
            "paths": {"/pets": {"x-oneOf": "left alone"}}
        });

        let renamed = transform(&mut doc, &TransformationTable::builtin());

        assert_eq!(renamed, 3);
        assert!(doc["definitions"]["Pet"].get("x-oneOf").is_none());
        assert_eq!(doc["definitions"]["Pet"]["oneOf"][1]["$ref"], "#/definitions/Dog");
        assert_eq!(
            doc["definitions"]["Pet"]["properties"]["tags"]["items"]["anyOf"][0]["type"],
            "string"
        );
        assert_eq!(doc["definitions"]["Cat"]["not"]["required"][0], "bark");
        assert_eq!(doc["paths"]["/pets"]["x-oneOf"], "left alone");
    }

    #[test]
    fn test_vendor_key_inside_array_of_schemas() {
        let mut doc = json!({
            "definitions": {
                "Model": {
                    "properties": {
                        "someProperty": {
                            "type": "array",
                            "items": {"x-oneOf": [{"required": ["a"]}, {"required": ["b"]}]}
                        }
                    }
                }
            }
        });
        transform(&mut doc, &TransformationTable::builtin());
        assert!(doc["definitions"]["Model"]["properties"]["someProperty"]["items"]["oneOf"].is_array());
    }

    #[test]
    fn test_chained_custom_rename() {
        let mut doc = json!({"definitions": {"User": {"x-oneof": [{}, {}]}}});
        let table =
            TransformationTable::with_custom(vec![Transformation::new("x-oneof", "x-oneOf")]);
        assert_eq!(transform(&mut doc, &table), 2);
        assert_eq!(doc, json!({"definitions": {"User": {"oneOf": [{}, {}]}}}));
    }

    #[test]
    fn test_both_keys_present_last_write_wins() {
        let mut doc = json!({"definitions": {"User": {"oneOf": ["canonical"], "x-oneOf": ["vendor"]}}});
        transform(&mut doc, &TransformationTable::builtin());
        assert_eq!(doc["definitions"]["User"], json!({"oneOf": ["vendor"]}));
    }

    fn json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z]{0,6}".prop_map(Value::String),
        ]
    }

    fn schema_key() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("x-oneOf".to_string()),
            Just("x-allOf".to_string()),
            Just("x-not".to_string()),
            Just("x-if".to_string()),
            Just("properties".to_string()),
            Just("items".to_string()),
            "[a-z]{1,5}",
        ]
    }

    fn schema_tree() -> impl Strategy<Value = Value> {
        json_leaf().prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map(schema_key(), inner, 0..5)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn contains_key(value: &Value, key: &str) -> bool {
        match value {
            Value::Object(m) => m.contains_key(key) || m.values().any(|v| contains_key(v, key)),
            Value::Array(items) => items.iter().any(|v| contains_key(v, key)),
            _ => false,
        }
    }

    proptest! {
        /// No built-in vendor key survives anywhere under `definitions`.
        #[test]
        fn no_vendor_key_survives(defs in prop::collection::btree_map("[A-Z][a-z]{0,4}", schema_tree(), 0..4)) {
            let mut doc = json!({"definitions": defs});
            transform(&mut doc, &TransformationTable::builtin());
            for (from, _) in BUILTIN_TRANSFORMATIONS {
                prop_assert!(!contains_key(&doc["definitions"], from), "{} survived: {}", from, doc);
            }
        }

        /// Members outside `definitions` are never modified.
        #[test]
        fn outside_definitions_untouched(defs in schema_tree(), paths in schema_tree()) {
            let mut doc = json!({"definitions": {"Model": defs}, "paths": paths.clone()});
            transform(&mut doc, &TransformationTable::builtin());
            prop_assert_eq!(&doc["paths"], &paths);
        }
    }
}
