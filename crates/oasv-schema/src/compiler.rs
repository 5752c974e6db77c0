//! # Schema Compilation and Caching
//!
//! A definition is compiled once per (document, pointer) pair and reused by
//! every later validation against it. Compilation builds a Draft 4 engine
//! validator over the whole transformed document, so that `$ref`s between
//! definitions resolve against the document root, and points it at the
//! definition with a root-level `$ref`.
//!
//! ## Cache semantics
//!
//! - Keys combine the document's identity with the pointer. Two documents
//!   with identical content never share entries.
//! - Concurrent requests for the same key compile once; the losers block
//!   until the winner's unit is available.
//! - A failed compilation is not cached. The next request retries.
//! - Entries are never evicted.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Retrieve, Uri, ValidationError, ValidationOptions, Validator};
use oasv_core::{DefinitionPointer, DocumentId, Finding, Severity, ValidationReport};
use once_cell::sync::{Lazy, OnceCell};
use serde_json::Value;

use crate::document::SchemaDocument;
use crate::error::ValidatorError;
use crate::keywords;
use crate::session::ValidationSession;

static SHARED: Lazy<Arc<SchemaCache>> = Lazy::new(|| Arc::new(SchemaCache::new()));

/// Retriever that refuses every external reference.
///
/// Swagger documents are validated as self-contained trees. The engine
/// would otherwise fetch remote `$ref` targets over the network.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external reference {} is not supported", uri.as_str()).into())
    }
}

/// Engine options for the Swagger dialect. Built fresh for every compilation.
pub fn dialect_options() -> ValidationOptions {
    let mut options = jsonschema::options();
    options.with_draft(Draft::Draft4);
    options.with_retriever(OfflineRetriever);
    keywords::register(&mut options);
    options
}

/// Cache key: document identity plus definition pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Identity of the document the definition belongs to.
    pub document: DocumentId,
    /// Definition inside that document.
    pub pointer: DefinitionPointer,
}

/// A definition compiled against its document, ready to validate payloads.
pub struct CompiledSchema {
    document: DocumentId,
    pointer: DefinitionPointer,
    validator: Validator,
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("document", &self.document)
            .field("pointer", &self.pointer)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    /// Compile the definition at `pointer`.
    ///
    /// # Errors
    ///
    /// `UnknownDefinition` if the pointer does not resolve in the document;
    /// `SchemaCompile` if the engine rejects the schema.
    pub fn compile(
        document: &SchemaDocument,
        pointer: &DefinitionPointer,
    ) -> Result<Self, ValidatorError> {
        if document.resolve(pointer).is_none() {
            return Err(ValidatorError::UnknownDefinition {
                pointer: pointer.to_string(),
            });
        }

        let mut root = document.root().clone();
        let Some(members) = root.as_object_mut() else {
            return Err(ValidatorError::SchemaCompile {
                pointer: pointer.to_string(),
                reason: "document root is not an object".to_string(),
            });
        };
        members.insert("$ref".to_string(), Value::String(pointer.to_uri_fragment()));

        let started = Instant::now();
        let validator =
            dialect_options()
                .build(&root)
                .map_err(|e| ValidatorError::SchemaCompile {
                    pointer: pointer.to_string(),
                    reason: e.to_string(),
                })?;
        tracing::debug!(
            document = %document.id(),
            pointer = %pointer,
            elapsed_us = started.elapsed().as_micros() as u64,
            "compiled definition"
        );

        Ok(Self {
            document: document.id(),
            pointer: pointer.clone(),
            validator,
        })
    }

    /// Identity of the owning document.
    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// The compiled definition.
    pub fn pointer(&self) -> &DefinitionPointer {
        &self.pointer
    }

    /// Validate `instance` and build the report.
    ///
    /// Engine failures come first, in the engine's order, followed by the
    /// warnings raised during the run in the order they were raised. With
    /// `deep_check` off, a finding located strictly inside an instance that
    /// already failed is omitted. Findings below `report_level` are omitted.
    pub fn validate(
        &self,
        instance: &Value,
        deep_check: bool,
        report_level: Severity,
    ) -> ValidationReport {
        let session = ValidationSession::begin();
        let failures: Vec<Finding> = self
            .validator
            .iter_errors(instance)
            .map(|e| engine_finding(&e))
            .collect();
        let recorded = session.finish();

        let mut findings = merge(failures, recorded);
        if !deep_check {
            findings = prune_nested(findings);
        }
        findings.retain(|f| f.severity >= report_level);

        tracing::trace!(
            document = %self.document,
            pointer = %self.pointer,
            findings = findings.len(),
            "validated payload"
        );
        ValidationReport::from(findings)
    }
}

/// Process-wide store of compiled definitions.
#[derive(Debug, Default)]
pub struct SchemaCache {
    units: DashMap<CacheKey, Arc<OnceCell<Arc<CompiledSchema>>>>,
    compilations: AtomicUsize,
}

impl SchemaCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache validators use unless given another one.
    pub fn shared() -> Arc<SchemaCache> {
        Arc::clone(&SHARED)
    }

    /// Return the compiled unit for `pointer`, compiling it on first use.
    ///
    /// # Errors
    ///
    /// See [`CompiledSchema::compile`]. Failures leave no entry behind.
    pub fn get_or_compile(
        &self,
        document: &SchemaDocument,
        pointer: &DefinitionPointer,
    ) -> Result<Arc<CompiledSchema>, ValidatorError> {
        if document.resolve(pointer).is_none() {
            return Err(ValidatorError::UnknownDefinition {
                pointer: pointer.to_string(),
            });
        }

        let key = CacheKey {
            document: document.id(),
            pointer: pointer.clone(),
        };
        let cell = Arc::clone(self.units.entry(key).or_default().value());

        if let Some(unit) = cell.get() {
            tracing::trace!(document = %document.id(), pointer = %pointer, "cache hit");
            return Ok(Arc::clone(unit));
        }

        let unit = cell.get_or_try_init(|| {
            self.compilations.fetch_add(1, Ordering::Relaxed);
            CompiledSchema::compile(document, pointer).map(Arc::new)
        })?;
        Ok(Arc::clone(unit))
    }

    /// The compiled unit for `key`, if one is cached.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<CompiledSchema>> {
        self.units
            .get(key)
            .and_then(|cell| cell.value().get().cloned())
    }

    /// Number of compilations started, successful or not.
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Number of compiled units held.
    pub fn len(&self) -> usize {
        self.units
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    /// Returns true if no unit has been compiled into this cache.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn engine_finding(error: &ValidationError<'_>) -> Finding {
    let schema_path = error.schema_path.to_string();
    let keyword = keyword_of(&schema_path).to_string();
    let finding = Finding::new(
        Severity::Error,
        format!("err.{keyword}"),
        error.to_string(),
        error.instance_path.to_string(),
        schema_path,
    );
    match &error.kind {
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            finding.with_argument("unexpected", unexpected.clone())
        }
        ValidationErrorKind::Required { property } => {
            finding.with_argument("required", property.clone())
        }
        _ => finding,
    }
}

/// Last schema path segment that names a keyword rather than an index.
fn keyword_of(schema_path: &str) -> &str {
    schema_path
        .rsplit('/')
        .find(|segment| !segment.is_empty() && !segment.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or("schema")
}

/// Engine failures followed by recorded warnings.
///
/// The engine only sees a format failure's message, so each `format`
/// failure is replaced by the recorded finding for the same instance, which
/// carries the specific key and arguments. Recorded failures the engine did
/// not report (rejected branches of a combinator) are dropped.
fn merge(failures: Vec<Finding>, recorded: Vec<Finding>) -> Vec<Finding> {
    let (mut format_failures, warnings): (Vec<Finding>, Vec<Finding>) =
        recorded.into_iter().partition(|f| f.severity.is_failure());

    failures
        .into_iter()
        .map(|failure| {
            if failure.key != "err.format" {
                return failure;
            }
            match format_failures
                .iter()
                .position(|r| r.instance_path == failure.instance_path)
            {
                Some(index) => format_failures.remove(index),
                None => failure,
            }
        })
        .chain(warnings)
        .collect()
}

/// Drop findings located strictly below an instance that failed.
fn prune_nested(findings: Vec<Finding>) -> Vec<Finding> {
    let failed: HashSet<String> = findings
        .iter()
        .filter(|f| f.severity.is_failure())
        .map(|f| f.instance_path.clone())
        .collect();
    findings
        .into_iter()
        .filter(|f| !has_failed_ancestor(&f.instance_path, &failed))
        .collect()
}

fn has_failed_ancestor(path: &str, failed: &HashSet<String>) -> bool {
    let mut current = path;
    while let Some(index) = current.rfind('/') {
        current = &current[..index];
        if failed.contains(current) {
            return true;
        }
    }
    false
}
