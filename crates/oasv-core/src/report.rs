//! # Validation Reports
//!
//! A validation run never answers with a bare boolean. It produces an
//! ordered list of [`Finding`]s, each carrying a severity, a stable message
//! key, a human-readable message and structured arguments. The report is
//! successful when no finding reaches [`Severity::Error`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity of a finding, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only.
    #[default]
    Info,
    /// Fidelity loss or other concern that does not make the payload invalid.
    Warning,
    /// The payload does not conform to the schema.
    Error,
    /// Processing could not continue for this part of the payload.
    Fatal,
}

impl Severity {
    /// Whether a finding at this severity makes the report unsuccessful.
    pub fn is_failure(self) -> bool {
        self >= Severity::Error
    }

    /// Lowercase name, as used in message keys and rendered reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item in a validation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// How serious the finding is.
    pub severity: Severity,
    /// Stable message key, e.g. `err.required` or `warn.format.int32.overflow`.
    pub key: String,
    /// Human-readable description.
    pub message: String,
    /// JSON Pointer to the offending location in the payload (empty for the root).
    pub instance_path: String,
    /// JSON Pointer to the schema location that produced the finding.
    pub schema_path: String,
    /// Structured arguments, e.g. the original and converted numeric values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<String, Value>,
}

impl Finding {
    /// Create a finding with no arguments.
    pub fn new(
        severity: Severity,
        key: impl Into<String>,
        message: impl Into<String>,
        instance_path: impl Into<String>,
        schema_path: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            key: key.into(),
            message: message.into(),
            instance_path: instance_path.into(),
            schema_path: schema_path.into(),
            arguments: BTreeMap::new(),
        }
    }

    /// Attach a structured argument.
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Look up a structured argument.
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.instance_path.is_empty() {
            "(root)"
        } else {
            self.instance_path.as_str()
        };
        write!(f, "{}: {} [{}] at {}", self.severity, self.message, self.key, location)
    }
}

/// Ordered sequence of findings produced by one validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    findings: Vec<Finding>,
}

impl ValidationReport {
    /// An empty, successful report.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no finding is at `Severity::Error` or above.
    pub fn is_success(&self) -> bool {
        !self.findings.iter().any(|f| f.severity.is_failure())
    }

    /// Append a finding.
    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Returns the number of findings.
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Returns true if there are no findings.
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Returns a slice of all findings, in report order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Iterate over findings.
    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.findings.iter()
    }

    /// Findings at exactly the given severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    /// Warning-level findings.
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.with_severity(Severity::Warning)
    }

    /// Findings at `Severity::Error` or above.
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity.is_failure())
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Finding> {
        self.findings
    }
}

impl From<Vec<Finding>> for ValidationReport {
    fn from(findings: Vec<Finding>) -> Self {
        Self { findings }
    }
}

impl FromIterator<Finding> for ValidationReport {
    fn from_iter<I: IntoIterator<Item = Finding>>(iter: I) -> Self {
        Self {
            findings: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ValidationReport {
    type Item = Finding;
    type IntoIter = std::vec::IntoIter<Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.iter()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.is_success() { "success" } else { "failure" })?;
        for finding in &self.findings {
            write!(f, "\n  {finding}")?;
        }
        Ok(())
    }
}
