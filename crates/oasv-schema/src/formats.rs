//! # Swagger Format Attributes
//!
//! Checks for the `format` values Swagger 2.0 adds on top of JSON Schema
//! Draft 4. Each check is scoped to one instance type and is skipped for
//! any other type; the engine's `type` keyword reports type mismatches.
//!
//! | Format   | Instance type | Failure                                   |
//! |----------|---------------|-------------------------------------------|
//! | `int32`  | integer       | warning: does not fit a signed 32-bit int |
//! | `int64`  | integer       | warning: does not fit a signed 64-bit int |
//! | `float`  | number        | warning: decimal value changes as `f32`   |
//! | `double` | number        | warning: decimal value changes as `f64`   |
//! | `byte`   | string        | error: not RFC 4648 base64                |
//! | `date`   | string        | error: not an RFC 3339 `full-date`        |
//!
//! Overflow is a warning because the payload still satisfies JSON Schema's
//! numeric semantics; it only loses fidelity at the declared wire width.
//!
//! Numeric comparisons are exact, on `BigDecimal` values. With serde_json's
//! `arbitrary_precision` feature a payload number keeps the digits it was
//! written with, so `0.1234567890123456789` is seen as losing precision
//! as a `double` even though it parses into an `f64` without complaint.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use oasv_core::{Finding, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

static BASE64: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$")
        .expect("base64 pattern is valid")
});

static FULL_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("full-date pattern is valid"));

/// A `format` value with Swagger-specific semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwaggerFormat {
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// IEEE-754 single precision.
    Float,
    /// IEEE-754 double precision.
    Double,
    /// Base64-encoded characters.
    Byte,
    /// RFC 3339 `full-date`.
    Date,
}

impl SwaggerFormat {
    /// All Swagger formats.
    pub const ALL: [SwaggerFormat; 6] = [
        SwaggerFormat::Int32,
        SwaggerFormat::Int64,
        SwaggerFormat::Float,
        SwaggerFormat::Double,
        SwaggerFormat::Byte,
        SwaggerFormat::Date,
    ];

    /// Look up a format by its `format` keyword value.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// The `format` keyword value.
    pub fn name(self) -> &'static str {
        match self {
            SwaggerFormat::Int32 => "int32",
            SwaggerFormat::Int64 => "int64",
            SwaggerFormat::Float => "float",
            SwaggerFormat::Double => "double",
            SwaggerFormat::Byte => "byte",
            SwaggerFormat::Date => "date",
        }
    }

    /// Whether the check runs for this instance.
    pub fn applies_to(self, instance: &Value) -> bool {
        match (self, instance) {
            (SwaggerFormat::Int32 | SwaggerFormat::Int64, Value::Number(n)) => is_integral(n),
            (SwaggerFormat::Float | SwaggerFormat::Double, Value::Number(_)) => true,
            (SwaggerFormat::Byte | SwaggerFormat::Date, Value::String(_)) => true,
            _ => false,
        }
    }

    /// Run the check. `None` means the instance passes or is out of scope.
    pub fn check(self, instance: &Value) -> Option<FormatViolation> {
        if !self.applies_to(instance) {
            return None;
        }
        match (self, instance) {
            (SwaggerFormat::Int32, Value::Number(n)) => {
                check_integer(self, n, i64::from(i32::MIN), i64::from(i32::MAX))
            }
            (SwaggerFormat::Int64, Value::Number(n)) => check_integer(self, n, i64::MIN, i64::MAX),
            (SwaggerFormat::Float, Value::Number(n)) => check_narrowing(self, n, narrow_to_f32),
            (SwaggerFormat::Double, Value::Number(n)) => check_narrowing(self, n, narrow_to_f64),
            (SwaggerFormat::Byte, Value::String(s)) => check_base64(s),
            (SwaggerFormat::Date, Value::String(s)) => check_date(s),
            _ => None,
        }
    }
}

/// A failed format check, not yet tied to a location.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatViolation {
    /// Warning for fidelity loss, error for malformed strings.
    pub severity: Severity,
    /// Message key.
    pub key: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Structured arguments.
    pub arguments: Vec<(&'static str, Value)>,
}

impl FormatViolation {
    /// Attach locations and turn the violation into a report finding.
    pub fn into_finding(
        self,
        instance_path: impl Into<String>,
        schema_path: impl Into<String>,
    ) -> Finding {
        self.arguments.into_iter().fold(
            Finding::new(self.severity, self.key, self.message, instance_path, schema_path),
            |finding, (name, value)| finding.with_argument(name, value),
        )
    }
}

fn check_integer(format: SwaggerFormat, n: &Number, min: i64, max: i64) -> Option<FormatViolation> {
    if fits_integer(n, min, max) {
        return None;
    }
    Some(FormatViolation {
        severity: Severity::Warning,
        key: overflow_key(format),
        message: format!("value for {} leads to overflow (found: {n})", format.name()),
        arguments: vec![("value", Value::Number(n.clone()))],
    })
}

fn check_narrowing(
    format: SwaggerFormat,
    n: &Number,
    narrow: fn(&str) -> Option<String>,
) -> Option<FormatViolation> {
    let text = n.to_string();
    let converted = narrow(&text)?;
    let original = decimal(&text);
    if original.is_some() && original == decimal(&converted) {
        return None;
    }

    let converted_value =
        serde_json::from_str::<Value>(&converted).unwrap_or_else(|_| Value::String(converted.clone()));
    Some(FormatViolation {
        severity: Severity::Warning,
        key: overflow_key(format),
        message: format!(
            "value for {} leads to overflow (original: {text}, converted: {converted})",
            format.name()
        ),
        arguments: vec![
            ("value", Value::Number(n.clone())),
            ("converted", converted_value),
        ],
    })
}

fn check_base64(s: &str) -> Option<FormatViolation> {
    if BASE64.is_match(s) {
        return None;
    }
    Some(FormatViolation {
        severity: Severity::Error,
        key: "err.format.base64.invalid",
        message: format!("string \"{s}\" is not valid base64"),
        arguments: vec![("value", Value::String(s.to_string()))],
    })
}

fn check_date(s: &str) -> Option<FormatViolation> {
    if FULL_DATE.is_match(s) && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() {
        return None;
    }
    Some(FormatViolation {
        severity: Severity::Error,
        key: "err.format.date.invalid",
        message: format!("string \"{s}\" is not a valid date (expected YYYY-MM-DD)"),
        arguments: vec![("value", Value::String(s.to_string()))],
    })
}

fn overflow_key(format: SwaggerFormat) -> &'static str {
    match format {
        SwaggerFormat::Int32 => "warn.format.int32.overflow",
        SwaggerFormat::Int64 => "warn.format.int64.overflow",
        SwaggerFormat::Float => "warn.format.float.overflow",
        _ => "warn.format.double.overflow",
    }
}

/// Shortest decimal form of the value nearest `text` as an `f32`.
fn narrow_to_f32(text: &str) -> Option<String> {
    text.parse::<f32>().ok().map(|v| format!("{v:e}"))
}

/// Shortest decimal form of the value nearest `text` as an `f64`.
fn narrow_to_f64(text: &str) -> Option<String> {
    text.parse::<f64>().ok().map(|v| format!("{v:e}"))
}

/// Whether `n` has no fractional part (`5` and `5.0` both do not).
fn is_integral(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    let text = n.to_string();
    match decimal(&text) {
        Some(d) => d.is_integer(),
        None => exponent(&text).is_some_and(|e| e > 0),
    }
}

/// Whether `n` is written as a plain integer literal, with no fraction or
/// exponent. This is Draft 4's `integer`, without the 64-bit limit.
pub(crate) fn is_integer_literal(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    let text = n.to_string();
    let digits = text.strip_prefix('-').unwrap_or(&text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Whether `n` is an integer in `min..=max`.
fn fits_integer(n: &Number, min: i64, max: i64) -> bool {
    if let Some(v) = n.as_i64() {
        return (min..=max).contains(&v);
    }
    decimal(&n.to_string()).is_some_and(|d| {
        d.is_integer() && d >= BigDecimal::from(min) && d <= BigDecimal::from(max)
    })
}

/// Largest exponent magnitude compared exactly. Anything beyond it lies far
/// outside every Swagger numeric range.
const MAX_EXPONENT: u64 = 4096;

/// Exact value of a number written in JSON (or `{:e}`) syntax.
///
/// `None` for text that is not a finite number, and for a non-zero value
/// whose exponent exceeds [`MAX_EXPONENT`].
fn decimal(text: &str) -> Option<BigDecimal> {
    match exponent(text) {
        Some(e) if e.unsigned_abs() > MAX_EXPONENT => {
            let mantissa = &text[..text.find(['e', 'E'])?];
            mantissa
                .bytes()
                .all(|b| matches!(b, b'0' | b'.' | b'-' | b'+'))
                .then(|| BigDecimal::from(0))
        }
        _ => BigDecimal::from_str(text).ok(),
    }
}

/// The written exponent, saturated when it does not fit an `i64`.
fn exponent(text: &str) -> Option<i64> {
    let idx = text.find(['e', 'E'])?;
    let digits = &text[idx + 1..];
    Some(digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    }))
}
