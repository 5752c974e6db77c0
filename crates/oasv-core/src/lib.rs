//! # oasv-core — Foundational Types for the Swagger Validator
//!
//! Defines the types shared by every layer of the validator: who a schema
//! document is, where a definition lives inside it, and what a validation
//! run reports back.
//!
//! ## Key Design Principles
//!
//! 1. **Identity, not equality.** `DocumentId` is assigned when a document
//!    is constructed. Two structurally identical documents built separately
//!    carry different identities and never share compiled schemas.
//!
//! 2. **Validated pointers.** `DefinitionPointer` only exists for strings
//!    that are well-formed JSON Pointers. Malformed text is rejected at the
//!    boundary instead of deep inside the schema engine.
//!
//! 3. **Reports, not booleans.** `ValidationReport` is an ordered list of
//!    `Finding`s with a severity each. Success is derived: no finding at
//!    `Severity::Error` or above.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `oasv-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod pointer;
pub mod report;

// Re-export primary types for ergonomic imports.
pub use error::PointerError;
pub use identity::DocumentId;
pub use pointer::DefinitionPointer;
pub use report::{Finding, Severity, ValidationReport};
