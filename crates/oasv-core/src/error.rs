//! # Error Types
//!
//! Errors raised while constructing core types. Validation problems in a
//! payload are never errors; they are `Finding`s inside a report.

use thiserror::Error;

/// A string could not be turned into a `DefinitionPointer`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// The pointer text was empty. The empty pointer addresses the whole
    /// document, which is never a definition.
    #[error("definition pointer is empty")]
    Empty,

    /// The pointer text does not start with `/`.
    #[error("definition pointer '{0}' must start with '/'")]
    MissingLeadingSlash(String),

    /// A `~` escape other than `~0` or `~1` was found.
    #[error("definition pointer '{pointer}' has an invalid escape at byte {offset}")]
    InvalidEscape {
        /// The offending pointer text.
        pointer: String,
        /// Byte offset of the `~`.
        offset: usize,
    },
}
