//! # Document Identity
//!
//! Every `SchemaDocument` receives a fresh `DocumentId` at construction.
//! Compiled schemas are cached per `(DocumentId, DefinitionPointer)`, so
//! the id is what ties a cached unit to the exact document instance it was
//! compiled from.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of one parsed schema document.
///
/// Ids are compared by value, but a new id is minted for every document, so
/// equal ids imply the same document instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    /// Mint a new identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "document:{}", self.0)
    }
}
