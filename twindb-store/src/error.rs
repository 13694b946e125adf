//! Error types for twindb-store

use thiserror::Error;
use twindb_core::Iri;
use twindb_ontology::SchemaViolation;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store mutation errors
///
/// Every variant is detected before any state is mutated; a failed
/// operation leaves the store exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The ontology rejected the mutation
    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    /// Entity does not exist
    #[error("Entity not found: {0}")]
    NotFound(Iri),

    /// The entity's revision moved past the caller's expectation
    ///
    /// Surfaced for caller-driven retry; the store never retries
    /// internally.
    #[error("Concurrent modification of {entity}: expected revision {expected}, found {actual}")]
    ConcurrentModification {
        entity: Iri,
        expected: u64,
        actual: u64,
    },
}
