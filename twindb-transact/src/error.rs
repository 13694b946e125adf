//! Error types for update coordination and seeding

use thiserror::Error;
use twindb_core::{Datatype, Iri};
use twindb_ontology::OntologyError;
use twindb_store::StoreError;

/// Result type alias using TransactError
pub type Result<T> = std::result::Result<T, TransactError>;

/// Errors from update coordination and dataset seeding
#[derive(Error, Debug)]
pub enum TransactError {
    /// A store write was rejected; the underlying error carries schema,
    /// missing-entity, or revision-conflict detail
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An ontology definition in a seed document was rejected
    #[error(transparent)]
    Ontology(#[from] OntologyError),

    /// A seed assertion was rejected; the error names the failing entity
    /// and property so the document can be corrected
    #[error("seeding entity {entity} failed on property {predicate}")]
    Seed {
        entity: Iri,
        predicate: Iri,
        #[source]
        source: StoreError,
    },

    /// A seed value cannot be represented in the property's declared
    /// datatype
    #[error("seed value for {predicate} on entity {entity} is not a valid {expected}: {found}")]
    SeedValue {
        entity: Iri,
        predicate: Iri,
        expected: Datatype,
        found: String,
    },

    /// The seed document is not valid JSON for the expected shape
    #[error("invalid seed document: {0}")]
    Parse(#[from] serde_json::Error),
}
