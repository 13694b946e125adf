//! Error types for twindb-ontology

use thiserror::Error;
use twindb_core::{Datatype, Iri, Value};

/// Result type alias for registration operations
pub type Result<T> = std::result::Result<T, OntologyError>;

/// Errors raised while loading the ontology
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OntologyError {
    /// An identifier is already registered with a different definition.
    /// Idempotent re-registration of an identical definition succeeds.
    #[error("Duplicate definition: {0} is already registered with a different definition")]
    DuplicateDefinition(Iri),

    /// A class parent chain loops back on itself
    #[error("Inheritance cycle involving class {0}")]
    InheritanceCycle(Iri),
}

/// A schema constraint rejected an entity mutation
///
/// Detected before any state is mutated; a violation always leaves the
/// entity unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaViolation {
    /// The predicate is not declared for any of the entity's classes
    #[error("Unknown property {predicate} for entity classes {classes:?}")]
    UnknownProperty {
        predicate: Iri,
        classes: Vec<Iri>,
    },

    /// The value's runtime type disagrees with the declared datatype
    #[error("Type mismatch for {predicate}: expected {expected}, got {actual} ({value})")]
    TypeMismatch {
        predicate: Iri,
        expected: Datatype,
        actual: Datatype,
        value: Value,
    },

    /// A single-valued property already holds a different value
    #[error("Cardinality violation: {predicate} is single-valued and already holds {existing}")]
    CardinalityViolation {
        predicate: Iri,
        existing: Value,
    },

    /// A numeric value falls outside the property's declared range
    #[error("Range violation for {predicate}: {value} outside [{min:?}, {max:?}]")]
    RangeViolation {
        predicate: Iri,
        value: Value,
        min: Option<f64>,
        max: Option<f64>,
    },

    /// Entity creation was attempted without any class assignment
    #[error("Missing class assignment for entity {0}")]
    MissingClassAssignment(Iri),

    /// A class assignment names a class the registry has never seen
    #[error("Unknown class {0}")]
    UnknownClass(Iri),
}
