//! Ontology registry for twindb
//!
//! Holds the schema - class and property definitions - that constrains what
//! entities and triples are legal, and performs the validation the store
//! runs before every mutation.
//!
//! The schema is append-only: definitions are loaded in a single-writer
//! phase at startup and never removed or retyped afterwards, so stored
//! entities can never be invalidated by schema change. The loaded registry
//! is shared behind `Arc` and read without locking.

pub mod class;
pub mod error;
pub mod property;
pub mod registry;

pub use class::ClassDef;
pub use error::{OntologyError, Result, SchemaViolation};
pub use property::{Cardinality, NumericRange, PropertyDef};
pub use registry::OntologyRegistry;
