//! Core data model for twindb
//!
//! This crate defines the vocabulary-independent building blocks shared by
//! every other twindb crate:
//!
//! - [`Iri`] - interned identifier for entities, classes and properties
//! - [`Value`] - polymorphic object value (literal or entity reference)
//! - [`Datatype`] - the declared type a property constrains its values to
//! - [`Triple`] - the (subject, predicate, object) projection of entity state
//!
//! It carries no storage, schema or query logic; those live in
//! `twindb-store`, `twindb-ontology` and `twindb-query` respectively.

pub mod iri;
pub mod triple;
pub mod value;

pub use iri::Iri;
pub use triple::Triple;
pub use value::{Datatype, Value};
