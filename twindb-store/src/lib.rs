//! Entity storage for twindb
//!
//! This crate pairs the two components a query never wants to see apart:
//!
//! - [`TripleStore`] - the canonical entity map with schema-validated,
//!   revision-counted mutations
//! - [`IndexSet`] - the three ordered triple indexes (SPO, POS, OSP) kept
//!   exactly current with the store inside the same commit
//!
//! Readers work against [`StoreSnapshot`]s; writers go through the store's
//! per-entity serialization. See the `store` module docs for the full
//! concurrency model.

pub mod comparator;
pub mod entity;
pub mod error;
pub mod index;
pub mod store;

pub use comparator::IndexType;
pub use entity::Entity;
pub use error::{Result, StoreError};
pub use index::IndexSet;
pub use store::{StoreSnapshot, TripleStore};
