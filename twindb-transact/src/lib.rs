//! Write coordination for twindb
//!
//! Two front doors onto the store's write path:
//!
//! - [`UpdateCoordinator`] applies single assertions and atomic
//!   [`UpdateBatch`]es, with optional revision pinning for optimistic
//!   read-modify-write loops
//! - [`SeedDataset`] loads an ontology and initial entity population from
//!   a JSON document, deterministically
//!
//! Reads never go through this crate; queries take snapshots directly
//! from the store.

mod coordinator;
mod error;
mod seed;

pub use coordinator::{UpdateBatch, UpdateCoordinator};
pub use error::{Result, TransactError};
pub use seed::{SeedDataset, SeedEntity};
