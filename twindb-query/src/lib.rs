//! Pattern queries over the triple store
//!
//! The pipeline has three stages, each usable on its own:
//!
//! 1. [`parse_query`] turns query text into a structured [`Query`] plus
//!    its [`VarRegistry`]
//! 2. [`plan`] validates predicates against the ontology and orders the
//!    patterns most-selective-first, pushing filters down to the earliest
//!    step that binds their variables
//! 3. [`execute`] runs the plan against a consistent store snapshot and
//!    lazily yields de-duplicated [`Binding`] rows
//!
//! [`run`] chains all three for callers holding query text:
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use twindb_ontology::OntologyRegistry;
//! # use twindb_store::TripleStore;
//! # use twindb_query::{run, PrefixMap};
//! # let store = TripleStore::new(Arc::new(OntologyRegistry::new()));
//! let prefixes = PrefixMap::new().with("ex", "http://example.org/");
//! let text = "SELECT ?s ?b WHERE { \
//!     ?s a ex:CommunicationsSatellite . \
//!     ?s ex:batteryLevel ?b . \
//!     FILTER(?b < 50) }";
//! for binding in run(text, &prefixes, &store)? {
//!     println!("{binding}");
//! }
//! # Ok::<(), twindb_query::QueryError>(())
//! ```

mod binding;
mod error;
mod execute;
mod ir;
mod parse;
mod pattern;
mod planner;
mod var_registry;

pub use binding::Binding;
pub use error::{ParseError, QueryError, Result};
pub use execute::{execute, Bindings};
pub use ir::{CompareOp, FilterExpr, Operand};
pub use parse::{parse_query, PrefixMap};
pub use pattern::{Query, Term, TriplePattern};
pub use planner::{plan, Plan, PlanStep};
pub use var_registry::{VarId, VarRegistry};

use twindb_store::TripleStore;

/// Parse, plan, and execute query text in one call
///
/// Planning errors surface before any enumeration starts; the returned
/// sequence itself cannot fail.
pub fn run(text: &str, prefixes: &PrefixMap, store: &TripleStore) -> Result<Bindings> {
    let (query, vars) = parse_query(text, prefixes)?;
    let plan = plan(&query, &vars, store.registry())?;
    Ok(execute(&plan, store))
}
