//! Triple - the query-facing projection of entity state
//!
//! An entity's property map is the canonical representation; every
//! (predicate, value) pair on an entity decomposes to exactly one triple
//! (multi-valued properties decompose to one triple per value), and class
//! memberships decompose to `rdf:type` triples. The ordered indexes and the
//! query engine only ever see triples.

use crate::iri::Iri;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use twindb_vocab::rdf;

/// A single (subject, predicate, object) fact
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Subject - the entity the fact is about
    pub s: Iri,
    /// Predicate - the property or relationship
    pub p: Iri,
    /// Object - literal value or entity reference
    pub o: Value,
}

impl Triple {
    /// Create a new triple
    pub fn new(s: Iri, p: Iri, o: Value) -> Self {
        Self { s, p, o }
    }

    /// Create an `rdf:type` triple linking an entity to a class
    pub fn class_membership(s: Iri, class: Iri) -> Self {
        Self {
            s,
            p: Iri::new(rdf::TYPE),
            o: Value::Ref(class),
        }
    }

    /// Whether this is an `rdf:type` triple
    pub fn is_class_membership(&self) -> bool {
        self.p == rdf::TYPE
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> <{}> {}", self.s, self.p, self.o)
    }
}
