//! Entity - a typed digital twin
//!
//! An entity is the canonical unit of storage: a stable identifier, the set
//! of classes it instantiates, a property map, and a revision counter for
//! optimistic concurrency. Triples are a projection of this state, never
//! stored independently of it.
//!
//! Entities handed out by the store are immutable snapshots behind `Arc`;
//! mutation happens by building a successor entity and installing it
//! atomically together with its index updates.

use serde::Serialize;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use twindb_core::{Iri, Triple, Value};

/// A typed, identified, versioned record
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Entity {
    /// Stable identifier
    pub id: Iri,
    /// Classes this entity instantiates; non-empty by construction
    pub classes: SmallVec<[Iri; 2]>,
    /// Property values, keyed by predicate; every value list is non-empty
    pub properties: BTreeMap<Iri, Vec<Value>>,
    /// Monotonically increasing revision, bumped once per successful mutation
    pub revision: u64,
}

impl Entity {
    /// First revision assigned on entity creation
    pub const INITIAL_REVISION: u64 = 1;

    /// Create a new entity with the given classes and no properties
    pub fn new(id: Iri, classes: impl IntoIterator<Item = Iri>) -> Self {
        Self {
            id,
            classes: classes.into_iter().collect(),
            properties: BTreeMap::new(),
            revision: Self::INITIAL_REVISION,
        }
    }

    /// Current values for a predicate (empty slice if unset)
    pub fn values(&self, predicate: &Iri) -> &[Value] {
        self.properties.get(predicate).map_or(&[], Vec::as_slice)
    }

    /// Whether the entity currently holds exactly this (predicate, value) pair
    pub fn has_value(&self, predicate: &Iri, value: &Value) -> bool {
        self.values(predicate).contains(value)
    }

    /// Whether the entity instantiates the class
    pub fn instantiates(&self, class: &Iri) -> bool {
        self.classes.contains(class)
    }

    /// Assert a value for a predicate
    ///
    /// Appends if the value is not already present; the caller is
    /// responsible for schema validation (cardinality included) beforehand.
    pub(crate) fn assert_value(&mut self, predicate: Iri, value: Value) {
        let values = self.properties.entry(predicate).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    /// Replace all values for a predicate with a single value
    pub(crate) fn replace_value(&mut self, predicate: Iri, value: Value) {
        self.properties.insert(predicate, vec![value]);
    }

    /// Add class memberships not already present
    pub(crate) fn add_classes(&mut self, classes: &[Iri]) {
        for class in classes {
            if !self.classes.contains(class) {
                self.classes.push(class.clone());
            }
        }
    }

    /// Project the entity into triples: one `rdf:type` triple per class and
    /// one triple per property value
    pub fn triples(&self) -> Vec<Triple> {
        let mut out =
            Vec::with_capacity(self.classes.len() + self.properties.values().map(Vec::len).sum::<usize>());
        for class in &self.classes {
            out.push(Triple::class_membership(self.id.clone(), class.clone()));
        }
        for (predicate, values) in &self.properties {
            for value in values {
                out.push(Triple::new(self.id.clone(), predicate.clone(), value.clone()));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::new(format!("http://example.org/{s}"))
    }

    #[test]
    fn test_triple_projection() {
        let mut entity = Entity::new(iri("sat-0001"), [iri("CommunicationsSatellite")]);
        entity.assert_value(iri("batteryLevel"), Value::Float(92.0));
        entity.assert_value(iri("payload"), Value::Ref(iri("pl-1")));
        entity.assert_value(iri("payload"), Value::Ref(iri("pl-2")));

        let triples = entity.triples();
        // 1 class triple + 1 battery + 2 payloads
        assert_eq!(triples.len(), 4);
        assert_eq!(triples.iter().filter(|t| t.is_class_membership()).count(), 1);
        assert_eq!(
            triples.iter().filter(|t| t.p == iri("payload")).count(),
            2
        );
    }

    #[test]
    fn test_assert_value_is_set_like() {
        let mut entity = Entity::new(iri("gs-1"), [iri("GroundStation")]);
        entity.assert_value(iri("band"), Value::from("S"));
        entity.assert_value(iri("band"), Value::from("S"));
        assert_eq!(entity.values(&iri("band")).len(), 1);
    }

    #[test]
    fn test_replace_value() {
        let mut entity = Entity::new(iri("sat-0001"), [iri("CommunicationsSatellite")]);
        entity.assert_value(iri("batteryLevel"), Value::Float(92.0));
        entity.replace_value(iri("batteryLevel"), Value::Float(42.0));
        assert_eq!(entity.values(&iri("batteryLevel")), &[Value::Float(42.0)]);
    }
}
