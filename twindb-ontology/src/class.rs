//! Class definitions
//!
//! A class names the properties its instances may carry. Classes support
//! single inheritance of *declarations*: a subclass's instances may carry
//! everything the parent chain declares. Entities themselves may instantiate
//! several classes at once (multi-typing), which unions the declarations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use twindb_core::Iri;

/// A class definition in the ontology
///
/// Immutable after registration (schema is append-only).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Class identifier
    pub iri: Iri,
    /// Optional single parent class; declarations are inherited transitively
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Iri>,
    /// Properties declared directly on this class (not including inherited)
    #[serde(default)]
    pub properties: BTreeSet<Iri>,
}

impl ClassDef {
    /// Create a class with no parent and no declared properties
    pub fn new(iri: impl Into<Iri>) -> Self {
        Self {
            iri: iri.into(),
            parent: None,
            properties: BTreeSet::new(),
        }
    }

    /// Set the parent class
    pub fn with_parent(mut self, parent: impl Into<Iri>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Declare a property on this class
    pub fn with_property(mut self, property: impl Into<Iri>) -> Self {
        self.properties.insert(property.into());
        self
    }

    /// Whether this class directly declares the property
    pub fn declares(&self, property: &Iri) -> bool {
        self.properties.contains(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let class = ClassDef::new("http://example.org/CommunicationsSatellite")
            .with_parent("http://example.org/Satellite")
            .with_property("http://example.org/batteryLevel")
            .with_property("http://example.org/transponderCount");

        assert_eq!(class.parent.as_ref().unwrap(), "http://example.org/Satellite");
        assert_eq!(class.properties.len(), 2);
        assert!(class.declares(&Iri::new("http://example.org/batteryLevel")));
        assert!(!class.declares(&Iri::new("http://example.org/mass")));
    }
}
