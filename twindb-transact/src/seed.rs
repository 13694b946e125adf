//! Dataset seeding from JSON documents
//!
//! A seed document declares the ontology and an initial entity population
//! in one file:
//!
//! ```json
//! {
//!   "classes": [
//!     { "iri": "http://example.org/CommunicationsSatellite",
//!       "properties": ["http://example.org/batteryLevel"] }
//!   ],
//!   "properties": [
//!     { "iri": "http://example.org/batteryLevel",
//!       "datatype": "float",
//!       "range": { "min": 0.0, "max": 100.0 } }
//!   ],
//!   "entities": [
//!     { "id": "http://example.org/sat-1",
//!       "classes": ["http://example.org/CommunicationsSatellite"],
//!       "properties": { "http://example.org/batteryLevel": 73.5 } }
//!   ]
//! }
//! ```
//!
//! Property values are plain JSON scalars coerced against the declared
//! datatype; an array seeds a multi-valued property one assertion at a
//! time. Entities are applied in ascending id order so a document always
//! seeds the same way, each entity's class memberships before its
//! properties (an entity with no properties still materializes). On
//! failure the resulting error names the entity and property at fault;
//! earlier entities stay applied.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value as Json;

use crate::coordinator::UpdateCoordinator;
use crate::error::{Result, TransactError};
use twindb_core::{Datatype, Iri, Value};
use twindb_ontology::{ClassDef, OntologyRegistry, PropertyDef, SchemaViolation};
use twindb_store::{StoreError, TripleStore};
use twindb_vocab::rdf;

/// A parsed seed document
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SeedDataset {
    #[serde(default)]
    pub classes: Vec<ClassDef>,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
    #[serde(default)]
    pub entities: Vec<SeedEntity>,
}

/// One entity in a seed document
#[derive(Clone, Debug, Deserialize)]
pub struct SeedEntity {
    pub id: Iri,
    pub classes: Vec<Iri>,
    #[serde(default)]
    pub properties: BTreeMap<Iri, Json>,
}

impl SeedDataset {
    /// Parse a seed document from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Register the document's classes and properties into a fresh registry
    pub fn build_registry(&self) -> Result<OntologyRegistry> {
        let mut registry = OntologyRegistry::new();
        for class in &self.classes {
            registry.register_class(class.clone())?;
        }
        for property in &self.properties {
            registry.register_property(property.clone())?;
        }
        tracing::debug!(
            classes = registry.class_count(),
            properties = registry.property_count(),
            "registry seeded"
        );
        Ok(registry)
    }

    /// Build the registry, stand up a store, and seed every entity
    pub fn bootstrap(&self) -> Result<UpdateCoordinator> {
        let registry = Arc::new(self.build_registry()?);
        let coordinator = UpdateCoordinator::new(Arc::new(TripleStore::new(registry)));
        self.populate(&coordinator)?;
        Ok(coordinator)
    }

    /// Seed the document's entities through the coordinator
    ///
    /// Returns the number of entities seeded.
    pub fn populate(&self, coordinator: &UpdateCoordinator) -> Result<usize> {
        let mut entities: Vec<&SeedEntity> = self.entities.iter().collect();
        entities.sort_by(|a, b| a.id.cmp(&b.id));

        for entity in &entities {
            // Class memberships first, so an entity with no properties
            // still materializes.
            coordinator
                .create(&entity.id, &entity.classes)
                .map_err(|err| seed_context(err, entity, &Iri::new(rdf::TYPE)))?;
            for (predicate, json) in &entity.properties {
                self.seed_property(coordinator, entity, predicate, json)?;
            }
        }
        tracing::debug!(entities = entities.len(), "dataset seeded");
        Ok(entities.len())
    }

    fn seed_property(
        &self,
        coordinator: &UpdateCoordinator,
        entity: &SeedEntity,
        predicate: &Iri,
        json: &Json,
    ) -> Result<()> {
        let registry = coordinator.store().registry();
        let Some(property) = registry.resolve_property(predicate) else {
            return Err(TransactError::Seed {
                entity: entity.id.clone(),
                predicate: predicate.clone(),
                source: StoreError::Schema(SchemaViolation::UnknownProperty {
                    predicate: predicate.clone(),
                    classes: entity.classes.clone(),
                }),
            });
        };

        let scalars: Vec<&Json> = match json {
            Json::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        for scalar in scalars {
            let value = coerce(property.datatype, scalar).ok_or_else(|| {
                TransactError::SeedValue {
                    entity: entity.id.clone(),
                    predicate: predicate.clone(),
                    expected: property.datatype,
                    found: scalar.to_string(),
                }
            })?;
            coordinator
                .assert(&entity.id, &entity.classes, predicate, value)
                .map_err(|err| seed_context(err, entity, predicate))?;
        }
        Ok(())
    }
}

/// Coerce a JSON scalar into the property's declared datatype
fn coerce(datatype: Datatype, json: &Json) -> Option<Value> {
    match (datatype, json) {
        (Datatype::String, Json::String(s)) => Some(Value::String(s.clone())),
        (Datatype::Ref, Json::String(s)) => Some(Value::Ref(Iri::new(s))),
        (Datatype::Boolean, Json::Bool(b)) => Some(Value::Boolean(*b)),
        (Datatype::Integer, Json::Number(n)) => n.as_i64().map(Value::Integer),
        (Datatype::Float, Json::Number(n)) => n.as_f64().map(Value::Float),
        _ => None,
    }
}

fn seed_context(err: TransactError, entity: &SeedEntity, predicate: &Iri) -> TransactError {
    match err {
        TransactError::Store(source) => TransactError::Seed {
            entity: entity.id.clone(),
            predicate: predicate.clone(),
            source,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "classes": [
            { "iri": "http://example.org/CommunicationsSatellite",
              "properties": [
                  "http://example.org/batteryLevel",
                  "http://example.org/name",
                  "http://example.org/groundStation"
              ] },
            { "iri": "http://example.org/GroundStation",
              "properties": ["http://example.org/name"] }
        ],
        "properties": [
            { "iri": "http://example.org/batteryLevel",
              "datatype": "float",
              "range": { "min": 0.0, "max": 100.0 } },
            { "iri": "http://example.org/name", "datatype": "string" },
            { "iri": "http://example.org/groundStation",
              "datatype": "ref",
              "cardinality": "multi" }
        ],
        "entities": [
            { "id": "http://example.org/sat-1",
              "classes": ["http://example.org/CommunicationsSatellite"],
              "properties": {
                  "http://example.org/batteryLevel": 73.5,
                  "http://example.org/name": "Meridian 9",
                  "http://example.org/groundStation": [
                      "http://example.org/gs-1",
                      "http://example.org/gs-2"
                  ]
              } },
            { "id": "http://example.org/gs-1",
              "classes": ["http://example.org/GroundStation"],
              "properties": { "http://example.org/name": "Svalbard" } },
            { "id": "http://example.org/gs-2",
              "classes": ["http://example.org/GroundStation"],
              "properties": { "http://example.org/name": "Kiruna" } }
        ]
    }"#;

    fn iri(s: &str) -> Iri {
        Iri::new(s)
    }

    #[test]
    fn test_bootstrap_from_document() {
        let dataset = SeedDataset::from_json(DOC).unwrap();
        let coordinator = dataset.bootstrap().unwrap();
        let store = coordinator.store();

        assert_eq!(store.len(), 3);
        let sat = store.get(&iri("http://example.org/sat-1")).unwrap();
        assert!(sat.has_value(
            &iri("http://example.org/batteryLevel"),
            &Value::Float(73.5)
        ));
        assert_eq!(
            sat.values(&iri("http://example.org/groundStation")).len(),
            2
        );
    }

    #[test]
    fn test_class_only_entity_is_created() {
        let mut dataset = SeedDataset::from_json(DOC).unwrap();
        dataset.entities.push(SeedEntity {
            id: iri("http://example.org/sat-2"),
            classes: vec![iri("http://example.org/CommunicationsSatellite")],
            properties: BTreeMap::new(),
        });

        let coordinator = dataset.bootstrap().unwrap();
        let store = coordinator.store();
        assert_eq!(store.len(), 4);
        let sat = store.get(&iri("http://example.org/sat-2")).unwrap();
        assert!(sat.instantiates(&iri("http://example.org/CommunicationsSatellite")));
        assert_eq!(sat.revision, 1);
    }

    #[test]
    fn test_entity_without_classes_fails_seeding() {
        let mut dataset = SeedDataset::from_json(DOC).unwrap();
        dataset.entities.push(SeedEntity {
            id: iri("http://example.org/adrift"),
            classes: Vec::new(),
            properties: BTreeMap::new(),
        });

        let err = dataset.bootstrap().unwrap_err();
        match err {
            TransactError::Seed { entity, source, .. } => {
                assert_eq!(entity, iri("http://example.org/adrift"));
                assert!(matches!(
                    source,
                    StoreError::Schema(SchemaViolation::MissingClassAssignment(_))
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_out_of_range_seed_names_the_culprit() {
        let mut dataset = SeedDataset::from_json(DOC).unwrap();
        dataset.entities[0]
            .properties
            .insert(iri("http://example.org/batteryLevel"), Json::from(250.0));

        let err = dataset.bootstrap().unwrap_err();
        match err {
            TransactError::Seed {
                entity, predicate, ..
            } => {
                assert_eq!(entity, iri("http://example.org/sat-1"));
                assert_eq!(predicate, iri("http://example.org/batteryLevel"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_json_type_is_a_seed_value_error() {
        let mut dataset = SeedDataset::from_json(DOC).unwrap();
        dataset.entities[0]
            .properties
            .insert(iri("http://example.org/name"), Json::from(7));

        let err = dataset.bootstrap().unwrap_err();
        assert!(matches!(
            err,
            TransactError::SeedValue {
                expected: Datatype::String,
                ..
            }
        ));
    }

    #[test]
    fn test_undeclared_property_rejected() {
        let mut dataset = SeedDataset::from_json(DOC).unwrap();
        dataset.entities[0]
            .properties
            .insert(iri("http://example.org/warpFactor"), Json::from(9));

        let err = dataset.bootstrap().unwrap_err();
        assert!(matches!(err, TransactError::Seed { .. }));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let err = SeedDataset::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TransactError::Parse(_)));
    }

    #[test]
    fn test_integer_datatype_rejects_fractions() {
        assert_eq!(
            coerce(Datatype::Integer, &Json::from(2.5)),
            None
        );
        assert_eq!(
            coerce(Datatype::Integer, &Json::from(7)),
            Some(Value::Integer(7))
        );
        // floats accept integral JSON numbers
        assert_eq!(
            coerce(Datatype::Float, &Json::from(7)),
            Some(Value::Float(7.0))
        );
    }
}
