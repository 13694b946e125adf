//! Ontology registry - schema lookups and mutation validation
//!
//! The registry holds every class and property definition and answers the
//! two questions the rest of the system asks:
//!
//! 1. *Is this predicate declared for this set of classes?* - the union of
//!    the declared properties of every assigned class, including everything
//!    inherited through parent chains.
//! 2. *Is this (predicate, value) pair legal here?* - datatype, cardinality
//!    and numeric-range checks, performed before any store mutation.
//!
//! The registry is read-mostly: it is loaded in a single-writer phase at
//! startup, then shared behind `Arc` with plain `&self` lookups. It is not
//! internally locked; concurrent loading is not supported or needed.

use crate::class::ClassDef;
use crate::error::{OntologyError, Result, SchemaViolation};
use crate::property::{Cardinality, PropertyDef};
use hashbrown::HashMap;
use twindb_core::{Iri, Value};

/// Registry of class and property definitions
#[derive(Debug, Default)]
pub struct OntologyRegistry {
    classes: HashMap<Iri, ClassDef>,
    properties: HashMap<Iri, PropertyDef>,
}

impl OntologyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class definition
    ///
    /// Re-registering an identical definition is a no-op; a different
    /// definition under the same IRI fails with `DuplicateDefinition`.
    /// A parent chain that loops back fails with `InheritanceCycle` and
    /// leaves the registry unchanged.
    pub fn register_class(&mut self, class: ClassDef) -> Result<()> {
        if let Some(existing) = self.classes.get(&class.iri) {
            if *existing == class {
                return Ok(());
            }
            return Err(OntologyError::DuplicateDefinition(class.iri));
        }

        self.check_no_cycle(&class)?;

        tracing::debug!(class = %class.iri, properties = class.properties.len(), "class registered");
        self.classes.insert(class.iri.clone(), class);
        Ok(())
    }

    /// Register a property definition
    ///
    /// Same idempotence rule as [`register_class`](Self::register_class).
    pub fn register_property(&mut self, property: PropertyDef) -> Result<()> {
        if let Some(existing) = self.properties.get(&property.iri) {
            if *existing == property {
                return Ok(());
            }
            return Err(OntologyError::DuplicateDefinition(property.iri));
        }

        tracing::debug!(property = %property.iri, datatype = %property.datatype, "property registered");
        self.properties.insert(property.iri.clone(), property);
        Ok(())
    }

    /// Look up a class definition
    pub fn resolve_class(&self, iri: &Iri) -> Option<&ClassDef> {
        self.classes.get(iri)
    }

    /// Look up a property definition
    pub fn resolve_property(&self, iri: &Iri) -> Option<&PropertyDef> {
        self.properties.get(iri)
    }

    /// Whether the predicate is declared for any of the given classes,
    /// directly or through a parent chain
    pub fn is_declared(&self, classes: &[Iri], predicate: &Iri) -> bool {
        classes
            .iter()
            .any(|class| self.chain(class).any(|c| c.declares(predicate)))
    }

    /// Whether any registered class declares the predicate
    ///
    /// Used by the query planner, which has a predicate but no entity in
    /// hand: a predicate no class declares can never match.
    pub fn is_declared_anywhere(&self, predicate: &Iri) -> bool {
        self.classes.values().any(|c| c.declares(predicate))
    }

    /// Iterate the union of declared properties for a set of classes,
    /// including inherited declarations
    pub fn declared_properties<'a>(
        &'a self,
        classes: &'a [Iri],
    ) -> impl Iterator<Item = &'a Iri> + 'a {
        classes
            .iter()
            .flat_map(move |class| self.chain(class).flat_map(|c| c.properties.iter()))
    }

    /// Validate a (predicate, value) assertion against the unioned schema of
    /// `classes`
    ///
    /// `current` is the entity's existing values for this predicate and
    /// feeds the cardinality check: a single-valued property may be
    /// re-asserted with its current value, but not given a second one.
    pub fn validate(
        &self,
        classes: &[Iri],
        predicate: &Iri,
        value: &Value,
        current: &[Value],
    ) -> std::result::Result<(), SchemaViolation> {
        if !self.is_declared(classes, predicate) {
            return Err(SchemaViolation::UnknownProperty {
                predicate: predicate.clone(),
                classes: classes.to_vec(),
            });
        }

        // is_declared passed, so the declaring class exists; the property
        // definition itself may still be unregistered (declared-by-name).
        let Some(def) = self.properties.get(predicate) else {
            return Err(SchemaViolation::UnknownProperty {
                predicate: predicate.clone(),
                classes: classes.to_vec(),
            });
        };

        if !def.datatype.admits(value) {
            return Err(SchemaViolation::TypeMismatch {
                predicate: predicate.clone(),
                expected: def.datatype,
                actual: value.datatype(),
                value: value.clone(),
            });
        }

        if let Some(range) = &def.range {
            if let Some(v) = value.as_f64() {
                if !range.contains(v) {
                    return Err(SchemaViolation::RangeViolation {
                        predicate: predicate.clone(),
                        value: value.clone(),
                        min: range.min,
                        max: range.max,
                    });
                }
            }
        }

        if def.cardinality == Cardinality::Single {
            if let Some(existing) = current.iter().find(|v| *v != value) {
                return Err(SchemaViolation::CardinalityViolation {
                    predicate: predicate.clone(),
                    existing: existing.clone(),
                });
            }
        }

        Ok(())
    }

    /// Check that every class in `classes` is registered and the set is
    /// non-empty; used when creating an entity
    pub fn validate_classes(
        &self,
        entity: &Iri,
        classes: &[Iri],
    ) -> std::result::Result<(), SchemaViolation> {
        if classes.is_empty() {
            return Err(SchemaViolation::MissingClassAssignment(entity.clone()));
        }
        for class in classes {
            if !self.classes.contains_key(class) {
                return Err(SchemaViolation::UnknownClass(class.clone()));
            }
        }
        Ok(())
    }

    /// Number of registered classes
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of registered properties
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Walk a class's parent chain, starting at the class itself
    ///
    /// Stops at unregistered parents. Registration rejects cycles, so the
    /// walk terminates.
    fn chain<'a>(&'a self, class: &'a Iri) -> ClassChain<'a> {
        ClassChain {
            registry: self,
            next: Some(class),
        }
    }

    /// Reject a registration whose parent chain would loop back to it
    ///
    /// Existing chains are acyclic by induction; only a chain passing
    /// through the new class can close a loop.
    fn check_no_cycle(&self, class: &ClassDef) -> Result<()> {
        let mut current = class.parent.as_ref();
        while let Some(parent) = current {
            if *parent == class.iri {
                return Err(OntologyError::InheritanceCycle(class.iri.clone()));
            }
            current = self.classes.get(parent).and_then(|c| c.parent.as_ref());
        }
        Ok(())
    }
}

/// Iterator over a class and its ancestors
struct ClassChain<'a> {
    registry: &'a OntologyRegistry,
    next: Option<&'a Iri>,
}

impl<'a> Iterator for ClassChain<'a> {
    type Item = &'a ClassDef;

    fn next(&mut self) -> Option<Self::Item> {
        let iri = self.next.take()?;
        let class = self.registry.classes.get(iri)?;
        self.next = class.parent.as_ref();
        Some(class)
    }
}
