//! Batch update coordination
//!
//! [`UpdateCoordinator`] is the write front door: callers describe a batch
//! of property replacements for one entity, optionally pinned to an
//! expected revision, and the coordinator applies it atomically. A batch
//! either commits in full with a single revision bump or leaves the entity
//! untouched.
//!
//! Revision pinning gives read-modify-write callers optimistic
//! concurrency: read the entity, build a batch against its revision, and
//! retry from a fresh read if the commit reports a conflict.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::Result;
use twindb_core::{Iri, Value};
use twindb_store::{StoreError, TripleStore};

/// A set of property replacements for one entity
///
/// Built incrementally; later [`set`](UpdateBatch::set) calls for the same
/// predicate overwrite earlier ones.
#[derive(Clone, Debug)]
pub struct UpdateBatch {
    entity: Iri,
    updates: BTreeMap<Iri, Value>,
    expected_revision: Option<u64>,
}

impl UpdateBatch {
    /// Start an empty batch for the given entity
    pub fn new(entity: impl Into<Iri>) -> Self {
        Self {
            entity: entity.into(),
            updates: BTreeMap::new(),
            expected_revision: None,
        }
    }

    /// Replace the values of `predicate` with `value`
    pub fn set(mut self, predicate: impl Into<Iri>, value: impl Into<Value>) -> Self {
        self.updates.insert(predicate.into(), value.into());
        self
    }

    /// Commit only if the entity is still at `revision`
    pub fn expecting_revision(mut self, revision: u64) -> Self {
        self.expected_revision = Some(revision);
        self
    }

    /// The entity this batch targets
    pub fn entity(&self) -> &Iri {
        &self.entity
    }

    /// Number of properties the batch replaces
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Whether the batch replaces nothing
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Serializes writes through the store with commit/conflict logging
#[derive(Clone)]
pub struct UpdateCoordinator {
    store: Arc<TripleStore>,
}

impl std::fmt::Debug for UpdateCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateCoordinator")
            .field("entities", &self.store.len())
            .finish_non_exhaustive()
    }
}

impl UpdateCoordinator {
    pub fn new(store: Arc<TripleStore>) -> Self {
        Self { store }
    }

    /// The store this coordinator writes through
    pub fn store(&self) -> &Arc<TripleStore> {
        &self.store
    }

    /// Create an entity carrying only class memberships
    ///
    /// Returns the entity's revision; idempotent when the entity already
    /// holds every given class.
    pub fn create(&self, entity: &Iri, classes: &[Iri]) -> Result<u64> {
        let revision = self.store.create(entity, classes)?;
        tracing::debug!(%entity, revision, "created");
        Ok(revision)
    }

    /// Assert a single property value, creating the entity if needed
    ///
    /// Returns the entity's revision after the write.
    pub fn assert(
        &self,
        entity: &Iri,
        classes: &[Iri],
        predicate: &Iri,
        value: Value,
    ) -> Result<u64> {
        let revision = self.store.upsert(entity, classes, predicate, value)?;
        tracing::debug!(%entity, %predicate, revision, "asserted");
        Ok(revision)
    }

    /// Apply a batch atomically, returning the committed revision
    ///
    /// All replacements validate against the ontology before any state
    /// changes; on failure or revision conflict the entity is untouched.
    pub fn apply(&self, batch: &UpdateBatch) -> Result<u64> {
        let span = tracing::debug_span!(
            "apply_batch",
            entity = %batch.entity,
            properties = batch.updates.len(),
        );
        let _enter = span.enter();

        match self
            .store
            .apply_batch(&batch.entity, &batch.updates, batch.expected_revision)
        {
            Ok(revision) => {
                tracing::debug!(revision, "batch committed");
                Ok(revision)
            }
            Err(StoreError::ConcurrentModification {
                entity,
                expected,
                actual,
            }) => {
                tracing::warn!(%entity, expected, actual, "revision conflict");
                Err(StoreError::ConcurrentModification {
                    entity,
                    expected,
                    actual,
                }
                .into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Remove an entity and every triple it contributed
    pub fn retract(&self, entity: &Iri) -> Result<()> {
        self.store.delete(entity)?;
        tracing::debug!(%entity, "retracted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransactError;
    use twindb_core::Datatype;
    use twindb_ontology::{ClassDef, NumericRange, OntologyRegistry, PropertyDef};

    fn ex(local: &str) -> Iri {
        Iri::new(format!("http://example.org/{local}"))
    }

    fn coordinator() -> UpdateCoordinator {
        let mut registry = OntologyRegistry::new();
        registry
            .register_class(
                ClassDef::new(ex("Satellite"))
                    .with_property(ex("batteryLevel"))
                    .with_property(ex("name")),
            )
            .unwrap();
        registry
            .register_property(
                PropertyDef::new(ex("batteryLevel"), Datatype::Float)
                    .with_range(NumericRange::new(0.0, 100.0)),
            )
            .unwrap();
        registry
            .register_property(PropertyDef::new(ex("name"), Datatype::String))
            .unwrap();
        UpdateCoordinator::new(Arc::new(TripleStore::new(Arc::new(registry))))
    }

    #[test]
    fn test_batch_commits_with_single_bump() {
        let coordinator = coordinator();
        let sat = ex("sat-1");
        let classes = [ex("Satellite")];
        coordinator
            .assert(&sat, &classes, &ex("batteryLevel"), Value::Float(73.5))
            .unwrap();

        let batch = UpdateBatch::new(sat.clone())
            .set(ex("batteryLevel"), 42.0)
            .set(ex("name"), "Meridian 9");
        let revision = coordinator.apply(&batch).unwrap();
        assert_eq!(revision, 2);

        let entity = coordinator.store().get(&sat).unwrap();
        assert_eq!(entity.revision, 2);
        assert!(entity.has_value(&ex("batteryLevel"), &Value::Float(42.0)));
    }

    #[test]
    fn test_stale_revision_is_a_conflict() {
        let coordinator = coordinator();
        let sat = ex("sat-1");
        coordinator
            .assert(&sat, &[ex("Satellite")], &ex("batteryLevel"), Value::Float(50.0))
            .unwrap();
        coordinator
            .apply(&UpdateBatch::new(sat.clone()).set(ex("batteryLevel"), 60.0))
            .unwrap();

        let stale = UpdateBatch::new(sat.clone())
            .set(ex("batteryLevel"), 10.0)
            .expecting_revision(1);
        let err = coordinator.apply(&stale).unwrap_err();
        assert!(matches!(
            err,
            TransactError::Store(StoreError::ConcurrentModification {
                expected: 1,
                actual: 2,
                ..
            })
        ));

        // losing batch left no trace
        let entity = coordinator.store().get(&sat).unwrap();
        assert!(entity.has_value(&ex("batteryLevel"), &Value::Float(60.0)));
    }

    #[test]
    fn test_failing_batch_touches_nothing() {
        let coordinator = coordinator();
        let sat = ex("sat-1");
        coordinator
            .assert(&sat, &[ex("Satellite")], &ex("batteryLevel"), Value::Float(50.0))
            .unwrap();

        let bad = UpdateBatch::new(sat.clone())
            .set(ex("name"), "Meridian 9")
            .set(ex("batteryLevel"), 250.0); // out of range
        assert!(coordinator.apply(&bad).is_err());

        let entity = coordinator.store().get(&sat).unwrap();
        assert_eq!(entity.revision, 1);
        assert!(entity.values(&ex("name")).is_empty());
    }

    #[test]
    fn test_retract_unknown_entity() {
        let coordinator = coordinator();
        let err = coordinator.retract(&ex("ghost")).unwrap_err();
        assert!(matches!(
            err,
            TransactError::Store(StoreError::NotFound(_))
        ));
    }
}
