//! TripleStore - typed entity storage with write-through indexing
//!
//! The store owns the entity map and the [`IndexSet`] and commits changes
//! to both inside one critical section, so readers never observe an entity
//! without its index entries or vice versa.
//!
//! # Concurrency model
//!
//! - A per-entity mutex serializes mutations of the *same* entity for the
//!   whole validate + write + revision-bump span (released on every exit
//!   path, including validation failure).
//! - A store-wide `RwLock` guards the shared maps and is held only for the
//!   short install step, so mutations of *different* entities proceed
//!   concurrently.
//! - Readers take the read lock, clone `Arc<Entity>` snapshots and leave;
//!   they never block writers for longer than the install step and never
//!   see a partially-applied batch. Lock order is always entity mutex
//!   first, then the store lock.

use crate::entity::Entity;
use crate::error::{Result, StoreError};
use crate::index::IndexSet;
use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;
use twindb_core::{Iri, Triple, Value};
use twindb_ontology::{OntologyRegistry, SchemaViolation};
use twindb_vocab::rdf;

/// Shared state guarded by the store-wide lock
#[derive(Default)]
struct StoreInner {
    entities: HashMap<Iri, Arc<Entity>>,
    indexes: IndexSet,
}

/// Ontology-constrained entity store
pub struct TripleStore {
    registry: Arc<OntologyRegistry>,
    inner: RwLock<StoreInner>,
    /// Per-entity mutation locks, created on demand and kept for the life
    /// of the store (an entry outliving its entity is harmless)
    entity_locks: Mutex<HashMap<Iri, Arc<Mutex<()>>>>,
}

impl TripleStore {
    /// Create an empty store over a loaded ontology
    pub fn new(registry: Arc<OntologyRegistry>) -> Self {
        Self {
            registry,
            inner: RwLock::new(StoreInner::default()),
            entity_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The ontology this store validates against
    pub fn registry(&self) -> &Arc<OntologyRegistry> {
        &self.registry
    }

    /// Assert a single (predicate, value) pair on an entity
    ///
    /// Creates the entity when it does not exist, but only if `classes` is
    /// non-empty (`MissingClassAssignment` otherwise). On an existing
    /// entity, `classes` adds any new memberships. The pair is validated
    /// before any state changes; the write is all-or-nothing. Returns the
    /// entity's revision - unchanged when the pair was already current
    /// (idempotent re-upsert).
    ///
    /// `rdf:type` is not writable as a plain predicate; class membership
    /// flows through `classes`.
    pub fn upsert(
        &self,
        entity_id: &Iri,
        classes: &[Iri],
        predicate: &Iri,
        value: Value,
    ) -> Result<u64> {
        if *predicate == rdf::TYPE {
            return Err(SchemaViolation::UnknownProperty {
                predicate: predicate.clone(),
                classes: classes.to_vec(),
            }
            .into());
        }

        let lock = self.entity_lock(entity_id);
        let _guard = lock.lock();

        match self.get(entity_id) {
            None => {
                self.registry.validate_classes(entity_id, classes)?;
                self.registry.validate(classes, predicate, &value, &[])?;

                let mut entity = Entity::new(entity_id.clone(), classes.iter().cloned());
                entity.assert_value(predicate.clone(), value);
                let revision = entity.revision;
                self.install(Arc::new(entity), &[]);

                tracing::debug!(entity = %entity_id, revision, "entity created");
                Ok(revision)
            }
            Some(current) => {
                if !classes.is_empty() {
                    self.registry.validate_classes(entity_id, classes)?;
                }

                let new_classes: Vec<Iri> = classes
                    .iter()
                    .filter(|c| !current.instantiates(c))
                    .cloned()
                    .collect();

                // Idempotence: an already-current pair with no new classes
                // leaves the revision untouched.
                if new_classes.is_empty() && current.has_value(predicate, &value) {
                    return Ok(current.revision);
                }

                let mut union: Vec<Iri> = current.classes.to_vec();
                union.extend(new_classes.iter().cloned());
                self.registry
                    .validate(&union, predicate, &value, current.values(predicate))?;

                let mut next = (*current).clone();
                next.add_classes(&new_classes);
                next.assert_value(predicate.clone(), value);
                next.revision += 1;
                let revision = next.revision;

                let removed = current.triples();
                self.install(Arc::new(next), &removed);

                tracing::debug!(entity = %entity_id, revision, "entity upserted");
                Ok(revision)
            }
        }
    }

    /// Create an entity carrying only class memberships
    ///
    /// `classes` must be non-empty (`MissingClassAssignment`). Idempotent
    /// on an existing entity: new memberships are added with a revision
    /// bump, and an entity already holding every given class keeps its
    /// revision. Returns the entity's revision.
    pub fn create(&self, entity_id: &Iri, classes: &[Iri]) -> Result<u64> {
        let lock = self.entity_lock(entity_id);
        let _guard = lock.lock();

        self.registry.validate_classes(entity_id, classes)?;

        match self.get(entity_id) {
            None => {
                let entity = Entity::new(entity_id.clone(), classes.iter().cloned());
                let revision = entity.revision;
                self.install(Arc::new(entity), &[]);

                tracing::debug!(entity = %entity_id, revision, "entity created");
                Ok(revision)
            }
            Some(current) => {
                let new_classes: Vec<Iri> = classes
                    .iter()
                    .filter(|c| !current.instantiates(c))
                    .cloned()
                    .collect();
                if new_classes.is_empty() {
                    return Ok(current.revision);
                }

                let mut next = (*current).clone();
                next.add_classes(&new_classes);
                next.revision += 1;
                let revision = next.revision;

                let removed = current.triples();
                self.install(Arc::new(next), &removed);

                tracing::debug!(entity = %entity_id, revision, "classes added");
                Ok(revision)
            }
        }
    }

    /// Apply a batch of property replacements as a single unit
    ///
    /// Every (predicate, value) pair is validated before any write; any
    /// failure rejects the whole batch (`Schema`). When
    /// `expected_revision` is given and does not match, the batch is
    /// rejected with `ConcurrentModification` and nothing is applied. Each
    /// predicate's values are *replaced* by the given value. On success the
    /// revision increments exactly once regardless of batch size.
    pub fn apply_batch(
        &self,
        entity_id: &Iri,
        updates: &BTreeMap<Iri, Value>,
        expected_revision: Option<u64>,
    ) -> Result<u64> {
        let lock = self.entity_lock(entity_id);
        let _guard = lock.lock();

        let current = self
            .get(entity_id)
            .ok_or_else(|| StoreError::NotFound(entity_id.clone()))?;

        if let Some(expected) = expected_revision {
            if expected != current.revision {
                return Err(StoreError::ConcurrentModification {
                    entity: entity_id.clone(),
                    expected,
                    actual: current.revision,
                });
            }
        }

        // Validate the whole batch before touching anything. Replacement
        // semantics: the pair is checked against an empty current-value
        // list, so a single-valued property may change value.
        for (predicate, value) in updates {
            if *predicate == rdf::TYPE {
                return Err(SchemaViolation::UnknownProperty {
                    predicate: predicate.clone(),
                    classes: current.classes.to_vec(),
                }
                .into());
            }
            self.registry
                .validate(&current.classes, predicate, value, &[])?;
        }

        let mut next = (*current).clone();
        for (predicate, value) in updates {
            next.replace_value(predicate.clone(), value.clone());
        }
        next.revision += 1;
        let revision = next.revision;

        let removed = current.triples();
        self.install(Arc::new(next), &removed);

        tracing::debug!(entity = %entity_id, revision, updates = updates.len(), "batch applied");
        Ok(revision)
    }

    /// Snapshot handle to an entity
    pub fn get(&self, entity_id: &Iri) -> Option<Arc<Entity>> {
        self.inner.read().entities.get(entity_id).cloned()
    }

    /// Delete an entity, removing all its triples and index entries
    /// atomically
    pub fn delete(&self, entity_id: &Iri) -> Result<()> {
        let lock = self.entity_lock(entity_id);
        let _guard = lock.lock();

        let mut inner = self.inner.write();
        let Some(entity) = inner.entities.remove(entity_id) else {
            return Err(StoreError::NotFound(entity_id.clone()));
        };
        let triples = entity.triples();
        inner.indexes.remove_entity(&triples);

        tracing::debug!(entity = %entity_id, triples = triples.len(), "entity deleted");
        Ok(())
    }

    /// Iterate a snapshot of all entities, sorted by IRI
    ///
    /// Finite and restartable; a re-scan re-reads current state.
    pub fn scan(&self) -> impl Iterator<Item = Arc<Entity>> {
        let mut entities: Vec<Arc<Entity>> =
            self.inner.read().entities.values().cloned().collect();
        entities.sort_by(|a, b| a.id.cmp(&b.id));
        entities.into_iter()
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.inner.read().entities.len()
    }

    /// Whether the store holds no entities
    pub fn is_empty(&self) -> bool {
        self.inner.read().entities.is_empty()
    }

    /// Whether an entity exists
    pub fn contains(&self, entity_id: &Iri) -> bool {
        self.inner.read().entities.contains_key(entity_id)
    }

    /// Consistent point-in-time view of the entity map and indexes
    ///
    /// Query execution reads exclusively through snapshots, so a run is
    /// never exposed to concurrent commits mid-join.
    pub fn snapshot(&self) -> StoreSnapshot {
        let inner = self.inner.read();
        StoreSnapshot {
            entities: inner.entities.clone(),
            indexes: inner.indexes.clone(),
        }
    }

    /// Install an entity's successor state: swap the entity pointer and
    /// re-index the difference, all under the write lock (the commit point)
    fn install(&self, entity: Arc<Entity>, removed: &[Triple]) {
        let added = entity.triples();
        let mut inner = self.inner.write();
        inner.entities.insert(entity.id.clone(), entity);
        for triple in removed {
            if !added.contains(triple) {
                inner.indexes.remove(triple);
            }
        }
        for triple in &added {
            inner.indexes.insert(triple);
        }
    }

    /// Fetch or create the mutation lock for an entity
    fn entity_lock(&self, entity_id: &Iri) -> Arc<Mutex<()>> {
        let mut locks = self.entity_locks.lock();
        locks
            .entry(entity_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Point-in-time view of store state
///
/// Cheap to hold: entities are shared `Arc`s and index keys share their
/// interned IRIs with the live store.
#[derive(Clone)]
pub struct StoreSnapshot {
    entities: HashMap<Iri, Arc<Entity>>,
    indexes: IndexSet,
}

impl StoreSnapshot {
    /// Entity as of the snapshot
    pub fn get(&self, entity_id: &Iri) -> Option<&Arc<Entity>> {
        self.entities.get(entity_id)
    }

    /// Triples matching a partially-bound pattern as of the snapshot
    pub fn match_pattern(
        &self,
        s: Option<&Iri>,
        p: Option<&Iri>,
        o: Option<&Value>,
    ) -> Vec<Triple> {
        self.indexes.match_pattern(s, p, o)
    }

    /// Number of triples in the snapshot
    pub fn triple_count(&self) -> usize {
        self.indexes.len()
    }
}
