//! Ordered triple indexes
//!
//! [`IndexSet`] maintains the three orderings described in
//! [`comparator`](crate::comparator) as `BTreeSet`s of per-index key
//! wrappers. It is a thin structural oracle: it answers "which current
//! triples match this partially-bound pattern" and nothing else.
//!
//! The single invariant: all three orderings are updated inside the same
//! store critical section as the entity map, so after any committed
//! mutation they reflect exactly the current triple set.
//!
//! ## Range bounds
//!
//! Key components are wrapped in [`Bounded`], whose `Min`/`Max` variants
//! sort strictly below/above every exact component. Wildcard slots in a
//! probe become `Min..=Max` spans of the key space, so no sentinel IRI or
//! sentinel value can collide with real data.

use crate::comparator::IndexType;
use std::collections::BTreeSet;
use twindb_core::{Iri, Triple, Value};

/// A key component that is either an exact value or a range endpoint
///
/// Derived `Ord` gives `Min < Exact(_) < Max` with exact components ordered
/// among themselves, which is exactly the bound semantics range probes need.
/// Stored keys are always all-`Exact`; `Min`/`Max` appear only in probe
/// endpoints.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Bounded<T: Ord> {
    Min,
    Exact(T),
    Max,
}

impl<T: Ord + Clone> Bounded<T> {
    fn exact(&self) -> Option<T> {
        match self {
            Bounded::Exact(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Lower/upper endpoints for an optionally bound probe slot
    fn endpoints(slot: Option<&T>) -> (Self, Self) {
        match slot {
            Some(v) => (Bounded::Exact(v.clone()), Bounded::Exact(v.clone())),
            None => (Bounded::Min, Bounded::Max),
        }
    }
}

/// Subject-Predicate-Object key
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SpoKey(Bounded<Iri>, Bounded<Iri>, Bounded<Value>);

impl SpoKey {
    fn from_triple(t: &Triple) -> Self {
        Self(
            Bounded::Exact(t.s.clone()),
            Bounded::Exact(t.p.clone()),
            Bounded::Exact(t.o.clone()),
        )
    }

    fn triple(&self) -> Option<Triple> {
        Some(Triple {
            s: self.0.exact()?,
            p: self.1.exact()?,
            o: self.2.exact()?,
        })
    }
}

/// Predicate-Object-Subject key
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct PosKey(Bounded<Iri>, Bounded<Value>, Bounded<Iri>);

impl PosKey {
    fn from_triple(t: &Triple) -> Self {
        Self(
            Bounded::Exact(t.p.clone()),
            Bounded::Exact(t.o.clone()),
            Bounded::Exact(t.s.clone()),
        )
    }

    fn triple(&self) -> Option<Triple> {
        Some(Triple {
            s: self.2.exact()?,
            p: self.0.exact()?,
            o: self.1.exact()?,
        })
    }
}

/// Object-Subject-Predicate key
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OspKey(Bounded<Value>, Bounded<Iri>, Bounded<Iri>);

impl OspKey {
    fn from_triple(t: &Triple) -> Self {
        Self(
            Bounded::Exact(t.o.clone()),
            Bounded::Exact(t.s.clone()),
            Bounded::Exact(t.p.clone()),
        )
    }

    fn triple(&self) -> Option<Triple> {
        Some(Triple {
            s: self.1.exact()?,
            p: self.2.exact()?,
            o: self.0.exact()?,
        })
    }
}

/// The three ordered index structures over the current triple set
#[derive(Clone, Debug, Default)]
pub struct IndexSet {
    spo: BTreeSet<SpoKey>,
    pos: BTreeSet<PosKey>,
    osp: BTreeSet<OspKey>,
}

impl IndexSet {
    /// Create an empty index set
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed triples
    pub fn len(&self) -> usize {
        self.spo.len()
    }

    /// Whether no triples are indexed
    pub fn is_empty(&self) -> bool {
        self.spo.is_empty()
    }

    /// Insert a triple into all three orderings
    pub fn insert(&mut self, triple: &Triple) {
        self.spo.insert(SpoKey::from_triple(triple));
        self.pos.insert(PosKey::from_triple(triple));
        self.osp.insert(OspKey::from_triple(triple));
    }

    /// Remove a triple from all three orderings
    pub fn remove(&mut self, triple: &Triple) {
        self.spo.remove(&SpoKey::from_triple(triple));
        self.pos.remove(&PosKey::from_triple(triple));
        self.osp.remove(&OspKey::from_triple(triple));
    }

    /// Remove every triple of a deleted entity
    pub fn remove_entity(&mut self, triples: &[Triple]) {
        for triple in triples {
            self.remove(triple);
        }
    }

    /// Find the triples matching a partially-bound pattern
    ///
    /// Probes the index whose leading keys match the bound slots; slots the
    /// chosen ordering cannot constrain with its prefix are re-checked per
    /// candidate. Results come back in the probed index's order.
    pub fn match_pattern(
        &self,
        s: Option<&Iri>,
        p: Option<&Iri>,
        o: Option<&Value>,
    ) -> Vec<Triple> {
        let matches = |t: &Triple| {
            s.map_or(true, |s| t.s == *s)
                && p.map_or(true, |p| t.p == *p)
                && o.map_or(true, |o| t.o == *o)
        };

        match IndexType::for_pattern(s.is_some(), p.is_some(), o.is_some()) {
            IndexType::Spo => {
                let (s_lo, s_hi) = Bounded::endpoints(s);
                let (p_lo, p_hi) = Bounded::endpoints(p);
                let (o_lo, o_hi) = Bounded::endpoints(o);
                self.spo
                    .range(SpoKey(s_lo, p_lo, o_lo)..=SpoKey(s_hi, p_hi, o_hi))
                    .filter_map(SpoKey::triple)
                    .filter(matches)
                    .collect()
            }
            IndexType::Pos => {
                let (p_lo, p_hi) = Bounded::endpoints(p);
                let (o_lo, o_hi) = Bounded::endpoints(o);
                let (s_lo, s_hi) = Bounded::endpoints(s);
                self.pos
                    .range(PosKey(p_lo, o_lo, s_lo)..=PosKey(p_hi, o_hi, s_hi))
                    .filter_map(PosKey::triple)
                    .filter(matches)
                    .collect()
            }
            IndexType::Osp => {
                let (o_lo, o_hi) = Bounded::endpoints(o);
                let (s_lo, s_hi) = Bounded::endpoints(s);
                let (p_lo, p_hi) = Bounded::endpoints(p);
                self.osp
                    .range(OspKey(o_lo, s_lo, p_lo)..=OspKey(o_hi, s_hi, p_hi))
                    .filter_map(OspKey::triple)
                    .filter(matches)
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::new(format!("http://example.org/{s}"))
    }

    fn sample() -> IndexSet {
        let mut idx = IndexSet::new();
        idx.insert(&Triple::new(iri("sat-1"), iri("battery"), Value::Float(92.0)));
        idx.insert(&Triple::new(iri("sat-1"), iri("name"), Value::from("Alpha")));
        idx.insert(&Triple::new(iri("sat-2"), iri("battery"), Value::Float(40.0)));
        idx.insert(&Triple::new(iri("sat-2"), iri("uplink"), Value::Ref(iri("gs-1"))));
        idx
    }

    #[test]
    fn test_subject_probe() {
        let idx = sample();
        let hits = idx.match_pattern(Some(&iri("sat-1")), None, None);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|t| t.s == iri("sat-1")));
    }

    #[test]
    fn test_predicate_probe_in_pos_order() {
        let idx = sample();
        let hits = idx.match_pattern(None, Some(&iri("battery")), None);
        assert_eq!(hits.len(), 2);
        // POS order: objects ascending
        assert_eq!(hits[0].o, Value::Float(40.0));
        assert_eq!(hits[1].o, Value::Float(92.0));
    }

    #[test]
    fn test_predicate_object_probe() {
        let idx = sample();
        let hits = idx.match_pattern(None, Some(&iri("battery")), Some(&Value::Float(40.0)));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].s, iri("sat-2"));
    }

    #[test]
    fn test_object_probe() {
        let idx = sample();
        let hits = idx.match_pattern(None, None, Some(&Value::Ref(iri("gs-1"))));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].p, iri("uplink"));
    }

    #[test]
    fn test_full_scan_insert_remove() {
        let mut idx = sample();
        assert_eq!(idx.match_pattern(None, None, None).len(), 4);

        let gone = Triple::new(iri("sat-1"), iri("name"), Value::from("Alpha"));
        idx.remove(&gone);
        assert_eq!(idx.len(), 3);
        assert!(idx
            .match_pattern(Some(&iri("sat-1")), Some(&iri("name")), None)
            .is_empty());

        // Re-inserting is idempotent set behavior
        let back = Triple::new(iri("sat-2"), iri("battery"), Value::Float(40.0));
        idx.insert(&back);
        assert_eq!(idx.len(), 3);
    }

    #[test]
    fn test_residual_filter_on_non_prefix_slot() {
        let idx = sample();
        // s bound + o bound probes SPO; o is not in the covered prefix and
        // gets re-checked per candidate.
        let hits = idx.match_pattern(Some(&iri("sat-2")), None, Some(&Value::Float(40.0)));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].p, iri("battery"));
    }

    #[test]
    fn test_remove_entity_drops_all_orderings() {
        let mut idx = sample();
        let sat2 = [
            Triple::new(iri("sat-2"), iri("battery"), Value::Float(40.0)),
            Triple::new(iri("sat-2"), iri("uplink"), Value::Ref(iri("gs-1"))),
        ];
        idx.remove_entity(&sat2);
        assert!(idx.match_pattern(Some(&iri("sat-2")), None, None).is_empty());
        assert!(idx
            .match_pattern(None, None, Some(&Value::Ref(iri("gs-1"))))
            .is_empty());
        assert_eq!(idx.len(), 2);
    }
}
