//! Query execution - nested-loop semi-join over the store snapshot
//!
//! [`execute`] takes a consistent snapshot of the store, then lazily
//! enumerates binding rows by backtracking through the plan's join steps.
//! For every partial binding surviving prior steps, the next pattern's
//! candidates are resolved through the snapshot's indexes and used to
//! extend the binding; step-attached filters discard failing rows the
//! moment their variables bind.
//!
//! Execution is infallible, finite, and restartable: re-running `execute`
//! takes a fresh snapshot and re-reads current state; nothing is cached
//! across runs. The projection de-duplicates by full projected-tuple
//! equality, emitting rows in first-discovered order.

use crate::binding::Binding;
use crate::planner::Plan;
use crate::var_registry::VarId;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use twindb_core::{Iri, Triple, Value};
use twindb_store::{StoreSnapshot, TripleStore};

/// Execute a plan against the store's current state
pub fn execute(plan: &Plan, store: &TripleStore) -> Bindings {
    let snapshot = store.snapshot();
    tracing::debug!(
        steps = plan.steps.len(),
        triples = snapshot.triple_count(),
        "executing plan"
    );
    Bindings::new(plan.clone(), snapshot)
}

/// Cursor state for one join level
struct Level {
    candidates: Vec<Triple>,
    pos: usize,
    bound: Vec<VarId>,
}

impl Level {
    fn new(candidates: Vec<Triple>) -> Self {
        Self {
            candidates,
            pos: 0,
            bound: Vec::new(),
        }
    }
}

/// Lazy sequence of result bindings
///
/// Finite: every level enumerates a finite candidate list and the stack
/// depth is the plan's step count.
pub struct Bindings {
    plan: Plan,
    snapshot: StoreSnapshot,
    names: Arc<[Arc<str>]>,
    row: Vec<Option<Value>>,
    levels: Vec<Level>,
    seen: FxHashSet<Vec<Value>>,
    started: bool,
}

impl Bindings {
    fn new(plan: Plan, snapshot: StoreSnapshot) -> Self {
        let names: Arc<[Arc<str>]> = Arc::from(plan.select_names.clone().into_boxed_slice());
        let row = vec![None; plan.var_count];
        Self {
            plan,
            snapshot,
            names,
            row,
            levels: Vec::new(),
            seen: FxHashSet::default(),
            started: false,
        }
    }

    /// Resolve the candidates for a step given the current partial binding
    ///
    /// Bound terms and already-bound variables become exact probe slots; a
    /// variable bound to a non-reference value in an IRI slot can never
    /// match and yields no candidates.
    fn probe(&self, depth: usize) -> Vec<Triple> {
        let pattern = &self.plan.steps[depth].pattern;

        let Some(s) = self.iri_slot(&pattern.s) else {
            return Vec::new();
        };
        let Some(p) = self.iri_slot(&pattern.p) else {
            return Vec::new();
        };
        let o = self.object_slot(&pattern.o);

        let candidates = self
            .snapshot
            .match_pattern(s.as_ref(), p.as_ref(), o.as_ref());
        tracing::trace!(depth, candidates = candidates.len(), "pattern probed");
        candidates
    }

    /// Probe slot for an IRI position (subject or predicate)
    ///
    /// Outer `None` means the slot can never match; `Some(None)` is a
    /// wildcard.
    fn iri_slot(&self, term: &crate::pattern::Term) -> Option<Option<Iri>> {
        use crate::pattern::Term;
        match term {
            Term::Iri(iri) => Some(Some(iri.clone())),
            Term::Value(Value::Ref(iri)) => Some(Some(iri.clone())),
            Term::Value(_) => None,
            Term::Var(v) => match &self.row[v.index()] {
                Some(Value::Ref(iri)) => Some(Some(iri.clone())),
                Some(_) => None,
                None => Some(None),
            },
        }
    }

    /// Probe slot for the object position
    fn object_slot(&self, term: &crate::pattern::Term) -> Option<Value> {
        use crate::pattern::Term;
        match term {
            Term::Var(v) => self.row[v.index()].clone(),
            bound => bound.as_object_value(),
        }
    }

    /// Extend the binding row with a candidate triple
    ///
    /// Returns the variables newly bound, or `None` (with the row
    /// restored) when a repeated variable disagrees between slots.
    fn unify(&mut self, depth: usize, triple: &Triple) -> Option<Vec<VarId>> {
        use crate::pattern::Term;
        let pattern = self.plan.steps[depth].pattern.clone();
        let slots = [
            (&pattern.s, Value::Ref(triple.s.clone())),
            (&pattern.p, Value::Ref(triple.p.clone())),
            (&pattern.o, triple.o.clone()),
        ];

        let mut newly: Vec<VarId> = Vec::new();
        for (term, value) in slots {
            if let Term::Var(v) = term {
                match &self.row[v.index()] {
                    Some(existing) => {
                        if *existing != value {
                            for v in newly {
                                self.row[v.index()] = None;
                            }
                            return None;
                        }
                    }
                    None => {
                        self.row[v.index()] = Some(value);
                        newly.push(*v);
                    }
                }
            }
        }
        Some(newly)
    }

    /// Evaluate the filters attached to a step against the current row
    fn filters_pass(&self, depth: usize) -> bool {
        self.plan.steps[depth]
            .filters
            .iter()
            .all(|f| f.eval(&self.row))
    }

    /// Project the current row; `None` when it duplicates an earlier result
    fn project(&mut self) -> Option<Binding> {
        let mut values = Vec::with_capacity(self.plan.select.len());
        for var in &self.plan.select {
            // The planner rejects projections of unbound variables, so a
            // full-depth row always has these set.
            values.push(self.row[var.index()].clone()?);
        }
        if !self.seen.insert(values.clone()) {
            return None;
        }
        Some(Binding::new(self.names.clone(), values))
    }
}

impl std::fmt::Debug for Bindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bindings")
            .field("steps", &self.plan.steps.len())
            .field("select", &self.names)
            .field("emitted", &self.seen.len())
            .finish_non_exhaustive()
    }
}

impl Iterator for Bindings {
    type Item = Binding;

    fn next(&mut self) -> Option<Binding> {
        if self.plan.steps.is_empty() {
            return None;
        }
        if !self.started {
            self.started = true;
            let candidates = self.probe(0);
            self.levels.push(Level::new(candidates));
        }

        loop {
            let depth = self.levels.len().checked_sub(1)?;

            // Undo the bindings of the previously tried candidate here
            let prev = std::mem::take(&mut self.levels[depth].bound);
            for v in prev {
                self.row[v.index()] = None;
            }

            let pos = self.levels[depth].pos;
            if pos >= self.levels[depth].candidates.len() {
                self.levels.pop();
                continue;
            }
            self.levels[depth].pos += 1;

            let triple = self.levels[depth].candidates[pos].clone();
            let Some(newly) = self.unify(depth, &triple) else {
                continue;
            };
            self.levels[depth].bound = newly;

            if !self.filters_pass(depth) {
                continue;
            }

            if depth + 1 == self.plan.steps.len() {
                match self.project() {
                    Some(binding) => return Some(binding),
                    None => continue,
                }
            }

            let candidates = self.probe(depth + 1);
            self.levels.push(Level::new(candidates));
        }
    }
}
