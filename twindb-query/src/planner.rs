//! Query planner - orders patterns and places filters
//!
//! The planner turns a logical [`Query`] into an executable [`Plan`]:
//!
//! 1. **Join order**: greedy most-selective-first - at each step pick the
//!    pattern with the fewest variables still unbound given everything
//!    bound by prior steps, breaking ties by source position. The order is
//!    deterministic for a given query.
//! 2. **Index choice**: per step, the index whose leading keys match the
//!    slots that will be bound when the step runs.
//! 3. **Filter pushdown**: each filter is attached to the earliest step
//!    after which all its referenced variables are bound, so failing
//!    partial bindings are discarded as soon as possible. Filters over
//!    variables no pattern ever binds go to the last step, where unbound
//!    comparison semantics (two-valued `false`) reject every row.
//!
//! Plan-time validation: a bound predicate IRI that is neither `rdf:type`
//! nor a registered property fails with `UnknownPredicate`; a projected
//! variable no pattern binds fails with `VariableNotFound`.

use crate::error::{QueryError, Result};
use crate::ir::FilterExpr;
use crate::pattern::{Query, TriplePattern};
use crate::var_registry::{VarId, VarRegistry};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use twindb_ontology::OntologyRegistry;
use twindb_store::IndexType;

/// One executable join step
#[derive(Clone, Debug)]
pub struct PlanStep {
    /// Pattern resolved at this step
    pub pattern: TriplePattern,
    /// Index the step's probes will use
    pub index: IndexType,
    /// Filters evaluated as soon as this step binds its variables
    pub filters: Vec<FilterExpr>,
}

/// An executable query plan
#[derive(Clone, Debug)]
pub struct Plan {
    /// Join steps in execution order
    pub steps: Vec<PlanStep>,
    /// Projected variables, in output column order
    pub select: Vec<VarId>,
    /// Names of the projected variables (same order as `select`)
    pub select_names: Vec<Arc<str>>,
    /// Total number of variables in the binding row
    pub var_count: usize,
}

/// Compile a query into a plan
pub fn plan(query: &Query, vars: &VarRegistry, registry: &OntologyRegistry) -> Result<Plan> {
    let span = tracing::debug_span!(
        "plan",
        patterns = query.patterns.len(),
        filters = query.filters.len()
    );
    let _enter = span.enter();

    // Bound predicates must be resolvable at plan time
    for pattern in &query.patterns {
        if let Some(predicate) = pattern.p.as_iri() {
            if !pattern.p.is_rdf_type() && registry.resolve_property(predicate).is_none() {
                return Err(QueryError::UnknownPredicate(predicate.clone()));
            }
        }
    }

    let mut bound: FxHashSet<VarId> = FxHashSet::default();
    let mut remaining: Vec<(usize, &TriplePattern)> = query.patterns.iter().enumerate().collect();
    let mut pending: Vec<FilterExpr> = query.filters.clone();
    let mut steps: Vec<PlanStep> = Vec::with_capacity(query.patterns.len());

    while !remaining.is_empty() {
        // Most selective next: fewest unbound variables, ties by position.
        // remaining is kept in position order, so min_by_key's first-wins
        // tie break is the stable one.
        let next = remaining
            .iter()
            .enumerate()
            .min_by_key(|(_, (_, p))| p.unbound_count(&|v| bound.contains(&v)))
            .map(|(slot, _)| slot)
            .unwrap_or(0);
        let (_, pattern) = remaining.remove(next);

        let s_bound = pattern.s.is_bound() || pattern.s.as_var().is_some_and(|v| bound.contains(&v));
        let p_bound = pattern.p.is_bound() || pattern.p.as_var().is_some_and(|v| bound.contains(&v));
        let o_bound = pattern.o.is_bound() || pattern.o.as_var().is_some_and(|v| bound.contains(&v));
        let index = IndexType::for_pattern(s_bound, p_bound, o_bound);

        bound.extend(pattern.variables());

        // Pushdown: attach every filter whose variables are now all bound
        let (ready, rest): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|f| f.variables().iter().all(|v| bound.contains(v)));
        pending = rest;

        tracing::debug!(step = steps.len(), index = %index, filters = ready.len(), "step planned");
        steps.push(PlanStep {
            pattern: pattern.clone(),
            index,
            filters: ready,
        });
    }

    // Filters over never-bound variables reject every row at runtime;
    // evaluate them at the end rather than silently dropping them.
    if let Some(last) = steps.last_mut() {
        last.filters.append(&mut pending);
    }

    let mut select_names = Vec::with_capacity(query.select.len());
    for var in &query.select {
        if !bound.contains(var) {
            let name = vars
                .name(*var)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("?{}", var.0));
            return Err(QueryError::VariableNotFound(name));
        }
        // Selected vars are bound vars, and bound vars come from the
        // registry, so the name exists.
        if let Some(name) = vars.name(*var) {
            select_names.push(name.clone());
        }
    }

    Ok(Plan {
        steps,
        select: query.select.clone(),
        select_names,
        var_count: vars.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CompareOp, Operand};
    use crate::pattern::Term;
    use twindb_core::{Datatype, Iri, Value};
    use twindb_ontology::{ClassDef, PropertyDef};

    const SAT: &str = "http://example.org/CommunicationsSatellite";
    const BATTERY: &str = "http://example.org/batteryLevel";
    const UPLINK: &str = "http://example.org/uplink";

    fn registry() -> OntologyRegistry {
        let mut reg = OntologyRegistry::new();
        reg.register_class(
            ClassDef::new(SAT)
                .with_property(BATTERY)
                .with_property(UPLINK),
        )
        .unwrap();
        reg.register_property(PropertyDef::new(BATTERY, Datatype::Float))
            .unwrap();
        reg.register_property(PropertyDef::new(UPLINK, Datatype::Ref))
            .unwrap();
        reg
    }

    fn type_pattern(vars: &mut VarRegistry) -> TriplePattern {
        let s = vars.get_or_insert("?s");
        TriplePattern::new(
            Term::Var(s),
            Term::Iri(Iri::new(twindb_vocab::rdf::TYPE)),
            Term::Iri(Iri::new(SAT)),
        )
    }

    #[test]
    fn test_unknown_predicate_fails_at_plan_time() {
        let mut vars = VarRegistry::new();
        let s = vars.get_or_insert("?s");
        let o = vars.get_or_insert("?o");
        let query = Query::new(
            vec![TriplePattern::new(
                Term::Var(s),
                Term::Iri(Iri::new("http://example.org/undeclared")),
                Term::Var(o),
            )],
            vec![],
            vec![s],
        );
        let err = plan(&query, &vars, &registry()).unwrap_err();
        assert!(matches!(err, QueryError::UnknownPredicate(_)));
    }

    #[test]
    fn test_unprojectable_variable_fails() {
        let mut vars = VarRegistry::new();
        let pattern = type_pattern(&mut vars);
        let ghost = vars.get_or_insert("?ghost");
        let query = Query::new(vec![pattern], vec![], vec![ghost]);
        let err = plan(&query, &vars, &registry()).unwrap_err();
        assert_eq!(err, QueryError::VariableNotFound("?ghost".into()));
    }

    #[test]
    fn test_most_selective_first_ordering() {
        let mut vars = VarRegistry::new();
        let s = vars.get_or_insert("?s");
        let b = vars.get_or_insert("?b");
        let g = vars.get_or_insert("?g");
        // Source order: a 2-unbound-var pattern first, then a 1-var pattern.
        // The planner must run the type pattern (1 unbound var) first.
        let battery = TriplePattern::new(Term::Var(s), Term::Iri(Iri::new(BATTERY)), Term::Var(b));
        let uplink = TriplePattern::new(Term::Var(s), Term::Iri(Iri::new(UPLINK)), Term::Var(g));
        let ty = TriplePattern::new(
            Term::Var(s),
            Term::Iri(Iri::new(twindb_vocab::rdf::TYPE)),
            Term::Iri(Iri::new(SAT)),
        );
        let query = Query::new(vec![battery.clone(), uplink.clone(), ty.clone()], vec![], vec![s]);
        let plan = plan(&query, &vars, &registry()).unwrap();

        assert_eq!(plan.steps[0].pattern, ty);
        // After ?s binds, both remaining patterns have one unbound var;
        // source position breaks the tie.
        assert_eq!(plan.steps[1].pattern, battery);
        assert_eq!(plan.steps[2].pattern, uplink);

        // First step probes POS (predicate + object bound), later steps SPO
        // (subject effectively bound).
        assert_eq!(plan.steps[0].index, IndexType::Pos);
        assert_eq!(plan.steps[1].index, IndexType::Spo);
    }

    #[test]
    fn test_filter_pushdown_placement() {
        let mut vars = VarRegistry::new();
        let s = vars.get_or_insert("?s");
        let b = vars.get_or_insert("?b");
        let ty = TriplePattern::new(
            Term::Var(s),
            Term::Iri(Iri::new(twindb_vocab::rdf::TYPE)),
            Term::Iri(Iri::new(SAT)),
        );
        let battery = TriplePattern::new(Term::Var(s), Term::Iri(Iri::new(BATTERY)), Term::Var(b));
        let filter = FilterExpr::new(
            Operand::Var(b),
            CompareOp::Lt,
            Operand::Const(Value::Float(50.0)),
        );
        let query = Query::new(vec![ty, battery], vec![filter.clone()], vec![s, b]);
        let plan = plan(&query, &vars, &registry()).unwrap();

        // ?b binds at the second step; the filter must sit there, not later
        assert!(plan.steps[0].filters.is_empty());
        assert_eq!(plan.steps[1].filters, vec![filter]);
    }
}
