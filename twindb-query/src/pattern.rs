//! Pattern types - the structured query representation
//!
//! A [`Query`] is patterns plus filters plus a projection; it is the API
//! boundary type. Query text is translated into it by the
//! [`parse`](crate::parse) module, and the planner consumes it - the
//! engine never sees strings.

use crate::ir::FilterExpr;
use crate::var_registry::VarId;
use twindb_core::{Iri, Value};
use twindb_vocab::rdf;

/// A term in a triple pattern - free variable, bound IRI or bound literal
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// Free variable
    Var(VarId),
    /// Bound IRI (subject, predicate, or reference object)
    Iri(Iri),
    /// Bound literal object
    Value(Value),
}

impl Term {
    /// Whether this term is a variable
    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    /// Whether this term is bound (not a variable)
    pub fn is_bound(&self) -> bool {
        !self.is_var()
    }

    /// The variable, if this is one
    pub fn as_var(&self) -> Option<VarId> {
        match self {
            Term::Var(v) => Some(*v),
            _ => None,
        }
    }

    /// The IRI, if this term is one
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Whether this term is the `rdf:type` predicate
    pub fn is_rdf_type(&self) -> bool {
        matches!(self, Term::Iri(iri) if *iri == rdf::TYPE)
    }

    /// View this term as an object value, if bound
    ///
    /// IRIs in object position are reference values.
    pub fn as_object_value(&self) -> Option<Value> {
        match self {
            Term::Var(_) => None,
            Term::Iri(iri) => Some(Value::Ref(iri.clone())),
            Term::Value(v) => Some(v.clone()),
        }
    }
}

/// A triple pattern: each slot either bound or a free variable
#[derive(Clone, Debug, PartialEq)]
pub struct TriplePattern {
    /// Subject term
    pub s: Term,
    /// Predicate term
    pub p: Term,
    /// Object term
    pub o: Term,
}

impl TriplePattern {
    /// Create a new triple pattern
    pub fn new(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o }
    }

    /// Variables in this pattern, in slot order (s, p, o)
    pub fn variables(&self) -> Vec<VarId> {
        [&self.s, &self.p, &self.o]
            .into_iter()
            .filter_map(Term::as_var)
            .collect()
    }

    /// Count the pattern's variables not present in `bound`
    pub fn unbound_count(&self, bound: &impl Fn(VarId) -> bool) -> usize {
        self.variables().iter().filter(|v| !bound(**v)).count()
    }
}

/// A complete query: patterns, filters, projection
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    /// Triple patterns, in source order
    pub patterns: Vec<TriplePattern>,
    /// Filter predicates over pattern variables
    pub filters: Vec<FilterExpr>,
    /// Variables to project, in output column order
    pub select: Vec<VarId>,
}

impl Query {
    /// Create a query from its parts
    pub fn new(patterns: Vec<TriplePattern>, filters: Vec<FilterExpr>, select: Vec<VarId>) -> Self {
        Self {
            patterns,
            filters,
            select,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_helpers() {
        let var = Term::Var(VarId(0));
        let iri = Term::Iri(Iri::new("http://example.org/p"));
        let val = Term::Value(Value::Integer(42));

        assert!(var.is_var() && !var.is_bound());
        assert!(iri.is_bound());
        assert_eq!(var.as_var(), Some(VarId(0)));
        assert_eq!(val.as_object_value(), Some(Value::Integer(42)));
        assert_eq!(
            iri.as_object_value(),
            Some(Value::Ref(Iri::new("http://example.org/p")))
        );
    }

    #[test]
    fn test_rdf_type_detection() {
        let a = Term::Iri(Iri::new(rdf::TYPE));
        let other = Term::Iri(Iri::new("http://example.org/p"));
        assert!(a.is_rdf_type());
        assert!(!other.is_rdf_type());
        assert!(!Term::Var(VarId(0)).is_rdf_type());
    }

    #[test]
    fn test_pattern_variables() {
        let pattern = TriplePattern::new(
            Term::Var(VarId(0)),
            Term::Iri(Iri::new("http://example.org/battery")),
            Term::Var(VarId(1)),
        );
        assert_eq!(pattern.variables(), vec![VarId(0), VarId(1)]);
        assert_eq!(pattern.unbound_count(&|v| v == VarId(0)), 1);
    }
}
