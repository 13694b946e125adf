//! Index orderings over triples
//!
//! The store maintains 3 orderings, each optimized for a family of query
//! patterns:
//!
//! | Index | Order   | Use case                              |
//! |-------|---------|---------------------------------------|
//! | SPO   | s, p, o | Subject lookups                       |
//! | POS   | p, o, s | Predicate and predicate-value lookups |
//! | OSP   | o, s, p | Reverse (object-first) lookups        |
//!
//! Index choice per pattern is made by the query planner via
//! [`IndexType::for_pattern`]; the index structures themselves carry no
//! query semantics.

use std::fmt;

/// Index ordering identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// Subject-Predicate-Object
    Spo,
    /// Predicate-Object-Subject
    Pos,
    /// Object-Subject-Predicate
    Osp,
}

impl IndexType {
    /// All index types
    pub fn all() -> &'static [IndexType] {
        &[IndexType::Spo, IndexType::Pos, IndexType::Osp]
    }

    /// Select the index whose leading keys match the bound pattern slots
    ///
    /// Priority:
    /// - SPO when the subject is bound (most selective prefix)
    /// - POS when the predicate is bound (with or without the object)
    /// - OSP when only the object is bound
    /// - SPO as the full-scan fallback
    pub fn for_pattern(s_bound: bool, p_bound: bool, o_bound: bool) -> IndexType {
        if s_bound {
            IndexType::Spo
        } else if p_bound {
            IndexType::Pos
        } else if o_bound {
            IndexType::Osp
        } else {
            IndexType::Spo
        }
    }

    /// Short lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            IndexType::Spo => "spo",
            IndexType::Pos => "pos",
            IndexType::Osp => "osp",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_selection() {
        assert_eq!(IndexType::for_pattern(true, true, true), IndexType::Spo);
        assert_eq!(IndexType::for_pattern(true, false, false), IndexType::Spo);
        assert_eq!(IndexType::for_pattern(false, true, false), IndexType::Pos);
        assert_eq!(IndexType::for_pattern(false, true, true), IndexType::Pos);
        assert_eq!(IndexType::for_pattern(false, false, true), IndexType::Osp);
        assert_eq!(IndexType::for_pattern(false, false, false), IndexType::Spo);
    }
}
