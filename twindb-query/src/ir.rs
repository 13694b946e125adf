//! Filter IR - comparison expressions over query variables
//!
//! Filters use **two-valued logic**: a comparison whose operands are
//! unbound or belong to incompatible comparison classes yields `false`,
//! except `!=` which yields `true` for incomparable operands. Numeric
//! operands compare mathematically, strings lexicographically - the
//! semantics carried by [`Value::compare`].

use crate::var_registry::VarId;
use std::cmp::Ordering;
use std::fmt;
use twindb_core::Value;

/// Comparison operator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    /// Source-text symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
        }
    }

    /// Apply the operator to a comparison outcome
    ///
    /// `None` means the operands were incomparable (unbound variable or
    /// incompatible classes): every operator yields `false` except `!=`.
    pub fn eval(&self, ordering: Option<Ordering>) -> bool {
        match ordering {
            None => matches!(self, CompareOp::Ne),
            Some(ord) => match self {
                CompareOp::Lt => ord == Ordering::Less,
                CompareOp::Le => ord != Ordering::Greater,
                CompareOp::Gt => ord == Ordering::Greater,
                CompareOp::Ge => ord != Ordering::Less,
                CompareOp::Eq => ord == Ordering::Equal,
                CompareOp::Ne => ord != Ordering::Equal,
            },
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One side of a comparison
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    /// Query variable, resolved against the current binding row
    Var(VarId),
    /// Constant literal or reference
    Const(Value),
}

impl Operand {
    /// The variable, if this operand is one
    pub fn as_var(&self) -> Option<VarId> {
        match self {
            Operand::Var(v) => Some(*v),
            Operand::Const(_) => None,
        }
    }
}

/// A single comparison filter
#[derive(Clone, Debug, PartialEq)]
pub struct FilterExpr {
    pub lhs: Operand,
    pub op: CompareOp,
    pub rhs: Operand,
}

impl FilterExpr {
    /// Create a comparison filter
    pub fn new(lhs: Operand, op: CompareOp, rhs: Operand) -> Self {
        Self { lhs, op, rhs }
    }

    /// Variables referenced by this filter
    pub fn variables(&self) -> Vec<VarId> {
        let mut vars = Vec::with_capacity(2);
        if let Some(v) = self.lhs.as_var() {
            vars.push(v);
        }
        if let Some(v) = self.rhs.as_var() {
            vars.push(v);
        }
        vars
    }

    /// Evaluate against a binding row (`None` entries are unbound)
    pub fn eval(&self, row: &[Option<Value>]) -> bool {
        let lhs = self.resolve(&self.lhs, row);
        let rhs = self.resolve(&self.rhs, row);
        let ordering = match (lhs, rhs) {
            (Some(a), Some(b)) => a.compare(b),
            _ => None,
        };
        self.op.eval(ordering)
    }

    fn resolve<'a>(&self, operand: &'a Operand, row: &'a [Option<Value>]) -> Option<&'a Value> {
        match operand {
            Operand::Var(v) => row.get(v.index()).and_then(Option::as_ref),
            Operand::Const(value) => Some(value),
        }
    }
}
