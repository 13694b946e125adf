//! Result bindings - projected variable-to-value rows
//!
//! A [`Binding`] is one query result: the projected variables, in the
//! `SELECT` order, with their values. Column names are shared (`Arc`)
//! across every row of an execution.

use std::fmt;
use std::sync::Arc;
use twindb_core::Value;

/// One projected result row
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    names: Arc<[Arc<str>]>,
    values: Vec<Value>,
}

impl Binding {
    /// Create a binding (the executor's job; column order is the
    /// projection order)
    pub(crate) fn new(names: Arc<[Arc<str>]>, values: Vec<Value>) -> Self {
        Self { names, values }
    }

    /// Value of a projected variable by name (with or without the `?`)
    pub fn get(&self, name: &str) -> Option<&Value> {
        let wanted = name.strip_prefix('?').unwrap_or(name);
        self.names
            .iter()
            .position(|n| n.strip_prefix('?').unwrap_or(n) == wanted)
            .map(|i| &self.values[i])
    }

    /// Projected values in column order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Projected variable names in column order
    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    /// Number of projected columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the projection is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.names.iter().zip(&self.values).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}
