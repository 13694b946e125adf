//! Property definitions
//!
//! A property declares the datatype its values must inhabit, how many
//! values an entity may hold for it, and (for numerics) an optional
//! inclusive range constraint.

use serde::{Deserialize, Serialize};
use twindb_core::{Datatype, Iri};

/// How many values an entity may hold for a property
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// At most one value; asserting a second different value is rejected
    #[default]
    Single,
    /// Any number of values
    Multi,
}

/// Inclusive numeric range constraint
///
/// Applies only to `Integer`/`Float` properties; either bound may be open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    /// Inclusive lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumericRange {
    /// Range with both bounds
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Range with only a lower bound
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Range with only an upper bound
    pub fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Whether a numeric value satisfies the range
    pub fn contains(&self, v: f64) -> bool {
        self.min.map_or(true, |min| v >= min) && self.max.map_or(true, |max| v <= max)
    }
}

/// A property definition in the ontology
///
/// Immutable after registration (schema is append-only).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Property identifier
    pub iri: Iri,
    /// Declared datatype of values
    pub datatype: Datatype,
    /// Optional numeric range constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<NumericRange>,
    /// Single- or multi-valued
    #[serde(default)]
    pub cardinality: Cardinality,
}

impl PropertyDef {
    /// Create a single-valued property with no range constraint
    pub fn new(iri: impl Into<Iri>, datatype: Datatype) -> Self {
        Self {
            iri: iri.into(),
            datatype,
            range: None,
            cardinality: Cardinality::Single,
        }
    }

    /// Set the numeric range constraint
    pub fn with_range(mut self, range: NumericRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Mark the property multi-valued
    pub fn multi_valued(mut self) -> Self {
        self.cardinality = Cardinality::Multi;
        self
    }
}
