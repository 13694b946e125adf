//! Value - polymorphic object value type
//!
//! The object position of a triple holds either a literal or a reference to
//! another entity. The variant set mirrors the datatypes the ontology layer
//! can declare: string, integer, float, boolean, IRI-reference.
//!
//! ## Ordering
//!
//! `Value` implements strict total ordering with **numeric class comparison**:
//!
//! 1. **Numeric class**: `Integer` and `Float` interleave mathematically in
//!    the order: `Integer(3) < Float(3.5) < Integer(4)`. A numeric tie is
//!    broken by the type discriminant, so `Integer(3) < Float(3.0)` and the
//!    two stay *unequal* - integer comparison keeps exact `i64` precision,
//!    and collapsing cross-type ties would lose transitivity for integers
//!    beyond 2^53.
//! 2. **Other types**: compared by type discriminant first, then by value
//!    within the type. NaN sorts after every other float.
//!
//! Equality and `Hash` follow the same strict order: values of different
//! variants are never equal. Total ordering is what lets values serve as
//! index key components; cross-class *filter* comparisons have different
//! (two-valued, mathematical) semantics, see [`Value::compare`]. Wildcard
//! range bounds are expressed by the index layer's bounded-key wrapper, not
//! by sentinel values.

use crate::iri::Iri;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use twindb_vocab::xsd;

/// Declared datatype of a property
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    /// UTF-8 string (xsd:string)
    String,
    /// 64-bit signed integer (xsd:integer)
    Integer,
    /// 64-bit floating point (xsd:double)
    Float,
    /// Boolean (xsd:boolean)
    Boolean,
    /// Reference to another entity (@id)
    Ref,
}

impl Datatype {
    /// Check whether a runtime value inhabits this datatype
    pub fn admits(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Datatype::String, Value::String(_))
                | (Datatype::Integer, Value::Integer(_))
                | (Datatype::Float, Value::Float(_))
                | (Datatype::Boolean, Value::Boolean(_))
                | (Datatype::Ref, Value::Ref(_))
        )
    }

    /// Whether this datatype participates in numeric comparison
    pub fn is_numeric(&self) -> bool {
        matches!(self, Datatype::Integer | Datatype::Float)
    }

    /// The canonical IRI naming this datatype
    pub fn iri(&self) -> &'static str {
        match self {
            Datatype::String => xsd::STRING,
            Datatype::Integer => xsd::INTEGER,
            Datatype::Float => xsd::DOUBLE,
            Datatype::Boolean => xsd::BOOLEAN,
            Datatype::Ref => xsd::ID_REF,
        }
    }

    /// Resolve a datatype from its canonical IRI
    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri {
            xsd::STRING => Some(Datatype::String),
            xsd::INTEGER => Some(Datatype::Integer),
            xsd::DOUBLE => Some(Datatype::Float),
            xsd::BOOLEAN => Some(Datatype::Boolean),
            xsd::ID_REF => Some(Datatype::Ref),
            _ => None,
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Datatype::String => "string",
            Datatype::Integer => "integer",
            Datatype::Float => "float",
            Datatype::Boolean => "boolean",
            Datatype::Ref => "ref",
        };
        write!(f, "{name}")
    }
}

/// Polymorphic value type for triple objects
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    /// Reference to another entity
    Ref(Iri),
    /// Boolean literal
    Boolean(bool),
    /// 64-bit signed integer literal
    Integer(i64),
    /// 64-bit floating point literal
    Float(f64),
    /// String literal
    String(String),
}

impl Value {
    /// Runtime datatype of this value
    pub fn datatype(&self) -> Datatype {
        match self {
            Value::Ref(_) => Datatype::Ref,
            Value::Boolean(_) => Datatype::Boolean,
            Value::Integer(_) => Datatype::Integer,
            Value::Float(_) => Datatype::Float,
            Value::String(_) => Datatype::String,
        }
    }

    /// Get the referenced IRI if this is a `Ref`
    pub fn as_ref_iri(&self) -> Option<&Iri> {
        match self {
            Value::Ref(iri) => Some(iri),
            _ => None,
        }
    }

    /// Numeric view of this value, if it is numeric
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Type discriminant for index ordering
    ///
    /// `Integer` and `Float` share effective ordering via the numeric class;
    /// the discriminant is only a tie-breaker between them.
    fn type_discriminant(&self) -> u8 {
        match self {
            Value::Ref(_) => 0,
            Value::Boolean(_) => 1,
            Value::Integer(_) => 2,
            Value::Float(_) => 3,
            Value::String(_) => 4,
        }
    }

    /// Whether this value belongs to the numeric comparison class
    fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Compare two values for *filter* semantics
    ///
    /// Returns `None` when the values belong to incompatible comparison
    /// classes (e.g. a string against an integer); the filter layer maps
    /// `None` to two-valued `false` (or `true` for `!=`). Within the
    /// numeric class, comparison is mathematical. NaN compares as
    /// incompatible with everything, itself included.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let (x, y) = (a.as_f64()?, b.as_f64()?);
                x.partial_cmp(&y)
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Ref(a), Value::Ref(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Ref(iri) => write!(f, "<{iri}>"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Iri> for Value {
    fn from(iri: Iri) -> Self {
        Value::Ref(iri)
    }
}

// Equality is the zero of the total order: strict, discriminant-aware.
// Mathematical cross-type comparison lives in `compare`, filters only.

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    /// Strict total order for index use
    ///
    /// Numeric class first (mathematical, NaN greatest), then discriminant,
    /// then value within type.
    fn cmp(&self, other: &Self) -> Ordering {
        // Same-variant integer comparison stays exact; casting both sides to
        // f64 would collapse integers beyond 2^53.
        if let (Value::Integer(a), Value::Integer(b)) = (self, other) {
            return a.cmp(b);
        }
        if self.is_numeric() && other.is_numeric() {
            let x = self.as_f64().unwrap_or(f64::NAN);
            let y = other.as_f64().unwrap_or(f64::NAN);
            // total_cmp puts NaN after all finite values, keeping the order strict
            return x
                .total_cmp(&y)
                .then_with(|| self.type_discriminant().cmp(&other.type_discriminant()));
        }

        match self.type_discriminant().cmp(&other.type_discriminant()) {
            Ordering::Equal => match (self, other) {
                (Value::Ref(a), Value::Ref(b)) => a.cmp(b),
                (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
                (Value::String(a), Value::String(b)) => a.cmp(b),
                // Same discriminant implies same variant for non-numerics
                _ => Ordering::Equal,
            },
            ord => ord,
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Ref(iri) => {
                0u8.hash(state);
                iri.hash(state);
            }
            Value::Boolean(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Integer(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => {
                3u8.hash(state);
                f.to_bits().hash(state);
            }
            Value::String(s) => {
                4u8.hash(state);
                s.hash(state);
            }
        }
    }
}
