//! Typed predicate arguments.

use std::hash::{Hash, Hasher};

use indexmap::IndexSet;
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};

use crate::decimal::Decimal;
use crate::error::{QueryError, Result};

/// Insertion-ordered set of predicate values.
///
/// Iteration order is the order in which values were first added, which keeps
/// compiled `terms` chunks stable across runs.
pub type ValueSet = IndexSet<Value, ahash::RandomState>;

/// Insertion-ordered set of plain strings (prefixes).
pub type TermSet = IndexSet<String, ahash::RandomState>;

/// The argument of an equality, range or set-membership predicate.
///
/// Equality and hashing are total: doubles compare by bit pattern, so a value
/// can always be placed in a [`ValueSet`].
///
/// JSON has no NaN or infinity. A non-finite double fails to serialize and
/// cannot be used as a range bound; as a term it renders as `NaN`, `inf` or
/// `-inf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    String(String),
    Int(i32),
    Long(i64),
    #[serde(serialize_with = "serialize_finite")]
    Double(f64),
    Boolean(bool),
    Decimal(Decimal),
}

impl Value {
    /// The term handed to `term`/`terms` leaves.
    ///
    /// Decimals are replaced by their order-preserving encoding.
    pub fn to_term(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Long(l) => l.to_string(),
            Value::Double(d) => d.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Decimal(d) => d.encode(),
        }
    }

    /// The bound handed to `range` leaves.
    ///
    /// Numbers stay JSON numbers so numeric fields compare numerically;
    /// decimals are encoded like their terms.
    pub fn to_range_bound(&self) -> Result<serde_json::Value> {
        Ok(match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Long(l) => serde_json::Value::from(*l),
            Value::Double(d) if !d.is_finite() => {
                return Err(QueryError::invalid_argument(format!(
                    "range bound {d} is not a finite number"
                )));
            }
            Value::Double(d) => serde_json::Value::from(*d),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Decimal(d) => serde_json::Value::String(d.encode()),
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

fn serialize_finite<S: Serializer>(
    value: &f64,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        Err(S::Error::custom(format!("{value} is not a finite number")))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Long(l) => l.hash(state),
            Value::Double(d) => d.to_bits().hash(state),
            Value::Boolean(b) => b.hash(state),
            Value::Decimal(d) => d.hash(state),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}
