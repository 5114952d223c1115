//! Raw values handed to quantity construction
//!
//! A `Value` is whatever a caller supplied before it was validated:
//! scalars, decimals, text, booleans, mappings, sequences, arrays or
//! null. Coercion decides which of these may become a magnitude.

use crate::Number;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(feature = "array")]
use ndarray::ArrayD;

/// Unvalidated input value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Int(i64),
    Float(f64),
    Decimal(Number),
    Text(String),
    Bool(bool),
    Map(BTreeMap<String, Value>),
    /// Variable-size ordered sequence
    List(Vec<Value>),
    /// Fixed-size ordered sequence
    Tuple(Vec<Value>),
    #[cfg(feature = "array")]
    Array(ArrayD<Number>),
    Null,
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn join(items: &[Value]) -> String {
            items.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
        }

        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Decimal(d) => write!(f, "Decimal('{}')", d),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Map(map) => {
                let entries: Vec<String> = map.iter()
                    .map(|(k, v)| format!("{:?}: {}", k, v))
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            Value::List(items) => write!(f, "[{}]", join(items)),
            Value::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0]),
            Value::Tuple(items) => write!(f, "({})", join(items)),
            #[cfg(feature = "array")]
            Value::Array(arr) => write!(f, "array(shape={:?})", arr.shape()),
            Value::Null => write!(f, "null"),
        }
    }
}

// From implementations for convenience
impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Decimal(n)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(feature = "array")]
impl From<ArrayD<Number>> for Value {
    fn from(arr: ArrayD<Number>) -> Self {
        Value::Array(arr)
    }
}

/// JSON documents map onto values directly: objects become mappings and
/// arrays become lists. Numbers keep integer form when they have one.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    // Beyond i64 range, keep every digit
                    Value::Decimal(Number::from_u64(u))
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::Text(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Map(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
            ),
        }
    }
}
