//! Validated magnitude of a quantity

use std::fmt;

use quanta_core::{MagnitudeError, Number, NumberError, Value};
use serde::{Deserialize, Serialize};

use crate::Coercer;

#[cfg(feature = "array")]
use ndarray::ArrayD;

/// Numeric payload of a quantity, independent of its unit.
///
/// Never a mapping, a boolean, null or empty text: those are rejected
/// during coercion. Deserialized magnitudes go through the same coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", try_from = "Value")]
pub enum Magnitude {
    Int(i64),
    Float(f64),
    Decimal(Number),
    /// Non-empty text accepted as-is; parsed by the quantity layer
    Text(String),
    #[cfg(feature = "array")]
    Array(ArrayD<Number>),
}

impl Magnitude {
    pub fn is_array(&self) -> bool {
        match self {
            #[cfg(feature = "array")]
            Magnitude::Array(_) => true,
            _ => false,
        }
    }

    #[cfg(feature = "array")]
    pub fn as_array(&self) -> Option<&ArrayD<Number>> {
        match self {
            Magnitude::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Replace a textual magnitude with the decimal it spells.
    /// Every other magnitude is returned as it is.
    pub fn resolve_text(self) -> Result<Magnitude, NumberError> {
        match self {
            Magnitude::Text(s) => Number::from_str(&s).map(Magnitude::Decimal),
            other => Ok(other),
        }
    }
}

/// Coerced with the strategy this build supports
impl TryFrom<Value> for Magnitude {
    type Error = MagnitudeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Coercer::default().coerce(value, false)
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Magnitude::Int(n) => write!(f, "{}", n),
            Magnitude::Float(x) => write!(f, "{}", x),
            Magnitude::Decimal(d) => write!(f, "{}", d),
            Magnitude::Text(s) => write!(f, "{}", s),
            #[cfg(feature = "array")]
            Magnitude::Array(arr) => write!(f, "{}", arr),
        }
    }
}
