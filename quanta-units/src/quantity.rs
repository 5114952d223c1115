//! Quantity type - a magnitude with an associated unit label

use std::fmt;
use serde::{Serialize, Deserialize};
use quanta_core::{QuantaError, Value};
use quanta_compat::{Coercer, Magnitude};

/// A physical quantity: a validated magnitude with a unit label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawQuantity")]
pub struct Quantity {
    magnitude: Magnitude,
    units: String,
}

/// Wire form read before validation
#[derive(Deserialize)]
struct RawQuantity {
    magnitude: Value,
    units: String,
}

impl TryFrom<RawQuantity> for Quantity {
    type Error = QuantaError;

    fn try_from(raw: RawQuantity) -> Result<Self, Self::Error> {
        Quantity::build(raw.magnitude, &raw.units, &Coercer::default(), false)
    }
}

impl Quantity {
    /// Create a quantity, coercing `value` without forcing an array
    pub fn new(value: impl Into<Value>, units: &str, coercer: &Coercer) -> Result<Self, QuantaError> {
        Self::build(value.into(), units, coercer, false)
    }

    /// Create a quantity whose magnitude is an array whenever arrays are supported
    pub fn new_array(value: impl Into<Value>, units: &str, coercer: &Coercer) -> Result<Self, QuantaError> {
        Self::build(value.into(), units, coercer, true)
    }

    /// Create a dimensionless quantity (pure number)
    pub fn dimensionless(value: impl Into<Value>, coercer: &Coercer) -> Result<Self, QuantaError> {
        Self::build(value.into(), "", coercer, false)
    }

    pub(crate) fn build(value: Value, units: &str, coercer: &Coercer, force_array: bool) -> Result<Self, QuantaError> {
        let magnitude = coercer.coerce(value, force_array)
            .map_err(|e| QuantaError::from(e).for_units(units))?;

        // Text survives coercion untouched; it has to spell a number here
        let magnitude = magnitude.resolve_text()
            .map_err(|e| QuantaError::from(e)
                .for_units(units)
                .with_note("while reading a textual magnitude"))?;

        Ok(Quantity { magnitude, units: units.trim().to_string() })
    }

    pub fn magnitude(&self) -> &Magnitude {
        &self.magnitude
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn is_array(&self) -> bool {
        self.magnitude.is_array()
    }

    /// Check if this is a dimensionless quantity
    pub fn is_dimensionless(&self) -> bool {
        self.units.is_empty()
    }

    pub fn into_parts(self) -> (Magnitude, String) {
        (self.magnitude, self.units)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.units.is_empty() {
            write!(f, "{}", self.magnitude)
        } else {
            write!(f, "{} {}", self.magnitude, self.units)
        }
    }
}
