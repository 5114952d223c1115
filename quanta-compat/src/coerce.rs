//! Magnitude coercion
//!
//! Raw values become magnitudes through one of two strategies, chosen once
//! from the capability descriptor:
//! - `ArrayCoercion`: sequences become arrays, and scalars can be promoted
//! - `ScalarCoercion`: no array support, sequences are rejected outright

use std::fmt;
use std::sync::Arc;

use quanta_core::{MagnitudeError, Value};
#[cfg(not(feature = "array"))]
use tracing::warn;

use crate::{Capabilities, Magnitude};

#[cfg(feature = "array")]
use ndarray::{ArrayD, IxDyn};
#[cfg(feature = "array")]
use quanta_core::Number;

/// Turns a raw value into a magnitude
pub trait CoerceStrategy: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;
    fn supports_arrays(&self) -> bool;
    fn coerce(&self, value: Value, force_array: bool) -> Result<Magnitude, MagnitudeError>;
}

/// Rejections shared by both strategies
fn reject_invalid(value: &Value) -> Result<(), MagnitudeError> {
    match value {
        Value::Map(_) | Value::Bool(_) | Value::Null => {
            Err(MagnitudeError::InvalidMagnitude(value.to_string()))
        }
        Value::Text(s) if s.is_empty() => Err(MagnitudeError::EmptyMagnitude),
        _ => Ok(()),
    }
}

/// Re-tag an accepted scalar as a magnitude
fn scalar(value: Value) -> Result<Magnitude, MagnitudeError> {
    match value {
        Value::Int(n) => Ok(Magnitude::Int(n)),
        Value::Float(x) => Ok(Magnitude::Float(x)),
        Value::Decimal(d) => Ok(Magnitude::Decimal(d)),
        Value::Text(s) => Ok(Magnitude::Text(s)),
        other => Err(MagnitudeError::InvalidMagnitude(other.to_string())),
    }
}

// ============ scalar-only ============

/// Strategy used when no array backend is available
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarCoercion;

impl CoerceStrategy for ScalarCoercion {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn supports_arrays(&self) -> bool {
        false
    }

    /// `force_array` has nothing to promote into here and is ignored
    fn coerce(&self, value: Value, _force_array: bool) -> Result<Magnitude, MagnitudeError> {
        reject_invalid(&value)?;
        match value {
            Value::List(_) | Value::Tuple(_) => {
                Err(MagnitudeError::UnsupportedMagnitude("lists and tuples".to_string()))
            }
            #[cfg(feature = "array")]
            Value::Array(_) => Err(MagnitudeError::UnsupportedMagnitude("arrays".to_string())),
            other => scalar(other),
        }
    }
}

// ============ array-backed ============

/// Strategy used when the array backend is available
#[cfg(feature = "array")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayCoercion;

#[cfg(feature = "array")]
impl CoerceStrategy for ArrayCoercion {
    fn name(&self) -> &'static str {
        "array"
    }

    fn supports_arrays(&self) -> bool {
        true
    }

    fn coerce(&self, value: Value, force_array: bool) -> Result<Magnitude, MagnitudeError> {
        reject_invalid(&value)?;
        match value {
            Value::List(items) | Value::Tuple(items) => sequence_to_array(&items).map(Magnitude::Array),
            Value::Array(arr) => Ok(Magnitude::Array(arr)),
            other if force_array => {
                let element = element_number(&other)?;
                Ok(Magnitude::Array(ndarray::arr1(&[element]).into_dyn()))
            }
            other => scalar(other),
        }
    }
}

/// Shape implied by the first element at every nesting level
#[cfg(feature = "array")]
fn implied_shape(value: &Value) -> Vec<usize> {
    match value {
        Value::List(items) | Value::Tuple(items) => {
            let mut shape = vec![items.len()];
            if let Some(first) = items.first() {
                shape.extend(implied_shape(first));
            }
            shape
        }
        Value::Array(arr) => arr.shape().to_vec(),
        _ => Vec::new(),
    }
}

#[cfg(feature = "array")]
fn sequence_to_array(items: &[Value]) -> Result<ArrayD<Number>, MagnitudeError> {
    let mut shape = vec![items.len()];
    if let Some(first) = items.first() {
        shape.extend(implied_shape(first));
    }

    // Sized by the leaves actually seen, not by the unchecked implied shape
    let mut data = Vec::new();
    for item in items {
        flatten_into(item, &shape[1..], &mut data)?;
    }

    ArrayD::from_shape_vec(IxDyn(&shape), data)
        .map_err(|e| MagnitudeError::InvalidMagnitude(e.to_string()))
}

/// Push the elements of `value` in row-major order, checking it has `shape`
#[cfg(feature = "array")]
fn flatten_into(value: &Value, shape: &[usize], out: &mut Vec<Number>) -> Result<(), MagnitudeError> {
    let ragged = || MagnitudeError::InvalidMagnitude(
        "sequence has an inhomogeneous shape".to_string()
    );

    match (value, shape.split_first()) {
        (Value::List(items) | Value::Tuple(items), Some((&len, rest))) => {
            if items.len() != len {
                return Err(ragged());
            }
            items.iter().try_for_each(|item| flatten_into(item, rest, out))
        }
        (Value::Array(arr), Some(_)) => {
            if arr.shape() != shape {
                return Err(ragged());
            }
            out.extend(arr.iter().cloned());
            Ok(())
        }
        (_, Some(_)) => Err(ragged()),
        (_, None) => {
            out.push(element_number(value)?);
            Ok(())
        }
    }
}

/// Convert one array element to a number
#[cfg(feature = "array")]
fn element_number(value: &Value) -> Result<Number, MagnitudeError> {
    let invalid = |detail: String| MagnitudeError::InvalidMagnitude(detail);

    match value {
        Value::Int(n) => Ok(Number::from_i64(*n)),
        Value::Float(x) => Number::try_from_f64(*x)
            .map_err(|e| invalid(format!("{} ({})", value, e))),
        Value::Decimal(d) => Ok(d.clone()),
        Value::Text(s) => Number::from_str(s)
            .map_err(|e| invalid(format!("{} ({})", value, e))),
        Value::List(_) | Value::Tuple(_) | Value::Array(_) => {
            Err(invalid("sequence has an inhomogeneous shape".to_string()))
        }
        Value::Map(_) | Value::Bool(_) | Value::Null => Err(invalid(value.to_string())),
    }
}

// ============ selection ============

/// Coercion entry point with its strategy fixed at construction
#[derive(Debug, Clone)]
pub struct Coercer {
    strategy: Arc<dyn CoerceStrategy>,
}

impl Coercer {
    /// Pick the strategy the descriptor calls for
    #[cfg(feature = "array")]
    pub fn new(caps: &Capabilities) -> Self {
        if caps.has_array() {
            Self::array()
        } else {
            Self::scalar()
        }
    }

    /// Pick the strategy the descriptor calls for
    #[cfg(not(feature = "array"))]
    pub fn new(caps: &Capabilities) -> Self {
        if caps.has_array() {
            warn!("array support declared but not compiled in; sequences will be rejected");
        }
        Self::scalar()
    }

    pub fn scalar() -> Self {
        Self::with_strategy(ScalarCoercion)
    }

    #[cfg(feature = "array")]
    pub fn array() -> Self {
        Self::with_strategy(ArrayCoercion)
    }

    pub fn with_strategy<S: CoerceStrategy + 'static>(strategy: S) -> Self {
        Self { strategy: Arc::new(strategy) }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn supports_arrays(&self) -> bool {
        self.strategy.supports_arrays()
    }

    /// Validate `value` and turn it into a magnitude.
    /// With `force_array` and array support, scalars become one-element arrays.
    pub fn coerce(&self, value: impl Into<Value>, force_array: bool) -> Result<Magnitude, MagnitudeError> {
        self.strategy.coerce(value.into(), force_array)
    }
}

impl Default for Coercer {
    fn default() -> Self {
        Self::new(&Capabilities::compiled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quanta_core::Number;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn invalid_inputs() -> Vec<Value> {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Value::Int(1));
        vec![
            Value::Map(BTreeMap::new()),
            Value::Map(map),
            Value::Bool(true),
            Value::Bool(false),
            Value::Null,
        ]
    }

    fn strategies() -> Vec<Coercer> {
        let mut all = vec![Coercer::scalar()];
        #[cfg(feature = "array")]
        all.push(Coercer::array());
        all
    }

    mod shared_rules {
        use super::*;

        #[test]
        fn test_mapping_boolean_null_invalid() {
            for coercer in strategies() {
                for value in invalid_inputs() {
                    for force in [false, true] {
                        let result = coercer.coerce(value.clone(), force);
                        assert!(
                            matches!(result, Err(MagnitudeError::InvalidMagnitude(_))),
                            "{} strategy accepted {}", coercer.strategy_name(), value
                        );
                    }
                }
            }
        }

        #[test]
        fn test_empty_string() {
            for coercer in strategies() {
                assert_eq!(coercer.coerce("", false), Err(MagnitudeError::EmptyMagnitude));
                assert_eq!(coercer.coerce("", true), Err(MagnitudeError::EmptyMagnitude));
            }
        }

        #[test]
        fn test_invalid_message_names_value() {
            let err = Coercer::scalar().coerce(Value::Null, false).unwrap_err();
            assert_eq!(err.to_string(), "Invalid magnitude for Quantity: null");
        }

        #[test]
        fn test_json_object_invalid() {
            for coercer in strategies() {
                let result = coercer.coerce(json!({"value": 3}), false);
                assert!(matches!(result, Err(MagnitudeError::InvalidMagnitude(_))));
            }
        }

        #[test]
        fn test_scalars_unchanged() {
            for coercer in strategies() {
                assert_eq!(coercer.coerce(5i64, false), Ok(Magnitude::Int(5)));
                assert_eq!(coercer.coerce(2.5, false), Ok(Magnitude::Float(2.5)));
                let d = Number::from_str("0.1").unwrap();
                assert_eq!(coercer.coerce(d.clone(), false), Ok(Magnitude::Decimal(d)));
                assert_eq!(coercer.coerce("3 m", false), Ok(Magnitude::Text("3 m".into())));
            }
        }
    }

    mod scalar_strategy {
        use super::*;

        #[test]
        fn test_list_unsupported() {
            let result = Coercer::scalar().coerce(vec![1i64, 2, 3], false);
            assert!(matches!(result, Err(MagnitudeError::UnsupportedMagnitude(_))));
        }

        #[test]
        fn test_tuple_unsupported() {
            let tuple = Value::Tuple(vec![Value::Int(1), Value::Int(2)]);
            let result = Coercer::scalar().coerce(tuple, true);
            assert!(matches!(result, Err(MagnitudeError::UnsupportedMagnitude(_))));
        }

        #[test]
        fn test_unsupported_message() {
            let err = Coercer::scalar().coerce(json!([1]), false).unwrap_err();
            assert_eq!(
                err.to_string(),
                "lists and tuples are valid magnitudes for Quantity only when array support is available"
            );
        }

        #[test]
        fn test_force_array_ignored() {
            assert_eq!(Coercer::scalar().coerce(5i64, true), Ok(Magnitude::Int(5)));
        }

        #[cfg(feature = "array")]
        #[test]
        fn test_array_value_unsupported() {
            let arr = ndarray::arr1(&[Number::from_i64(1)]).into_dyn();
            let result = Coercer::scalar().coerce(Value::Array(arr), false);
            assert!(matches!(result, Err(MagnitudeError::UnsupportedMagnitude(_))));
        }
    }

    #[cfg(feature = "array")]
    mod array_strategy {
        use super::*;
        use ndarray::{arr1, arr2};

        fn nums(values: &[i64]) -> Vec<Number> {
            values.iter().map(|&v| Number::from_i64(v)).collect()
        }

        fn array_of(m: Magnitude) -> ArrayD<Number> {
            match m {
                Magnitude::Array(arr) => arr,
                other => panic!("expected array, got {}", other),
            }
        }

        #[test]
        fn test_list_becomes_array() {
            let arr = array_of(Coercer::array().coerce(vec![1i64, 2, 3], false).unwrap());
            assert_eq!(arr, arr1(&nums(&[1, 2, 3])).into_dyn());
        }

        #[test]
        fn test_tuple_becomes_array() {
            let tuple = Value::Tuple(vec![Value::Int(4), Value::Float(0.5)]);
            let arr = array_of(Coercer::array().coerce(tuple, false).unwrap());
            let expected = vec![Number::from_i64(4), Number::from_str("0.5").unwrap()];
            assert_eq!(arr, arr1(&expected).into_dyn());
        }

        #[test]
        fn test_force_array_promotes_scalar() {
            let arr = array_of(Coercer::array().coerce(5i64, true).unwrap());
            assert_eq!(arr.shape(), &[1]);
            assert_eq!(arr, arr1(&nums(&[5])).into_dyn());
        }

        #[test]
        fn test_without_force_scalar_unchanged() {
            assert_eq!(Coercer::array().coerce(5i64, false), Ok(Magnitude::Int(5)));
        }

        #[test]
        fn test_force_array_numeric_text() {
            let arr = array_of(Coercer::array().coerce("1.25", true).unwrap());
            assert_eq!(arr, arr1(&[Number::from_str("1.25").unwrap()]).into_dyn());
        }

        #[test]
        fn test_force_array_non_numeric_text() {
            let result = Coercer::array().coerce("meter", true);
            assert!(matches!(result, Err(MagnitudeError::InvalidMagnitude(_))));
        }

        #[test]
        fn test_nested_lists() {
            let value = Value::from(json!([[1, 2], [3, 4]]));
            let arr = array_of(Coercer::array().coerce(value, false).unwrap());
            let expected = arr2(&[
                [Number::from_i64(1), Number::from_i64(2)],
                [Number::from_i64(3), Number::from_i64(4)],
            ]).into_dyn();
            assert_eq!(arr, expected);
        }

        #[test]
        fn test_ragged_lists_rejected() {
            let value = Value::from(json!([[1, 2], [3]]));
            let result = Coercer::array().coerce(value, false);
            assert!(matches!(result, Err(MagnitudeError::InvalidMagnitude(_))));

            let value = Value::from(json!([1, [2]]));
            let result = Coercer::array().coerce(value, false);
            assert!(matches!(result, Err(MagnitudeError::InvalidMagnitude(_))));
        }

        #[test]
        fn test_ragged_with_long_leading_rows() {
            // Leading rows imply a shape far larger than the input itself
            let mut value = Value::List((0..1000).map(Value::Int).collect());
            for _ in 0..5 {
                let mut items = vec![value];
                items.extend((0..1000).map(Value::Int));
                value = Value::List(items);
            }
            let result = Coercer::array().coerce(value, false);
            assert!(matches!(result, Err(MagnitudeError::InvalidMagnitude(_))));
        }

        #[test]
        fn test_bad_elements_rejected() {
            for bad in [json!([1, true]), json!([1, null]), json!([{"a": 1}]), json!(["x"])] {
                let result = Coercer::array().coerce(bad.clone(), false);
                assert!(matches!(result, Err(MagnitudeError::InvalidMagnitude(_))), "accepted {}", bad);
            }
            let result = Coercer::array().coerce(vec![1.0, f64::NAN], false);
            assert!(matches!(result, Err(MagnitudeError::InvalidMagnitude(_))));
        }

        #[test]
        fn test_empty_list() {
            let arr = array_of(Coercer::array().coerce(Value::List(vec![]), false).unwrap());
            assert_eq!(arr.shape(), &[0]);
        }

        #[test]
        fn test_nested_array_elements() {
            let row = Value::Array(arr1(&nums(&[1, 2])).into_dyn());
            let value = Value::List(vec![row.clone(), row]);
            let arr = array_of(Coercer::array().coerce(value, false).unwrap());
            assert_eq!(arr.shape(), &[2, 2]);
        }

        #[test]
        fn test_array_passes_through() {
            let arr = arr1(&nums(&[7, 8])).into_dyn();
            let m = Coercer::array().coerce(Value::Array(arr.clone()), false).unwrap();
            assert_eq!(m, Magnitude::Array(arr));
        }
    }

    mod selection {
        use super::*;

        #[test]
        fn test_none_selects_scalar() {
            let coercer = Coercer::new(&Capabilities::none());
            assert_eq!(coercer.strategy_name(), "scalar");
            assert!(!coercer.supports_arrays());
        }

        #[test]
        fn test_compiled_selects_by_feature() {
            let coercer = Coercer::new(&Capabilities::compiled());
            assert_eq!(coercer.supports_arrays(), cfg!(feature = "array"));
            assert_eq!(Coercer::default().supports_arrays(), cfg!(feature = "array"));
        }

        #[test]
        fn test_disabled_array_selects_scalar() {
            let caps = Capabilities::compiled().without_array();
            let coercer = Coercer::new(&caps);
            let result = coercer.coerce(vec![1i64, 2, 3], false);
            assert!(matches!(result, Err(MagnitudeError::UnsupportedMagnitude(_))));
        }

        #[test]
        fn test_coercer_is_shareable() {
            fn assert_send_sync<T: Send + Sync>() {}
            assert_send_sync::<Coercer>();

            let coercer = Coercer::new(&Capabilities::compiled());
            let handles: Vec<_> = (0..4i64).map(|i| {
                let c = coercer.clone();
                std::thread::spawn(move || c.coerce(i, false))
            }).collect();
            for (i, h) in handles.into_iter().enumerate() {
                assert_eq!(h.join().unwrap(), Ok(Magnitude::Int(i as i64)));
            }
        }
    }
}
