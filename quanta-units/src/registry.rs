//! Quantity registry
//!
//! Holds the capability descriptor resolved at startup together with the
//! coercion strategy it selects, so quantity construction never consults
//! ambient state.

use quanta_core::{QuantaError, Value};
use quanta_compat::{Capabilities, Coercer};
use tracing::debug;

use crate::Quantity;

/// Central quantity factory
#[derive(Debug, Clone)]
pub struct QuantityRegistry {
    capabilities: Capabilities,
    coercer: Coercer,
    force_array: bool,
}

impl QuantityRegistry {
    pub fn new(capabilities: Capabilities) -> Self {
        let coercer = Coercer::new(&capabilities);
        debug!(strategy = coercer.strategy_name(), "quantity registry ready");
        Self { capabilities, coercer, force_array: false }
    }

    /// Registry for the detected capabilities of this process
    pub fn detect() -> Self {
        Self::new(Capabilities::detect())
    }

    /// Promote every scalar magnitude to a one-element array.
    /// Has no effect without array support.
    pub fn with_force_array(mut self, enabled: bool) -> Self {
        self.force_array = enabled;
        self
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn coercer(&self) -> &Coercer {
        &self.coercer
    }

    pub fn forces_array(&self) -> bool {
        self.force_array
    }

    /// Build a quantity from a raw value and a unit label
    pub fn quantity(&self, value: impl Into<Value>, units: &str) -> Result<Quantity, QuantaError> {
        Quantity::build(value.into(), units, &self.coercer, self.force_array)
    }
}

impl Default for QuantityRegistry {
    fn default() -> Self {
        Self::new(Capabilities::compiled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quanta_core::codes;
    use quanta_compat::Magnitude;

    #[test]
    fn test_scalar_registry() {
        let registry = QuantityRegistry::new(Capabilities::none());
        assert!(!registry.capabilities().has_array());
        assert_eq!(registry.coercer().strategy_name(), "scalar");

        let q = registry.quantity(5i64, "m").unwrap();
        assert_eq!(q.magnitude(), &Magnitude::Int(5));

        let err = registry.quantity(vec![1i64, 2], "m").unwrap_err();
        assert_eq!(err.code, codes::UNSUPPORTED_MAGNITUDE);
    }

    #[test]
    fn test_force_array_without_arrays() {
        let registry = QuantityRegistry::new(Capabilities::none()).with_force_array(true);
        assert!(registry.forces_array());
        assert!(!registry.quantity(5i64, "m").unwrap().is_array());
    }

    #[test]
    fn test_default_follows_build() {
        let registry = QuantityRegistry::default();
        assert_eq!(registry.coercer().supports_arrays(), cfg!(feature = "array"));
        assert!(!registry.forces_array());
    }

    #[test]
    fn test_detect_uses_process_capabilities() {
        let registry = QuantityRegistry::detect();
        let expected = Capabilities::from_env(Capabilities::compiled());
        assert_eq!(registry.capabilities(), &expected);
        assert_eq!(registry.coercer().supports_arrays(), expected.has_array());
        assert_eq!(registry.quantity(3i64, "m").unwrap().magnitude(), &Magnitude::Int(3));
    }

    #[cfg(feature = "array")]
    #[test]
    fn test_force_array_registry() {
        let registry = QuantityRegistry::new(Capabilities::compiled()).with_force_array(true);
        let q = registry.quantity(5i64, "m").unwrap();
        assert!(q.is_array());
        assert_eq!(q.to_string(), "[5] m");

        let q = registry.quantity(vec![1i64, 2, 3], "m").unwrap();
        assert_eq!(q.magnitude().as_array().map(|a| a.len()), Some(3));
    }

    #[cfg(feature = "array")]
    #[test]
    fn test_disabled_arrays_reject_sequences() {
        let registry = QuantityRegistry::new(Capabilities::compiled().without_array());
        let err = registry.quantity(vec![1i64, 2, 3], "m").unwrap_err();
        assert_eq!(err.code, codes::UNSUPPORTED_MAGNITUDE);
    }
}
