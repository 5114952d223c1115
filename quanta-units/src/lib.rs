//! Quanta Units - Unit-labelled quantities
//!
//! Quantities pair a validated magnitude with a unit label. Construction
//! goes through the coercion strategy selected from the capability
//! descriptor, so invalid magnitudes (mappings, booleans, null, empty text)
//! are rejected up front with structured errors.
//!
//! Unit conversion and dimensional analysis are not provided here.

mod quantity;
mod registry;

pub use quantity::Quantity;
pub use registry::QuantityRegistry;
