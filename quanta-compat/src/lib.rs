//! Quanta Compat - Optional capabilities and magnitude coercion
//!
//! Smooths over which optional backends a build has:
//! - `Capabilities`: descriptor of array, locale, uncertainty, tabular and
//!   test-framework support, resolved once at startup
//! - `Coercer`: validates raw values and turns them into `Magnitude`s,
//!   using the array-backed or scalar-only strategy the descriptor selects
//!
//! Array support comes from the `array` cargo feature (ndarray).

mod capabilities;
mod coerce;
mod magnitude;
mod version;

pub use capabilities::{
    Backend, Capabilities, NumericKind, Support,
    vars, ARRAY_BACKEND, ARRAY_BACKEND_VERSION, BEHAVIOR_CHANGE_NOTICE,
};
pub use coerce::{CoerceStrategy, Coercer, ScalarCoercion};
#[cfg(feature = "array")]
pub use coerce::ArrayCoercion;
pub use magnitude::Magnitude;
pub use version::{normalize_version, version_at_least};

/// Re-export core types for downstream crates
pub mod prelude {
    pub use crate::{Capabilities, Coercer, Magnitude};
    pub use quanta_core::prelude::*;
}
