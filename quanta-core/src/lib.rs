//! Quanta Core - Fundamental types
//!
//! This crate provides the core types used throughout Quanta:
//! - `Number`: Arbitrary precision decimal numbers
//! - `Value`: Raw, unvalidated values handed to quantity construction
//! - `MagnitudeError`: Why a value cannot become a magnitude
//! - `QuantaError`: Structured errors with machine-readable codes

mod number;
mod value;
mod error;

pub use number::{Number, NumberError};
pub use value::Value;
pub use error::{MagnitudeError, QuantaError, ErrorContext, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Number, Value, MagnitudeError, QuantaError};
    pub use crate::error::codes;
}
