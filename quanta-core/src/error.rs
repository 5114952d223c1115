//! Errors for magnitude coercion and quantity construction
//!
//! `MagnitudeError` is the typed failure of a single coercion call.
//! `QuantaError` is the structured form handed to end users: a stable code,
//! a message and an optional suggestion.

use crate::NumberError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const INVALID_MAGNITUDE: &str = "INVALID_MAGNITUDE";
    pub const EMPTY_MAGNITUDE: &str = "EMPTY_MAGNITUDE";
    pub const UNSUPPORTED_MAGNITUDE: &str = "UNSUPPORTED_MAGNITUDE";
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const DIV_ZERO: &str = "DIV_ZERO";
    pub const DOMAIN_ERROR: &str = "DOMAIN_ERROR";
    pub const OVERFLOW: &str = "OVERFLOW";
}

/// Why a raw value cannot become a magnitude
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MagnitudeError {
    /// Mapping, boolean or null, or an array element/shape that cannot be numeric
    #[error("Invalid magnitude for Quantity: {0}")]
    InvalidMagnitude(String),

    #[error("Quantity magnitude cannot be an empty string")]
    EmptyMagnitude,

    /// Sequence supplied while array support is unavailable
    #[error("{0} are valid magnitudes for Quantity only when array support is available")]
    UnsupportedMagnitude(String),
}

impl MagnitudeError {
    /// Machine-readable code for this failure
    pub fn code(&self) -> &'static str {
        match self {
            MagnitudeError::InvalidMagnitude(_) => codes::INVALID_MAGNITUDE,
            MagnitudeError::EmptyMagnitude => codes::EMPTY_MAGNITUDE,
            MagnitudeError::UnsupportedMagnitude(_) => codes::UNSUPPORTED_MAGNITUDE,
        }
    }
}

/// Context about where an error occurred
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Units of the quantity being built
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,

    /// Propagation notes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Structured error surfaced to end users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantaError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
}

impl QuantaError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            context: None,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: set units context
    pub fn for_units(mut self, units: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.units = Some(units.into());
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.notes.push(note.into());
        self
    }

    // ========== Common Error Constructors ==========

    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", details.into()))
            .with_suggestion("Use a decimal literal such as \"2.5\", \"1/3\" or \"6.02e23\"")
    }

    pub fn domain_error(details: impl Into<String>) -> Self {
        Self::new(codes::DOMAIN_ERROR, format!("Domain error: {}", details.into()))
    }
}

impl std::fmt::Display for QuantaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for QuantaError {}

impl From<MagnitudeError> for QuantaError {
    fn from(err: MagnitudeError) -> Self {
        let base = Self::new(err.code(), err.to_string());
        match err {
            MagnitudeError::InvalidMagnitude(_) => base
                .with_suggestion("Use a number, decimal, numeric text or numeric sequence"),
            MagnitudeError::EmptyMagnitude => base
                .with_suggestion("Provide a numeric value such as \"0\""),
            MagnitudeError::UnsupportedMagnitude(_) => base
                .with_suggestion("Enable the `array` feature or pass a scalar"),
        }
    }
}

impl From<NumberError> for QuantaError {
    fn from(err: NumberError) -> Self {
        match err {
            NumberError::ParseError(s) => Self::parse_error(s),
            NumberError::DivisionByZero => Self::new(codes::DIV_ZERO, "Division by zero")
                .with_suggestion("Ensure divisor is not zero"),
            NumberError::DomainError(s) => Self::domain_error(s),
            NumberError::Overflow => Self::new(codes::OVERFLOW, "Numeric overflow"),
        }
    }
}
