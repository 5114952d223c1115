//! Arbitrary precision numbers using dashu
//!
//! Decimal magnitudes and array elements are stored as dashu-float `DBig`
//! so that values like `0.1` or `602214076e15` keep their exact digits.

use dashu_float::DBig;
use dashu_int::IBig;
use serde::{Deserialize, Serialize, Serializer, Deserializer};
use thiserror::Error;

/// Error type for number operations
#[derive(Debug, Clone, Error)]
pub enum NumberError {
    #[error("Invalid number format: {0}")]
    ParseError(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("Overflow: result too large")]
    Overflow,
}

/// Default precision for parsed values (decimal digits)
const DEFAULT_PRECISION: usize = 50;

/// Longest run of padding zeros rendered positionally
const MAX_PADDING: usize = 64;

/// Arbitrary precision decimal number
///
/// Built on dashu-float's DBig. Construction from text or floats returns
/// a `Result`; nothing here panics.
#[derive(Debug, Clone)]
pub struct Number {
    inner: DBig,
}

impl Number {
    // ========== Construction ==========

    /// Ensure a DBig has adequate precision
    fn with_work_precision(val: DBig) -> DBig {
        val.with_precision(DEFAULT_PRECISION).value()
    }

    /// Create from string representation
    /// Supports: "123", "3.14", "1/3", "1.5e10", "-42"
    pub fn from_str(s: &str) -> Result<Self, NumberError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NumberError::ParseError(s.to_string()));
        }

        // Handle rational format "a/b"
        if s.contains('/') && !s.contains('.') && !s.contains('e') && !s.contains('E') {
            let parts: Vec<&str> = s.split('/').collect();
            if parts.len() == 2 {
                let num: DBig = parts[0].trim().parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;
                let den: DBig = parts[1].trim().parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;

                if den == DBig::ZERO {
                    return Err(NumberError::DivisionByZero);
                }

                let result = Self::with_work_precision(num) / Self::with_work_precision(den);
                return Ok(Self { inner: result });
            }
        }

        // Scientific notation with integer mantissa: "602214076e15"
        if (s.contains('e') || s.contains('E')) && !s.contains('.') {
            let s_lower = s.to_lowercase();
            let parts: Vec<&str> = s_lower.split('e').collect();
            if parts.len() == 2 {
                let mantissa: IBig = parts[0].parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;
                let exp: i32 = parts[1].parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;

                let result = DBig::from_parts(mantissa, exp as isize);
                return Ok(Self { inner: Self::with_work_precision(result) });
            }
        }

        let inner: DBig = s.parse()
            .map_err(|_| NumberError::ParseError(s.to_string()))?;

        Ok(Self { inner: Self::with_work_precision(inner) })
    }

    /// Create from i64 with working precision
    pub fn from_i64(n: i64) -> Self {
        Self { inner: Self::with_work_precision(DBig::from(n)) }
    }

    /// Create from u64 with working precision
    pub fn from_u64(n: u64) -> Self {
        Self { inner: Self::with_work_precision(DBig::from(n)) }
    }

    /// Create from f64. NaN and infinities have no decimal form.
    pub fn try_from_f64(f: f64) -> Result<Self, NumberError> {
        if f.is_nan() {
            return Err(NumberError::DomainError("NaN has no decimal representation".to_string()));
        }
        if f.is_infinite() {
            return Err(NumberError::Overflow);
        }
        // Shortest round-trip text keeps the digits the caller wrote
        Self::from_str(&format!("{:e}", f))
    }

    // ========== Display ==========

    /// Exact positional text of the stored decimal, without trailing
    /// zeros. Exponents far outside the digits fall back to the
    /// `<digits>e<exp>` form that `from_str` reads back.
    fn decimal_text(&self) -> String {
        let (significand, exponent) = self.inner.clone().into_repr().into_parts();
        let text = significand.to_string();
        let (sign, digits) = match text.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", text.as_str()),
        };

        if digits == "0" {
            return "0".to_string();
        }

        if exponent >= 0 {
            let zeros = exponent as usize;
            if zeros > MAX_PADDING {
                return format!("{}{}e{}", sign, digits, exponent);
            }
            return format!("{}{}{}", sign, digits, "0".repeat(zeros));
        }

        let shift = exponent.unsigned_abs();
        let positional = if shift < digits.len() {
            let (whole, frac) = digits.split_at(digits.len() - shift);
            format!("{}.{}", whole, frac)
        } else if shift - digits.len() > MAX_PADDING {
            return format!("{}{}e{}", sign, digits, exponent);
        } else {
            format!("0.{}{}", "0".repeat(shift - digits.len()), digits)
        };

        let trimmed = positional.trim_end_matches('0').trim_end_matches('.');
        format!("{}{}", sign, trimmed)
    }
}

// ========== Trait Implementations ==========

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.decimal_text())
    }
}

/// Serialized as the exact decimal text, so every stored digit survives
impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.decimal_text())
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for Number {}
