//! Arbitrary-precision JSON numbers.
//!
//! A [`Number`] keeps the integer/decimal distinction of its source text:
//! `123` stays an integer and `123.0` stays a decimal. Integers that fit in
//! an `i64` are stored inline; wider ones fall back to [`BigInt`].

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive, Zero};
use serde::{Serialize, Serializer};

use crate::errors::{NumberError, Result};

/// Largest decimal exponent [`Number::to_integral`] expands into digits.
pub const MAX_INTEGRAL_EXPONENT: u64 = 4096;

fn pow10(exponent: u64) -> BigInt {
    // Callers bound the exponent well below u32::MAX.
    BigInt::from(10u8).pow(exponent as u32)
}

/// A JSON number.
#[derive(Debug, Clone)]
pub enum Number {
    /// Integer within `i64` range.
    Integer(i64),
    /// Integer outside `i64` range.
    BigInteger(BigInt),
    /// Number written with a fraction or exponent.
    Decimal(BigDecimal),
}

impl Number {
    /// Build an integer, narrowing to `i64` when it fits.
    pub fn integer(value: BigInt) -> Self {
        match value.to_i64() {
            Some(small) => Self::Integer(small),
            None => Self::BigInteger(value),
        }
    }

    /// Build a decimal.
    pub fn decimal(value: BigDecimal) -> Self {
        Self::Decimal(value)
    }

    /// Parse an integer literal (optional sign and digits only).
    pub fn parse_integer(literal: &str) -> Result<Self> {
        if let Ok(small) = literal.parse::<i64>() {
            return Ok(Self::Integer(small));
        }
        BigInt::from_str(literal)
            .map(Self::integer)
            .map_err(|_| NumberError::invalid_literal(literal))
    }

    /// Parse a decimal literal (fraction and/or exponent).
    pub fn parse_decimal(literal: &str) -> Result<Self> {
        BigDecimal::from_str(literal)
            .map(Self::Decimal)
            .map_err(|_| NumberError::invalid_literal(literal))
    }

    /// Convert a float. Finite floats become decimals.
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(NumberError::non_finite(value));
        }
        // Display gives the shortest text that round-trips, never exponent form.
        Self::parse_decimal(&value.to_string())
    }

    /// Convert a 128-bit signed integer.
    pub fn from_i128(value: i128) -> Self {
        match i64::try_from(value) {
            Ok(small) => Self::Integer(small),
            Err(_) => Self::BigInteger(BigInt::from(value)),
        }
    }

    /// Convert a 128-bit unsigned integer.
    pub fn from_u128(value: u128) -> Self {
        match i64::try_from(value) {
            Ok(small) => Self::Integer(small),
            Err(_) => Self::BigInteger(BigInt::from(value)),
        }
    }

    /// Whether this number was written without fraction or exponent.
    pub fn is_integer(&self) -> bool {
        !matches!(self, Self::Decimal(_))
    }

    /// Whether this number was written with a fraction or exponent.
    pub fn is_decimal(&self) -> bool {
        matches!(self, Self::Decimal(_))
    }

    /// The value as `i64` if it is an integer in range.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::BigInteger(n) => n.to_i64(),
            Self::Decimal(_) => None,
        }
    }

    /// The value as a [`BigInt`] if it is an integer.
    pub fn as_big_int(&self) -> Option<BigInt> {
        match self {
            Self::Integer(n) => Some(BigInt::from(*n)),
            Self::BigInteger(n) => Some(n.clone()),
            Self::Decimal(_) => None,
        }
    }

    /// The integral value of this number, accepting decimals with no
    /// fractional part such as `3.0`.
    ///
    /// Decimals whose exponent exceeds [`MAX_INTEGRAL_EXPONENT`] are refused
    /// before any digits are expanded.
    pub fn to_integral(&self) -> Result<BigInt> {
        let d = match self {
            Self::Decimal(d) => d,
            Self::Integer(n) => return Ok(BigInt::from(*n)),
            Self::BigInteger(n) => return Ok(n.clone()),
        };
        let (digits, scale) = d.as_bigint_and_exponent();
        if digits.is_zero() {
            return Ok(digits);
        }
        if scale <= 0 {
            let exponent = scale.unsigned_abs();
            if exponent > MAX_INTEGRAL_EXPONENT {
                return Err(NumberError::ExponentTooLarge(self.to_string()));
            }
            return Ok(digits * pow10(exponent));
        }
        // A scale wider than the digits leaves a non-zero value below one.
        let max_digits = digits.bits() * 30_103 / 100_000 + 1;
        if scale.unsigned_abs() > max_digits {
            return Err(NumberError::Fractional(self.to_string()));
        }
        let divisor = pow10(scale.unsigned_abs());
        if (&digits % &divisor).is_zero() {
            Ok(digits / divisor)
        } else {
            Err(NumberError::Fractional(self.to_string()))
        }
    }

    /// Lossy conversion to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => n.to_f64(),
            Self::BigInteger(n) => n.to_f64(),
            Self::Decimal(d) => d.to_f64(),
        }
    }

    /// Exact conversion to a [`BigDecimal`], used for bound checks.
    pub fn to_big_decimal(&self) -> BigDecimal {
        match self {
            Self::Integer(n) => BigDecimal::from(*n),
            Self::BigInteger(n) => BigDecimal::new(n.clone(), 0),
            Self::Decimal(d) => d.clone(),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Decimal(_), _) | (_, Self::Decimal(_)) => false,
            (a, b) => a.as_big_int() == b.as_big_int(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::BigInteger(n) => write!(f, "{n}"),
            Self::Decimal(d) => {
                let text = d.to_string();
                // Keep decimals recognisable as decimals when re-parsed.
                if text.contains(['.', 'e', 'E']) {
                    f.write_str(&text)
                } else {
                    write!(f, "{text}.0")
                }
            }
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::BigInteger(n) => match n.to_u64() {
                Some(wide) => serializer.serialize_u64(wide),
                None => serializer.serialize_str(&n.to_string()),
            },
            Self::Decimal(d) => match d.to_f64().filter(|f| f.is_finite()) {
                Some(float) => serializer.serialize_f64(float),
                None => serializer.serialize_str(&self.to_string()),
            },
        }
    }
}

macro_rules! number_from_small_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Self::Integer(i64::from(value))
                }
            }
        )*
    };
}

number_from_small_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Self::from_u128(u128::from(value))
    }
}

impl From<isize> for Number {
    fn from(value: isize) -> Self {
        Self::from_i128(value as i128)
    }
}

impl From<usize> for Number {
    fn from(value: usize) -> Self {
        Self::from_u128(value as u128)
    }
}

impl From<i128> for Number {
    fn from(value: i128) -> Self {
        Self::from_i128(value)
    }
}

impl From<u128> for Number {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Self::integer(value)
    }
}

impl From<BigDecimal> for Number {
    fn from(value: BigDecimal) -> Self {
        Self::Decimal(value)
    }
}

impl TryFrom<f64> for Number {
    type Error = NumberError;

    fn try_from(value: f64) -> Result<Self> {
        Self::from_f64(value)
    }
}

impl TryFrom<f32> for Number {
    type Error = NumberError;

    fn try_from(value: f32) -> Result<Self> {
        if !value.is_finite() {
            return Err(NumberError::non_finite(f64::from(value)));
        }
        // Go through the f32 text so 0.1f32 stays 0.1 rather than its f64 widening.
        Self::parse_decimal(&value.to_string())
    }
}

/// Narrow a [`BigInt`] into any primitive integer, if it fits.
pub fn narrow_integer<T: FromPrimitive>(value: &BigInt) -> Option<T> {
    if let Some(small) = value.to_i128() {
        return T::from_i128(small);
    }
    value.to_u128().and_then(T::from_u128)
}
