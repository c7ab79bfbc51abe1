//! Error types shared by the value layer.

use thiserror::Error;

/// Result alias for number construction.
pub type Result<T, E = NumberError> = std::result::Result<T, E>;

/// Error building a [`Number`](crate::Number).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    /// The literal is not a valid integer or decimal.
    #[error("Invalid number literal: {0}")]
    InvalidLiteral(String),

    /// NaN and infinities have no JSON representation.
    #[error("Non-finite number: {0}")]
    NonFinite(String),

    /// The number has a fractional part.
    #[error("Not an integer: {0}")]
    Fractional(String),

    /// The exponent is too large to expand into an integer.
    #[error("Exponent too large for an integer: {0}")]
    ExponentTooLarge(String),
}

impl NumberError {
    /// Create an invalid literal error.
    pub fn invalid_literal(literal: impl Into<String>) -> Self {
        Self::InvalidLiteral(literal.into())
    }

    /// Create a non-finite error from a float.
    pub fn non_finite(value: f64) -> Self {
        Self::NonFinite(value.to_string())
    }
}
