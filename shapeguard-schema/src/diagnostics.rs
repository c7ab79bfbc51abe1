//! Structured validation diagnostics.

use std::fmt;

use serde::Serialize;
use shapeguard_core::Value;

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A required property is absent.
    MissingRequired,
    /// The value has the wrong JSON type.
    WrongType,
    /// The value is not one of the allowed enum values.
    InvalidEnumValue,
    /// The value is malformed for its type.
    InvalidFormat,
    /// A number is outside its bounds.
    OutOfRange,
    /// A property the schema does not declare.
    UnknownField,
    /// The text is not JSON.
    ParseError,
    /// A string constraint or the no-null rule was violated.
    ConstraintViolation,
}

/// One validation failure, located by a `$`-rooted path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Where the failure is, e.g. `$.items[0].name`.
    pub path: String,
    /// Category.
    pub kind: ErrorKind,
    /// What the schema expected.
    pub expected: String,
    /// What was found, if anything.
    pub received: Option<Value>,
    /// Human-readable explanation.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(
        path: impl Into<String>,
        kind: ErrorKind,
        expected: impl Into<String>,
        received: Option<Value>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            expected: expected.into(),
            received,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let received = self
            .received
            .as_ref()
            .map_or_else(|| "null".to_string(), Value::to_plain_string);
        write!(
            f,
            "Field '{}': {} (expected {}, got {})",
            self.path, self.message, self.expected, received
        )
    }
}

/// Outcome of validating one document. Valid iff there are no errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    errors: Vec<FieldError>,
}

impl ValidationResult {
    /// Wrap a list of errors.
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// A result with no errors.
    pub fn valid() -> Self {
        Self::default()
    }

    /// Whether the document conforms.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether any error was found.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// All errors in discovery order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Take the errors.
    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Errors located exactly at `path`.
    pub fn errors_for_field(&self, path: &str) -> Vec<&FieldError> {
        self.errors.iter().filter(|e| e.path == path).collect()
    }

    /// One line per error, newline-joined.
    pub fn format_errors(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
