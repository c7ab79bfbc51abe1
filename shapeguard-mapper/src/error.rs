//! Error types for typed mapping.

use shapeguard_core::FieldPath;
use shapeguard_json::ParseError;
use thiserror::Error;

/// Result alias for mapping.
pub type Result<T, E = MappingError> = std::result::Result<T, E>;

/// Why a value could not be mapped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingErrorKind {
    /// The value has the wrong kind for the target type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// What the target type accepts.
        expected: String,
        /// What was found.
        found: String,
    },

    /// A string that names no variant of the target enum.
    #[error("unknown variant '{variant}', expected one of [{}]", expected.join(", "))]
    UnknownVariant {
        /// The string found.
        variant: String,
        /// Valid variant names.
        expected: Vec<String>,
    },

    /// A required field is absent.
    #[error("missing required field")]
    MissingField,

    /// A number that does not fit the target type.
    #[error("value {value} is out of range for {target}")]
    OutOfRange {
        /// Number as written.
        value: String,
        /// Target type name.
        target: String,
    },

    /// Array length differs from a fixed-size target.
    #[error("expected an array of length {expected}, found length {found}")]
    LengthMismatch {
        /// Required length.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// A collection or map descriptor with no element, key or value type.
    #[error("raw container type {type_name}; declare its element, key and value types")]
    RawContainer {
        /// Container type name.
        type_name: String,
    },

    /// A map keyed by something other than strings.
    #[error("only string keys are supported for maps, got {key_type}")]
    NonStringKey {
        /// Key type name.
        key_type: String,
    },

    /// A type the mapper cannot build.
    #[error("unsupported type {type_name}")]
    Unsupported {
        /// Type name.
        type_name: String,
    },

    /// The input text is not JSON.
    #[error("invalid JSON: {0}")]
    Parse(ParseError),

    /// Custom error from a hand-written impl.
    #[error("{0}")]
    Custom(String),
}

/// A mapping failure at a location in the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Mapping failed at {path}: {kind}")]
pub struct MappingError {
    /// Where the failure happened.
    pub path: FieldPath,
    /// What went wrong.
    pub kind: MappingErrorKind,
}

impl MappingError {
    /// Create a mapping error.
    pub fn new(path: &FieldPath, kind: MappingErrorKind) -> Self {
        Self {
            path: path.clone(),
            kind,
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(path: &FieldPath, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::new(
            path,
            MappingErrorKind::TypeMismatch {
                expected: expected.into(),
                found: found.into(),
            },
        )
    }

    /// Create a missing field error.
    pub fn missing_field(path: &FieldPath) -> Self {
        Self::new(path, MappingErrorKind::MissingField)
    }

    /// Create an out of range error.
    pub fn out_of_range(path: &FieldPath, value: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            path,
            MappingErrorKind::OutOfRange {
                value: value.into(),
                target: target.into(),
            },
        )
    }

    /// Create an unknown variant error.
    pub fn unknown_variant<I, S>(path: &FieldPath, variant: impl Into<String>, expected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            path,
            MappingErrorKind::UnknownVariant {
                variant: variant.into(),
                expected: expected.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Create a custom error.
    pub fn custom(path: &FieldPath, msg: impl Into<String>) -> Self {
        Self::new(path, MappingErrorKind::Custom(msg.into()))
    }
}

impl From<ParseError> for MappingError {
    fn from(err: ParseError) -> Self {
        Self::new(&FieldPath::root(), MappingErrorKind::Parse(err))
    }
}
