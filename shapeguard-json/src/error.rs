//! Error types for parsing and serialization.

use thiserror::Error;

/// Why a parse failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Input is empty or whitespace only.
    #[error("empty input")]
    Empty,

    /// Input ended inside a value.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A character that cannot start or continue the current construct.
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    /// Non-whitespace after a complete value.
    #[error("trailing characters after JSON value")]
    TrailingCharacters,

    /// Malformed number.
    #[error("invalid number")]
    InvalidNumber,

    /// `true`, `false` or `null` misspelled or glued to other letters.
    #[error("invalid literal")]
    InvalidLiteral,

    /// Unknown escape after a backslash.
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),

    /// `\u` not followed by four hex digits.
    #[error("invalid unicode escape")]
    InvalidUnicodeEscape,

    /// Raw control character inside a string.
    #[error("control character in string")]
    ControlCharacter,

    /// Object member without `:`.
    #[error("expected ':' after object key")]
    ExpectedColon,

    /// Object key that is not a string.
    #[error("object keys must be strings")]
    KeyMustBeString,

    /// Trailing comma before `]` or `}`.
    #[error("trailing comma")]
    TrailingComma,

    /// Nesting deeper than the configured limit.
    #[error("nesting exceeds maximum depth of {0}")]
    DepthLimit(usize),

    /// Root value is not an object where one is required.
    #[error("JSON is not an object")]
    NotAnObject,
}

/// Error produced by [`JsonParser`](crate::JsonParser).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    /// Byte offset where the error was detected.
    pub offset: usize,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Create a parse error.
    pub fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { offset, kind }
    }
}

/// Error produced by [`ValueSerializer`](crate::ValueSerializer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializationError {
    /// A value refers back to one of its ancestors.
    #[error("Cyclic reference detected for type: {type_name}")]
    Cycle {
        /// Type of the value seen twice on the current path.
        type_name: String,
    },

    /// A map key is absent.
    #[error("Map contains null key")]
    NullKey,

    /// NaN or infinity.
    #[error("Cannot serialize non-finite number {0}")]
    NonFinite(String),

    /// A `RefCell` is mutably borrowed elsewhere.
    #[error("Value of type {type_name} is mutably borrowed")]
    Borrowed {
        /// Type behind the cell.
        type_name: String,
    },

    /// Custom error from a hand-written `ToValue` impl.
    #[error("Serialization error: {0}")]
    Custom(String),
}

impl SerializationError {
    /// Create a cycle error.
    pub fn cycle(type_name: impl Into<String>) -> Self {
        Self::Cycle {
            type_name: type_name.into(),
        }
    }

    /// Create a custom error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}
