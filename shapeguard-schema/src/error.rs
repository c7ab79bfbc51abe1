//! Error types for schema construction and derivation.

use thiserror::Error;

/// Error building a schema by hand.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// The pattern is not a valid regular expression.
    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Pattern source.
        pattern: String,
        /// Regex compiler message.
        message: String,
    },
}

impl SchemaError {
    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, err: &regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: err.to_string(),
        }
    }
}

/// Error deriving a schema from a type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaGenerationError {
    /// The root type is not a struct.
    #[error("Cannot generate a schema for {type_name}: the root type must be a struct")]
    RootNotObject {
        /// Offending type.
        type_name: String,
    },

    /// A type references itself through its fields.
    #[error("Circular reference detected: {type_name} references itself. Use #[shape(ignore)] or refactor structure.")]
    Cycle {
        /// Type reached twice on the same path.
        type_name: String,
    },

    /// A collection or map with no declared element, key or value type.
    #[error("Field '{field}' is a raw container; declare its element, key and value types")]
    RawContainer {
        /// Field name.
        field: String,
    },

    /// A fixed array with no item descriptor.
    #[error("Field '{field}' is an array without an item type")]
    MissingItems {
        /// Field name.
        field: String,
    },

    /// A map keyed by something other than strings.
    #[error("Field '{field}' is a map with non-string keys ({key_type}); only string keys are supported")]
    NonStringKey {
        /// Field name.
        field: String,
        /// Key type name.
        key_type: String,
    },

    /// A terminal type with no schema equivalent.
    #[error("Unsupported type {type_name} for field '{field}'. Supported: strings, chars, numbers, booleans, enums, options, collections, arrays, string-keyed maps and structs")]
    Unsupported {
        /// Field name.
        field: String,
        /// Type name.
        type_name: String,
    },

    /// A pattern marker that does not compile.
    #[error("Field '{field}' has an invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Field name.
        field: String,
        /// Pattern source.
        pattern: String,
        /// Regex compiler message.
        message: String,
    },

    /// A marker that does not apply to the field's type.
    #[error("Field '{field}': marker '{marker}' does not apply to {type_name}")]
    MisplacedMarker {
        /// Field name.
        field: String,
        /// Marker name.
        marker: &'static str,
        /// Type name.
        type_name: String,
    },
}

impl SchemaGenerationError {
    /// Create a cycle error.
    pub fn cycle(type_name: impl Into<String>) -> Self {
        Self::Cycle {
            type_name: type_name.into(),
        }
    }

    /// Create a raw container error.
    pub fn raw_container(field: impl Into<String>) -> Self {
        Self::RawContainer {
            field: field.into(),
        }
    }

    /// Create an unsupported type error.
    pub fn unsupported(field: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::Unsupported {
            field: field.into(),
            type_name: type_name.into(),
        }
    }
}
