//! # shapeguard-schema
//!
//! Schemas for structured generator output.
//!
//! - **[`Schema`]** / **[`PropertySchema`]**: an immutable, reusable
//!   description of the expected shape, built by hand or derived
//! - **[`SchemaGenerator`]**: derives a schema from a type descriptor
//! - **[`SchemaValidator`]**: checks a document and reports every problem as
//!   a structured [`FieldError`]
//!
//! Schemas render to deterministic JSON text ([`Schema::to_text`]) that can
//! be embedded in a prompt and parsed back as ordinary JSON.
//!
//! ## Example
//!
//! ```rust
//! use shapeguard_schema::{Schema, SchemaValidator};
//!
//! let schema = Schema::builder()
//!     .string("name", "Full name", true)
//!     .enum_values("status", "Status", &["open", "closed"], true)
//!     .build();
//!
//! let result = SchemaValidator::new(schema).validate_text(r#"{"name":"Alice","status":"open"}"#);
//! assert!(result.is_valid());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod diagnostics;
pub mod error;
pub mod generator;
pub mod render;
pub mod schema;
pub mod validator;

pub use diagnostics::{ErrorKind, FieldError, ValidationResult};
pub use error::{SchemaError, SchemaGenerationError};
pub use generator::SchemaGenerator;
pub use schema::{
    NumberSchemaBuilder, ObjectShape, Pattern, PropertyKind, PropertySchema, Schema,
    SchemaBuilder, StringSchemaBuilder,
};
pub use validator::SchemaValidator;

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::diagnostics::{ErrorKind, FieldError, ValidationResult};
    pub use crate::error::{SchemaError, SchemaGenerationError};
    pub use crate::generator::SchemaGenerator;
    pub use crate::schema::{PropertySchema, Schema, SchemaBuilder};
    pub use crate::validator::SchemaValidator;
}
