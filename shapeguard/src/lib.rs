//! # shapeguard - Schema-Enforced Structured Output
//!
//! shapeguard turns the free-form text of a language model into typed,
//! validated data. It derives a JSON schema from a Rust type, asks the model
//! for JSON matching it, validates what comes back with precise diagnostics,
//! and feeds those diagnostics back to the model until the output conforms
//! or the attempt budget runs out.
//!
//! ## Quick Start
//!
//! ```ignore
//! use shapeguard::prelude::*;
//!
//! /// A support ticket
//! #[derive(Debug, Shape)]
//! struct Ticket {
//!     /// One-line summary
//!     #[shape(min_length = 1, max_length = 80)]
//!     title: String,
//!     #[shape(minimum = 1, maximum = 5)]
//!     priority: u8,
//!     assignee: Option<String>,
//! }
//!
//! let ticket: Ticket = shapeguard::direct::enforce(my_model, "Triage this email: ...").await?;
//! ```
//!
//! ## Key Features
//!
//! - **Exact JSON parsing** with arbitrary-precision numbers
//! - **Schema derivation** from types via `#[derive(Shape)]`
//! - **Structured diagnostics** with `$`-rooted paths for every violation
//! - **Repair loop** that quotes violations back to the generator
//! - **Strict typed mapping** with range-checked integers
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|--------|
//! | `macros` | `#[derive(Shape)]` | ✅ |
//!
//! ## Architecture
//!
//! shapeguard is organized as a workspace of focused crates:
//!
//! - [`shapeguard_core`] - Value tree, numbers, type descriptors
//! - [`shapeguard_json`] - JSON parser and value serializer
//! - [`shapeguard_schema`] - Schema model, generator and validator
//! - [`shapeguard_mapper`] - Typed mapping of validated documents
//! - [`shapeguard_enforcer`] - Generator trait and the repair loop
//! - `shapeguard_macros` - Procedural macros

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Derived code names paths through `::shapeguard`, including in this crate's tests.
extern crate self as shapeguard;

// ============================================================================
// Direct Access
// ============================================================================

/// Type-driven shortcuts over the whole pipeline.
pub mod direct;

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Value tree, numbers, paths and type descriptors.
pub use shapeguard_core as core;

/// JSON parsing and value serialization.
pub use shapeguard_json as json;

/// Schema model, generation, rendering and validation.
pub use shapeguard_schema as schema;

/// Typed mapping.
pub use shapeguard_mapper as mapper;

/// Generator capability and the enforcement loop.
pub use shapeguard_enforcer as enforcer;

// ============================================================================
// Macro Re-exports
// ============================================================================

/// Derive macro for `Describe`, `ToValue` and `FromValue`.
#[cfg(feature = "macros")]
#[cfg_attr(docsrs, doc(cfg(feature = "macros")))]
pub use shapeguard_macros::Shape;

// ============================================================================
// Type Re-exports
// ============================================================================

pub use shapeguard_core::{
    Describe, FieldDescriptor, FieldMeta, FieldPath, Map, Number, NumberKind, TypeDescriptor,
    TypeKind, TypeRef, Value,
};
pub use shapeguard_enforcer::{
    AttemptRecord, EnforcementError, EnforcementReport, EnforcerConfig, FnGenerator,
    GenerationError, Generator, SchemaEnforcer, ScriptedGenerator,
};
pub use shapeguard_json::{JsonParser, ParseError, SerializationError, ToValue, ValueSerializer};
pub use shapeguard_mapper::{FromValue, JsonMapper, MappingError};
pub use shapeguard_schema::{
    ErrorKind, FieldError, PropertySchema, Schema, SchemaGenerationError, SchemaGenerator,
    SchemaValidator, ValidationResult,
};

pub use direct::DirectError;

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient prelude for common imports.
///
/// ```ignore
/// use shapeguard::prelude::*;
/// ```
pub mod prelude {
    // Values
    pub use crate::core::{Describe, FieldPath, Number, TypeDescriptor, Value};

    // JSON
    pub use crate::json::{JsonParser, ToValue};

    // Schemas
    pub use crate::schema::{
        ErrorKind, FieldError, Schema, SchemaGenerator, SchemaValidator, ValidationResult,
    };

    // Mapping
    pub use crate::mapper::{FromValue, JsonMapper};

    // Enforcement
    pub use crate::enforcer::{
        EnforcementError, EnforcerConfig, FnGenerator, GenerationError, Generator, SchemaEnforcer,
    };

    // Direct access
    pub use crate::direct::{enforce, from_json, schema_for, to_json, DirectError};

    #[cfg(feature = "macros")]
    pub use crate::Shape;
}
