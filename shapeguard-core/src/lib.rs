//! # shapeguard-core
//!
//! Core types for shapeguard.
//!
//! This crate holds the pieces every other shapeguard crate agrees on:
//!
//! - **[`Value`]**: the generic JSON tree produced by the parser and the
//!   serializer, and consumed by the validator and the mapper
//! - **[`Number`]**: arbitrary-precision numbers that keep the
//!   integer/decimal distinction of their source text
//! - **[`TypeDescriptor`]** and **[`Describe`]**: runtime descriptions of
//!   target types, used to derive schemas and to drive mapping
//! - **[`FieldPath`]**: `$`-rooted locators used in diagnostics
//!
//! ## Example
//!
//! ```rust
//! use shapeguard_core::{Number, Value};
//!
//! let value = Value::from_iter([("name", Value::from("Alice")), ("age", Value::from(30))]);
//! assert_eq!(value.to_string(), r#"{"name":"Alice","age":30}"#);
//! assert_eq!(value.get("age").and_then(Value::as_number), Some(&Number::Integer(30)));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod descriptor;
pub mod errors;
pub mod number;
pub mod path;
pub mod value;

pub use descriptor::{
    Describe, FieldDescriptor, FieldMeta, NumberKind, TypeDescriptor, TypeKind, TypeRef,
};
pub use errors::NumberError;
pub use number::{narrow_integer, Number, MAX_INTEGRAL_EXPONENT};
pub use path::{FieldPath, PathSegment};
pub use value::{write_json_string, Map, Value};

// Numeric crates, re-exported so downstream code and derived impls agree on versions.
pub use bigdecimal::BigDecimal;
pub use num_bigint::BigInt;

/// Prelude module for common imports.
///
/// ```rust
/// use shapeguard_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::descriptor::{
        Describe, FieldDescriptor, FieldMeta, NumberKind, TypeDescriptor, TypeKind, TypeRef,
    };
    pub use crate::number::Number;
    pub use crate::path::FieldPath;
    pub use crate::value::{Map, Value};
}
