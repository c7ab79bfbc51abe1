//! # shapeguard-mapper
//!
//! Maps validated value trees onto typed targets.
//!
//! - **[`FromValue`]**: strict typed construction, implemented for std
//!   scalars, collections and maps and derived with `#[derive(Shape)]`
//! - **[`JsonMapper`]**: the entry point, with typed
//!   ([`JsonMapper::deserialize`]) and descriptor-driven
//!   ([`JsonMapper::conform`]) mapping
//!
//! Every failure is a [`MappingError`] carrying the `$`-rooted path of the
//! offending value.
//!
//! ## Example
//!
//! ```rust
//! use shapeguard_mapper::JsonMapper;
//!
//! let scores: Vec<u8> = JsonMapper::from_text("[1, 2, 3]").unwrap();
//! assert_eq!(scores, vec![1, 2, 3]);
//!
//! let err = JsonMapper::from_text::<Vec<u8>>("[1, 300]").unwrap_err();
//! assert_eq!(err.path.to_string(), "$[1]");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod from_value;
pub mod mapper;

pub use error::{MappingError, MappingErrorKind, Result};
pub use from_value::{defaulted_field, object_members, required_field, variant_name, FromKey, FromValue};
pub use mapper::JsonMapper;

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::error::{MappingError, MappingErrorKind};
    pub use crate::from_value::{FromKey, FromValue};
    pub use crate::mapper::JsonMapper;
}
