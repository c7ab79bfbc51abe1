//! # shapeguard-json
//!
//! JSON text and typed values, to and from [`Value`](shapeguard_core::Value).
//!
//! - **[`JsonParser`]**: a strict recursive-descent parser that keeps the
//!   integer/decimal distinction and reports errors with byte offsets
//! - **[`ValueSerializer`]** / **[`ToValue`]**: typed values to value trees,
//!   with cycle detection for shared-ownership graphs
//! - **[`interop`]**: conversions to and from `serde_json::Value`
//!
//! ## Example
//!
//! ```rust
//! use shapeguard_json::{JsonParser, ValueSerializer};
//!
//! let value = JsonParser::parse(r#"{"tags": ["a", "b"]}"#).unwrap();
//! assert_eq!(value.to_string(), r#"{"tags":["a","b"]}"#);
//!
//! let tree = ValueSerializer::to_value_tree(&vec!["a", "b"]).unwrap();
//! assert_eq!(Some(&tree), value.get("tags"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod interop;
pub mod parser;
pub mod serializer;

pub use error::{ParseError, ParseErrorKind, SerializationError};
pub use interop::{from_serde, to_serde};
pub use parser::{JsonParser, ParserConfig, DEFAULT_MAX_DEPTH};
pub use serializer::{ToKey, ToValue, ValueSerializer};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::error::{ParseError, SerializationError};
    pub use crate::parser::JsonParser;
    pub use crate::serializer::{ToKey, ToValue, ValueSerializer};
}
