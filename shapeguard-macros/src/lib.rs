//! # shapeguard-macros
//!
//! Derive macros for shapeguard.
//!
//! `#[derive(Shape)]` implements the three traits that let a type take part
//! in schema enforcement:
//!
//! - `Describe`: a type descriptor, from which schemas are generated
//! - `ToValue`: conversion into a value tree
//! - `FromValue`: strict construction from a validated value tree
//!
//! ```ignore
//! use shapeguard::Shape;
//!
//! /// A support ticket
//! #[derive(Shape)]
//! struct Ticket {
//!     /// Short summary
//!     #[shape(min_length = 1, max_length = 80)]
//!     title: String,
//!     #[shape(minimum = 1, maximum = 5)]
//!     priority: u8,
//!     status: Status,
//!     assignee: Option<String>,
//! }
//!
//! #[derive(Shape)]
//! #[shape(rename_all = "snake_case")]
//! enum Status {
//!     Open,
//!     InProgress,
//!     Closed,
//! }
//! ```

extern crate proc_macro;

mod attrs;
mod shape;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive `Describe`, `ToValue` and `FromValue`.
///
/// Supported on structs with named fields and enums whose variants are all
/// unit variants. Enums are carried as their variant names.
///
/// # Container attributes
///
/// - `#[shape(description = "...")]` - Type description (default: doc comment)
/// - `#[shape(rename_all = "...")]` - Rename fields and variants: `snake_case`,
///   `camelCase`, `lowercase`, `UPPERCASE` or `SCREAMING_SNAKE_CASE`
///
/// # Field attributes
///
/// - `#[shape(description = "...")]` - Field description (default: doc comment,
///   then the field name)
/// - `#[shape(rename = "...")]` - JSON member name
/// - `#[shape(ignore)]` - Skip in schemas, serialization and mapping; the
///   field takes its `Default` when mapped
/// - `#[shape(default)]` - Not required; takes its `Default` when absent
/// - `#[shape(pattern = "...")]`, `#[shape(min_length = n)]`,
///   `#[shape(max_length = n)]` - String constraints
/// - `#[shape(minimum = n)]`, `#[shape(maximum = n)]` - Inclusive numeric bounds
///
/// # Variant attributes
///
/// - `#[shape(rename = "...")]` - Variant name
#[proc_macro_derive(Shape, attributes(shape))]
pub fn derive_shape(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match shape::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
