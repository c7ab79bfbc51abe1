//! # shapeguard-enforcer
//!
//! Wraps a text generator in a validate-and-repair loop so its output
//! satisfies a [`Schema`](shapeguard_schema::Schema).
//!
//! ## Core Concepts
//!
//! - **[`Generator`]**: the async capability being driven, usually a language
//!   model client
//! - **[`SchemaEnforcer`]**: prompts, extracts, validates and retries with
//!   the violations fed back to the generator
//! - **[`EnforcerConfig`]**: attempt budget and prompt overrides
//!
//! ## Example
//!
//! ```rust
//! use shapeguard_enforcer::{SchemaEnforcer, ScriptedGenerator};
//! use shapeguard_schema::Schema;
//!
//! # tokio_test::block_on(async {
//! let schema = Schema::builder().string("name", "Name", true).build();
//! let generator = ScriptedGenerator::new()
//!     .with_response("Sorry, here you go")
//!     .with_response(r#"{"name":"Alice"}"#);
//!
//! let enforcer = SchemaEnforcer::new(generator, schema);
//! let report = enforcer.execute_with_report("Who wrote this?").await.unwrap();
//! assert_eq!(report.output, r#"{"name":"Alice"}"#);
//! assert_eq!(report.attempts.len(), 2);
//! # });
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod enforcer;
pub mod error;
pub mod extract;
pub mod generator;
pub mod prompt;

pub use config::{EnforcerConfig, DEFAULT_MAX_ATTEMPTS};
pub use enforcer::{AttemptRecord, EnforcementReport, SchemaEnforcer};
pub use error::{EnforcementError, EnforcementResult, GenerationError};
pub use extract::extract_json_object;
pub use generator::{FnGenerator, Generator, ScriptedGenerator};
pub use prompt::{PromptBuilder, DEFAULT_INSTRUCTIONS, DEFAULT_REPAIR_INSTRUCTIONS, EXTRACTION_FAILURE};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::config::EnforcerConfig;
    pub use crate::enforcer::{EnforcementReport, SchemaEnforcer};
    pub use crate::error::{EnforcementError, GenerationError};
    pub use crate::generator::{FnGenerator, Generator, ScriptedGenerator};
}
