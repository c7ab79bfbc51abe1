//! Enforcer configuration.

use serde::{Deserialize, Serialize};

use crate::error::{EnforcementError, EnforcementResult};

/// Default number of attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Configuration for [`SchemaEnforcer`](crate::SchemaEnforcer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnforcerConfig {
    /// Total generator calls allowed, including the first.
    pub max_attempts: u32,
    /// Formatting instructions for the first prompt. `None` uses the built-in text.
    pub instructions: Option<String>,
    /// Correction instructions for repair prompts. `None` uses the built-in text.
    pub repair_instructions: Option<String>,
    /// Embed the schema indented instead of compact.
    pub pretty_schema: bool,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            instructions: None,
            repair_instructions: None,
            pretty_schema: false,
        }
    }
}

impl EnforcerConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attempt budget.
    #[must_use]
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Override the first-prompt instructions.
    #[must_use]
    pub fn instructions(mut self, text: impl Into<String>) -> Self {
        self.instructions = Some(text.into());
        self
    }

    /// Override the repair instructions.
    #[must_use]
    pub fn repair_instructions(mut self, text: impl Into<String>) -> Self {
        self.repair_instructions = Some(text.into());
        self
    }

    /// Embed the schema indented.
    #[must_use]
    pub fn pretty_schema(mut self, pretty: bool) -> Self {
        self.pretty_schema = pretty;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> EnforcementResult<()> {
        if self.max_attempts == 0 {
            return Err(EnforcementError::invalid_config(
                "max_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}
