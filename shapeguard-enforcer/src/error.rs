//! Enforcement error types.

use shapeguard_mapper::MappingError;
use shapeguard_schema::FieldError;
use thiserror::Error;

/// Result alias for enforcement.
pub type EnforcementResult<T> = Result<T, EnforcementError>;

/// Failure reported by a [`Generator`](crate::Generator).
///
/// Generator failures are never retried by the enforcer.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The generator did not answer in time.
    #[error("Generation timed out")]
    Timeout,

    /// A scripted generator ran out of responses.
    #[error("No scripted responses left")]
    ScriptExhausted,

    /// Any other failure.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl GenerationError {
    /// Create an error from a message.
    pub fn msg(msg: impl std::fmt::Display + std::fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Other(anyhow::Error::msg(msg))
    }
}

/// Errors from [`SchemaEnforcer`](crate::SchemaEnforcer).
#[derive(Debug, Error)]
pub enum EnforcementError {
    /// Every attempt produced invalid output.
    #[error("Failed to get valid JSON after {attempts} attempts")]
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// Raw text of the final response.
        last_response: String,
        /// Violations found in the final response.
        last_errors: Vec<FieldError>,
    },

    /// The generator failed.
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Valid output could not be mapped onto the target type.
    #[error("Mapping failed: {0}")]
    Mapping(#[from] MappingError),

    /// The enforcer configuration is unusable.
    #[error("Invalid enforcer configuration: {0}")]
    InvalidConfig(String),
}

impl EnforcementError {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Raw text of the final response, if the loop ran out of attempts.
    pub fn last_response(&self) -> Option<&str> {
        match self {
            Self::Exhausted { last_response, .. } => Some(last_response),
            _ => None,
        }
    }

    /// Whether the loop ran out of attempts.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_display() {
        let err = EnforcementError::Exhausted {
            attempts: 3,
            last_response: "nope".to_string(),
            last_errors: Vec::new(),
        };
        assert_eq!(err.to_string(), "Failed to get valid JSON after 3 attempts");
        assert_eq!(err.last_response(), Some("nope"));
        assert!(err.is_exhausted());
    }

    #[test]
    fn test_generation_from_anyhow() {
        let err: EnforcementError = GenerationError::from(anyhow::anyhow!("quota exceeded")).into();
        assert_eq!(err.to_string(), "Generation failed: quota exceeded");
        assert!(err.last_response().is_none());
    }
}
