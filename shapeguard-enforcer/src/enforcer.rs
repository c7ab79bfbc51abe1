//! The validate-and-repair loop.

use shapeguard_core::FieldPath;
use shapeguard_mapper::{FromValue, JsonMapper};
use shapeguard_schema::{ErrorKind, FieldError, Schema, SchemaValidator};
use tracing::{debug, info, warn};

use crate::config::EnforcerConfig;
use crate::error::{EnforcementError, EnforcementResult};
use crate::extract::extract_json_object;
use crate::generator::Generator;
use crate::prompt::{PromptBuilder, EXTRACTION_FAILURE};

/// What happened in one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    /// Attempt number, starting at 1.
    pub attempt: u32,
    /// Raw generator response.
    pub response: String,
    /// The JSON object extracted from the response, if any.
    pub candidate: Option<String>,
    /// Violations found. Empty for the successful attempt.
    pub errors: Vec<FieldError>,
}

impl AttemptRecord {
    /// Whether this attempt produced valid output.
    pub fn succeeded(&self) -> bool {
        self.candidate.is_some() && self.errors.is_empty()
    }
}

/// Output of a successful run with its attempt history.
#[derive(Debug, Clone, PartialEq)]
pub struct EnforcementReport {
    /// The validated JSON text.
    pub output: String,
    /// Every attempt in order; the last one succeeded.
    pub attempts: Vec<AttemptRecord>,
}

/// Drives a [`Generator`] until its output satisfies a [`Schema`].
///
/// Each attempt sends a prompt, extracts a JSON object from the response and
/// validates it. Invalid output triggers a repair prompt that quotes the
/// previous candidate and its violations. The loop ends with the first valid
/// candidate or after `max_attempts` attempts.
///
/// # Example
///
/// ```rust
/// use shapeguard_enforcer::{SchemaEnforcer, ScriptedGenerator};
/// use shapeguard_schema::Schema;
///
/// # tokio_test::block_on(async {
/// let schema = Schema::builder().string("name", "Name", true).build();
/// let generator = ScriptedGenerator::new().with_response(r#"{"name":"Alice"}"#);
///
/// let enforcer = SchemaEnforcer::new(generator, schema);
/// let json = enforcer.execute("Who?").await.unwrap();
/// assert_eq!(json, r#"{"name":"Alice"}"#);
/// # });
/// ```
#[derive(Debug)]
pub struct SchemaEnforcer<G> {
    generator: G,
    validator: SchemaValidator,
    prompts: PromptBuilder,
    config: EnforcerConfig,
}

impl<G: Generator> SchemaEnforcer<G> {
    /// Create an enforcer with the default configuration.
    pub fn new(generator: G, schema: Schema) -> Self {
        let config = EnforcerConfig::default();
        Self {
            generator,
            prompts: PromptBuilder::new(&schema, &config),
            validator: SchemaValidator::new(schema),
            config,
        }
    }

    /// Create an enforcer with `config`, rejecting unusable configurations.
    pub fn with_config(generator: G, schema: Schema, config: EnforcerConfig) -> EnforcementResult<Self> {
        config.validate()?;
        Ok(Self {
            generator,
            prompts: PromptBuilder::new(&schema, &config),
            validator: SchemaValidator::new(schema),
            config,
        })
    }

    /// The schema being enforced.
    pub fn schema(&self) -> &Schema {
        self.validator.schema()
    }

    /// The active configuration.
    pub fn config(&self) -> &EnforcerConfig {
        &self.config
    }

    /// The generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Run the loop and return the validated JSON text.
    pub async fn execute(&self, prompt: &str) -> EnforcementResult<String> {
        self.execute_with_report(prompt).await.map(|report| report.output)
    }

    /// Run the loop and map the validated JSON onto `T`.
    pub async fn execute_as<T: FromValue>(&self, prompt: &str) -> EnforcementResult<T> {
        let output = self.execute(prompt).await?;
        Ok(JsonMapper::from_text(&output)?)
    }

    /// Run the loop and return the output with every attempt made.
    pub async fn execute_with_report(&self, prompt: &str) -> EnforcementResult<EnforcementReport> {
        let max_attempts = self.config.max_attempts;
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut current_prompt = self.prompts.initial(prompt);

        for attempt in 1..=max_attempts {
            debug!(attempt, max_attempts, "Requesting structured output");

            let response = self.generator.generate(&current_prompt).await.map_err(|e| {
                warn!(attempt, error = %e, "Generator failed");
                EnforcementError::Generation(e)
            })?;

            let Some(candidate) = extract_json_object(&response) else {
                warn!(attempt, "No JSON object in response");
                current_prompt = self
                    .prompts
                    .repair(prompt, attempt, &response, EXTRACTION_FAILURE);
                attempts.push(AttemptRecord {
                    attempt,
                    errors: vec![extraction_error(&response)],
                    response,
                    candidate: None,
                });
                continue;
            };

            let result = self.validator.validate_text(candidate);
            if result.is_valid() {
                info!(attempt, "Structured output accepted");
                let output = candidate.to_string();
                attempts.push(AttemptRecord {
                    attempt,
                    candidate: Some(output.clone()),
                    response,
                    errors: Vec::new(),
                });
                return Ok(EnforcementReport { output, attempts });
            }

            warn!(
                attempt,
                error_count = result.errors().len(),
                "Structured output rejected"
            );
            current_prompt = self
                .prompts
                .repair(prompt, attempt, candidate, &result.format_errors());
            attempts.push(AttemptRecord {
                attempt,
                candidate: Some(candidate.to_string()),
                errors: result.into_errors(),
                response,
            });
        }

        let (last_response, last_errors) = attempts
            .pop()
            .map(|record| (record.response, record.errors))
            .unwrap_or_default();
        warn!(max_attempts, "Structured output attempts exhausted");
        Err(EnforcementError::Exhausted {
            attempts: max_attempts,
            last_response,
            last_errors,
        })
    }
}

fn extraction_error(response: &str) -> FieldError {
    FieldError::new(
        FieldPath::root().to_string(),
        ErrorKind::ParseError,
        "JSON object",
        Some(response.into()),
        EXTRACTION_FAILURE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{FnGenerator, ScriptedGenerator};
    use crate::GenerationError;
    use pretty_assertions::assert_eq;
    use shapeguard_mapper::{object_members, required_field, MappingError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn person_schema() -> Schema {
        Schema::builder()
            .string("name", "Full name", true)
            .number("age", "Age in years", false)
            .build()
    }

    #[derive(Debug, PartialEq)]
    struct Person {
        name: String,
        age: Option<u32>,
    }

    impl FromValue for Person {
        fn from_value(value: &shapeguard_core::Value, path: &FieldPath) -> Result<Self, MappingError> {
            let members = object_members(value, path)?;
            Ok(Self {
                name: required_field(members, "name", path)?,
                age: required_field(members, "age", path)?,
            })
        }
    }

    #[tokio::test]
    async fn test_repairs_after_non_json() {
        let generator = ScriptedGenerator::new()
            .with_response("not json")
            .with_response(r#"{"name":"Alice"}"#);
        let enforcer = SchemaEnforcer::new(generator.clone(), person_schema());

        let output = enforcer.execute("Extract the person").await.unwrap();
        assert_eq!(output, r#"{"name":"Alice"}"#);

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("The JSON must match this schema exactly"));
        assert!(prompts[1].contains("Attempt 1 failed."));
        assert!(prompts[1].contains("Previous JSON:\nnot json\n\n"));
        assert!(prompts[1].contains(EXTRACTION_FAILURE));
    }

    #[tokio::test]
    async fn test_repair_prompt_lists_violations() {
        let generator = ScriptedGenerator::new()
            .with_response("```json\n{\"age\":\"ten\"}\n```")
            .with_response(r#"{"name":"Bob","age":10}"#);
        let enforcer = SchemaEnforcer::new(generator.clone(), person_schema());

        let report = enforcer.execute_with_report("Who?").await.unwrap();
        assert_eq!(report.attempts.len(), 2);
        assert!(!report.attempts[0].succeeded());
        assert!(report.attempts[1].succeeded());
        assert_eq!(report.attempts[0].candidate.as_deref(), Some(r#"{"age":"ten"}"#));

        let repair = &generator.prompts()[1];
        assert!(repair.contains("Previous JSON:\n{\"age\":\"ten\"}\n\n"));
        assert!(repair.contains(
            "Field '$.name': Missing required field (expected present, got null)"
        ));
        assert!(repair.contains("Field '$.age': Expected number, got string"));
    }

    #[tokio::test]
    async fn test_exhausted() {
        let generator = ScriptedGenerator::new()
            .with_response("{}")
            .with_response("{}")
            .with_response("still nothing");
        let enforcer = SchemaEnforcer::new(generator.clone(), person_schema());

        let err = enforcer.execute("Who?").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to get valid JSON after 3 attempts");
        match err {
            EnforcementError::Exhausted {
                attempts,
                last_response,
                last_errors,
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_response, "still nothing");
                assert_eq!(last_errors.len(), 1);
                assert_eq!(last_errors[0].message, EXTRACTION_FAILURE);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(generator.call_count(), 3);
    }

    #[tokio::test]
    async fn test_generator_failure_is_not_retried() {
        let generator = ScriptedGenerator::new()
            .with_failure("rate limited")
            .with_response(r#"{"name":"Alice"}"#);
        let enforcer = SchemaEnforcer::new(generator.clone(), person_schema());

        let err = enforcer.execute("Who?").await.unwrap_err();
        assert!(matches!(err, EnforcementError::Generation(_)));
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_single_attempt_budget() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let generator = FnGenerator::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("{}".to_string())
        });
        let config = EnforcerConfig::new().max_attempts(1);
        let enforcer = SchemaEnforcer::with_config(generator, person_schema(), config).unwrap();

        assert!(enforcer.execute("Who?").await.unwrap_err().is_exhausted());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_attempt_non_json() {
        let generator = ScriptedGenerator::new()
            .with_response("not json")
            .with_response("not json");
        let config = EnforcerConfig::new().max_attempts(1);
        let enforcer = SchemaEnforcer::with_config(generator.clone(), person_schema(), config).unwrap();

        let err = enforcer.execute("Who?").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to get valid JSON after 1 attempts");
        assert_eq!(err.last_response(), Some("not json"));
        assert_eq!(generator.call_count(), 1);
        assert_eq!(generator.remaining(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let generator = FnGenerator::new(|_| Err(GenerationError::Timeout));
        let config = EnforcerConfig::new().max_attempts(0);
        let err = SchemaEnforcer::with_config(generator, person_schema(), config).unwrap_err();
        assert!(matches!(err, EnforcementError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_execute_as() {
        let generator = ScriptedGenerator::new().with_response(r#"{"name":"Alice","age":30}"#);
        let enforcer = SchemaEnforcer::new(generator, person_schema());

        let person: Person = enforcer.execute_as("Who?").await.unwrap();
        assert_eq!(
            person,
            Person {
                name: "Alice".to_string(),
                age: Some(30),
            }
        );
    }

    #[tokio::test]
    async fn test_execute_as_mapping_failure() {
        let generator = ScriptedGenerator::new().with_response(r#"{"name":"Alice","age":-4}"#);
        let enforcer = SchemaEnforcer::new(generator, person_schema());

        let err = enforcer.execute_as::<Person>("Who?").await.unwrap_err();
        assert!(matches!(err, EnforcementError::Mapping(_)));
    }
}
