//! Direct, type-driven entry points.
//!
//! These functions tie the pipeline together for a Rust type: derive its
//! schema, serialize or map it, or run a generator until it produces one.
//!
//! # Examples
//!
//! ```rust,ignore
//! use shapeguard::direct::{enforce, schema_for};
//!
//! let schema = schema_for::<Invoice>()?;
//! println!("{schema}");
//!
//! let invoice: Invoice = enforce(model, "Extract the invoice from this email: ...").await?;
//! ```

use shapeguard_core::{Describe, Value};
use shapeguard_enforcer::{EnforcementError, EnforcerConfig, Generator, SchemaEnforcer};
use shapeguard_json::{SerializationError, ToValue, ValueSerializer};
use shapeguard_mapper::{FromValue, JsonMapper, MappingError};
use shapeguard_schema::{Schema, SchemaGenerationError, SchemaGenerator, SchemaValidator, ValidationResult};
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Error Type
// ============================================================================

/// Error type for direct calls.
#[derive(Debug, Error)]
pub enum DirectError {
    /// The type has no schema.
    #[error("Schema generation failed: {0}")]
    Schema(#[from] SchemaGenerationError),

    /// The value could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] SerializationError),

    /// The JSON could not be mapped onto the type.
    #[error("Mapping failed: {0}")]
    Mapping(#[from] MappingError),

    /// The generator never produced valid output, or failed.
    #[error(transparent)]
    Enforcement(#[from] EnforcementError),
}

// ============================================================================
// Schema
// ============================================================================

/// Generate the schema for `T`.
pub fn schema_for<T: Describe>() -> Result<Schema, SchemaGenerationError> {
    SchemaGenerator::from_type::<T>()
}

/// Validate `text` against the schema of `T`.
pub fn validate_as<T: Describe>(text: &str) -> Result<ValidationResult, SchemaGenerationError> {
    let validator = SchemaValidator::new(schema_for::<T>()?);
    Ok(validator.validate_text(text))
}

// ============================================================================
// Conversion
// ============================================================================

/// Convert a value into a value tree.
pub fn to_value<T: ToValue + ?Sized>(value: &T) -> Result<Value, SerializationError> {
    ValueSerializer::to_value_tree(value)
}

/// Serialize a value as compact JSON text.
pub fn to_json<T: ToValue + ?Sized>(value: &T) -> Result<String, SerializationError> {
    to_value(value).map(|tree| tree.to_string())
}

/// Serialize a value as indented JSON text.
pub fn to_json_pretty<T: ToValue + ?Sized>(value: &T) -> Result<String, SerializationError> {
    to_value(value).map(|tree| tree.to_pretty_string())
}

/// Parse JSON text into a `T`.
pub fn from_json<T: FromValue>(text: &str) -> Result<T, MappingError> {
    JsonMapper::from_text(text)
}

// ============================================================================
// Enforcement
// ============================================================================

/// Run `generator` until it returns JSON matching `T`'s schema, then map it.
pub async fn enforce<T, G>(generator: G, prompt: &str) -> Result<T, DirectError>
where
    T: Describe + FromValue,
    G: Generator,
{
    enforce_with_config(generator, prompt, EnforcerConfig::default()).await
}

/// Like [`enforce`], with an explicit configuration.
pub async fn enforce_with_config<T, G>(
    generator: G,
    prompt: &str,
    config: EnforcerConfig,
) -> Result<T, DirectError>
where
    T: Describe + FromValue,
    G: Generator,
{
    let schema = schema_for::<T>()?;
    debug!(
        properties = schema.properties().len(),
        max_attempts = config.max_attempts,
        "Enforcing schema"
    );
    let enforcer = SchemaEnforcer::with_config(generator, schema, config)?;
    Ok(enforcer.execute_as::<T>(prompt).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shapeguard_core::{FieldDescriptor, FieldPath, TypeDescriptor, TypeRef};
    use shapeguard_enforcer::ScriptedGenerator;
    use shapeguard_mapper::{object_members, required_field};

    #[derive(Debug, PartialEq)]
    struct City {
        name: String,
        population: u64,
    }

    impl Describe for City {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::structure(
                "tests::City",
                vec![
                    FieldDescriptor::new("name", TypeRef::of::<String>()),
                    FieldDescriptor::new("population", TypeRef::of::<u64>()),
                ],
            )
        }
    }

    impl FromValue for City {
        fn from_value(value: &Value, path: &FieldPath) -> Result<Self, MappingError> {
            let members = object_members(value, path)?;
            Ok(Self {
                name: required_field(members, "name", path)?,
                population: required_field(members, "population", path)?,
            })
        }
    }

    #[test]
    fn test_to_json() {
        assert_eq!(to_json(&vec![1, 2]).unwrap(), "[1,2]");
        assert_eq!(to_json_pretty(&vec![true]).unwrap(), "[\n  true\n]");
        assert!(matches!(to_json(&f64::NAN), Err(SerializationError::NonFinite(_))));
    }

    #[test]
    fn test_validate_as() {
        let result = validate_as::<City>(r#"{"name":"Oslo"}"#).unwrap();
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].path, "$.population");
    }

    #[tokio::test]
    async fn test_enforce() {
        let generator = ScriptedGenerator::new()
            .with_response(r#"{"name":"Oslo"}"#)
            .with_response(r#"{"name":"Oslo","population":709037}"#);

        let city: City = enforce(generator, "Largest city in Norway").await.unwrap();
        assert_eq!(
            city,
            City {
                name: "Oslo".to_string(),
                population: 709037,
            }
        );
    }

    #[tokio::test]
    async fn test_enforce_rejects_bad_config() {
        let generator = ScriptedGenerator::new();
        let config = EnforcerConfig::new().max_attempts(0);
        let err = enforce_with_config::<City, _>(generator, "?", config).await.unwrap_err();
        assert!(matches!(
            err,
            DirectError::Enforcement(EnforcementError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_schema_for_non_struct() {
        assert!(schema_for::<String>().is_err());
    }
}
