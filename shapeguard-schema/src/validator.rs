//! Validation of value trees against a [`Schema`].
//!
//! The validator never fails: every problem it finds becomes a
//! [`FieldError`] and checking carries on, so one pass reports everything
//! that is wrong with a document. Null is never accepted where a schema
//! node is expected.

use shapeguard_core::{BigDecimal, FieldPath, Map, Value};
use shapeguard_json::JsonParser;
use tracing::debug;

use crate::diagnostics::{ErrorKind, FieldError, ValidationResult};
use crate::schema::{ObjectShape, PropertyKind, PropertySchema, Schema};

/// Checks documents against one schema.
///
/// # Example
///
/// ```rust
/// use shapeguard_schema::{Schema, SchemaValidator};
///
/// let schema = Schema::builder().string("name", "name", true).build();
/// let validator = SchemaValidator::new(schema);
///
/// let result = validator.validate_text(r#"{"age": 3}"#);
/// assert_eq!(
///     result.format_errors(),
///     "Field '$.age': Field not allowed by schema (expected defined in schema, got age)\n\
///      Field '$.name': Missing required field (expected present, got null)"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    schema: Schema,
}

impl SchemaValidator {
    /// Create a validator.
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// The schema being enforced.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Parse `text` and validate it. A parse failure is reported as a
    /// single error at `$`.
    pub fn validate_text(&self, text: &str) -> ValidationResult {
        match JsonParser::parse(text) {
            Ok(value) => self.validate(&value),
            Err(err) => {
                debug!(error = %err, "Document is not valid JSON");
                ValidationResult::new(vec![FieldError::new(
                    "$",
                    ErrorKind::ParseError,
                    "valid JSON",
                    Some(Value::from(text)),
                    err.to_string(),
                )])
            }
        }
    }

    /// Validate a value tree. The root must be an object.
    pub fn validate(&self, value: &Value) -> ValidationResult {
        let mut errors = Vec::new();
        match value {
            Value::Object(map) => validate_object(&self.schema, map, &FieldPath::root(), &mut errors),
            other => errors.push(FieldError::new(
                "$",
                ErrorKind::WrongType,
                "object",
                Some(other.clone()),
                "Root JSON value must be an object",
            )),
        }
        debug!(error_count = errors.len(), "Validated document");
        ValidationResult::new(errors)
    }
}

fn validate_object(schema: &Schema, map: &Map, path: &FieldPath, errors: &mut Vec<FieldError>) {
    // A schema with no declared properties accepts any keys.
    if !schema.properties().is_empty() {
        for key in map.keys().filter(|k| !schema.properties().contains_key(*k)) {
            errors.push(FieldError::new(
                path.key(key.as_str()).to_string(),
                ErrorKind::UnknownField,
                "defined in schema",
                Some(Value::from(key.as_str())),
                "Field not allowed by schema",
            ));
        }
    }
    for name in schema.required().iter().filter(|n| !map.contains_key(*n)) {
        errors.push(FieldError::new(
            path.key(name.as_str()).to_string(),
            ErrorKind::MissingRequired,
            "present",
            None,
            "Missing required field",
        ));
    }
    for (name, prop) in schema.properties() {
        if let Some(value) = map.get(name) {
            validate_property(prop, value, &path.key(name.as_str()), errors);
        }
    }
}

fn validate_property(prop: &PropertySchema, value: &Value, path: &FieldPath, errors: &mut Vec<FieldError>) {
    if value.is_null() {
        errors.push(FieldError::new(
            path.to_string(),
            ErrorKind::ConstraintViolation,
            "non-null",
            None,
            "Null value not allowed",
        ));
        return;
    }

    match &prop.kind {
        PropertyKind::String {
            pattern,
            min_length,
            max_length,
        } => match value {
            Value::String(s) => {
                if let Some(pattern) = pattern {
                    if !pattern.is_match(s) {
                        errors.push(FieldError::new(
                            path.to_string(),
                            ErrorKind::ConstraintViolation,
                            format!("pattern={pattern}"),
                            Some(value.clone()),
                            "String does not match required pattern",
                        ));
                    }
                }
                let len = s.chars().count();
                if let Some(min) = *min_length {
                    if len < min {
                        errors.push(FieldError::new(
                            path.to_string(),
                            ErrorKind::ConstraintViolation,
                            format!("minLength={min}"),
                            Some(value.clone()),
                            format!("String length {len} is less than minimum {min}"),
                        ));
                    }
                }
                if let Some(max) = *max_length {
                    if len > max {
                        errors.push(FieldError::new(
                            path.to_string(),
                            ErrorKind::ConstraintViolation,
                            format!("maxLength={max}"),
                            Some(value.clone()),
                            format!("String length {len} exceeds maximum {max}"),
                        ));
                    }
                }
            }
            other => errors.push(wrong_type(path, "string", other)),
        },
        PropertyKind::Number { minimum, maximum } => match value {
            Value::Number(n) => {
                let exact = n.to_big_decimal();
                if let Some(min) = *minimum {
                    if exact < BigDecimal::from(min) {
                        errors.push(FieldError::new(
                            path.to_string(),
                            ErrorKind::OutOfRange,
                            format!("minimum={min}"),
                            Some(value.clone()),
                            format!("Value {n} is less than minimum {min}"),
                        ));
                    }
                }
                if let Some(max) = *maximum {
                    if exact > BigDecimal::from(max) {
                        errors.push(FieldError::new(
                            path.to_string(),
                            ErrorKind::OutOfRange,
                            format!("maximum={max}"),
                            Some(value.clone()),
                            format!("Value {n} exceeds maximum {max}"),
                        ));
                    }
                }
            }
            other => errors.push(wrong_type(path, "number", other)),
        },
        PropertyKind::Boolean => {
            if !matches!(value, Value::Bool(_)) {
                errors.push(wrong_type(path, "boolean", value));
            }
        }
        PropertyKind::Array { items } => match value {
            Value::Array(elements) => {
                for (i, element) in elements.iter().enumerate() {
                    validate_property(items, element, &path.index(i), errors);
                }
            }
            other => errors.push(wrong_type(path, "array", other)),
        },
        PropertyKind::Object(shape) => match value {
            Value::Object(map) => match shape {
                ObjectShape::Fixed(schema) => validate_object(schema, map, path, errors),
                ObjectShape::Additional(values) => {
                    for (key, entry) in map {
                        validate_property(values, entry, &path.key(key.as_str()), errors);
                    }
                }
            },
            other => errors.push(wrong_type(path, "object", other)),
        },
    }

    if let Some(allowed) = &prop.enum_values {
        let actual = value.to_plain_string();
        if !allowed.contains(&actual) {
            errors.push(FieldError::new(
                path.to_string(),
                ErrorKind::InvalidEnumValue,
                format!("[{}]", allowed.join(", ")),
                Some(value.clone()),
                "Value not in allowed enum values",
            ));
        }
    }
}

fn wrong_type(path: &FieldPath, expected: &str, found: &Value) -> FieldError {
    FieldError::new(
        path.to_string(),
        ErrorKind::WrongType,
        expected,
        Some(found.clone()),
        format!("Expected {expected}, got {}", found.type_name()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn person() -> Schema {
        Schema::builder()
            .string("name", "name", true)
            .property(
                "age",
                PropertySchema::number("age").minimum(0).maximum(150).build(),
                false,
            )
            .build()
    }

    fn kinds(result: &ValidationResult) -> Vec<(String, ErrorKind)> {
        result
            .errors()
            .iter()
            .map(|e| (e.path.clone(), e.kind))
            .collect()
    }

    #[test]
    fn test_valid_document() {
        let result = SchemaValidator::new(person()).validate_text(r#"{"name":"Ada","age":36}"#);
        assert!(result.is_valid(), "{}", result.format_errors());
    }

    #[test]
    fn test_missing_required() {
        let result = SchemaValidator::new(person()).validate_text(r#"{"age":30}"#);
        assert_eq!(kinds(&result), vec![("$.name".to_string(), ErrorKind::MissingRequired)]);
    }

    #[test]
    fn test_enum_rejection() {
        let schema = Schema::builder()
            .enum_values("status", "status", &["open", "closed"], true)
            .build();
        let result = SchemaValidator::new(schema).validate_text(r#"{"status":"pending"}"#);
        assert_eq!(kinds(&result), vec![("$.status".to_string(), ErrorKind::InvalidEnumValue)]);
        assert_eq!(
            result.format_errors(),
            "Field '$.status': Value not in allowed enum values (expected [open, closed], got pending)"
        );
    }

    #[test]
    fn test_unknown_field() {
        let result = SchemaValidator::new(person()).validate_text(r#"{"name":"a","extra":1}"#);
        assert_eq!(kinds(&result), vec![("$.extra".to_string(), ErrorKind::UnknownField)]);
    }

    #[test]
    fn test_empty_schema_accepts_any_keys() {
        let schema = Schema::builder().build();
        let result = SchemaValidator::new(schema).validate_text(r#"{"anything":1}"#);
        assert!(result.is_valid());
    }

    #[test]
    fn test_null_is_a_constraint_violation() {
        let result = SchemaValidator::new(person()).validate_text(r#"{"name":null}"#);
        assert_eq!(
            result.format_errors(),
            "Field '$.name': Null value not allowed (expected non-null, got null)"
        );
        assert_eq!(result.errors()[0].kind, ErrorKind::ConstraintViolation);
    }

    #[rstest]
    #[case(r#"{"name":5}"#, "Field '$.name': Expected string, got number (expected string, got 5)")]
    #[case(r#"{"name":"a","age":"old"}"#, "Field '$.age': Expected number, got string (expected number, got old)")]
    #[case(r#"{"name":"a","age":-1}"#, "Field '$.age': Value -1 is less than minimum 0 (expected minimum=0, got -1)")]
    #[case(r#"{"name":"a","age":150.5}"#, "Field '$.age': Value 150.5 exceeds maximum 150 (expected maximum=150, got 150.5)")]
    fn test_type_and_range_errors(#[case] text: &str, #[case] expected: &str) {
        let result = SchemaValidator::new(person()).validate_text(text);
        assert_eq!(result.format_errors(), expected);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let validator = SchemaValidator::new(person());
        assert!(validator.validate_text(r#"{"name":"a","age":0}"#).is_valid());
        assert!(validator.validate_text(r#"{"name":"a","age":150}"#).is_valid());
        assert!(validator.validate_text(r#"{"name":"a","age":150.0}"#).is_valid());
    }

    #[test]
    fn test_string_constraints_reported_independently() {
        let schema = Schema::builder()
            .property(
                "code",
                PropertySchema::string("code")
                    .pattern("[A-Z]{3}")
                    .unwrap()
                    .min_length(3)
                    .max_length(3)
                    .build(),
                true,
            )
            .build();
        let validator = SchemaValidator::new(schema);
        let result = validator.validate_text(r#"{"code":"abcd"}"#);
        assert_eq!(
            result.format_errors(),
            "Field '$.code': String does not match required pattern (expected pattern=[A-Z]{3}, got abcd)\n\
             Field '$.code': String length 4 exceeds maximum 3 (expected maxLength=3, got abcd)"
        );
        assert!(validator.validate_text(r#"{"code":"ABC"}"#).is_valid());
    }

    #[test]
    fn test_length_counts_characters() {
        let schema = Schema::builder()
            .property("s", PropertySchema::string("s").max_length(2).build(), true)
            .build();
        assert!(SchemaValidator::new(schema).validate_text(r#"{"s":"éé"}"#).is_valid());
    }

    #[test]
    fn test_nested_paths() {
        let item = Schema::builder().string("id", "id", true).build();
        let schema = Schema::builder()
            .property(
                "items",
                PropertySchema::array("items", PropertySchema::object("item", item)),
                true,
            )
            .property(
                "scores",
                PropertySchema::map("scores", PropertySchema::number("score").build()),
                true,
            )
            .build();
        let result = SchemaValidator::new(schema)
            .validate_text(r#"{"items":[{"id":"a"},{"id":2},{}],"scores":{"x":1,"y":"no"}}"#);
        assert_eq!(
            kinds(&result),
            vec![
                ("$.items[1].id".to_string(), ErrorKind::WrongType),
                ("$.items[2].id".to_string(), ErrorKind::MissingRequired),
                ("$.scores.y".to_string(), ErrorKind::WrongType),
            ]
        );
    }

    #[test]
    fn test_root_must_be_object() {
        let result = SchemaValidator::new(person()).validate_text("[1]");
        assert_eq!(kinds(&result), vec![("$".to_string(), ErrorKind::WrongType)]);
        assert_eq!(result.errors()[0].message, "Root JSON value must be an object");
    }

    #[test]
    fn test_parse_error() {
        let result = SchemaValidator::new(person()).validate_text("not json");
        assert_eq!(kinds(&result), vec![("$".to_string(), ErrorKind::ParseError)]);
        assert_eq!(result.errors()[0].expected, "valid JSON");
    }

    #[test]
    fn test_idempotent() {
        let validator = SchemaValidator::new(person());
        let value = JsonParser::parse(r#"{"name":1,"x":null}"#).unwrap();
        assert_eq!(validator.validate(&value), validator.validate(&value));
    }

    #[test]
    fn test_accumulates_errors() {
        let result = SchemaValidator::new(person()).validate_text(r#"{"age":"x","other":true}"#);
        assert_eq!(
            kinds(&result),
            vec![
                ("$.other".to_string(), ErrorKind::UnknownField),
                ("$.name".to_string(), ErrorKind::MissingRequired),
                ("$.age".to_string(), ErrorKind::WrongType),
            ]
        );
    }
}
