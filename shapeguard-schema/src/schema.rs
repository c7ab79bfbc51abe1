//! The schema model.
//!
//! A [`Schema`] is the root object node: named properties, a required set
//! and an optional description. Each property is a [`PropertySchema`] whose
//! [`PropertyKind`] carries the type tag and its type-specific constraints.
//! Arrays always have an item schema and objects have either fixed
//! properties or an additional-properties schema, never both; the types
//! make the other combinations unrepresentable.
//!
//! ```rust
//! use shapeguard_schema::{PropertySchema, Schema};
//!
//! let schema = Schema::builder()
//!     .string("name", "The user's name", true)
//!     .property(
//!         "age",
//!         PropertySchema::number("The user's age").minimum(0).maximum(150).build(),
//!         false,
//!     )
//!     .enum_values("status", "Account status", &["active", "inactive"], true)
//!     .description("User information")
//!     .build();
//!
//! assert_eq!(schema.required(), ["name", "status"]);
//! ```

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::SchemaError;

/// A regular expression that must match a whole string.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern. Matching is anchored at both ends.
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self { source, regex })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the whole of `text` matches.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Shape of an object node.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectShape {
    /// Named properties with a required set.
    Fixed(Schema),
    /// Open string-keyed map; every value must match this schema.
    Additional(Box<PropertySchema>),
}

/// Type tag and type-specific constraints of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// A string.
    String {
        /// Regex the whole string must match.
        pattern: Option<Pattern>,
        /// Minimum length in characters.
        min_length: Option<usize>,
        /// Maximum length in characters.
        max_length: Option<usize>,
    },
    /// Any number.
    Number {
        /// Inclusive minimum.
        minimum: Option<i64>,
        /// Inclusive maximum.
        maximum: Option<i64>,
    },
    /// A boolean.
    Boolean,
    /// A homogeneous array.
    Array {
        /// Schema every element must match.
        items: Box<PropertySchema>,
    },
    /// A nested object.
    Object(ObjectShape),
}

impl PropertyKind {
    /// JSON type name of this kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Number { .. } => "number",
            Self::Boolean => "boolean",
            Self::Array { .. } => "array",
            Self::Object(_) => "object",
        }
    }
}

/// One typed, constrained node of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySchema {
    /// Human-readable description, rendered when non-empty.
    pub description: String,
    /// Allowed values, compared against the value's string form.
    pub enum_values: Option<Vec<String>>,
    /// Type tag and constraints.
    pub kind: PropertyKind,
}

impl PropertySchema {
    fn with_kind(description: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            description: description.into(),
            enum_values: None,
            kind,
        }
    }

    /// Start a string property.
    pub fn string(description: impl Into<String>) -> StringSchemaBuilder {
        StringSchemaBuilder::new(description)
    }

    /// Start a number property.
    pub fn number(description: impl Into<String>) -> NumberSchemaBuilder {
        NumberSchemaBuilder::new(description)
    }

    /// Boolean property.
    pub fn boolean(description: impl Into<String>) -> Self {
        Self::with_kind(description, PropertyKind::Boolean)
    }

    /// String property restricted to `values`.
    pub fn enumeration<I, S>(description: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::string(description).build().with_enum_values(values)
    }

    /// Array whose elements match `items`.
    pub fn array(description: impl Into<String>, items: PropertySchema) -> Self {
        Self::with_kind(
            description,
            PropertyKind::Array {
                items: Box::new(items),
            },
        )
    }

    /// Nested object with fixed properties.
    pub fn object(description: impl Into<String>, schema: Schema) -> Self {
        Self::with_kind(description, PropertyKind::Object(ObjectShape::Fixed(schema)))
    }

    /// Open string-keyed map whose values match `values`.
    pub fn map(description: impl Into<String>, values: PropertySchema) -> Self {
        Self::with_kind(
            description,
            PropertyKind::Object(ObjectShape::Additional(Box::new(values))),
        )
    }

    /// Restrict the property to `values`.
    #[must_use]
    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// JSON type name.
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Builder for string properties.
#[derive(Debug, Clone)]
pub struct StringSchemaBuilder {
    description: String,
    pattern: Option<Pattern>,
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl StringSchemaBuilder {
    fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            pattern: None,
            min_length: None,
            max_length: None,
        }
    }

    /// Require the whole string to match `pattern`.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, SchemaError> {
        let compiled = Pattern::new(pattern).map_err(|e| SchemaError::invalid_pattern(pattern, &e))?;
        self.pattern = Some(compiled);
        Ok(self)
    }

    /// Use an already compiled pattern.
    #[must_use]
    pub fn compiled_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Minimum length in characters.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    /// Maximum length in characters.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Finish the property.
    pub fn build(self) -> PropertySchema {
        PropertySchema::with_kind(
            self.description,
            PropertyKind::String {
                pattern: self.pattern,
                min_length: self.min_length,
                max_length: self.max_length,
            },
        )
    }
}

/// Builder for number properties.
#[derive(Debug, Clone)]
pub struct NumberSchemaBuilder {
    description: String,
    minimum: Option<i64>,
    maximum: Option<i64>,
}

impl NumberSchemaBuilder {
    fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            minimum: None,
            maximum: None,
        }
    }

    /// Inclusive minimum.
    #[must_use]
    pub fn minimum(mut self, min: i64) -> Self {
        self.minimum = Some(min);
        self
    }

    /// Inclusive maximum.
    #[must_use]
    pub fn maximum(mut self, max: i64) -> Self {
        self.maximum = Some(max);
        self
    }

    /// Finish the property.
    pub fn build(self) -> PropertySchema {
        PropertySchema::with_kind(
            self.description,
            PropertyKind::Number {
                minimum: self.minimum,
                maximum: self.maximum,
            },
        )
    }
}

/// Root object node of a schema. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    description: Option<String>,
    properties: IndexMap<String, PropertySchema>,
    required: Vec<String>,
}

impl Schema {
    /// Start building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Type-level description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared properties in declaration order.
    pub fn properties(&self) -> &IndexMap<String, PropertySchema> {
        &self.properties
    }

    /// Look up a property.
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name)
    }

    /// Required property names, unique, in the order they were declared.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Whether `name` is required.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Fluent builder for [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    description: Option<String>,
    properties: IndexMap<String, PropertySchema>,
    required: Vec<String>,
}

impl SchemaBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a property.
    #[must_use]
    pub fn property(mut self, name: &str, schema: PropertySchema, required: bool) -> Self {
        self.properties.insert(name.to_string(), schema);
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    /// Add a plain string property.
    #[must_use]
    pub fn string(self, name: &str, desc: &str, required: bool) -> Self {
        self.property(name, PropertySchema::string(desc).build(), required)
    }

    /// Add a plain number property.
    #[must_use]
    pub fn number(self, name: &str, desc: &str, required: bool) -> Self {
        self.property(name, PropertySchema::number(desc).build(), required)
    }

    /// Add a boolean property.
    #[must_use]
    pub fn boolean(self, name: &str, desc: &str, required: bool) -> Self {
        self.property(name, PropertySchema::boolean(desc), required)
    }

    /// Add a string property restricted to `values`.
    #[must_use]
    pub fn enum_values(self, name: &str, desc: &str, values: &[&str], required: bool) -> Self {
        self.property(
            name,
            PropertySchema::enumeration(desc, values.iter().copied()),
            required,
        )
    }

    /// Mark additional names as required.
    #[must_use]
    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    /// Build the schema. Duplicate required names collapse to the first.
    pub fn build(self) -> Schema {
        let mut required: Vec<String> = Vec::with_capacity(self.required.len());
        for name in self.required {
            if !required.contains(&name) {
                required.push(name);
            }
        }
        Schema {
            description: self.description,
            properties: self.properties,
            required,
        }
    }
}
