//! Schema derivation from type descriptors.
//!
//! [`SchemaGenerator`] walks a struct's [`TypeDescriptor`] field by field
//! and builds the matching [`Schema`]. Optional and defaulted fields stay
//! out of the required set, ignored fields disappear, and field markers
//! become string or number constraints.
//!
//! Each call keeps its own stack of the struct types being expanded, so a
//! type that contains itself is rejected while two sibling fields of the
//! same struct type are fine.

use shapeguard_core::{Describe, FieldDescriptor, FieldMeta, TypeDescriptor, TypeKind};
use tracing::debug;

use crate::error::SchemaGenerationError;
use crate::schema::{Pattern, PropertySchema, Schema, SchemaBuilder};

type Result<T> = std::result::Result<T, SchemaGenerationError>;

/// Builds schemas from descriptors.
///
/// # Example
///
/// ```rust
/// use shapeguard_core::{FieldDescriptor, FieldMeta, TypeDescriptor, TypeRef};
/// use shapeguard_schema::SchemaGenerator;
///
/// let person = TypeDescriptor::structure(
///     "Person",
///     vec![
///         FieldDescriptor::new("name", TypeRef::of::<String>())
///             .with_meta(FieldMeta::new().description("Full name")),
///         FieldDescriptor::new("age", TypeRef::of::<Option<u32>>()),
///     ],
/// );
///
/// let schema = SchemaGenerator::from_descriptor(&person).unwrap();
/// assert_eq!(schema.required(), ["name"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaGenerator;

impl SchemaGenerator {
    /// Derive the schema of a [`Describe`] type.
    pub fn from_type<T: Describe>() -> Result<Schema> {
        Self::from_descriptor(&T::describe())
    }

    /// Derive the schema of a struct descriptor.
    pub fn from_descriptor(descriptor: &TypeDescriptor) -> Result<Schema> {
        let TypeKind::Struct(_) = &descriptor.kind else {
            return Err(SchemaGenerationError::RootNotObject {
                type_name: descriptor.short_name().to_string(),
            });
        };
        let mut expanding = Vec::new();
        let schema = object_schema(descriptor, &mut expanding)?;
        debug!(
            type_name = descriptor.short_name(),
            properties = schema.properties().len(),
            required = schema.required().len(),
            "Generated schema"
        );
        Ok(schema)
    }
}

fn object_schema(descriptor: &TypeDescriptor, expanding: &mut Vec<String>) -> Result<Schema> {
    let TypeKind::Struct(fields) = &descriptor.kind else {
        return Err(SchemaGenerationError::RootNotObject {
            type_name: descriptor.short_name().to_string(),
        });
    };
    let identity = descriptor.name.to_string();
    if expanding.contains(&identity) {
        return Err(SchemaGenerationError::cycle(descriptor.short_name()));
    }
    expanding.push(identity);
    let result = struct_schema(descriptor, fields, expanding);
    expanding.pop();
    result
}

fn struct_schema(
    descriptor: &TypeDescriptor,
    fields: &[FieldDescriptor],
    expanding: &mut Vec<String>,
) -> Result<Schema> {
    let mut builder = SchemaBuilder::new();
    if let Some(description) = &descriptor.description {
        builder = builder.description(description.clone());
    }
    for field in fields.iter().filter(|f| !f.meta.ignore) {
        let ty = field.ty.resolve();
        let description = field
            .meta
            .description
            .clone()
            .unwrap_or_else(|| field.name.to_string());
        let property = property_schema(&ty, &field.name, description, &field.meta, expanding)?;
        builder = builder.property(&field.name, property, !field.is_optional(&ty));
    }
    Ok(builder.build())
}

fn property_schema(
    ty: &TypeDescriptor,
    field: &str,
    description: String,
    meta: &FieldMeta,
    expanding: &mut Vec<String>,
) -> Result<PropertySchema> {
    match &ty.kind {
        TypeKind::Optional(inner) => property_schema(inner, field, description, meta, expanding),
        TypeKind::String => string_property(field, description, meta, None),
        TypeKind::Char => string_property(field, description, meta, Some(1)),
        TypeKind::Number(_) => {
            reject_markers(field, ty, meta, Markers::String)?;
            let mut builder = PropertySchema::number(description);
            if let Some(min) = meta.minimum {
                builder = builder.minimum(min);
            }
            if let Some(max) = meta.maximum {
                builder = builder.maximum(max);
            }
            Ok(builder.build())
        }
        TypeKind::Boolean => {
            reject_markers(field, ty, meta, Markers::All)?;
            Ok(PropertySchema::boolean(description))
        }
        TypeKind::Enum(variants) => {
            reject_markers(field, ty, meta, Markers::All)?;
            Ok(PropertySchema::enumeration(description, variants.iter().cloned()))
        }
        TypeKind::Sequence { element, .. } => {
            reject_markers(field, ty, meta, Markers::All)?;
            let element = element
                .as_deref()
                .ok_or_else(|| SchemaGenerationError::raw_container(field))?;
            let items = item_schema(element, field, expanding)?;
            Ok(PropertySchema::array(description, items))
        }
        TypeKind::Array { element, .. } => {
            reject_markers(field, ty, meta, Markers::All)?;
            let element = element.as_deref().ok_or_else(|| SchemaGenerationError::MissingItems {
                field: field.to_string(),
            })?;
            let items = item_schema(element, field, expanding)?;
            Ok(PropertySchema::array(description, items))
        }
        TypeKind::Map { key, value } => {
            reject_markers(field, ty, meta, Markers::All)?;
            let (Some(key), Some(value)) = (key.as_deref(), value.as_deref()) else {
                return Err(SchemaGenerationError::raw_container(field));
            };
            if !key.is_string_like() {
                return Err(SchemaGenerationError::NonStringKey {
                    field: field.to_string(),
                    key_type: key.short_name().to_string(),
                });
            }
            let values = item_schema(value, field, expanding)?;
            Ok(PropertySchema::map(description, values))
        }
        TypeKind::Struct(_) => {
            reject_markers(field, ty, meta, Markers::All)?;
            let nested = object_schema(ty, expanding)?;
            Ok(PropertySchema::object(description, nested))
        }
        TypeKind::Opaque => Err(SchemaGenerationError::unsupported(field, ty.short_name())),
    }
}

/// Schema for an element, key's value or other unnamed nested type. Its
/// description comes from the type, since there is no field to name it.
fn item_schema(
    element: &TypeDescriptor,
    field: &str,
    expanding: &mut Vec<String>,
) -> Result<PropertySchema> {
    let description = element
        .description
        .clone()
        .unwrap_or_else(|| element.short_name().to_string());
    property_schema(element, field, description, &FieldMeta::default(), expanding)
}

fn string_property(
    field: &str,
    description: String,
    meta: &FieldMeta,
    exact_len: Option<usize>,
) -> Result<PropertySchema> {
    if meta.has_number_markers() {
        return Err(SchemaGenerationError::MisplacedMarker {
            field: field.to_string(),
            marker: if meta.minimum.is_some() { "minimum" } else { "maximum" },
            type_name: "a string".to_string(),
        });
    }
    let mut builder = PropertySchema::string(description);
    if let Some(source) = &meta.pattern {
        let pattern = Pattern::new(source.as_str()).map_err(|e| SchemaGenerationError::InvalidPattern {
            field: field.to_string(),
            pattern: source.clone(),
            message: e.to_string(),
        })?;
        builder = builder.compiled_pattern(pattern);
    }
    if let Some(min) = meta.min_length.or(exact_len) {
        builder = builder.min_length(min);
    }
    if let Some(max) = meta.max_length.or(exact_len) {
        builder = builder.max_length(max);
    }
    Ok(builder.build())
}

#[derive(Clone, Copy)]
enum Markers {
    /// Only string markers are misplaced; numeric bounds apply.
    String,
    /// Every constraint marker is misplaced.
    All,
}

fn reject_markers(field: &str, ty: &TypeDescriptor, meta: &FieldMeta, markers: Markers) -> Result<()> {
    let misplaced = if meta.pattern.is_some() {
        Some("pattern")
    } else if meta.min_length.is_some() {
        Some("min_length")
    } else if meta.max_length.is_some() {
        Some("max_length")
    } else if matches!(markers, Markers::All) && meta.minimum.is_some() {
        Some("minimum")
    } else if matches!(markers, Markers::All) && meta.maximum.is_some() {
        Some("maximum")
    } else {
        None
    };
    match misplaced {
        Some(marker) => Err(SchemaGenerationError::MisplacedMarker {
            field: field.to_string(),
            marker,
            type_name: ty.short_name().to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use super::*;
    use crate::schema::{ObjectShape, PropertyKind};
    use pretty_assertions::assert_eq;
    use shapeguard_core::{NumberKind, TypeRef};

    struct Address;

    impl Describe for Address {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::structure(
                "tests::Address",
                vec![FieldDescriptor::new("city", TypeRef::of::<String>())],
            )
            .with_description("Postal address")
        }
    }

    struct Person;

    impl Describe for Person {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::structure(
                "tests::Person",
                vec![
                    FieldDescriptor::new("name", TypeRef::of::<String>()).with_meta(
                        FieldMeta::new()
                            .description("Full name")
                            .pattern("[A-Z].*")
                            .min_length(1),
                    ),
                    FieldDescriptor::new("age", TypeRef::of::<Option<u32>>())
                        .with_meta(FieldMeta::new().minimum(0).maximum(150)),
                    FieldDescriptor::new(
                        "status",
                        TypeDescriptor::enumeration("Status", ["Active", "Inactive"]),
                    ),
                    FieldDescriptor::new("tags", TypeRef::of::<Vec<String>>()),
                    FieldDescriptor::new("home", TypeRef::of::<Address>()),
                    FieldDescriptor::new("work", TypeRef::of::<Option<Address>>()),
                    FieldDescriptor::new("scores", TypeRef::of::<BTreeMap<String, f64>>()),
                    FieldDescriptor::new("initial", TypeRef::of::<char>()),
                    FieldDescriptor::new("retries", TypeRef::of::<u8>())
                        .with_meta(FieldMeta::new().default_when_missing()),
                    FieldDescriptor::new("secret", TypeRef::of::<String>())
                        .with_meta(FieldMeta::new().ignore()),
                ],
            )
            .with_description("A person")
        }
    }

    struct Node;

    impl Describe for Node {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::structure(
                "tests::Node",
                vec![FieldDescriptor::new("children", TypeRef::of::<Vec<Node>>())],
            )
        }
    }

    fn single_field(ty: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::structure("tests::Holder", vec![FieldDescriptor::new("value", ty)])
    }

    #[test]
    fn test_person_schema() {
        let schema = SchemaGenerator::from_type::<Person>().unwrap();
        assert_eq!(schema.description(), Some("A person"));
        assert_eq!(
            schema.required(),
            ["name", "status", "tags", "home", "scores", "initial"]
        );
        assert!(schema.property("secret").is_none());
        assert_eq!(schema.properties().len(), 9);

        let expected = concat!(
            r#"{"type":"object","description":"A person","properties":{"#,
            r#""name":{"type":"string","description":"Full name","pattern":"[A-Z].*","minLength":1},"#,
            r#""age":{"type":"number","description":"age","minimum":0,"maximum":150},"#,
            r#""status":{"type":"string","description":"status","enum":["Active","Inactive"]},"#,
            r#""tags":{"type":"array","description":"tags","items":{"type":"string","description":"String"}},"#,
            r#""home":{"type":"object","description":"home","properties":{"city":{"type":"string","description":"city"}},"required":["city"]},"#,
            r#""work":{"type":"object","description":"work","properties":{"city":{"type":"string","description":"city"}},"required":["city"]},"#,
            r#""scores":{"type":"object","description":"scores","additionalProperties":{"type":"number","description":"f64"}},"#,
            r#""initial":{"type":"string","description":"initial","minLength":1,"maxLength":1},"#,
            r#""retries":{"type":"number","description":"retries"}"#,
            r#"},"required":["name","status","tags","home","scores","initial"]}"#
        );
        assert_eq!(schema.to_text(), expected);
    }

    #[test]
    fn test_sibling_reuse_is_not_a_cycle() {
        // `home` and `work` both expand Address.
        let schema = SchemaGenerator::from_type::<Person>().unwrap();
        let home = &schema.property("home").unwrap().kind;
        let work = &schema.property("work").unwrap().kind;
        assert!(matches!(home, PropertyKind::Object(ObjectShape::Fixed(_))));
        assert_eq!(home, work);
    }

    #[test]
    fn test_self_reference_rejected() {
        let err = SchemaGenerator::from_type::<Node>().unwrap_err();
        assert_eq!(err, SchemaGenerationError::cycle("Node"));
    }

    #[test]
    fn test_root_must_be_struct() {
        let err = SchemaGenerator::from_type::<Vec<String>>().unwrap_err();
        assert!(matches!(err, SchemaGenerationError::RootNotObject { .. }));
    }

    #[test]
    fn test_raw_containers_rejected() {
        let err = SchemaGenerator::from_descriptor(&single_field(TypeDescriptor::raw_sequence()))
            .unwrap_err();
        assert_eq!(err, SchemaGenerationError::raw_container("value"));

        let err =
            SchemaGenerator::from_descriptor(&single_field(TypeDescriptor::raw_map())).unwrap_err();
        assert_eq!(err, SchemaGenerationError::raw_container("value"));

        let untyped_array = TypeDescriptor::new("[?]", TypeKind::Array { element: None, len: None });
        let err = SchemaGenerator::from_descriptor(&single_field(untyped_array)).unwrap_err();
        assert!(matches!(err, SchemaGenerationError::MissingItems { .. }));
    }

    #[test]
    fn test_non_string_key_rejected() {
        let err = SchemaGenerator::from_descriptor(&single_field(<HashMap<u32, String>>::describe()))
            .unwrap_err();
        assert!(matches!(err, SchemaGenerationError::NonStringKey { .. }));
    }

    #[test]
    fn test_opaque_rejected() {
        let err = SchemaGenerator::from_descriptor(&single_field(TypeDescriptor::opaque("Blob")))
            .unwrap_err();
        assert_eq!(err, SchemaGenerationError::unsupported("value", "Blob"));
    }

    #[test]
    fn test_misplaced_marker() {
        let descriptor = TypeDescriptor::structure(
            "tests::Bad",
            vec![FieldDescriptor::new("n", TypeDescriptor::number(NumberKind::I32))
                .with_meta(FieldMeta::new().pattern("x"))],
        );
        let err = SchemaGenerator::from_descriptor(&descriptor).unwrap_err();
        assert!(matches!(
            err,
            SchemaGenerationError::MisplacedMarker { marker: "pattern", .. }
        ));
    }

    #[test]
    fn test_invalid_pattern_marker() {
        let descriptor = TypeDescriptor::structure(
            "tests::Bad",
            vec![FieldDescriptor::new("s", TypeRef::of::<String>())
                .with_meta(FieldMeta::new().pattern("("))],
        );
        let err = SchemaGenerator::from_descriptor(&descriptor).unwrap_err();
        assert!(matches!(err, SchemaGenerationError::InvalidPattern { .. }));
    }

    #[test]
    fn test_nested_collections() {
        let schema =
            SchemaGenerator::from_descriptor(&single_field(<Vec<Vec<i32>>>::describe())).unwrap();
        assert_eq!(
            schema.property("value").unwrap().to_value().to_string(),
            r#"{"type":"array","description":"value","items":{"type":"array","description":"Vec","items":{"type":"number","description":"i32"}}}"#
        );
    }
}
