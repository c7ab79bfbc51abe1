//! The mapper facade.

use shapeguard_core::{
    BigDecimal, BigInt, FieldPath, Map, Number, NumberKind, TypeDescriptor, TypeKind, Value,
};
use shapeguard_json::JsonParser;
use tracing::debug;

use crate::error::{MappingError, MappingErrorKind, Result};
use crate::from_value::{integral, object_members, FromValue};

/// Maps validated documents onto target types.
///
/// Typed mapping goes through [`FromValue`]. Descriptor-driven mapping
/// ([`JsonMapper::conform`]) produces a normalized value tree for callers
/// that only hold a [`TypeDescriptor`]: integers narrowed and range-checked,
/// absent optional fields filled with `null`, ignored and unknown fields
/// dropped, and set elements deduplicated.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMapper;

impl JsonMapper {
    /// Build a `T` from a value tree.
    pub fn deserialize<T: FromValue>(value: &Value) -> Result<T> {
        T::from_value(value, &FieldPath::root())
    }

    /// Parse `text` and build a `T` from it.
    pub fn from_text<T: FromValue>(text: &str) -> Result<T> {
        let value = JsonParser::parse(text)?;
        Self::deserialize(&value)
    }

    /// Conform `value` to `descriptor`.
    pub fn conform(value: &Value, descriptor: &TypeDescriptor) -> Result<Value> {
        let conformed = conform_at(value, descriptor, &FieldPath::root())?;
        debug!(type_name = %descriptor.name, "Conformed value to descriptor");
        Ok(conformed)
    }

    /// Parse `text` and conform it to `descriptor`.
    pub fn conform_text(text: &str, descriptor: &TypeDescriptor) -> Result<Value> {
        let value = JsonParser::parse(text)?;
        Self::conform(&value, descriptor)
    }
}

fn raw_container(path: &FieldPath, ty: &TypeDescriptor) -> MappingError {
    MappingError::new(
        path,
        MappingErrorKind::RawContainer {
            type_name: ty.name.to_string(),
        },
    )
}

fn conform_at(value: &Value, ty: &TypeDescriptor, path: &FieldPath) -> Result<Value> {
    if let TypeKind::Optional(inner) = &ty.kind {
        return match value {
            Value::Null => Ok(Value::Null),
            other => conform_at(other, inner, path),
        };
    }

    let expected = match &ty.kind {
        TypeKind::String | TypeKind::Char | TypeKind::Enum(_) => "string",
        TypeKind::Boolean => "boolean",
        TypeKind::Number(_) => "number",
        TypeKind::Sequence { .. } | TypeKind::Array { .. } => "array",
        TypeKind::Map { .. } | TypeKind::Struct(_) => "object",
        TypeKind::Optional(_) | TypeKind::Opaque => "value",
    };
    let mismatch = || MappingError::type_mismatch(path, expected, value.type_name());

    match &ty.kind {
        TypeKind::String => value.as_str().map(Value::from).ok_or_else(mismatch),
        TypeKind::Char => {
            let text = value.as_str().ok_or_else(mismatch)?;
            char::from_value(value, path)?;
            Ok(Value::from(text))
        }
        TypeKind::Boolean => value.as_bool().map(Value::Bool).ok_or_else(mismatch),
        TypeKind::Number(kind) => conform_number(value, *kind, path).map(Value::Number),
        TypeKind::Enum(variants) => {
            let name = value.as_str().ok_or_else(mismatch)?;
            if variants.iter().any(|v| v == name) {
                Ok(Value::from(name))
            } else {
                Err(MappingError::unknown_variant(path, name, variants.iter().cloned()))
            }
        }
        TypeKind::Sequence { element, unique } => {
            let element = element.as_deref().ok_or_else(|| raw_container(path, ty))?;
            let items = value.as_array().ok_or_else(mismatch)?;
            let mut out: Vec<Value> = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let item = conform_at(item, element, &path.index(i))?;
                if !*unique || !out.contains(&item) {
                    out.push(item);
                }
            }
            Ok(Value::Array(out))
        }
        TypeKind::Array { element, len } => {
            let element = element.as_deref().ok_or_else(|| raw_container(path, ty))?;
            let items = value.as_array().ok_or_else(mismatch)?;
            if let Some(expected) = *len {
                if items.len() != expected {
                    return Err(MappingError::new(
                        path,
                        MappingErrorKind::LengthMismatch {
                            expected,
                            found: items.len(),
                        },
                    ));
                }
            }
            items
                .iter()
                .enumerate()
                .map(|(i, item)| conform_at(item, element, &path.index(i)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        TypeKind::Map { key, value: entry } => {
            let (Some(key), Some(entry)) = (key.as_deref(), entry.as_deref()) else {
                return Err(raw_container(path, ty));
            };
            if !key.is_string_like() {
                return Err(MappingError::new(
                    path,
                    MappingErrorKind::NonStringKey {
                        key_type: key.short_name().to_string(),
                    },
                ));
            }
            let members = value.as_object().ok_or_else(mismatch)?;
            let mut out = Map::with_capacity(members.len());
            for (name, item) in members {
                let member = path.key(name.as_str());
                if matches!(key.kind, TypeKind::Char) {
                    char::from_value(&Value::from(name.as_str()), &member)?;
                }
                out.insert(name.clone(), conform_at(item, entry, &member)?);
            }
            Ok(Value::Object(out))
        }
        TypeKind::Struct(fields) => {
            let members = object_members(value, path)?;
            let mut out = Map::with_capacity(fields.len());
            for field in fields.iter().filter(|f| !f.meta.ignore) {
                let name: &str = &field.name;
                let member = path.key(name);
                let field_ty = field.ty.resolve();
                match members.get(name) {
                    Some(item) => {
                        out.insert(name.to_string(), conform_at(item, &field_ty, &member)?);
                    }
                    None if field_ty.is_optional() => {
                        out.insert(name.to_string(), Value::Null);
                    }
                    None if field.meta.default => {}
                    None => return Err(MappingError::missing_field(&member)),
                }
            }
            Ok(Value::Object(out))
        }
        TypeKind::Optional(_) | TypeKind::Opaque => Err(MappingError::new(
            path,
            MappingErrorKind::Unsupported {
                type_name: ty.name.to_string(),
            },
        )),
    }
}

fn conform_number(value: &Value, kind: NumberKind, path: &FieldPath) -> Result<Number> {
    let n = value
        .as_number()
        .ok_or_else(|| MappingError::type_mismatch(path, "number", value.type_name()))?;
    let target = format!("{kind:?}").to_lowercase();
    let out_of_range = || MappingError::out_of_range(path, n.to_string(), &target);
    match kind {
        NumberKind::Decimal => return Ok(Number::decimal(n.to_big_decimal())),
        NumberKind::F64 => {
            return n
                .as_f64()
                .filter(|f| f.is_finite())
                .and_then(|f| Number::from_f64(f).ok())
                .ok_or_else(out_of_range);
        }
        NumberKind::F32 => {
            return n
                .as_f64()
                .map(|f| f as f32)
                .filter(|f| f.is_finite())
                .and_then(|f| Number::from_f64(f64::from(f)).ok())
                .ok_or_else(out_of_range);
        }
        _ => {}
    }

    // Bounds are checked on the exact value before any digits are expanded.
    if let Some((min, max)) = kind.integer_bounds() {
        let exact = n.to_big_decimal();
        if exact < BigDecimal::new(BigInt::from(min), 0) || exact > BigDecimal::new(BigInt::from(max), 0) {
            return Err(out_of_range());
        }
    }
    let whole = integral(value, path, &target)?;
    Ok(Number::integer(whole))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shapeguard_core::{Describe, FieldDescriptor, FieldMeta};
    use std::collections::BTreeSet;

    fn person() -> TypeDescriptor {
        TypeDescriptor::structure(
            "Person",
            vec![
                FieldDescriptor::new("name", String::describe()),
                FieldDescriptor::new("age", u8::describe()),
                FieldDescriptor::new("nick", Option::<String>::describe()),
                FieldDescriptor::new("score", i32::describe())
                    .with_meta(FieldMeta::new().default_when_missing()),
                FieldDescriptor::new("cache", String::describe())
                    .with_meta(FieldMeta::new().ignore()),
                FieldDescriptor::new("tags", BTreeSet::<String>::describe()),
            ],
        )
    }

    #[test]
    fn test_from_text() {
        let tags: Vec<String> = JsonMapper::from_text(r#"["a","b"]"#).unwrap();
        assert_eq!(tags, vec!["a", "b"]);
    }

    #[test]
    fn test_from_text_parse_error() {
        let err = JsonMapper::from_text::<Vec<String>>("not json").unwrap_err();
        assert!(matches!(err.kind, MappingErrorKind::Parse(_)));
        assert!(err.path.is_root());
    }

    #[test]
    fn test_conform_struct() {
        let input = r#"{"name":"Alice","age":30.0,"cache":"x","extra":true,"tags":["b","a","b"]}"#;
        let value = JsonMapper::conform_text(input, &person()).unwrap();
        assert_eq!(
            value.to_string(),
            r#"{"name":"Alice","age":30,"nick":null,"tags":["b","a"]}"#
        );
    }

    #[test]
    fn test_conform_missing_required() {
        let err = JsonMapper::conform_text(r#"{"name":"Alice","tags":[]}"#, &person()).unwrap_err();
        assert_eq!(err.kind, MappingErrorKind::MissingField);
        assert_eq!(err.path.to_string(), "$.age");
    }

    #[test]
    fn test_conform_out_of_range() {
        let err =
            JsonMapper::conform_text(r#"{"name":"A","age":256,"tags":[]}"#, &person()).unwrap_err();
        assert_eq!(
            err.kind,
            MappingErrorKind::OutOfRange {
                value: "256".to_string(),
                target: "u8".to_string(),
            }
        );
    }

    #[test]
    fn test_conform_huge_exponent() {
        let err = JsonMapper::conform_text(r#"{"name":"A","age":1e100000000,"tags":[]}"#, &person())
            .unwrap_err();
        assert_eq!(err.path.to_string(), "$.age");
        assert!(matches!(err.kind, MappingErrorKind::OutOfRange { ref target, .. } if target == "u8"));
    }

    #[test]
    fn test_conform_f32_range() {
        let err = JsonMapper::conform_text("1e39", &f32::describe()).unwrap_err();
        assert!(matches!(err.kind, MappingErrorKind::OutOfRange { ref target, .. } if target == "f32"));
        assert!(JsonMapper::from_text::<f32>("1e39").is_err());

        assert!(JsonMapper::conform_text("1e39", &f64::describe()).is_ok());
    }

    #[test]
    fn test_conform_null_for_required() {
        let err =
            JsonMapper::conform_text(r#"{"name":null,"age":1,"tags":[]}"#, &person()).unwrap_err();
        assert_eq!(err.path.to_string(), "$.name");
        assert_eq!(
            err.kind,
            MappingErrorKind::TypeMismatch {
                expected: "string".to_string(),
                found: "null".to_string(),
            }
        );
    }

    #[test]
    fn test_conform_rejects_raw_and_opaque() {
        let err = JsonMapper::conform(&Value::Array(vec![]), &TypeDescriptor::raw_sequence()).unwrap_err();
        assert!(matches!(err.kind, MappingErrorKind::RawContainer { .. }));

        let err = JsonMapper::conform(&Value::Null, &Value::describe()).unwrap_err();
        assert!(matches!(err.kind, MappingErrorKind::Unsupported { .. }));
    }

    #[test]
    fn test_conform_non_string_key() {
        let ty = TypeDescriptor::map(i32::describe(), String::describe());
        let value = JsonMapper::conform_text(r#"{"1":"a"}"#, &ty);
        assert_eq!(
            value.unwrap_err().kind,
            MappingErrorKind::NonStringKey {
                key_type: "i32".to_string()
            }
        );
    }

    #[test]
    fn test_conform_enum_and_array() {
        let color = TypeDescriptor::enumeration("Color", ["RED", "GREEN"]);
        assert!(JsonMapper::conform(&Value::from("RED"), &color).is_ok());
        let err = JsonMapper::conform(&Value::from("BLUE"), &color).unwrap_err();
        assert!(matches!(err.kind, MappingErrorKind::UnknownVariant { .. }));

        let pair = TypeDescriptor::array(f64::describe(), Some(2));
        let value = JsonMapper::conform_text("[1, 2.5]", &pair).unwrap();
        assert_eq!(value.to_string(), "[1.0,2.5]");
        assert!(JsonMapper::conform_text("[1]", &pair).is_err());
    }
}
