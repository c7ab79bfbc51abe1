//! Typed construction from value trees.
//!
//! [`FromValue`] is the strict inverse of rendering: a value is accepted only
//! when it has the kind the target expects. Integers are range-checked,
//! decimals with a fractional part never become integers, and `null` is only
//! accepted by `Option`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use shapeguard_core::{
    narrow_integer, BigDecimal, BigInt, FieldPath, Map, Number, NumberError, Value,
};

use crate::error::{MappingError, MappingErrorKind, Result};

/// Build a value of this type from a value tree.
pub trait FromValue: Sized {
    /// Map `value`, reporting failures at `path`.
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self>;

    /// The value to use when the field is absent from its object.
    ///
    /// Only optional types have one; everything else is a missing field.
    fn from_missing(path: &FieldPath) -> Result<Self> {
        Err(MappingError::missing_field(path))
    }
}

/// Build a map key from an object member name.
pub trait FromKey: Sized {
    /// Map `key`, reporting failures at `path`.
    fn from_key(key: &str, path: &FieldPath) -> Result<Self>;
}

fn mismatch(path: &FieldPath, expected: &str, value: &Value) -> MappingError {
    MappingError::type_mismatch(path, expected, value.type_name())
}

/// The members of an object value.
pub fn object_members<'a>(value: &'a Value, path: &FieldPath) -> Result<&'a Map> {
    value.as_object().ok_or_else(|| mismatch(path, "object", value))
}

/// Map a required member, falling back to [`FromValue::from_missing`].
pub fn required_field<T: FromValue>(members: &Map, name: &str, path: &FieldPath) -> Result<T> {
    let path = path.key(name);
    match members.get(name) {
        Some(value) => T::from_value(value, &path),
        None => T::from_missing(&path),
    }
}

/// Map a member that takes its `Default` when absent.
pub fn defaulted_field<T: FromValue + Default>(
    members: &Map,
    name: &str,
    path: &FieldPath,
) -> Result<T> {
    match members.get(name) {
        Some(value) => T::from_value(value, &path.key(name)),
        None => Ok(T::default()),
    }
}

/// The variant name carried by a unit enum value, checked against `variants`.
pub fn variant_name<'a>(value: &'a Value, path: &FieldPath, variants: &[&str]) -> Result<&'a str> {
    let name = value.as_str().ok_or_else(|| mismatch(path, "string", value))?;
    if variants.contains(&name) {
        Ok(name)
    } else {
        Err(MappingError::unknown_variant(
            path,
            name,
            variants.iter().copied(),
        ))
    }
}

fn single_char(text: &str, path: &FieldPath) -> Result<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(MappingError::type_mismatch(
            path,
            "single character",
            format!("string of length {}", text.chars().count()),
        )),
    }
}

fn number<'a>(value: &'a Value, path: &FieldPath) -> Result<&'a Number> {
    value.as_number().ok_or_else(|| mismatch(path, "number", value))
}

/// The integer in `value`, or an error naming `target` when it cannot be one.
pub(crate) fn integral(value: &Value, path: &FieldPath, target: &str) -> Result<BigInt> {
    let n = number(value, path)?;
    n.to_integral().map_err(|err| match err {
        NumberError::ExponentTooLarge(_) => MappingError::out_of_range(path, n.to_string(), target),
        _ => MappingError::type_mismatch(path, "integer", format!("decimal {n}")),
    })
}

impl FromValue for Value {
    fn from_value(value: &Value, _path: &FieldPath) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| mismatch(path, "string", value))
    }
}

impl FromValue for char {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        let text = value.as_str().ok_or_else(|| mismatch(path, "string", value))?;
        single_char(text, path)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        value.as_bool().ok_or_else(|| mismatch(path, "boolean", value))
    }
}

macro_rules! from_value_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
                    let n = integral(value, path, stringify!($ty))?;
                    narrow_integer::<$ty>(&n)
                        .ok_or_else(|| MappingError::out_of_range(path, n.to_string(), stringify!($ty)))
                }
            }
        )*
    };
}

from_value_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl FromValue for f64 {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        let n = number(value, path)?;
        n.as_f64()
            .filter(|f| f.is_finite())
            .ok_or_else(|| MappingError::out_of_range(path, n.to_string(), "f64"))
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        let n = number(value, path)?;
        n.as_f64()
            .map(|f| f as f32)
            .filter(|f| f.is_finite())
            .ok_or_else(|| MappingError::out_of_range(path, n.to_string(), "f32"))
    }
}

impl FromValue for BigInt {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        integral(value, path, "bigint")
    }
}

impl FromValue for BigDecimal {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        number(value, path).map(Number::to_big_decimal)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, path).map(Some),
        }
    }

    fn from_missing(_path: &FieldPath) -> Result<Self> {
        Ok(None)
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        T::from_value(value, path).map(Box::new)
    }

    fn from_missing(path: &FieldPath) -> Result<Self> {
        T::from_missing(path).map(Box::new)
    }
}

impl<T: FromValue> FromValue for Rc<T> {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        T::from_value(value, path).map(Rc::new)
    }

    fn from_missing(path: &FieldPath) -> Result<Self> {
        T::from_missing(path).map(Rc::new)
    }
}

impl<T: FromValue> FromValue for Arc<T> {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        T::from_value(value, path).map(Arc::new)
    }

    fn from_missing(path: &FieldPath) -> Result<Self> {
        T::from_missing(path).map(Arc::new)
    }
}

fn elements<'a, T: FromValue + 'a>(
    value: &'a Value,
    path: &'a FieldPath,
) -> Result<impl Iterator<Item = Result<T>> + 'a> {
    let items = value.as_array().ok_or_else(|| mismatch(path, "array", value))?;
    Ok(items
        .iter()
        .enumerate()
        .map(move |(i, item)| T::from_value(item, &path.index(i))))
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        elements(value, path)?.collect()
    }
}

impl<T: FromValue> FromValue for VecDeque<T> {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        elements(value, path)?.collect()
    }
}

impl<T, S> FromValue for HashSet<T, S>
where
    T: FromValue + Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        elements(value, path)?.collect()
    }
}

impl<T: FromValue + Ord> FromValue for BTreeSet<T> {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        elements(value, path)?.collect()
    }
}

impl<T, S> FromValue for IndexSet<T, S>
where
    T: FromValue + Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        elements(value, path)?.collect()
    }
}

impl<T: FromValue, const N: usize> FromValue for [T; N] {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        let items: Vec<T> = elements(value, path)?.collect::<Result<_>>()?;
        let found = items.len();
        items.try_into().map_err(|_| {
            MappingError::new(
                path,
                MappingErrorKind::LengthMismatch { expected: N, found },
            )
        })
    }
}

impl FromKey for String {
    fn from_key(key: &str, _path: &FieldPath) -> Result<Self> {
        Ok(key.to_owned())
    }
}

impl FromKey for char {
    fn from_key(key: &str, path: &FieldPath) -> Result<Self> {
        single_char(key, path)
    }
}

fn entries<'a, K: FromKey + 'a, V: FromValue + 'a>(
    value: &'a Value,
    path: &'a FieldPath,
) -> Result<impl Iterator<Item = Result<(K, V)>> + 'a> {
    let members = object_members(value, path)?;
    Ok(members.iter().map(move |(key, item)| {
        let member = path.key(key.as_str());
        Ok((K::from_key(key, &member)?, V::from_value(item, &member)?))
    }))
}

impl<K, V, S> FromValue for HashMap<K, V, S>
where
    K: FromKey + Eq + Hash,
    V: FromValue,
    S: BuildHasher + Default,
{
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        entries(value, path)?.collect()
    }
}

impl<K: FromKey + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        entries(value, path)?.collect()
    }
}

impl<K, V, S> FromValue for IndexMap<K, V, S>
where
    K: FromKey + Eq + Hash,
    V: FromValue,
    S: BuildHasher + Default,
{
    fn from_value(value: &Value, path: &FieldPath) -> Result<Self> {
        entries(value, path)?.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use shapeguard_json::JsonParser;

    fn parse(text: &str) -> Value {
        JsonParser::parse(text).unwrap()
    }

    fn map<T: FromValue>(text: &str) -> Result<T> {
        T::from_value(&parse(text), &FieldPath::root())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(map::<String>(r#""hi""#).unwrap(), "hi");
        assert_eq!(map::<char>(r#""x""#).unwrap(), 'x');
        assert!(map::<bool>("true").unwrap());
        assert_eq!(map::<i32>("42").unwrap(), 42);
        assert_eq!(map::<f64>("1.5").unwrap(), 1.5);
        assert_eq!(map::<f64>("2").unwrap(), 2.0);
    }

    #[rstest]
    #[case("300", "u8")]
    #[case("-1", "u32")]
    #[case("99999999999999999999", "i64")]
    fn test_integer_out_of_range(#[case] text: &str, #[case] target: &str) {
        let err = match target {
            "u8" => map::<u8>(text).unwrap_err(),
            "u32" => map::<u32>(text).unwrap_err(),
            _ => map::<i64>(text).unwrap_err(),
        };
        assert_eq!(
            err.kind,
            MappingErrorKind::OutOfRange {
                value: text.to_string(),
                target: target.to_string(),
            }
        );
    }

    #[test]
    fn test_integral_decimal_accepted() {
        assert_eq!(map::<i64>("3.0").unwrap(), 3);
        let err = map::<i64>("3.5").unwrap_err();
        assert!(matches!(err.kind, MappingErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_huge_exponent_is_out_of_range() {
        let err = map::<Vec<u8>>("[1e100000000]").unwrap_err();
        assert_eq!(err.path.to_string(), "$[0]");
        assert!(matches!(err.kind, MappingErrorKind::OutOfRange { ref target, .. } if target == "u8"));

        let err = map::<BigInt>("1e100000000").unwrap_err();
        assert!(matches!(err.kind, MappingErrorKind::OutOfRange { ref target, .. } if target == "bigint"));

        let err = map::<i64>("1e-100000000").unwrap_err();
        assert!(matches!(err.kind, MappingErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_big_numbers() {
        let n = map::<BigInt>("123456789012345678901234567890").unwrap();
        assert_eq!(n.to_string(), "123456789012345678901234567890");
        let d = map::<BigDecimal>("0.1").unwrap();
        assert_eq!(d.to_string(), "0.1");
    }

    #[test]
    fn test_null_only_for_option() {
        assert_eq!(map::<Option<String>>("null").unwrap(), None);
        assert_eq!(map::<Option<String>>(r#""a""#).unwrap(), Some("a".to_string()));
        let err = map::<String>("null").unwrap_err();
        assert_eq!(
            err.kind,
            MappingErrorKind::TypeMismatch {
                expected: "string".to_string(),
                found: "null".to_string(),
            }
        );
    }

    #[test]
    fn test_char_requires_one_character() {
        assert!(map::<char>(r#""ab""#).is_err());
        assert!(map::<char>(r#""""#).is_err());
    }

    #[test]
    fn test_collections() {
        assert_eq!(map::<Vec<u8>>("[1,2,3]").unwrap(), vec![1, 2, 3]);
        let set = map::<BTreeSet<String>>(r#"["b","a","b"]"#).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
        let nested = map::<Vec<Vec<i32>>>("[[1],[2,3]]").unwrap();
        assert_eq!(nested, vec![vec![1], vec![2, 3]]);
    }

    #[test]
    fn test_element_error_path() {
        let err = map::<Vec<i32>>(r#"[1,"two"]"#).unwrap_err();
        assert_eq!(err.path.to_string(), "$[1]");
    }

    #[test]
    fn test_fixed_array() {
        assert_eq!(map::<[i32; 2]>("[1,2]").unwrap(), [1, 2]);
        let err = map::<[i32; 2]>("[1,2,3]").unwrap_err();
        assert_eq!(
            err.kind,
            MappingErrorKind::LengthMismatch {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_maps() {
        let m = map::<IndexMap<String, i32>>(r#"{"b":2,"a":1}"#).unwrap();
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        let err = map::<HashMap<String, i32>>(r#"{"a":"x"}"#).unwrap_err();
        assert_eq!(err.path.to_string(), "$.a");
    }

    #[test]
    fn test_required_and_defaulted_fields() {
        let value = parse(r#"{"name":"Alice"}"#);
        let members = object_members(&value, &FieldPath::root()).unwrap();
        let root = FieldPath::root();

        let name: String = required_field(members, "name", &root).unwrap();
        assert_eq!(name, "Alice");

        let nick: Option<String> = required_field(members, "nick", &root).unwrap();
        assert_eq!(nick, None);

        let age: u32 = defaulted_field(members, "age", &root).unwrap();
        assert_eq!(age, 0);

        let err = required_field::<u32>(members, "age", &root).unwrap_err();
        assert_eq!(err.kind, MappingErrorKind::MissingField);
        assert_eq!(err.path.to_string(), "$.age");
    }

    #[test]
    fn test_variant_name() {
        let root = FieldPath::root();
        let variants = ["RED", "GREEN"];
        assert_eq!(variant_name(&Value::from("RED"), &root, &variants).unwrap(), "RED");
        let err = variant_name(&Value::from("BLUE"), &root, &variants).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Mapping failed at $: unknown variant 'BLUE', expected one of [RED, GREEN]"
        );
    }
}
