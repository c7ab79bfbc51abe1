//! The generic JSON value tree.
//!
//! [`Value`] is what the parser produces from text and what the serializer
//! produces from typed values. The validator and the mapper both consume it.

use std::fmt::{self, Write};

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::number::Number;

/// Ordered string-keyed object map. Keys keep insertion order.
pub type Map = IndexMap<String, Value>;

/// A JSON value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// `null`
    #[default]
    Null,
    /// `true` or `false`
    Bool(bool),
    /// Integer or decimal number.
    Number(Number),
    /// String.
    String(String),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Ordered key-value mapping.
    Object(Map),
}

impl Value {
    /// Name of this value's JSON type, as used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Check for `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow as a number.
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Borrow as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as an array.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as an object.
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up an object member.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Textual form used for enum membership and diagnostics.
    ///
    /// Strings render without quotes; everything else renders as compact JSON.
    pub fn to_plain_string(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Render as indented JSON with two-space indentation.
    pub fn to_pretty_string(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_pretty(&mut out, self, 0);
        out
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write_json_string(f, s),
            Self::Array(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            Self::Object(map) => {
                f.write_char('{')?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write_json_string(f, key)?;
                    write!(f, ":{value}")?;
                }
                f.write_char('}')
            }
        }
    }
}

fn write_pretty<W: Write>(out: &mut W, value: &Value, depth: usize) -> fmt::Result {
    const INDENT: &str = "  ";
    match value {
        Value::Array(items) if !items.is_empty() => {
            out.write_str("[\n")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_str(",\n")?;
                }
                out.write_str(&INDENT.repeat(depth + 1))?;
                write_pretty(out, item, depth + 1)?;
            }
            write!(out, "\n{}]", INDENT.repeat(depth))
        }
        Value::Object(map) if !map.is_empty() => {
            out.write_str("{\n")?;
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.write_str(",\n")?;
                }
                out.write_str(&INDENT.repeat(depth + 1))?;
                write_json_string(out, key)?;
                out.write_str(": ")?;
                write_pretty(out, item, depth + 1)?;
            }
            write!(out, "\n{}}}", INDENT.repeat(depth))
        }
        other => write!(out, "{other}"),
    }
}

/// Write `s` as a quoted JSON string literal.
///
/// Quotes, backslashes and control characters are escaped; everything else
/// is written as-is.
pub fn write_json_string<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            '\u{08}' => out.write_str("\\b")?,
            '\u{0C}' => out.write_str("\\f")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Self::Object(value)
    }
}

macro_rules! value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Number(Number::from(value))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Object(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Value {
        Value::from_iter([
            ("name", Value::from("Ada \"L\"")),
            ("age", Value::from(36)),
            (
                "tags",
                Value::Array(vec![Value::from("x"), Value::Null, Value::Bool(true)]),
            ),
        ])
    }

    #[test]
    fn test_compact_display() {
        assert_eq!(
            sample().to_string(),
            r#"{"name":"Ada \"L\"","age":36,"tags":["x",null,true]}"#
        );
    }

    #[test]
    fn test_pretty_display() {
        let expected = "{\n  \"name\": \"Ada \\\"L\\\"\",\n  \"age\": 36,\n  \"tags\": [\n    \"x\",\n    null,\n    true\n  ]\n}";
        assert_eq!(sample().to_pretty_string(), expected);
    }

    #[test]
    fn test_control_characters_escaped() {
        let value = Value::from("a\u{1}b\nc");
        assert_eq!(value.to_string(), "\"a\\u0001b\\nc\"");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(1).type_name(), "number");
        assert_eq!(Value::Object(Map::new()).type_name(), "object");
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(Value::from("open").to_plain_string(), "open");
        assert_eq!(Value::from(3).to_plain_string(), "3");
    }

    #[test]
    fn test_serialize_matches_serde_json() {
        let rendered = serde_json::to_string(&sample()).unwrap();
        assert_eq!(rendered, sample().to_string());
    }

    #[test]
    fn test_accessors() {
        let value = sample();
        assert_eq!(value.get("name").and_then(Value::as_str), Some("Ada \"L\""));
        assert_eq!(
            value.get("age").and_then(Value::as_number).and_then(Number::as_i64),
            Some(36)
        );
        assert!(value.get("missing").is_none());
    }
}
