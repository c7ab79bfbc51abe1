//! Deterministic JSON rendering of schemas.
//!
//! Keys are emitted in a fixed order so the same schema always renders to
//! the same text: `type`, `description`, `properties`, `required` for object
//! nodes, and `type`, `description`, `enum`, `pattern`, `minLength`,
//! `maxLength`, `minimum`, `maximum`, `items`, then `properties`/`required`
//! or `additionalProperties` for property nodes.

use std::fmt;

use shapeguard_core::{Map, Value};

use crate::schema::{ObjectShape, PropertyKind, PropertySchema, Schema};

impl Schema {
    /// Render as a value tree.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from("object"));
        if let Some(description) = self.description() {
            out.insert("description".into(), Value::from(description));
        }
        insert_members(&mut out, self);
        Value::Object(out)
    }

    /// Render as compact JSON text.
    pub fn to_text(&self) -> String {
        self.to_value().to_string()
    }

    /// Render as indented JSON text.
    pub fn to_pretty_text(&self) -> String {
        self.to_value().to_pretty_string()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

fn insert_members(out: &mut Map, schema: &Schema) {
    let properties = schema
        .properties()
        .iter()
        .map(|(name, prop)| (name.clone(), prop.to_value()))
        .collect::<Map>();
    out.insert("properties".into(), Value::Object(properties));
    if !schema.required().is_empty() {
        let required = schema.required().iter().map(|r| Value::from(r.as_str())).collect();
        out.insert("required".into(), Value::Array(required));
    }
}

impl PropertySchema {
    /// Render as a value tree.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from(self.type_name()));
        if !self.description.is_empty() {
            out.insert("description".into(), Value::from(self.description.as_str()));
        }
        if let Some(values) = &self.enum_values {
            let values = values.iter().map(|v| Value::from(v.as_str())).collect();
            out.insert("enum".into(), Value::Array(values));
        }
        match &self.kind {
            PropertyKind::String {
                pattern,
                min_length,
                max_length,
            } => {
                if let Some(pattern) = pattern {
                    out.insert("pattern".into(), Value::from(pattern.as_str()));
                }
                if let Some(min) = min_length {
                    out.insert("minLength".into(), Value::from(*min));
                }
                if let Some(max) = max_length {
                    out.insert("maxLength".into(), Value::from(*max));
                }
            }
            PropertyKind::Number { minimum, maximum } => {
                if let Some(min) = minimum {
                    out.insert("minimum".into(), Value::from(*min));
                }
                if let Some(max) = maximum {
                    out.insert("maximum".into(), Value::from(*max));
                }
            }
            PropertyKind::Boolean => {}
            PropertyKind::Array { items } => {
                out.insert("items".into(), items.to_value());
            }
            PropertyKind::Object(ObjectShape::Fixed(schema)) => insert_members(&mut out, schema),
            PropertyKind::Object(ObjectShape::Additional(values)) => {
                out.insert("additionalProperties".into(), values.to_value());
            }
        }
        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shapeguard_json::{from_serde, JsonParser};

    fn sample() -> Schema {
        let address = Schema::builder()
            .string("city", "City \"name\"", true)
            .build();
        Schema::builder()
            .description("A person")
            .property(
                "name",
                PropertySchema::string("Full name")
                    .pattern("[A-Z].*")
                    .unwrap()
                    .min_length(1)
                    .max_length(50)
                    .build(),
                true,
            )
            .property(
                "age",
                PropertySchema::number("age").minimum(0).maximum(150).build(),
                false,
            )
            .enum_values("status", "status", &["open", "closed"], true)
            .property(
                "tags",
                PropertySchema::array("tags", PropertySchema::string("tag").build()),
                true,
            )
            .property("address", PropertySchema::object("address", address), true)
            .property(
                "scores",
                PropertySchema::map("scores", PropertySchema::number("score").build()),
                false,
            )
            .build()
    }

    #[test]
    fn test_render_is_deterministic() {
        let expected = concat!(
            r#"{"type":"object","description":"A person","properties":{"#,
            r#""name":{"type":"string","description":"Full name","pattern":"[A-Z].*","minLength":1,"maxLength":50},"#,
            r#""age":{"type":"number","description":"age","minimum":0,"maximum":150},"#,
            r#""status":{"type":"string","description":"status","enum":["open","closed"]},"#,
            r#""tags":{"type":"array","description":"tags","items":{"type":"string","description":"tag"}},"#,
            r#""address":{"type":"object","description":"address","properties":{"city":{"type":"string","description":"City \"name\""}},"required":["city"]},"#,
            r#""scores":{"type":"object","description":"scores","additionalProperties":{"type":"number","description":"score"}}"#,
            r#"},"required":["name","status","tags","address"]}"#
        );
        assert_eq!(sample().to_text(), expected);
        assert_eq!(sample().to_string(), expected);
    }

    #[test]
    fn test_render_parses_back() {
        let text = sample().to_text();
        let ours = JsonParser::parse(&text).unwrap();
        assert_eq!(ours, sample().to_value());

        let theirs: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(from_serde(theirs), ours);

        let pretty = JsonParser::parse(&sample().to_pretty_text()).unwrap();
        assert_eq!(pretty, ours);
    }

    #[test]
    fn test_empty_schema() {
        assert_eq!(Schema::builder().build().to_text(), r#"{"type":"object","properties":{}}"#);
    }
}
