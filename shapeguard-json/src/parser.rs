//! Recursive-descent JSON parser.
//!
//! The parser walks the input once with a forward cursor and never
//! backtracks. Any deviation from the JSON grammar is an immediate error
//! carrying the byte offset where it was detected.

use shapeguard_core::{Map, Number, Value};

use crate::error::{ParseError, ParseErrorKind};

/// Default nesting limit for arrays and objects.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum array/object nesting depth.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserConfig {
    /// Set the maximum depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

type Result<T> = std::result::Result<T, ParseError>;

/// JSON text parser.
///
/// # Example
///
/// ```rust
/// use shapeguard_json::JsonParser;
/// use shapeguard_core::{Number, Value};
///
/// let value = JsonParser::parse(r#"{"pi": 3.14, "n": 7}"#).unwrap();
/// assert!(matches!(value.get("pi"), Some(Value::Number(Number::Decimal(_)))));
/// assert_eq!(value.get("n"), Some(&Value::Number(Number::Integer(7))));
/// ```
#[derive(Debug)]
pub struct JsonParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    config: ParserConfig,
}

impl<'a> JsonParser<'a> {
    fn new(text: &'a str, config: ParserConfig) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            depth: 0,
            config,
        }
    }

    /// Parse a complete JSON document with default settings.
    pub fn parse(text: &str) -> Result<Value> {
        Self::parse_with(text, ParserConfig::default())
    }

    /// Parse a complete JSON document.
    pub fn parse_with(text: &str, config: ParserConfig) -> Result<Value> {
        let mut parser = JsonParser::new(text, config);
        parser.skip_whitespace();
        if parser.at_end() {
            return Err(ParseError::new(ParseErrorKind::Empty, parser.pos));
        }
        let value = parser.parse_value()?;
        parser.skip_whitespace();
        if !parser.at_end() {
            return Err(parser.error(ParseErrorKind::TrailingCharacters));
        }
        Ok(value)
    }

    /// Parse a document whose root must be an object.
    pub fn parse_object(text: &str) -> Result<Map> {
        match Self::parse(text)? {
            Value::Object(map) => Ok(map),
            _ => Err(ParseError::new(ParseErrorKind::NotAnObject, 0)),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.pos)
    }

    fn unexpected(&self) -> ParseError {
        match self.text.get(self.pos..).and_then(|rest| rest.chars().next()) {
            Some(c) => self.error(ParseErrorKind::UnexpectedChar(c)),
            None => self.error(ParseErrorKind::UnexpectedEnd),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        match self.peek() {
            None => Err(self.error(ParseErrorKind::UnexpectedEnd)),
            Some(b'{') => self.parse_object_body(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => self.parse_string().map(Value::String),
            Some(b't') => self.parse_literal("true", Value::Bool(true)),
            Some(b'f') => self.parse_literal("false", Value::Bool(false)),
            Some(b'n') => self.parse_literal("null", Value::Null),
            Some(b'-' | b'0'..=b'9') => self.parse_number().map(Value::Number),
            Some(_) => Err(self.unexpected()),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(self.error(ParseErrorKind::DepthLimit(self.config.max_depth)));
        }
        Ok(())
    }

    fn parse_object_body(&mut self) -> Result<Value> {
        self.enter()?;
        self.pos += 1;
        let mut map = Map::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Object(map));
        }
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'"') => {}
                Some(b'}') if !map.is_empty() => {
                    return Err(self.error(ParseErrorKind::TrailingComma));
                }
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
                Some(_) => return Err(self.error(ParseErrorKind::KeyMustBeString)),
            }
            let key = self.parse_string()?;
            self.skip_whitespace();
            if self.peek() != Some(b':') {
                return Err(self.error(ParseErrorKind::ExpectedColon));
            }
            self.pos += 1;
            self.skip_whitespace();
            let value = self.parse_value()?;
            // A repeated key keeps its first position and takes the last value.
            map.insert(key, value);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected()),
            }
        }
        self.depth -= 1;
        Ok(Value::Object(map))
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.enter()?;
        self.pos += 1;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.depth -= 1;
            return Ok(Value::Array(items));
        }
        loop {
            self.skip_whitespace();
            if self.peek() == Some(b']') {
                return Err(self.error(ParseErrorKind::TrailingComma));
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.unexpected()),
            }
        }
        self.depth -= 1;
        Ok(Value::Array(items))
    }

    fn parse_literal(&mut self, literal: &'static str, value: Value) -> Result<Value> {
        let end = self.pos + literal.len();
        if self.bytes.get(self.pos..end) != Some(literal.as_bytes()) {
            return Err(self.error(ParseErrorKind::InvalidLiteral));
        }
        if matches!(self.bytes.get(end), Some(b) if b.is_ascii_alphanumeric()) {
            return Err(ParseError::new(ParseErrorKind::InvalidLiteral, end));
        }
        self.pos = end;
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<Number> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                if matches!(self.peek(), Some(b'0'..=b'9')) {
                    return Err(self.error(ParseErrorKind::InvalidNumber));
                }
            }
            Some(b'1'..=b'9') => self.skip_digits(),
            _ => return Err(self.error(ParseErrorKind::InvalidNumber)),
        }

        let mut decimal = false;
        if self.peek() == Some(b'.') {
            decimal = true;
            self.pos += 1;
            self.require_digits()?;
        }
        if let Some(b'e' | b'E') = self.peek() {
            decimal = true;
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            self.require_digits()?;
        }

        let literal = self
            .text
            .get(start..self.pos)
            .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidNumber, start))?;
        let number = if decimal {
            Number::parse_decimal(literal)
        } else {
            Number::parse_integer(literal)
        };
        number.map_err(|_| ParseError::new(ParseErrorKind::InvalidNumber, start))
    }

    fn skip_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
    }

    fn require_digits(&mut self) -> Result<()> {
        if !matches!(self.peek(), Some(b'0'..=b'9')) {
            return Err(self.error(ParseErrorKind::InvalidNumber));
        }
        self.skip_digits();
        Ok(())
    }

    fn parse_string(&mut self) -> Result<String> {
        // Opening quote.
        self.pos += 1;
        let mut out = String::new();
        let mut run_start = self.pos;
        loop {
            match self.peek() {
                None => return Err(self.error(ParseErrorKind::UnexpectedEnd)),
                Some(b'"') => {
                    self.flush_run(&mut out, run_start)?;
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.flush_run(&mut out, run_start)?;
                    self.pos += 1;
                    self.parse_escape(&mut out)?;
                    run_start = self.pos;
                }
                Some(b) if b < 0x20 => return Err(self.error(ParseErrorKind::ControlCharacter)),
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Copy the unescaped run `run_start..pos` into `out`. Both ends sit on
    /// ASCII bytes, so the slice is on character boundaries.
    fn flush_run(&self, out: &mut String, run_start: usize) -> Result<()> {
        let run = self
            .text
            .get(run_start..self.pos)
            .ok_or_else(|| ParseError::new(ParseErrorKind::UnexpectedEnd, run_start))?;
        out.push_str(run);
        Ok(())
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<()> {
        let Some(b) = self.peek() else {
            return Err(self.error(ParseErrorKind::UnexpectedEnd));
        };
        let c = match b {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{08}',
            b'f' => '\u{0C}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                self.pos += 1;
                let c = self.parse_unicode_escape()?;
                out.push(c);
                return Ok(());
            }
            _ => {
                let c = self
                    .text
                    .get(self.pos..)
                    .and_then(|rest| rest.chars().next())
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(self.error(ParseErrorKind::InvalidEscape(c)));
            }
        };
        self.pos += 1;
        out.push(c);
        Ok(())
    }

    /// Decode the code unit after `\u`, pairing surrogates when a low
    /// surrogate escape follows a high one.
    fn parse_unicode_escape(&mut self) -> Result<char> {
        let unit = self.parse_hex4()?;
        match unit {
            0xD800..=0xDBFF => {
                let resume = self.pos;
                if self.bytes.get(self.pos..self.pos + 2) == Some(b"\\u") {
                    self.pos += 2;
                    let low = self.parse_hex4()?;
                    if (0xDC00..=0xDFFF).contains(&low) {
                        let scalar =
                            0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                        return Ok(char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER));
                    }
                    // Not a pair; the second escape is decoded on its own.
                    self.pos = resume;
                }
                Ok(char::REPLACEMENT_CHARACTER)
            }
            0xDC00..=0xDFFF => Ok(char::REPLACEMENT_CHARACTER),
            other => Ok(char::from_u32(u32::from(other)).unwrap_or(char::REPLACEMENT_CHARACTER)),
        }
    }

    fn parse_hex4(&mut self) -> Result<u16> {
        let bytes = self.bytes;
        let digits = bytes
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| self.error(ParseErrorKind::InvalidUnicodeEscape))?;
        let mut unit: u16 = 0;
        for &d in digits {
            let nibble = match d {
                b'0'..=b'9' => d - b'0',
                b'a'..=b'f' => d - b'a' + 10,
                b'A'..=b'F' => d - b'A' + 10,
                _ => return Err(self.error(ParseErrorKind::InvalidUnicodeEscape)),
            };
            unit = (unit << 4) | u16::from(nibble);
        }
        self.pos += 4;
        Ok(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use shapeguard_core::BigInt;

    fn parse(text: &str) -> Value {
        JsonParser::parse(text).unwrap()
    }

    fn parse_err(text: &str) -> ParseErrorKind {
        JsonParser::parse(text).unwrap_err().kind
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse("true"), Value::Bool(true));
        assert_eq!(parse(" false "), Value::Bool(false));
        assert_eq!(parse("null"), Value::Null);
        assert_eq!(parse("\"hi\""), Value::String("hi".into()));
    }

    #[test]
    fn test_number_fidelity() {
        assert!(matches!(parse("3.14"), Value::Number(Number::Decimal(_))));
        assert_eq!(parse("123"), Value::Number(Number::Integer(123)));
        let big = parse("9999999999999999999999999");
        let expected: BigInt = "9999999999999999999999999".parse().unwrap();
        assert_eq!(big, Value::Number(Number::BigInteger(expected)));
        assert!(matches!(parse("1e5"), Value::Number(Number::Decimal(_))));
        assert!(matches!(parse("-2.5E-3"), Value::Number(Number::Decimal(_))));
    }

    #[rstest]
    #[case("0")]
    #[case("0.5")]
    #[case("-0")]
    #[case("10")]
    #[case("1E+2")]
    fn test_valid_numbers(#[case] text: &str) {
        assert!(JsonParser::parse(text).is_ok(), "{text}");
    }

    #[rstest]
    #[case("0123")]
    #[case("-")]
    #[case("1.")]
    #[case(".5")]
    #[case("1e")]
    #[case("-01")]
    #[case("+1")]
    fn test_invalid_numbers(#[case] text: &str) {
        assert!(JsonParser::parse(text).is_err(), "{text}");
    }

    #[test]
    fn test_leading_zero_kind() {
        assert_eq!(parse_err("0123"), ParseErrorKind::InvalidNumber);
    }

    #[test]
    fn test_literal_continuation_rejected() {
        assert_eq!(parse_err("truex"), ParseErrorKind::InvalidLiteral);
        assert_eq!(parse_err("null1"), ParseErrorKind::InvalidLiteral);
        assert_eq!(parse_err("tru"), ParseErrorKind::InvalidLiteral);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(
            parse(r#""a\"b\\c\/d\b\f\n\r\t""#),
            Value::String("a\"b\\c/d\u{8}\u{c}\n\r\t".into())
        );
        assert_eq!(parse(r#""\u00e9""#), Value::String("é".into()));
        assert_eq!(parse(r#""\ud83d\ude00""#), Value::String("😀".into()));
        assert_eq!(parse(r#""\ud83dx""#), Value::String("\u{FFFD}x".into()));
        assert_eq!(parse("\"naïve ünïcode\""), Value::String("naïve ünïcode".into()));
    }

    #[test]
    fn test_string_errors() {
        assert_eq!(parse_err("\"abc"), ParseErrorKind::UnexpectedEnd);
        assert_eq!(parse_err(r#""\q""#), ParseErrorKind::InvalidEscape('q'));
        assert_eq!(parse_err(r#""\u12""#), ParseErrorKind::InvalidUnicodeEscape);
        assert_eq!(parse_err("\"a\nb\""), ParseErrorKind::ControlCharacter);
    }

    #[test]
    fn test_containers() {
        let value = parse(r#"{"b": [1, {"c": null}], "a": {}, "e": []}"#);
        let map = value.as_object().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a", "e"]);
        assert_eq!(value.get("a"), Some(&Value::Object(Map::new())));
        assert_eq!(value.get("e"), Some(&Value::Array(vec![])));
    }

    #[test]
    fn test_duplicate_key_keeps_first_position_last_value() {
        let value = parse(r#"{"a": 1, "b": 2, "a": 3}"#);
        assert_eq!(value.to_string(), r#"{"a":3,"b":2}"#);
    }

    #[rstest]
    #[case("[1,]", ParseErrorKind::TrailingComma)]
    #[case(r#"{"a":1,}"#, ParseErrorKind::TrailingComma)]
    #[case(r#"{"a" 1}"#, ParseErrorKind::ExpectedColon)]
    #[case("{1: 2}", ParseErrorKind::KeyMustBeString)]
    #[case("[1 2]", ParseErrorKind::UnexpectedChar('2'))]
    #[case("{} x", ParseErrorKind::TrailingCharacters)]
    #[case("   ", ParseErrorKind::Empty)]
    #[case("", ParseErrorKind::Empty)]
    #[case("[", ParseErrorKind::UnexpectedEnd)]
    fn test_structural_errors(#[case] text: &str, #[case] expected: ParseErrorKind) {
        assert_eq!(parse_err(text), expected);
    }

    #[test]
    fn test_error_offset() {
        let err = JsonParser::parse("[1, 2, x]").unwrap_err();
        assert_eq!(err.offset, 7);
        assert_eq!(err.to_string(), "unexpected character 'x' at offset 7");
    }

    #[test]
    fn test_depth_limit() {
        let config = ParserConfig::default().with_max_depth(3);
        assert!(JsonParser::parse_with("[[[1]]]", config).is_ok());
        assert_eq!(
            JsonParser::parse_with("[[[[1]]]]", config).unwrap_err().kind,
            ParseErrorKind::DepthLimit(3)
        );
    }

    #[test]
    fn test_parse_object() {
        assert_eq!(JsonParser::parse_object(r#"{"a":1}"#).unwrap().len(), 1);
        assert_eq!(
            JsonParser::parse_object("[1]").unwrap_err().kind,
            ParseErrorKind::NotAnObject
        );
    }
}
