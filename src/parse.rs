//! Document parser: JSON text → `Value`.
//!
//! Single pass over the input with an explicit stack of open containers, so
//! nesting depth is limited by memory rather than by the call stack. Failures
//! are atomic: either the whole document parses or a `ParseError` pointing at
//! the offending position is returned.
mod number;
mod string;

use std::io::Read;

use crate::error::{Error, Found, ParseError, ParseErrorKind, Position};
use crate::value::{Map, Value};

// ------------------------------- Front API -------------------------------- //

pub fn parse(text: &str) -> Result<Value, ParseError> {
    Scanner::new(text).document()
}

/// Buffer a reader fully, then parse it.
pub fn parse_reader<R: Read>(mut reader: R) -> Result<Value, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(parse(&text)?)
}

// -------------------------------- Scanner --------------------------------- //

pub(crate) struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

/// A container whose closing delimiter has not been seen yet.
enum Open {
    Array { items: Vec<Value>, opened_at: usize },
    Object { entries: Map, key: String, opened_at: usize },
}

impl Open {
    fn push(&mut self, value: Value) {
        match self {
            Open::Array { items, .. } => items.push(value),
            Open::Object { entries, key, .. } => {
                // repeated keys keep their first position, last value wins
                entries.insert(std::mem::take(key), value);
            }
        }
    }

    fn delimiter(&self) -> char {
        match self {
            Open::Array { .. } => ']',
            Open::Object { .. } => '}',
        }
    }

    fn separators(&self) -> &'static str {
        match self {
            Open::Array { .. } => "',' or ']'",
            Open::Object { .. } => "',' or '}'",
        }
    }

    fn opened_at(&self) -> usize {
        match self {
            Open::Array { opened_at, .. } | Open::Object { opened_at, .. } => *opened_at,
        }
    }

    fn close(self) -> Value {
        match self {
            Open::Array { items, .. } => Value::Array(items),
            Open::Object { entries, .. } => Value::Object(entries),
        }
    }
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        let pos = if input.starts_with('\u{feff}') { '\u{feff}'.len_utf8() } else { 0 };
        Scanner { input, bytes: input.as_bytes(), pos }
    }

    fn document(&mut self) -> Result<Value, ParseError> {
        let mut open: Vec<Open> = Vec::new();

        'value: loop {
            self.skip_ws();
            let mut value = match self.peek() {
                Some(b'[') => {
                    let opened_at = self.pos;
                    self.pos += 1;
                    self.skip_ws();
                    if self.eat(b']') {
                        Value::Array(Vec::new())
                    } else {
                        open.push(Open::Array { items: Vec::new(), opened_at });
                        continue 'value;
                    }
                }
                Some(b'{') => {
                    let opened_at = self.pos;
                    self.pos += 1;
                    self.skip_ws();
                    if self.eat(b'}') {
                        Value::Object(Map::new())
                    } else {
                        let key = self.key(opened_at)?;
                        open.push(Open::Object { entries: Map::new(), key, opened_at });
                        continue 'value;
                    }
                }
                Some(_) => self.scalar()?,
                None => {
                    return Err(match open.last() {
                        Some(container) => self.unterminated(container),
                        None => self.unexpected("a value"),
                    });
                }
            };

            // Hand the finished value to its parent, closing every container
            // whose delimiter follows immediately.
            loop {
                let Some(mut container) = open.pop() else {
                    self.skip_ws();
                    if self.pos < self.bytes.len() {
                        return Err(self.error_at(self.pos, ParseErrorKind::TrailingData));
                    }
                    return Ok(value);
                };
                container.push(value);
                self.skip_ws();
                match self.peek() {
                    Some(b',') => {
                        self.pos += 1;
                        if let Open::Object { key, opened_at, .. } = &mut container {
                            self.skip_ws();
                            *key = self.key(*opened_at)?;
                        }
                        open.push(container);
                        continue 'value;
                    }
                    Some(b) if char::from(b) == container.delimiter() => {
                        self.pos += 1;
                        value = container.close();
                    }
                    Some(_) => return Err(self.unexpected(container.separators())),
                    None => return Err(self.unterminated(&container)),
                }
            }
        }
    }

    /// Object key plus the `:` after it. `opened_at` is the enclosing `{`.
    fn key(&mut self, opened_at: usize) -> Result<String, ParseError> {
        let unterminated = ParseErrorKind::UnterminatedContainer { delimiter: '}' };
        match self.peek() {
            Some(b'"') => {}
            Some(_) => return Err(self.unexpected("a string key")),
            None => return Err(self.error_at(opened_at, unterminated)),
        }
        let key = self.string()?;
        self.skip_ws();
        match self.peek() {
            Some(b':') => self.pos += 1,
            Some(_) => return Err(self.unexpected("':'")),
            None => return Err(self.error_at(opened_at, unterminated)),
        }
        Ok(key)
    }

    fn scalar(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            Some(b'"') => self.string().map(Value::String),
            Some(b'-' | b'0'..=b'9') => self.number().map(Value::Number),
            Some(b't') => self.literal("true", Value::Bool(true)),
            Some(b'f') => self.literal("false", Value::Bool(false)),
            Some(b'n') => self.literal("null", Value::Null),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn literal(&mut self, word: &'static str, value: Value) -> Result<Value, ParseError> {
        if self.input[self.pos..].starts_with(word) {
            self.pos += word.len();
            Ok(value)
        } else {
            Err(self.unexpected(word))
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn skip_ws(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn found(&self) -> Found {
        match self.input[self.pos..].chars().next() {
            Some(c) => Found::Char(c),
            None => Found::EndOfInput,
        }
    }

    fn error_at(&self, offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError { kind, position: Position::locate(self.input, offset) }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        let found = self.found();
        self.error_at(self.pos, ParseErrorKind::UnexpectedToken { expected, found })
    }

    fn unterminated(&self, container: &Open) -> ParseError {
        let kind = ParseErrorKind::UnterminatedContainer { delimiter: container.delimiter() };
        self.error_at(container.opened_at(), kind)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;
    use ordered_float::OrderedFloat;

    fn kind_of(text: &str) -> ParseErrorKind {
        parse(text).unwrap_err().kind
    }

    #[test]
    fn parses_every_value_kind() {
        let value = parse(r#" {"a": [1, -2.5e1, "s", true, false, null, {}, []]} "#).unwrap();
        let items = value.get("a").unwrap().as_array().unwrap();
        assert_eq!(items[0].as_number(), Some(Number::Int(1)));
        assert_eq!(items[1].as_number(), Some(Number::Float(OrderedFloat(-25.0))));
        assert_eq!(items[2].as_str(), Some("s"));
        assert_eq!(items[3].as_bool(), Some(true));
        assert_eq!(items[4].as_bool(), Some(false));
        assert!(items[5].is_null());
        assert!(items[6].as_object().unwrap().is_empty());
        assert!(items[7].as_array().unwrap().is_empty());
    }

    #[test]
    fn agrees_with_serde_json_on_ast_documents() {
        let text = r#"{
            "_nodetype": "FileAST",
            "ext": [
                {"_nodetype": "FuncDef", "coord": "t.c:1:5", "decl": {"_nodetype": "Decl", "name": "main", "quals": []},
                 "param_decls": null, "body": {"_nodetype": "Compound", "block_items": null}}
            ]
        }"#;
        let ours = parse(text).unwrap();
        let theirs = Value::from(serde_json::from_str::<serde_json::Value>(text).unwrap());
        assert_eq!(ours, theirs);
    }

    #[test]
    fn keeps_object_key_order() {
        let value = parse(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn repeated_key_keeps_position_and_last_value() {
        let value = parse(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
        let entries: Vec<(&str, i64)> = value
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_number().unwrap().as_i64().unwrap()))
            .collect();
        assert_eq!(entries, [("a", 3), ("b", 2)]);
    }

    #[test]
    fn handles_deep_nesting() {
        let depth = 100_000;
        let text = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let mut value = &parse(&text).unwrap();
        let mut seen = 1;
        while let Some([inner]) = value.as_array() {
            value = inner;
            seen += 1;
        }
        assert_eq!(seen, depth);
    }

    #[test]
    fn skips_byte_order_mark() {
        assert_eq!(parse("\u{feff}null").unwrap(), Value::Null);
    }

    #[test]
    fn unterminated_string_points_at_opening_quote() {
        let err = parse("{\"name\": \"add").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
        assert_eq!(err.position.offset, 9);
        assert_eq!(err.position.column, 10);
    }

    #[test]
    fn newline_inside_string_is_unterminated() {
        let err = parse("[\"abc\n, 1]").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
        assert_eq!(err.position.offset, 1);
    }

    #[test]
    fn unbalanced_containers_point_at_innermost_opener() {
        let err = parse("{\"a\": [1, 2").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedContainer { delimiter: ']' });
        assert_eq!(err.position.offset, 6);

        let err = parse("{\"a\": [1, 2]").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedContainer { delimiter: '}' });
        assert_eq!(err.position.offset, 0);

        assert_eq!(kind_of("{\"a\""), ParseErrorKind::UnterminatedContainer { delimiter: '}' });
        assert_eq!(kind_of("[1,"), ParseErrorKind::UnterminatedContainer { delimiter: ']' });
    }

    #[test]
    fn trailing_data_is_rejected() {
        let err = parse("{} {}").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TrailingData);
        assert_eq!(err.position.offset, 3);
        assert_eq!(kind_of("1 2"), ParseErrorKind::TrailingData);
        assert_eq!(kind_of("01"), ParseErrorKind::TrailingData);
    }

    #[test]
    fn malformed_tokens_are_unexpected() {
        for text in ["", "   ", "[1,]", "{\"a\" 1}", "{1: 2}", "[tru]", "nul", "{\"a\": 1,}", "-", "1.", "1e", "[1 2]", "]"] {
            assert!(
                matches!(kind_of(text), ParseErrorKind::UnexpectedToken { .. }),
                "input {text:?} should be an unexpected token"
            );
        }
    }

    #[test]
    fn unexpected_token_reports_what_was_found() {
        let err = parse("[1,\n  }").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnexpectedToken { expected: "a value", found: Found::Char('}') }
        );
        assert_eq!((err.position.line, err.position.column), (2, 3));

        assert_eq!(
            kind_of(""),
            ParseErrorKind::UnexpectedToken { expected: "a value", found: Found::EndOfInput }
        );
    }

    #[test]
    fn reader_input_parses_like_text() {
        let value = parse_reader(&b"{\"k\": [true]}"[..]).unwrap();
        assert_eq!(value, parse("{\"k\": [true]}").unwrap());
    }
}
