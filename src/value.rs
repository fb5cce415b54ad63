//! Generic document tree.
//!
//! `Value` is the format-generic representation the parser produces and the
//! projector borrows. Objects keep insertion order so every walk over a tree
//! visits fields exactly as they appear in the source document.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

pub type Map = IndexMap<String, Value>;

// ------------------------------- Types ------------------------------------ //

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Map),
}

/// Integers stay exact when the literal has no fraction or exponent and fits
/// in an `i64`; everything else is a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Number {
    Int(i64),
    Float(OrderedFloat<f64>),
}

// ------------------------------ Accessors --------------------------------- //

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Field lookup on objects; `None` for every other variant.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Human-readable variant name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Resolve an RFC 6901 JSON Pointer (`""` is the whole document).
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        if pointer.is_empty() {
            return Some(self);
        }
        if !pointer.starts_with('/') {
            return None;
        }
        pointer
            .split('/')
            .skip(1)
            .map(unescape_pointer_token)
            .try_fold(self, |target, token| match target {
                Value::Object(map) => map.get(&*token),
                Value::Array(items) => parse_index(&token).and_then(|i| items.get(i)),
                _ => None,
            })
    }
}

impl Number {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(*i),
            Number::Float(_) => None,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => write!(f, "{}", x.0),
        }
    }
}

// ------------------------------- Drop ------------------------------------- //

// Nested containers are released through a heap worklist; the derived drop
// glue would recurse once per nesting level.
impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = match self {
            Value::Array(items) => std::mem::take(items),
            Value::Object(map) => std::mem::take(map).into_values().collect(),
            _ => return,
        };
        while let Some(mut value) = pending.pop() {
            match &mut value {
                Value::Array(items) => pending.append(items),
                Value::Object(map) => pending.extend(std::mem::take(map).into_values()),
                _ => {}
            }
        }
    }
}

// ---------------------------- Conversions --------------------------------- //

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(match n.as_i64() {
                Some(i) => Number::Int(i),
                None => Number::Float(OrderedFloat(n.as_f64().unwrap_or(f64::NAN))),
            }),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Float(f)) => serializer.serialize_f64(f.0),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

// ------------------------------ Pointers ---------------------------------- //

pub(crate) fn escape_pointer_token(token: &str) -> Cow<'_, str> {
    if token.contains(['~', '/']) {
        Cow::Owned(token.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(token)
    }
}

fn unescape_pointer_token(token: &str) -> Cow<'_, str> {
    if token.contains('~') {
        Cow::Owned(token.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(token)
    }
}

fn parse_index(token: &str) -> Option<usize> {
    if token.starts_with('+') || (token.starts_with('0') && token.len() != 1) {
        return None;
    }
    token.parse().ok()
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn conversion_keeps_key_order() {
        let value = Value::from(json!({"zeta": 1, "alpha": 2, "mid": {"b": null, "a": true}}));
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        let inner: Vec<&str> = value.get("mid").unwrap().as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(inner, ["b", "a"]);
    }

    #[test]
    fn numbers_keep_integers_exact() {
        let value = Value::from(json!([1, -7, 2.5, 18446744073709551615u64]));
        let items = value.as_array().unwrap();
        assert_eq!(items[0].as_number(), Some(Number::Int(1)));
        assert_eq!(items[1].as_number(), Some(Number::Int(-7)));
        assert_eq!(items[2].as_number(), Some(Number::Float(OrderedFloat(2.5))));
        assert!(items[3].as_number().unwrap().as_i64().is_none());
    }

    #[test]
    fn pointer_walks_objects_and_arrays() {
        let value = Value::from(json!({"ext": [{"name": "f"}, {"a/b": {"~x": 3}}]}));
        assert_eq!(value.pointer("/ext/0/name").and_then(Value::as_str), Some("f"));
        assert_eq!(value.pointer("/ext/1/a~1b/~0x").and_then(Value::as_number), Some(Number::Int(3)));
        assert_eq!(value.pointer(""), Some(&value));
        assert!(value.pointer("/ext/01").is_none());
        assert!(value.pointer("/ext/9").is_none());
        assert!(value.pointer("ext").is_none());
    }

    #[test]
    fn serializes_in_insertion_order() {
        let value = Value::from(json!({"b": [1, 2.5, "x"], "a": null, "c": false}));
        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(text, r#"{"b":[1,2.5,"x"],"a":null,"c":false}"#);
    }

    #[test]
    fn deep_nesting_drops_without_overflow() {
        let mut value = Value::Null;
        for i in 0..200_000 {
            value = if i % 2 == 0 {
                Value::Array(vec![value])
            } else {
                let mut map = Map::new();
                map.insert("k".to_string(), value);
                Value::Object(map)
            };
        }
        drop(value);
    }

    #[test]
    fn numbers_display_like_their_literals() {
        assert_eq!(Number::Int(-42).to_string(), "-42");
        assert_eq!(Number::Float(OrderedFloat(2.5)).to_string(), "2.5");
    }

    #[test]
    fn pointer_tokens_escape_both_ways() {
        assert_eq!(escape_pointer_token("a/b~c"), "a~1b~0c");
        assert_eq!(unescape_pointer_token("a~1b~0c"), "a/b~c");
        assert!(matches!(escape_pointer_token("plain"), Cow::Borrowed(_)));
    }
}
