//! The value tree produced by resolution.
//!
//! Objects keep their keys in schema declaration order, and numbers keep
//! the text they were written with so nothing is lost before serialization.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Object),
}

/// A numeric literal, stored as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Number {
    Integer(String),
    Decimal(String),
}

impl Number {
    /// Classify a number literal. A trailing `.` is completed to `.0`.
    pub fn from_literal(text: &str) -> Number {
        match text.find('.') {
            None => Number::Integer(text.to_string()),
            Some(dot) if dot + 1 == text.len() => Number::Decimal(format!("{text}0")),
            Some(_) => Number::Decimal(text.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Number::Integer(text) | Number::Decimal(text) => text,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(text) => text.parse().ok(),
            Number::Decimal(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_str().parse().ok()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered map from field names to values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    entries: Vec<(String, Value)>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing an existing entry in place.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut object = Object::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

impl Value {
    pub fn integer(value: i64) -> Value {
        Value::Number(Number::Integer(value.to_string()))
    }

    pub fn string(value: impl Into<String>) -> Value {
        Value::String(value.into())
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::Object(entries.into_iter().collect())
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Look up a field of an object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|object| object.get(key))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Number(number) => write!(f, "{number}"),
            Value::String(value) => write!(f, "{value:?}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(object) => {
                write!(f, "{{")?;
                for (i, (key, value)) in object.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Number::Integer(text) => {
                if let Ok(value) = text.parse::<i64>() {
                    serializer.serialize_i64(value)
                } else if let Ok(value) = text.parse::<u64>() {
                    serializer.serialize_u64(value)
                } else {
                    // Out of range for every integer type the data model has.
                    serializer.serialize_str(text)
                }
            }
            Number::Decimal(text) => match text.parse::<f64>() {
                Ok(value) if value.is_finite() => serializer.serialize_f64(value),
                _ => serializer.serialize_str(text),
            },
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Number(number) => number.serialize(serializer),
            Value::String(value) => serializer.serialize_str(value),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(object) => object.serialize(serializer),
        }
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_literal_forms() {
        assert_eq!(Number::from_literal("42"), Number::Integer("42".to_string()));
        assert_eq!(Number::from_literal("1."), Number::Decimal("1.0".to_string()));
        assert_eq!(Number::from_literal("2.50"), Number::Decimal("2.50".to_string()));
        assert_eq!(Number::from_literal("7").as_i64(), Some(7));
        assert_eq!(Number::from_literal("0.5").as_f64(), Some(0.5));
    }

    #[test]
    fn test_object_keeps_insertion_order() {
        let mut object = Object::new();
        object.insert("b", Value::integer(1));
        object.insert("a", Value::integer(2));
        object.insert("b", Value::integer(3));
        assert_eq!(object.keys().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(object.get("b"), Some(&Value::integer(3)));
    }

    #[test]
    fn test_display() {
        let value = Value::object([
            ("name", Value::string("app")),
            ("ports", Value::Array(vec![Value::integer(80), Value::integer(443)])),
            ("debug", Value::Bool(false)),
            ("parent", Value::Null),
        ]);
        assert_eq!(
            value.to_string(),
            r#"{name: "app", ports: [80, 443], debug: false, parent: null}"#
        );
    }
}
