//! Model values and path segments
//!
//! This module defines the runtime value tree that models are expressed in,
//! and the segment type used to address a property or an index inside it.

use chrono::{DateTime, Utc};
use std::fmt;

// ============================================================================
// Value Enum - Runtime models to be validated
// ============================================================================

/// Runtime value that can be validated
///
/// Objects keep their insertion order, which is also the order in which
/// their properties are enumerated.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (i64)
    Int(i64),
    /// Float value (f64)
    Float(f64),
    /// String value
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Point in time; never descended into
    Date(DateTime<Utc>),
    /// List/Array of values
    List(Vec<Value>),
    /// Object/Dictionary (key-value pairs)
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Build an object from key-value pairs
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a list from values
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Get human-readable type name for messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Date(_) => "date",
            Self::List(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the validator walks into this value (objects and lists)
    pub fn is_descendable(&self) -> bool {
        matches!(self, Self::List(_) | Self::Object(_))
    }

    /// String content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric content as f64 (integers are widened)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Length of strings (in characters), bytes, lists and objects
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::String(s) => Some(s.chars().count()),
            Self::Bytes(b) => Some(b.len()),
            Self::List(items) => Some(items.len()),
            Self::Object(fields) => Some(fields.len()),
            _ => None,
        }
    }

    /// Look up an object property by name
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Object(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Look up a property or an index
    ///
    /// Index segments on objects use the decimal key, key segments on lists
    /// are parsed as indices.
    pub fn lookup(&self, segment: &PathSegment) -> Option<&Value> {
        match (self, segment) {
            (Self::Object(_), PathSegment::Key(key)) => self.get(key),
            (Self::Object(_), PathSegment::Index(i)) => self.get(&i.to_string()),
            (Self::List(items), segment) => segment.as_index().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Iterate object keys in insertion order (empty for non-objects)
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let fields: &[(String, Value)] = match self {
            Self::Object(fields) => fields,
            _ => &[],
        };
        fields.iter().map(|(k, _)| k.as_str())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Self::Date(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

// ============================================================================
// PathSegment - one step in a model path
// ============================================================================

/// Name of an object property or index of a list element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object property
    Key(String),
    /// List index
    Index(usize),
}

impl PathSegment {
    /// The segment as a list index, parsing decimal keys
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Key(k) => k.parse().ok(),
        }
    }

    /// The segment as a property key, if it is one
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(k) => Some(k),
            Self::Index(_) => None,
        }
    }

    /// Whether this segment names the given property (indices compare by decimal form)
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Key(k) => k == name,
            Self::Index(i) => name.parse::<usize>().map_or(false, |n| n == *i),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        Self::Key(s)
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

// ============================================================================
// Conversions
// ============================================================================

#[cfg(feature = "serde")]
impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::Number(i.into()),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::Bytes(b) => {
                serde_json::Value::Array(b.into_iter().map(|byte| byte.into()).collect())
            }
            Value::Date(d) => serde_json::Value::String(d.to_rfc3339()),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(fields) => {
                Value::Object(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_name() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Bool(true).type_name(), "boolean");
        assert_eq!(Value::Int(42).type_name(), "integer");
        assert_eq!(Value::Float(2.5).type_name(), "float");
        assert_eq!(Value::from("test").type_name(), "string");
        assert_eq!(Value::Date(Utc::now()).type_name(), "date");
        assert_eq!(Value::List(vec![]).type_name(), "array");
        assert_eq!(Value::Object(vec![]).type_name(), "object");
    }

    #[test]
    fn test_descendable() {
        assert!(Value::List(vec![]).is_descendable());
        assert!(Value::Object(vec![]).is_descendable());
        assert!(!Value::Date(Utc::now()).is_descendable());
        assert!(!Value::Null.is_descendable());
        assert!(!Value::from("x").is_descendable());
    }

    #[test]
    fn test_lookup() {
        let model = Value::object([
            ("name", Value::from("Rex")),
            ("tags", Value::list([Value::from("a"), Value::from("b")])),
        ]);

        assert_eq!(model.lookup(&"name".into()), Some(&Value::from("Rex")));
        assert_eq!(model.lookup(&"missing".into()), None);

        let tags = model.get("tags").unwrap();
        assert_eq!(tags.lookup(&1usize.into()), Some(&Value::from("b")));
        assert_eq!(tags.lookup(&"0".into()), Some(&Value::from("a")));
        assert_eq!(tags.lookup(&5usize.into()), None);
        assert_eq!(Value::Int(1).lookup(&"x".into()), None);
    }

    #[test]
    fn test_len_counts_characters() {
        assert_eq!(Value::from("héllo").len(), Some(5));
        assert_eq!(Value::list([Value::Null]).len(), Some(1));
        assert_eq!(Value::Int(3).len(), None);
    }

    #[test]
    fn test_path_segment_matches() {
        assert!(PathSegment::from("name").matches("name"));
        assert!(PathSegment::from(3usize).matches("3"));
        assert!(!PathSegment::from(3usize).matches("name"));
        assert_eq!(PathSegment::from(7usize).to_string(), "7");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_conversion() {
        let json = serde_json::json!({"a": 1, "b": [true, null], "c": 1.5});
        let value = Value::from(json);
        assert_eq!(value.get("a"), Some(&Value::Int(1)));
        assert_eq!(value.get("c"), Some(&Value::Float(1.5)));
        assert_eq!(value.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
