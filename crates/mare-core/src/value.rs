//! Attribute value model
//!
//! A [`Value`] is what flows through a transform chain: nothing at all, one
//! scalar, or an ordered list of scalars of the same type. Values handed over
//! by the host in its own container type are carried as
//! [`Value::Collection`] until a transform coerces them.

use crate::transform::TransformError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::mem;
use std::sync::Arc;
use uuid::Uuid;

/// A single indivisible attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Guid(Uuid),
}

impl Scalar {
    /// Short name of the scalar type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::String(_) => "string",
            Scalar::Integer(_) => "integer",
            Scalar::Boolean(_) => "boolean",
            Scalar::DateTime(_) => "datetime",
            Scalar::Guid(_) => "guid",
        }
    }

    /// Borrow the string content if this is a string scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical text of the scalar; borrowed for strings
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Scalar::String(s) => Cow::Borrowed(s),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// Whether two scalars carry the same type
    pub fn same_type(&self, other: &Scalar) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    fn from_json(json: &serde_json::Value) -> std::result::Result<Self, String> {
        match json {
            serde_json::Value::String(s) => Ok(Scalar::String(s.clone())),
            serde_json::Value::Bool(b) => Ok(Scalar::Boolean(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Scalar::Integer)
                .ok_or_else(|| format!("number {} is not a 64-bit integer", n)),
            other => Err(format!("unsupported scalar value: {}", other)),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Boolean(true) => f.write_str("True"),
            Scalar::Boolean(false) => f.write_str("False"),
            Scalar::DateTime(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Scalar::Guid(g) => write!(f, "{}", g.hyphenated()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(value: DateTime<Utc>) -> Self {
        Scalar::DateTime(value)
    }
}

impl From<Uuid> for Scalar {
    fn from(value: Uuid) -> Self {
        Scalar::Guid(value)
    }
}

/// A multi-valued container owned by the host
///
/// Elements are only ever observed through their string representation.
pub trait ValueCollection: fmt::Debug + Send + Sync {
    /// Number of elements
    fn len(&self) -> usize;

    /// Whether the collection has no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// String representation of every element, in order
    fn string_values(&self) -> Vec<String>;
}

impl ValueCollection for Vec<String> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn string_values(&self) -> Vec<String> {
        self.clone()
    }
}

impl ValueCollection for Vec<serde_json::Value> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn string_values(&self) -> Vec<String> {
        self.iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

/// The value flowing through a transform chain
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// No value; distinct from an empty string or an empty list
    #[default]
    Absent,
    /// One scalar
    Scalar(Scalar),
    /// Ordered scalars of one type
    MultiValue(Vec<Scalar>),
    /// A host container not yet coerced
    Collection(Arc<dyn ValueCollection>),
}

impl Value {
    /// Build a string scalar value
    pub fn string(value: impl Into<String>) -> Self {
        Value::Scalar(Scalar::String(value.into()))
    }

    /// Build a multi-value, rejecting mixed element types
    pub fn multi(values: Vec<Scalar>) -> std::result::Result<Self, TransformError> {
        if let Some(first) = values.first() {
            if let Some(odd) = values.iter().find(|v| !v.same_type(first)) {
                return Err(TransformError::TypeMismatch {
                    expected: format!("multi-value of {}", first.type_name()),
                    actual: odd.type_name().to_string(),
                });
            }
        }
        Ok(Value::MultiValue(values))
    }

    /// Build a multi-value of strings
    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::MultiValue(values.into_iter().map(|s| Scalar::String(s.into())).collect())
    }

    /// Wrap a host container
    pub fn collection(values: impl ValueCollection + 'static) -> Self {
        Value::Collection(Arc::new(values))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// The scalar, if this is a single value
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The string content, if this is a string scalar
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// Short name of the representation, used in error messages and traces
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Scalar(s) => s.type_name(),
            Value::MultiValue(_) => "multi-value",
            Value::Collection(_) => "collection",
        }
    }

    /// Convert a JSON document into a value
    pub fn from_json(json: &serde_json::Value) -> std::result::Result<Self, String> {
        match json {
            serde_json::Value::Null => Ok(Value::Absent),
            serde_json::Value::Array(items) => {
                let scalars = items
                    .iter()
                    .map(Scalar::from_json)
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Value::multi(scalars).map_err(|e| e.to_string())
            }
            other => Scalar::from_json(other).map(Value::Scalar),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Absent, Value::Absent) => true,
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            (Value::MultiValue(a), Value::MultiValue(b)) => a == b,
            (Value::Collection(a), Value::Collection(b)) => {
                // Host containers compare by content, not identity
                a.string_values() == b.string_values()
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => f.write_str("<absent>"),
            Value::Scalar(s) => write!(f, "{}", s),
            Value::MultiValue(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Collection(c) => write!(f, "[{}]", c.string_values().join(", ")),
        }
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Value::Scalar(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::string(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Absent, |v| Value::Scalar(v.into()))
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::String(s) => serializer.serialize_str(s),
            Scalar::Integer(i) => serializer.serialize_i64(*i),
            Scalar::Boolean(b) => serializer.serialize_bool(*b),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Absent => serializer.serialize_none(),
            Value::Scalar(s) => s.serialize(serializer),
            Value::MultiValue(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for v in values {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            Value::Collection(c) => {
                let strings = c.string_values();
                let mut seq = serializer.serialize_seq(Some(strings.len()))?;
                for s in &strings {
                    seq.serialize_element(s)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Value::from_json(&json).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_display_is_canonical() {
        assert_eq!(Scalar::Boolean(true).to_string(), "True");
        assert_eq!(Scalar::Integer(-42).to_string(), "-42");
        let guid = Uuid::parse_str("B1E3AC2A-4E1C-4A8E-9D3F-0123456789AB").unwrap();
        assert_eq!(Scalar::Guid(guid).to_string(), "b1e3ac2a-4e1c-4a8e-9d3f-0123456789ab");
        let dt = DateTime::parse_from_rfc3339("2020-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(Scalar::DateTime(dt).to_string(), "2020-01-01T00:00:00Z");
    }

    #[test]
    fn test_multi_rejects_mixed_types() {
        let err = Value::multi(vec![Scalar::from("a"), Scalar::Integer(1)]).unwrap_err();
        assert!(matches!(err, TransformError::TypeMismatch { .. }));
        assert!(Value::multi(vec![]).is_ok());
    }

    #[test]
    fn test_json_conversion() {
        assert_eq!(Value::from_json(&json!(null)).unwrap(), Value::Absent);
        assert_eq!(Value::from_json(&json!("x")).unwrap(), Value::string("x"));
        assert_eq!(
            Value::from_json(&json!(["a", "b"])).unwrap(),
            Value::strings(["a", "b"])
        );
        assert!(Value::from_json(&json!(["a", 1])).is_err());
        assert!(Value::from_json(&json!({"a": 1})).is_err());
        assert!(Value::from_json(&json!(1.5)).is_err());
    }

    #[test]
    fn test_serialize_round_trip_through_json() {
        let value = Value::strings(["admin", "user"]);
        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(text, r#"["admin","user"]"#);
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
        assert_eq!(serde_json::to_string(&Value::Absent).unwrap(), "null");
    }

    #[test]
    fn test_collections_compare_by_content() {
        let a = Value::collection(vec!["x".to_string()]);
        let b = Value::collection(vec![json!("x")]);
        assert_eq!(a, b);
        assert_ne!(a, Value::strings(["x"]));
    }
}
