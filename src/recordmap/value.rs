//! Runtime values for raw records and resolved attributes.
//!
//! A [`Record`] is the loosely structured input handed to a [`Model`]: string
//! keys mapped to [`Value`]s. The same [`Value`] type carries resolved attribute
//! values back out, which is why it can hold parsed [`Model`] instances next to
//! plain JSON-like data.
//!
//! `Value::Null` doubles as *absent*. A key that is missing from a record and a
//! key mapped to `null` look the same to the resolver.

use crate::error::{Error, Result};
use crate::model::Model;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A raw record: string keys to values, kept in sorted key order.
pub type Record = BTreeMap<String, Value>;

/// A dynamically typed value found in, or resolved from, a record.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent, or explicitly null.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Record),
    /// A parsed instance of some schema.
    ///
    /// Cloning the value clones the `Rc`, so every clone points at the same
    /// instance.
    Model(Rc<Model>),
}

impl Value {
    /// Whether this value counts as absent for search and casting.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Model(_) => "model",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Floats, with integers widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Record> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&Rc<Model>> {
        match self {
            Value::Model(m) => Some(m),
            _ => None,
        }
    }

    /// Convert back into JSON. Models become their committed raw record;
    /// non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Int(v) => serde_json::Value::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(record) => record_to_json(record),
            Value::Model(model) => record_to_json(&model.attributes()),
        }
    }

    /// Like [`Value::to_json`], but nested models are expanded into their
    /// resolved attributes instead of their raw record.
    pub fn to_resolved_json(&self) -> Result<serde_json::Value> {
        match self {
            Value::Model(model) => model.to_resolved_json(),
            Value::List(items) => Ok(serde_json::Value::Array(
                items
                    .iter()
                    .map(Value::to_resolved_json)
                    .collect::<Result<_>>()?,
            )),
            Value::Map(record) => {
                let mut out = serde_json::Map::new();
                for (key, value) in record {
                    out.insert(key.clone(), value.to_resolved_json()?);
                }
                Ok(serde_json::Value::Object(out))
            }
            other => Ok(other.to_json()),
        }
    }
}

fn record_to_json(record: &Record) -> serde_json::Value {
    serde_json::Value::Object(
        record
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Models are compared by identity, not content
            (Value::Model(a), Value::Model(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(record) => serialize_record(record, serializer),
            Value::Model(model) => serialize_record(&model.attributes(), serializer),
        }
    }
}

fn serialize_record<S: Serializer>(
    record: &Record,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(record.len()))?;
    for (key, value) in record {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(v) => Value::Bool(v),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(json_map_to_record(map)),
        }
    }
}

fn json_map_to_record(map: serde_json::Map<String, serde_json::Value>) -> Record {
    map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Map(v)
    }
}

impl From<Model> for Value {
    fn from(v: Model) -> Self {
        Value::Model(Rc::new(v))
    }
}

impl From<Rc<Model>> for Value {
    fn from(v: Rc<Model>) -> Self {
        Value::Model(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Anything that can be handed to a parse call as input.
pub trait IntoRecord {
    fn into_record(self) -> Result<Record>;
}

impl IntoRecord for Record {
    fn into_record(self) -> Result<Record> {
        Ok(self)
    }
}

impl IntoRecord for serde_json::Map<String, serde_json::Value> {
    fn into_record(self) -> Result<Record> {
        Ok(json_map_to_record(self))
    }
}

impl IntoRecord for serde_json::Value {
    fn into_record(self) -> Result<Record> {
        Value::from(self).into_record()
    }
}

/// `Null` parses as an empty record and a model hands over its raw record.
impl IntoRecord for Value {
    fn into_record(self) -> Result<Record> {
        match self {
            Value::Null => Ok(Record::new()),
            Value::Map(record) => Ok(record),
            Value::Model(model) => Ok(model.attributes()),
            other => Err(Error::NotARecord {
                expected: "record".to_string(),
                found: other.kind(),
            }),
        }
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> IntoRecord for [(K, V); N] {
    fn into_record(self) -> Result<Record> {
        Ok(self
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_integers_stay_integers() {
        assert_eq!(Value::from(json!(10)), Value::Int(10));
        assert_eq!(Value::from(json!(-3)), Value::Int(-3));
    }

    #[test]
    fn json_fractions_become_floats() {
        assert_eq!(Value::from(json!(1.5)), Value::Float(1.5));
        // u64 beyond i64 range falls back to a float
        assert!(matches!(Value::from(json!(u64::MAX)), Value::Float(_)));
    }

    #[test]
    fn json_objects_become_sorted_records() {
        let value = Value::from(json!({"b": 1, "a": [true, null]}));
        let record = value.as_map().unwrap();
        let keys: Vec<_> = record.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(
            record["a"],
            Value::List(vec![Value::Bool(true), Value::Null])
        );
    }

    #[test]
    fn to_json_reverses_from_json() {
        let source = json!({"name": "Phar Lap", "wins": 37, "odds": 1.5, "tags": ["x"]});
        assert_eq!(Value::from(source.clone()).to_json(), source);
    }

    #[test]
    fn non_finite_float_serializes_as_null() {
        assert_eq!(Value::Float(f64::NAN).to_json(), serde_json::Value::Null);
    }

    #[test]
    fn serialize_matches_to_json() {
        let value = Value::from(json!({"z": 1, "a": {"nested": "x"}}));
        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(text, r#"{"a":{"nested":"x"},"z":1}"#);
    }

    #[test]
    fn accessors_only_match_their_variant() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(3).as_bool(), None);
        assert_eq!(Value::Int(3).as_i64(), Some(3));
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::Null.as_str(), None);
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(false).is_null());
    }

    #[test]
    fn option_none_is_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::from("a"));
    }

    #[test]
    fn display_strings_are_bare() {
        assert_eq!(Value::from("Matamata").to_string(), "Matamata");
        assert_eq!(Value::Int(4).to_string(), "4");
    }

    #[test]
    fn into_record_from_json_object() {
        let record = json!({"name": "foo"}).into_record().unwrap();
        assert_eq!(record["name"], Value::from("foo"));
    }

    #[test]
    fn into_record_from_null_is_empty() {
        assert!(serde_json::Value::Null.into_record().unwrap().is_empty());
    }

    #[test]
    fn into_record_rejects_scalars() {
        let err = json!("nope").into_record().unwrap_err();
        assert!(matches!(err, Error::NotARecord { found: "string", .. }));
    }

    #[test]
    fn into_record_from_pairs() {
        let record = [("number", Value::from("10")), ("stake", Value::from(1.5))]
            .into_record()
            .unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record["number"], Value::from("10"));
    }
}
