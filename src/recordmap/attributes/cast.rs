//! Cast strategies.
//!
//! Every descriptor carries exactly one [`CastStrategy`], picked when the
//! attribute is declared. The strategy turns whatever the search found
//! (possibly nothing) into the value handed back to callers.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::schema::Schema;
use crate::value::{IntoRecord, Record, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// A user supplied cast. It sees the searched value verbatim, absent included.
pub type CustomCast = Rc<dyn Fn(Value) -> Result<Value>>;

/// Primitive target types for coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Integer,
    Float,
    Boolean,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Primitive::String => "string",
            Primitive::Integer => "integer",
            Primitive::Float => "float",
            Primitive::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

impl Primitive {
    /// Coerce a present value into this primitive type.
    pub fn coerce(self, value: &Value) -> Result<Value> {
        let coerced = match self {
            Primitive::String => coerce_string(value).map(Value::String),
            Primitive::Integer => coerce_integer(value).map(Value::Int),
            Primitive::Float => coerce_float(value).map(Value::Float),
            Primitive::Boolean => coerce_boolean(value).map(Value::Bool),
        };
        coerced.ok_or_else(|| Error::Coercion {
            target: self,
            value: value.to_string(),
        })
    }
}

/// How a searched value becomes an attribute value.
#[derive(Clone, Default)]
pub enum CastStrategy {
    #[default]
    Identity,
    Primitive(Primitive),
    /// Parse into one instance of the schema.
    Model(Rc<Schema>),
    /// Parse each element into the schema. Absent becomes an empty list.
    Collection(Rc<Schema>),
    Custom(CustomCast),
}

impl fmt::Debug for CastStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastStrategy::Identity => f.write_str("Identity"),
            CastStrategy::Primitive(p) => f.debug_tuple("Primitive").field(p).finish(),
            CastStrategy::Model(s) => f.debug_tuple("Model").field(&s.name()).finish(),
            CastStrategy::Collection(s) => f.debug_tuple("Collection").field(&s.name()).finish(),
            CastStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Display for CastStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastStrategy::Identity => f.write_str("identity"),
            CastStrategy::Primitive(p) => write!(f, "{}", p),
            CastStrategy::Model(s) => write!(f, "model {}", s.name()),
            CastStrategy::Collection(s) => write!(f, "collection of {}", s.name()),
            CastStrategy::Custom(_) => f.write_str("custom"),
        }
    }
}

impl CastStrategy {
    /// Cast a searched value. `config` decides what counts as absent.
    pub fn apply(&self, value: Value, config: &EngineConfig) -> Result<Value> {
        let absent = config.treats_as_absent(&value);
        match self {
            CastStrategy::Identity => Ok(value),
            CastStrategy::Custom(cast) => cast(value),
            CastStrategy::Primitive(_) | CastStrategy::Model(_) if absent => Ok(Value::Null),
            CastStrategy::Collection(_) if absent => Ok(Value::List(Vec::new())),
            CastStrategy::Primitive(primitive) => primitive.coerce(&value),
            CastStrategy::Model(schema) => cast_model(schema, value),
            CastStrategy::Collection(schema) => {
                let Value::List(items) = value else {
                    return Err(Error::NotACollection {
                        expected: schema.name().to_string(),
                        found: value.kind(),
                    });
                };
                trace!(schema = schema.name(), len = items.len(), "casting collection");
                items
                    .into_iter()
                    .map(|item| cast_model(schema, item))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::List)
            }
        }
    }
}

/// Instances of `schema` pass through untouched; anything else is parsed.
fn cast_model(schema: &Rc<Schema>, value: Value) -> Result<Value> {
    if let Value::Model(model) = &value {
        if model.is_instance_of(schema) {
            return Ok(value);
        }
    }
    let record = record_for(schema, value)?;
    Ok(Value::Model(Rc::new(Model::parse_new(schema, record)?)))
}

fn record_for(schema: &Schema, value: Value) -> Result<Record> {
    let found = value.kind();
    value.into_record().map_err(|_| Error::NotARecord {
        expected: schema.name().to_string(),
        found,
    })
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(format_float(*f)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => Some(other.to_json().to_string()),
    }
}

/// Whole floats keep one fractional digit so they still read as floats.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Float(f) if f.is_finite() => {
            let truncated = f.trunc();
            if truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
                Some(truncated as i64)
            } else {
                None
            }
        }
        Value::String(s) => parse_integer(s),
        _ => None,
    }
}

/// Parse an integer literal: optional sign, optional `0x`/`0o`/`0b` prefix,
/// underscores allowed between digits. Leading zeros are plain decimal.
fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let lower = unsigned.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else {
        (10, lower.as_str())
    };
    if digits.starts_with(['+', '-']) {
        return None;
    }
    let digits = strip_digit_separators(digits, radix)?;
    let magnitude = i128::from_str_radix(&digits, radix).ok()?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).ok()
}

fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        Value::String(s) => {
            let trimmed = s.trim();
            let cleaned = strip_digit_separators(trimmed, 10)?;
            cleaned.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Int(0) => Some(false),
        Value::Int(1) => Some(true),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Drop `_` separators, which are only valid between two digits of `radix`.
fn strip_digit_separators(text: &str, radix: u32) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(chars.len());
    for (i, c) in chars.iter().enumerate() {
        if *c == '_' {
            let before = i.checked_sub(1).and_then(|j| chars.get(j));
            let after = chars.get(i + 1);
            match (before, after) {
                (Some(b), Some(a)) if b.is_digit(radix) && a.is_digit(radix) => {
                    continue
                }
                _ => return None,
            }
        }
        out.push(*c);
    }
    Some(out)
}
