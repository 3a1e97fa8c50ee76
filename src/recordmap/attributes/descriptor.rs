//! Attribute descriptors and the options they are declared with.
//!
//! A descriptor records where an attribute lives in the foreign record
//! (`source_keys`), what it is called on our side (`alias`), where else to
//! search (`lookup`) and how to cast it (`cast`).

use super::cast::{CastStrategy, CustomCast, Primitive};
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::value::Value;
use heck::ToSnakeCase;
use std::fmt;
use std::rc::Rc;

/// The candidate keys of a declaration.
///
/// `Multiple` always needs an explicit alias, even with a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKeys {
    Single(String),
    Multiple(Vec<String>),
}

impl From<&str> for SourceKeys {
    fn from(key: &str) -> Self {
        SourceKeys::Single(key.to_string())
    }
}

impl From<String> for SourceKeys {
    fn from(key: String) -> Self {
        SourceKeys::Single(key)
    }
}

impl From<Vec<String>> for SourceKeys {
    fn from(keys: Vec<String>) -> Self {
        SourceKeys::Multiple(keys)
    }
}

impl From<Vec<&str>> for SourceKeys {
    fn from(keys: Vec<&str>) -> Self {
        SourceKeys::Multiple(keys.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for SourceKeys {
    fn from(keys: &[&str]) -> Self {
        SourceKeys::Multiple(keys.iter().map(|k| k.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SourceKeys {
    fn from(keys: [&str; N]) -> Self {
        SourceKeys::Multiple(keys.iter().map(|k| k.to_string()).collect())
    }
}

/// Where to search when the alias slot of the record is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Search the top-level record.
    TopLevel,
    /// Search only inside the resolved value of another attribute.
    Within(String),
    /// Search inside another attribute first, the top-level record if that
    /// attribute resolves to nothing.
    Try(String),
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::TopLevel => f.write_str("top-level"),
            Lookup::Within(root) => write!(f, "within {}", root),
            Lookup::Try(root) => write!(f, "try {} then top-level", root),
        }
    }
}

/// Options accepted when declaring an attribute.
///
/// At most one of `primitive`, `model`, `collection` and `parse_with` may be
/// given, and `within` excludes `try_in`. Conflicts are reported when the
/// attribute is registered.
#[derive(Clone, Default)]
pub struct AttributeOptions {
    alias: Option<String>,
    within: Option<String>,
    try_root: Option<String>,
    primitive: Option<Primitive>,
    model: Option<Rc<Schema>>,
    collection: Option<Rc<Schema>>,
    custom: Option<CustomCast>,
}

impl AttributeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the attribute instead of snake-casing its source key.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Search exclusively inside the value of attribute `root`.
    pub fn within(mut self, root: impl Into<String>) -> Self {
        self.within = Some(root.into());
        self
    }

    /// Search inside attribute `root` first, falling back to the top level.
    pub fn try_in(mut self, root: impl Into<String>) -> Self {
        self.try_root = Some(root.into());
        self
    }

    pub fn primitive(mut self, primitive: Primitive) -> Self {
        self.primitive = Some(primitive);
        self
    }

    pub fn model(mut self, schema: &Rc<Schema>) -> Self {
        self.model = Some(Rc::clone(schema));
        self
    }

    pub fn collection(mut self, schema: &Rc<Schema>) -> Self {
        self.collection = Some(Rc::clone(schema));
        self
    }

    /// Cast with a function of the raw searched value.
    pub fn parse_with<F>(mut self, cast: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + 'static,
    {
        self.custom = Some(Rc::new(cast));
        self
    }

    fn into_cast(self, alias: &str) -> Result<CastStrategy> {
        let mut chosen = Vec::new();
        if let Some(p) = self.primitive {
            chosen.push(CastStrategy::Primitive(p));
        }
        if let Some(s) = self.model {
            chosen.push(CastStrategy::Model(s));
        }
        if let Some(s) = self.collection {
            chosen.push(CastStrategy::Collection(s));
        }
        if let Some(f) = self.custom {
            chosen.push(CastStrategy::Custom(f));
        }
        match chosen.len() {
            0 => Ok(CastStrategy::Identity),
            1 => Ok(chosen.remove(0)),
            _ => Err(Error::Configuration(format!(
                "attribute '{}' declares more than one of primitive, model, collection and parse_with",
                alias
            ))),
        }
    }
}

/// Immutable description of one declared attribute.
#[derive(Debug, Clone)]
pub struct AttributeDescriptor {
    source_keys: Vec<String>,
    alias: String,
    lookup: Lookup,
    cast: CastStrategy,
}

impl AttributeDescriptor {
    /// Build a descriptor from a declaration, validating the options.
    pub fn declare(keys: impl Into<SourceKeys>, options: AttributeOptions) -> Result<Self> {
        let (source_keys, alias) = match keys.into() {
            SourceKeys::Single(key) => {
                let alias = match &options.alias {
                    Some(alias) => alias.clone(),
                    None => default_alias(&key),
                };
                (vec![key], alias)
            }
            SourceKeys::Multiple(keys) => {
                let Some(alias) = options.alias.clone() else {
                    return Err(Error::Configuration(format!(
                        "attributes {:?} need an explicit alias",
                        keys
                    )));
                };
                (keys, alias)
            }
        };

        if source_keys.is_empty() || source_keys.iter().any(|k| k.is_empty()) {
            return Err(Error::Configuration(format!(
                "attribute '{}' needs at least one non-empty source key",
                alias
            )));
        }
        if alias.is_empty() {
            return Err(Error::Configuration(format!(
                "attributes {:?} resolve to an empty alias",
                source_keys
            )));
        }

        let lookup = match (options.within.clone(), options.try_root.clone()) {
            (None, None) => Lookup::TopLevel,
            (Some(root), None) => Lookup::Within(root),
            (None, Some(root)) => Lookup::Try(root),
            (Some(_), Some(_)) => {
                return Err(Error::Configuration(format!(
                    "attribute '{}' cannot use both within and try",
                    alias
                )))
            }
        };

        let cast = options.into_cast(&alias)?;

        Ok(Self {
            source_keys,
            alias,
            lookup,
            cast,
        })
    }

    pub fn source_keys(&self) -> &[String] {
        &self.source_keys
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn lookup(&self) -> &Lookup {
        &self.lookup
    }

    pub fn cast(&self) -> &CastStrategy {
        &self.cast
    }

    /// The attribute searched exclusively, if declared with `within`.
    pub fn containment_root(&self) -> Option<&str> {
        match &self.lookup {
            Lookup::Within(root) => Some(root),
            _ => None,
        }
    }

    /// The attribute searched before the top level, if declared with `try`.
    pub fn fallback_root(&self) -> Option<&str> {
        match &self.lookup {
            Lookup::Try(root) => Some(root),
            _ => None,
        }
    }
}

/// Default alias for a single source key: lower snake case.
pub fn default_alias(key: &str) -> String {
    key.to_snake_case()
}
