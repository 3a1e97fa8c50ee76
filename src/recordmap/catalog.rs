//! # Catalogs
//!
//! Schemas declared as data instead of code. A catalog document names a set of
//! types, each with a list of attribute declarations:
//!
//! ```json
//! {
//!   "types": {
//!     "Thing": { "attributes": [ { "keys": "name" } ] },
//!     "Race": {
//!       "attributes": [
//!         { "keys": ["fooMeeting", "barMeeting"], "alias": "meeting" },
//!         { "keys": "number", "type": "integer" },
//!         { "keys": "manyThings", "collection": "Thing" },
//!         { "keys": "someDetails", "alias": "details" },
//!         { "keys": "nestedDetail", "within": "details" }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! `model` and `collection` refer to other types of the same document by name.
//! Types are built referenced-first, so declaration order in the document does
//! not matter; unknown and cyclic references are configuration errors.
//! Custom casts and parse hooks only exist in code.

use crate::attributes::{AttributeOptions, Primitive, SourceKeys};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::schema::Schema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CatalogDocument {
    pub types: IndexMap<String, TypeDocument>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TypeDocument {
    #[serde(default)]
    pub attributes: Vec<AttributeDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AttributeDocument {
    pub keys: KeysDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within: Option<String>,
    #[serde(default, rename = "try", skip_serializing_if = "Option::is_none")]
    pub try_root: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub primitive: Option<Primitive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

/// A single key, or several candidates (which need an alias).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum KeysDocument {
    One(String),
    Many(Vec<String>),
}

impl From<KeysDocument> for SourceKeys {
    fn from(keys: KeysDocument) -> Self {
        match keys {
            KeysDocument::One(key) => SourceKeys::Single(key),
            KeysDocument::Many(keys) => SourceKeys::Multiple(keys),
        }
    }
}

/// Schemas built from a [`CatalogDocument`], by type name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    schemas: IndexMap<String, Rc<Schema>>,
}

impl Catalog {
    /// Load a catalog document from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P, config: &EngineConfig) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(Error::Io)?;
        Self::from_json_str(&content, config)
    }

    pub fn from_json_str(text: &str, config: &EngineConfig) -> Result<Self> {
        let document: CatalogDocument = serde_json::from_str(text)?;
        Self::from_document(&document, config)
    }

    /// Build every type of `document`, each with `config`.
    pub fn from_document(document: &CatalogDocument, config: &EngineConfig) -> Result<Self> {
        let mut builder = CatalogBuilder {
            document,
            config,
            built: IndexMap::new(),
            visiting: Vec::new(),
        };
        for name in document.types.keys() {
            builder.build(name)?;
        }

        let mut schemas = IndexMap::with_capacity(document.types.len());
        for name in document.types.keys() {
            if let Some(schema) = builder.built.get(name) {
                schemas.insert(name.clone(), Rc::clone(schema));
            }
        }
        debug!(types = schemas.len(), "catalog built");
        Ok(Self { schemas })
    }

    pub fn get(&self, name: &str) -> Option<&Rc<Schema>> {
        self.schemas.get(name)
    }

    /// Like [`Catalog::get`], but a missing type is an error.
    pub fn schema(&self, name: &str) -> Result<&Rc<Schema>> {
        self.get(name).ok_or_else(|| {
            Error::Configuration(format!("catalog has no type named '{}'", name))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<Schema>)> {
        self.schemas.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

struct CatalogBuilder<'a> {
    document: &'a CatalogDocument,
    config: &'a EngineConfig,
    built: IndexMap<String, Rc<Schema>>,
    visiting: Vec<String>,
}

impl CatalogBuilder<'_> {
    fn build(&mut self, name: &str) -> Result<Rc<Schema>> {
        if let Some(schema) = self.built.get(name) {
            return Ok(Rc::clone(schema));
        }
        if self.visiting.iter().any(|n| n == name) {
            return Err(Error::Configuration(format!(
                "cyclic type reference: {} -> {}",
                self.visiting.join(" -> "),
                name
            )));
        }
        let document = self.document;
        let Some(doc) = document.types.get(name) else {
            return Err(Error::Configuration(format!("unknown type '{}'", name)));
        };

        self.visiting.push(name.to_string());
        let mut schema = Schema::builder(name).config(self.config.clone());
        for attribute in &doc.attributes {
            let options = self.options_for(attribute)?;
            schema = schema.attribute(attribute.keys.clone(), options);
        }
        self.visiting.pop();

        let schema = schema.build()?;
        self.built.insert(name.to_string(), Rc::clone(&schema));
        Ok(schema)
    }

    fn options_for(&mut self, attribute: &AttributeDocument) -> Result<AttributeOptions> {
        let mut options = AttributeOptions::new();
        if let Some(alias) = &attribute.alias {
            options = options.alias(alias);
        }
        if let Some(root) = &attribute.within {
            options = options.within(root);
        }
        if let Some(root) = &attribute.try_root {
            options = options.try_in(root);
        }
        if let Some(primitive) = attribute.primitive {
            options = options.primitive(primitive);
        }
        if let Some(name) = &attribute.model {
            let nested = self.build(name)?;
            options = options.model(&nested);
        }
        if let Some(name) = &attribute.collection {
            let nested = self.build(name)?;
            options = options.collection(&nested);
        }
        Ok(options)
    }
}
