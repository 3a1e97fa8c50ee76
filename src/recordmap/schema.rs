//! Schemas: the declared shape of one kind of foreign record.
//!
//! A [`Schema`] owns its [`AttributeRegistry`], its parse hooks and its
//! [`EngineConfig`]. It is assembled once through [`SchemaBuilder`], then
//! frozen behind an `Rc` and shared by every [`Model`] parsed from it.
//!
//! ```ignore
//! let thing = Schema::builder("Thing")
//!     .attribute("name", AttributeOptions::new())
//!     .build()?;
//!
//! let race = Schema::builder("Race")
//!     .attribute("number", AttributeOptions::new().primitive(Primitive::Integer))
//!     .attribute("manyThings", AttributeOptions::new().collection(&thing))
//!     .after_parse(|race| race.set("number", 7))
//!     .build()?;
//! ```

use crate::attributes::{AttributeDescriptor, AttributeOptions, AttributeRegistry, Lookup, SourceKeys};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::model::Model;
use std::fmt;
use std::rc::Rc;

/// A callback run around parsing.
pub type Hook = Rc<dyn Fn(&Model) -> Result<()>>;

pub struct Schema {
    name: String,
    registry: AttributeRegistry,
    before_parse: Vec<Hook>,
    after_parse: Vec<Hook>,
    config: EngineConfig,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .field("before_parse", &self.before_parse.len())
            .field("after_parse", &self.after_parse.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    pub fn descriptor(&self, alias: &str) -> Option<&AttributeDescriptor> {
        self.registry.get(alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.registry.aliases()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn before_parse_hooks(&self) -> &[Hook] {
        &self.before_parse
    }

    pub(crate) fn after_parse_hooks(&self) -> &[Hook] {
        &self.after_parse
    }
}

/// Collects declarations for a [`Schema`].
///
/// Declaration errors are held until [`SchemaBuilder::build`], which reports
/// the first one.
pub struct SchemaBuilder {
    name: String,
    registry: AttributeRegistry,
    before_parse: Vec<Hook>,
    after_parse: Vec<Hook>,
    config: EngineConfig,
    error: Option<Error>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: AttributeRegistry::new(),
            before_parse: Vec::new(),
            after_parse: Vec::new(),
            config: EngineConfig::default(),
            error: None,
        }
    }

    /// Declare an attribute. A later declaration with the same alias wins.
    pub fn attribute(mut self, keys: impl Into<SourceKeys>, options: AttributeOptions) -> Self {
        if let Err(err) = self.registry.register(keys, options) {
            self.error.get_or_insert(err);
        }
        self
    }

    /// Run `hook` after the input is merged and before it is committed.
    pub fn before_parse<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Model) -> Result<()> + 'static,
    {
        self.before_parse.push(Rc::new(hook));
        self
    }

    /// Run `hook` once the merged input is committed.
    pub fn after_parse<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Model) -> Result<()> + 'static,
    {
        self.after_parse.push(Rc::new(hook));
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Freeze the schema. Fails on the first declaration error, or when a
    /// `within`/`try` root does not name another declared attribute.
    pub fn build(self) -> Result<Rc<Schema>> {
        if let Some(err) = self.error {
            return Err(err);
        }

        for descriptor in self.registry.iter() {
            let root = match descriptor.lookup() {
                Lookup::TopLevel => continue,
                Lookup::Within(root) | Lookup::Try(root) => root,
            };
            if root == descriptor.alias() {
                return Err(Error::Configuration(format!(
                    "attribute '{}' in {} cannot search inside itself",
                    root, self.name
                )));
            }
            if !self.registry.contains(root) {
                return Err(Error::Configuration(format!(
                    "attribute '{}' in {} searches unknown attribute '{}'",
                    descriptor.alias(),
                    self.name,
                    root
                )));
            }
        }

        Ok(Rc::new(Schema {
            name: self.name,
            registry: self.registry,
            before_parse: self.before_parse,
            after_parse: self.after_parse,
            config: self.config,
        }))
    }
}
