//! Per-schema registry of declared attributes.

use super::descriptor::{AttributeDescriptor, AttributeOptions, SourceKeys};
use crate::error::Result;
use indexmap::IndexMap;
use tracing::trace;

/// Alias → descriptor, in declaration order.
///
/// Filled while a schema is being built and read-only afterwards.
/// Declaring an alias twice replaces the earlier descriptor in place.
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    entries: IndexMap<String, AttributeDescriptor>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an attribute.
    pub fn register(
        &mut self,
        keys: impl Into<SourceKeys>,
        options: AttributeOptions,
    ) -> Result<&AttributeDescriptor> {
        let descriptor = AttributeDescriptor::declare(keys, options)?;
        let alias = descriptor.alias().to_string();
        trace!(alias = %alias, keys = ?descriptor.source_keys(), "registering attribute");
        let (index, _) = self.entries.insert_full(alias, descriptor);
        Ok(&self.entries[index])
    }

    pub fn get(&self, alias: &str) -> Option<&AttributeDescriptor> {
        self.entries.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
