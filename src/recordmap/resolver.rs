//! Value resolution.
//!
//! Resolving an attribute on a [`Model`]:
//!
//! 1. a memoized value is returned as is;
//! 2. the record slot named after the alias is used when present;
//! 3. otherwise the source keys are searched, in order, in the place the
//!    descriptor's [`Lookup`] points at;
//! 4. the cast is applied, absent values included;
//! 5. the result is memoized under the alias.
//!
//! Only the memo is written. The raw record is never touched.

use crate::attributes::{AttributeDescriptor, Lookup};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::Model;
use crate::value::{Record, Value};
use std::borrow::Cow;
use tracing::trace;

pub(crate) fn resolve(model: &Model, descriptor: &AttributeDescriptor) -> Result<Value> {
    let alias = descriptor.alias();
    if let Some(value) = model.cached(alias) {
        trace!(alias, "memoized");
        return Ok(value);
    }

    let config = model.schema().config();
    let raw = model.active_raw();

    let value = match raw.get(alias).filter(|v| !config.treats_as_absent(v)) {
        Some(direct) => direct.clone(),
        None => search(model, descriptor, &raw, config)?,
    };

    let cast = descriptor.cast().apply(value, config)?;
    model.memoize(alias, cast.clone());
    Ok(cast)
}

fn search(
    model: &Model,
    descriptor: &AttributeDescriptor,
    raw: &Record,
    config: &EngineConfig,
) -> Result<Value> {
    let keys = descriptor.source_keys();
    match descriptor.lookup() {
        Lookup::TopLevel => Ok(first_present(keys, raw, config)),
        Lookup::Within(root) => {
            let node = model.get(root)?;
            Ok(match as_record(&node) {
                Some(record) => first_present(keys, &record, config),
                None => {
                    trace!(alias = descriptor.alias(), root = %root, "containment root is empty");
                    Value::Null
                }
            })
        }
        Lookup::Try(root) => {
            let node = model.get(root)?;
            Ok(match as_record(&node) {
                Some(record) => first_present(keys, &record, config),
                None => {
                    trace!(alias = descriptor.alias(), root = %root, "falling back to top level");
                    first_present(keys, raw, config)
                }
            })
        }
    }
}

/// The first key whose value is present, or `Null`.
fn first_present(keys: &[String], record: &Record, config: &EngineConfig) -> Value {
    keys.iter()
        .filter_map(|key| record.get(key))
        .find(|value| !config.treats_as_absent(value))
        .cloned()
        .unwrap_or(Value::Null)
}

/// A root value we can search: a map, or a model's raw record.
fn as_record(node: &Value) -> Option<Cow<'_, Record>> {
    match node {
        Value::Map(record) => Some(Cow::Borrowed(record)),
        Value::Model(model) => Some(Cow::Owned(model.attributes())),
        _ => None,
    }
}
