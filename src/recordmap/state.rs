//! Per-instance record state.
//!
//! A [`RecordState`] pairs a frozen raw record with its identity digest and the
//! memo of attribute values resolved from it. States are never patched: every
//! parse builds a new one, so the memo can never outlive the record it was
//! computed from.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::value::{Record, Value};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct RecordState {
    raw: Rc<Record>,
    identity: Option<String>,
    resolved: HashMap<String, Value>,
}

impl RecordState {
    /// The state of an instance that was never parsed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// An uncommitted state over `raw`, without identity.
    pub fn pending(raw: Record) -> Self {
        Self {
            raw: Rc::new(raw),
            identity: None,
            resolved: HashMap::new(),
        }
    }

    /// Freeze `raw`, compute its identity and start with an empty memo.
    pub fn commit(raw: Record, config: &EngineConfig) -> Result<Self> {
        let identity = identity_of(&raw, config)?;
        Ok(Self {
            raw: Rc::new(raw),
            identity: Some(identity),
            resolved: HashMap::new(),
        })
    }

    /// This state's raw record overlaid with `input`. Input keys win;
    /// keys only present here are kept.
    pub fn merged_with(&self, input: Record) -> Record {
        let mut merged = Record::clone(&self.raw);
        merged.extend(input);
        merged
    }

    pub fn raw(&self) -> &Rc<Record> {
        &self.raw
    }

    /// Consume the state, returning its raw record.
    pub fn into_raw(self) -> Record {
        Rc::try_unwrap(self.raw).unwrap_or_else(|shared| Record::clone(&shared))
    }

    /// Add or replace a raw key. Only used on pending states.
    ///
    /// Clears the memo: alias slots and roots may read any raw key.
    pub fn inject(&mut self, key: String, value: Value) {
        Rc::make_mut(&mut self.raw).insert(key, value);
        self.resolved.clear();
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn cached(&self, alias: &str) -> Option<&Value> {
        self.resolved.get(alias)
    }

    pub fn memoize(&mut self, alias: &str, value: Value) {
        self.resolved.insert(alias.to_string(), value);
    }
}

/// Digest of the canonical serialization of `raw`: JSON with sorted keys,
/// nested models written as their own raw records.
pub fn identity_of(raw: &Record, config: &EngineConfig) -> Result<String> {
    let canonical = serde_json::to_string(raw)?;
    Ok(config.digest.hex_digest(canonical.as_bytes()))
}
