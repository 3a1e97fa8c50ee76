//! Parsed instances of a schema.
//!
//! A [`Model`] holds one foreign record and resolves declared attributes from
//! it on first access. All access goes through `&self`: the memo and the parse
//! phase live in `RefCell`/`Cell`, which is enough because models are
//! single-threaded and nested models are shared through `Rc`.
//!
//! ## Parse lifecycle
//!
//! ```text
//! Idle/Committed ──parse──▶ Snapshotting ──before hooks ok──▶ Committed ──▶ after hooks
//!                                 │
//!                                 └──before hook fails──▶ previous phase, state untouched
//! ```
//!
//! While snapshotting, `get` reads the merged but uncommitted record and
//! [`Model::inject`] may add raw keys to it. Committing freezes the record,
//! recomputes the identity and drops every memoized value.

use crate::error::{Error, Result};
use crate::resolver;
use crate::schema::Schema;
use crate::state::RecordState;
use crate::value::{IntoRecord, Record, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Where a model is in its parse lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePhase {
    /// Never parsed.
    Idle,
    /// Merged input exists, before hooks are running.
    Snapshotting,
    /// A record has been committed.
    Committed,
}

pub struct Model {
    schema: Rc<Schema>,
    state: RefCell<RecordState>,
    pending: RefCell<Option<RecordState>>,
    phase: Cell<ParsePhase>,
    resolving: RefCell<Vec<String>>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("schema", &self.schema.name())
            .field("phase", &self.phase.get())
            .field("raw", &self.state.borrow().raw())
            .finish()
    }
}

impl Model {
    /// An unparsed instance: no attributes and no cache key.
    pub fn new(schema: &Rc<Schema>) -> Self {
        Self {
            schema: Rc::clone(schema),
            state: RefCell::new(RecordState::empty()),
            pending: RefCell::new(None),
            phase: Cell::new(ParsePhase::Idle),
            resolving: RefCell::new(Vec::new()),
        }
    }

    /// Construct and parse in one step.
    pub fn parse_new(schema: &Rc<Schema>, input: impl IntoRecord) -> Result<Self> {
        let model = Self::new(schema);
        model.parse(input)?;
        Ok(model)
    }

    pub fn schema(&self) -> &Rc<Schema> {
        &self.schema
    }

    pub fn is_instance_of(&self, schema: &Rc<Schema>) -> bool {
        Rc::ptr_eq(&self.schema, schema)
    }

    pub fn phase(&self) -> ParsePhase {
        self.phase.get()
    }

    /// Merge `input` over the current record and run the parse lifecycle.
    ///
    /// A failing before hook leaves the previously committed state in place.
    /// A failing after hook is reported, but the commit stands.
    pub fn parse(&self, input: impl IntoRecord) -> Result<&Self> {
        if self.phase.get() == ParsePhase::Snapshotting {
            return Err(Error::Lifecycle(format!(
                "{} is already being parsed",
                self.schema.name()
            )));
        }
        let input = input.into_record()?;
        let previous_phase = self.phase.get();

        let merged = self.state.borrow().merged_with(input);
        *self.pending.borrow_mut() = Some(RecordState::pending(merged));
        self.phase.set(ParsePhase::Snapshotting);

        for hook in self.schema.before_parse_hooks() {
            if let Err(err) = hook(self) {
                debug!(schema = self.schema.name(), error = %err, "before_parse hook aborted parse");
                self.pending.borrow_mut().take();
                self.phase.set(previous_phase);
                return Err(err);
            }
        }

        let pending = self.pending.borrow_mut().take().unwrap_or_default();
        let committed = match RecordState::commit(pending.into_raw(), self.schema.config()) {
            Ok(committed) => committed,
            Err(err) => {
                self.phase.set(previous_phase);
                return Err(err);
            }
        };
        debug!(
            schema = self.schema.name(),
            keys = committed.raw().len(),
            identity = committed.identity().unwrap_or_default(),
            "committed record"
        );
        *self.state.borrow_mut() = committed;
        self.phase.set(ParsePhase::Committed);

        for hook in self.schema.after_parse_hooks() {
            hook(self)?;
        }
        Ok(self)
    }

    /// Same as [`Model::parse`]: earlier keys survive unless `input` overrides them.
    pub fn merge_attributes(&self, input: impl IntoRecord) -> Result<&Self> {
        self.parse(input)
    }

    /// Resolve a declared attribute, memoizing the cast result.
    pub fn get(&self, alias: &str) -> Result<Value> {
        let descriptor = self
            .schema
            .descriptor(alias)
            .ok_or_else(|| Error::UnknownAttribute(alias.to_string()))?;

        if self.resolving.borrow().iter().any(|a| a == alias) {
            return Err(Error::CyclicLookup(alias.to_string()));
        }
        self.resolving.borrow_mut().push(alias.to_string());
        let result = resolver::resolve(self, descriptor);
        self.resolving.borrow_mut().pop();
        result
    }

    /// Set a declared attribute's value directly, skipping search and cast.
    /// The raw record is not changed.
    pub fn set(&self, alias: &str, value: impl Into<Value>) -> Result<()> {
        if !self.schema.registry().contains(alias) {
            return Err(Error::UnknownAttribute(alias.to_string()));
        }
        self.memoize(alias, value.into());
        Ok(())
    }

    /// Add a raw key to the record being parsed. Only valid in before hooks.
    pub fn inject(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        match self.pending.borrow_mut().as_mut() {
            Some(pending) => {
                pending.inject(key.into(), value.into());
                Ok(())
            }
            None => Err(Error::Lifecycle(
                "inject is only available in before_parse hooks".to_string(),
            )),
        }
    }

    /// The committed raw record, empty if never parsed.
    pub fn attributes(&self) -> Record {
        Record::clone(self.state.borrow().raw())
    }

    /// Identity digest of the committed raw record.
    pub fn cache_key(&self) -> Option<String> {
        self.state.borrow().identity().map(str::to_string)
    }

    /// Every declared attribute, resolved, as JSON.
    pub fn to_resolved_json(&self) -> Result<serde_json::Value> {
        let mut out = serde_json::Map::new();
        for alias in self.schema.aliases() {
            out.insert(alias.to_string(), self.get(alias)?.to_resolved_json()?);
        }
        Ok(serde_json::Value::Object(out))
    }

    pub(crate) fn cached(&self, alias: &str) -> Option<Value> {
        self.with_active(|state| state.cached(alias).cloned())
    }

    pub(crate) fn memoize(&self, alias: &str, value: Value) {
        self.with_active(|state| state.memoize(alias, value))
    }

    /// The record resolution reads: pending while snapshotting, else committed.
    pub(crate) fn active_raw(&self) -> Rc<Record> {
        self.with_active(|state| Rc::clone(state.raw()))
    }

    fn with_active<R>(&self, f: impl FnOnce(&mut RecordState) -> R) -> R {
        let mut pending = self.pending.borrow_mut();
        match pending.as_mut() {
            Some(state) => f(state),
            None => f(&mut *self.state.borrow_mut()),
        }
    }
}

/// A Rust type backed by a schema.
///
/// Implementors build their schema once (a `thread_local!` works well, since
/// schemas are `Rc`-shared) and wrap the [`Model`] it parses into.
pub trait Declarative: Sized {
    fn schema() -> Rc<Schema>;

    fn from_model(model: Model) -> Self;

    fn model(&self) -> &Model;

    fn parse(input: impl IntoRecord) -> Result<Self> {
        Model::parse_new(&Self::schema(), input).map(Self::from_model)
    }

    fn get(&self, alias: &str) -> Result<Value> {
        self.model().get(alias)
    }

    fn set(&self, alias: &str, value: impl Into<Value>) -> Result<()> {
        self.model().set(alias, value)
    }

    fn attributes(&self) -> Record {
        self.model().attributes()
    }

    fn cache_key(&self) -> Option<String> {
        self.model().cache_key()
    }
}
