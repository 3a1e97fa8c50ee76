//! # Recordmap Architecture
//!
//! Recordmap maps **someone else's records** onto attributes you name yourself.
//! You declare, per attribute, which keys to look for, what to call the result,
//! where else to search and how to cast it. Records are parsed as they come and
//! attributes are resolved lazily, on first access.
//!
//! ```ignore
//! let runner = Schema::builder("Runner")
//!     .attribute("runnerName", AttributeOptions::new().alias("name"))
//!     .build()?;
//!
//! let phar_lap = Model::parse_new(&runner, json!({"runnerName": "Phar Lap"}))?;
//! assert_eq!(phar_lap.get("name")?, Value::from("Phar Lap"));
//! ```
//!
//! ## The Three Phases
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Declaration (schema.rs, attributes/)                       │
//! │  - SchemaBuilder collects descriptors and parse hooks       │
//! │  - Cast strategy picked once per attribute                  │
//! │  - Frozen into an Rc<Schema>, shared by every instance      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Parse (model.rs, state.rs)                                 │
//! │  - Merge input over the previous record                     │
//! │  - before hooks → commit + identity digest → after hooks    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Access (resolver.rs)                                       │
//! │  - Memo → alias slot → within/try/top-level key search      │
//! │  - Cast, then memoize until the next parse                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Absence Is Not an Error
//!
//! A value that is nowhere to be found resolves to `Value::Null`. Every cast
//! accepts it: primitives and models keep it, collections turn it into an
//! empty list, custom casts decide for themselves. Errors are reserved for
//! declarations that cannot work and for values that cannot be coerced.
//!
//! ## Module Overview
//!
//! - [`attributes`]: Descriptors, cast strategies and the per-schema registry
//! - [`schema`]: Schemas and their builder, parse hooks
//! - [`model`]: Parsed instances, the parse lifecycle, get/set
//! - [`state`]: Raw record snapshots, identity digests and the resolved memo
//! - [`value`]: The dynamic value type shared by input and output
//! - [`catalog`]: Schemas declared in JSON documents
//! - [`config`]: Engine configuration
//! - [`error`]: Error types

pub mod attributes;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
mod resolver;
pub mod schema;
pub mod state;
pub mod value;

pub use attributes::{AttributeOptions, Primitive};
pub use error::{Error, Result};
pub use model::{Declarative, Model, ParsePhase};
pub use schema::Schema;
pub use value::{IntoRecord, Record, Value};
