//! # Attribute declarations
//!
//! Everything a schema knows about its attributes, fixed at declaration time:
//!
//! - **Descriptors** ([`AttributeDescriptor`]): source keys, alias, lookup mode, cast
//! - **Casts** ([`CastStrategy`]): identity, primitive coercion, nested model,
//!   nested collection, or a custom function
//! - **Registry** ([`AttributeRegistry`]): alias → descriptor for one schema
//!
//! ## Lookup modes
//!
//! | Lookup | Declared with | Searched |
//! |--------|---------------|----------|
//! | `TopLevel` | nothing | the record itself |
//! | `Within(root)` | `within` | only the resolved value of `root` |
//! | `Try(root)` | `try_in` | `root` if it resolves, else the record |
//!
//! In every mode the record slot named after the alias is checked first.

mod cast;
mod descriptor;
mod registry;

pub use cast::{CastStrategy, CustomCast, Primitive};
pub use descriptor::{default_alias, AttributeDescriptor, AttributeOptions, Lookup, SourceKeys};
pub use registry::AttributeRegistry;
