use crate::attributes::Primitive;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Cannot coerce {value} into {target}")]
    Coercion { target: Primitive, value: String },

    #[error("Expected a record for {expected}, found {found}")]
    NotARecord { expected: String, found: &'static str },

    #[error("Expected a collection of {expected}, found {found}")]
    NotACollection { expected: String, found: &'static str },

    #[error("Cyclic lookup while resolving: {0}")]
    CyclicLookup(String),

    #[error("Parse hook failed: {0}")]
    Hook(String),

    #[error("Cast failed: {0}")]
    Cast(String),

    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for hook authors reporting a failed parse hook.
    pub fn hook(message: impl Into<String>) -> Self {
        Error::Hook(message.into())
    }

    /// Shorthand for custom cast functions rejecting a value.
    pub fn cast(message: impl Into<String>) -> Self {
        Error::Cast(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
