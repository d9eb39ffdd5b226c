//! Error types for the object model and runtime configuration.

use thiserror::Error;

use crate::object::PropertyKey;

/// Result type for object operations.
pub type ObjectResult<T> = Result<T, ObjectError>;

/// Errors raised by the standard object operations.
///
/// The reactive layer never produces these on its own. They come from the
/// underlying read/write primitives and propagate unchanged through traps.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjectError {
    /// Write or delete on a frozen object.
    #[error("cannot modify property `{key}` of a frozen object")]
    Frozen { key: PropertyKey },

    /// A sequence `length` was assigned something other than an integral
    /// number between `0` and `MAX_LENGTH`.
    #[error("invalid sequence length: {value}")]
    InvalidLength { value: String },

    /// A sequence operation was applied to a record.
    #[error("operation requires a sequence")]
    NotASequence,

    /// JSON export reached an object that is already on the current path.
    #[error("cannot serialize a cyclic object graph")]
    Cycle,

    /// JSON export nested deeper than the export limit.
    #[error("object graph nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Errors that can occur while loading a runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
