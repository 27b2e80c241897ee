//! Error types for the gusd library.
//!
//! Almost every failure in this crate is per-attribute and non-fatal: the
//! caller logs it and moves on to the next attribute or prim. The variants
//! carry enough context (attribute path, type name, sizes) to make the
//! resulting warning actionable on its own.

use thiserror::Error;

/// Main error type for gusd operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Held value type is outside the supported closed set
    #[error("Unsupported type '{type_name}' for attribute {path}")]
    UnsupportedType { path: String, type_name: String },

    /// Array length is not a multiple of the primvar element size
    #[error(
        "Array length {len} of {path} is not a multiple of element size {element_size}"
    )]
    ElementSize {
        path: String,
        len: usize,
        element_size: usize,
    },

    /// Too few entries for the target interpolation domain
    #[error("{name}: {domain} data has {actual} entries, expected at least {expected}")]
    Cardinality {
        name: String,
        domain: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Subset partition metadata of the wrong type
    #[error("Subset {path}: partitionValue of type '{actual}' does not match family '{family}'")]
    SubsetMetadata {
        path: String,
        family: String,
        actual: String,
    },

    /// Subset restricted to an element type other than faces
    #[error("Subset {path}: unsupported element type '{element_type}'")]
    SubsetElementType { path: String, element_type: String },

    /// No reader or writer registered for a schema type
    #[error("No handler registered for type '{0}'")]
    UnknownSchema(String),

    /// Type mismatch when converting data
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Failure reported by the stage backend
    #[error("Stage error: {0}")]
    Stage(String),

    /// Invalid options
    #[error("Invalid config: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a stage backend error.
    pub fn stage(msg: impl Into<String>) -> Self {
        Self::Stage(msg.into())
    }

    /// Create an unsupported type error.
    pub fn unsupported(path: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            path: path.into(),
            type_name: type_name.into(),
        }
    }
}

/// Result type alias for gusd operations.
pub type Result<T> = std::result::Result<T, Error>;
