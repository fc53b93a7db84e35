//! Error types for resource store operations.
//!
//! Provides a unified error type covering all failure modes: I/O,
//! serialization, configuration, filters and resource lookups.

use thiserror::Error;

use crate::models::ResourceKind;

/// Errors that can occur while reading or changing resources.
#[derive(Debug, Error)]
pub enum DbError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A `-filter` pattern is not a valid regular expression.
    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    /// No resource of this kind has the given name.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: ResourceKind, name: String },

    /// A resource of this kind already uses the name.
    #[error("{kind} '{name}' already exists")]
    Duplicate { kind: ResourceKind, name: String },

    /// A field value could not be interpreted.
    #[error("invalid value '{value}' for {field}")]
    InvalidValue { field: &'static str, value: String },
}

/// Convenience alias for results with [`DbError`].
pub type Result<T> = std::result::Result<T, DbError>;
