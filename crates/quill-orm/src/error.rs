//! Error types for the ORM.

use quill_sql_core::{BuildError, TransportError};
use thiserror::Error;

/// ORM-specific errors.
#[derive(Debug, Error)]
pub enum OrmError {
    /// The statement could not be rendered.
    #[error("query error: {0}")]
    Build(#[from] BuildError),

    /// The transport rejected the statement.
    #[error("database error: {0}")]
    Transport(#[from] TransportError),

    /// No record found matching the query.
    #[error("object not found")]
    NotFound,

    /// The relation kind cannot perform the operation.
    #[error("relation not support: {kind} cannot {operation}")]
    UnsupportedRelation {
        /// Relation kind, e.g. `MorphMany`.
        kind: &'static str,
        /// Operation, e.g. `has`.
        operation: &'static str,
    },

    /// The model declares no relation with this name.
    #[error("unknown relation `{relation}` on {model}")]
    UnknownRelation {
        /// Owner model name.
        model: &'static str,
        /// Requested relation name.
        relation: String,
    },

    /// A bound attribute would overwrite an owner attribute.
    #[error("bind attr has exists: {0}")]
    BindConflict(String),

    /// A key column needed by the operation is unset.
    #[error("missing key: {0}")]
    MissingKey(String),
}

/// Result type alias for ORM operations.
pub type Result<T> = std::result::Result<T, OrmError>;
