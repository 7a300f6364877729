//! Render-time errors.

use thiserror::Error;

/// Errors raised while turning a plan into SQL.
///
/// Every variant is raised at render time, before anything reaches the
/// transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The dialect cannot express the requested construct.
    #[error("{dialect} does not support {feature}")]
    Unsupported {
        /// Dialect name.
        dialect: &'static str,
        /// Construct that was requested.
        feature: String,
    },

    /// Strict field validation rejected a column reference.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The plan is incomplete or contradictory.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl BuildError {
    /// Creates an [`BuildError::Unsupported`] error.
    #[must_use]
    pub fn unsupported(dialect: &'static str, feature: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect,
            feature: feature.into(),
        }
    }
}

/// Result type for rendering.
pub type Result<T> = std::result::Result<T, BuildError>;
