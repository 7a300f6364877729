//! The execution boundary.
//!
//! Nothing in this workspace talks to a database server directly. Rendered
//! SQL and its parameters are handed to a [`Transport`], which returns rows
//! as ordered column maps. Errors cross this boundary as [`TransportError`]
//! and are never retried.

use indexmap::IndexMap;
use thiserror::Error;

use crate::builder::SqlValue;

/// A fetched row: column name to value, in select order.
pub type Row = IndexMap<String, SqlValue>;

/// Errors reported by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Driver or server message.
    #[error("{0}")]
    Message(String),

    /// The transport does not implement an operation.
    #[error("{operation} is not supported by this transport")]
    Unsupported {
        /// Operation name.
        operation: &'static str,
    },

    /// Underlying driver error.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for transport calls.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Executes SQL against a database.
///
/// Calls block until the server answers. Transaction methods default to
/// plain `BEGIN` / `COMMIT` / `ROLLBACK` statements; the distributed
/// (two-phase) methods are unsupported unless overridden.
pub trait Transport {
    /// Runs a statement returning rows.
    ///
    /// # Errors
    ///
    /// Any driver or server failure.
    fn query(&self, sql: &str, params: &[SqlValue]) -> TransportResult<Vec<Row>>;

    /// Runs a statement returning the number of affected rows.
    ///
    /// # Errors
    ///
    /// Any driver or server failure.
    fn execute(&self, sql: &str, params: &[SqlValue]) -> TransportResult<u64>;

    /// Returns the key generated by the last INSERT, if any.
    ///
    /// # Errors
    ///
    /// Any driver or server failure.
    fn last_insert_id(&self) -> TransportResult<Option<SqlValue>>;

    /// Starts a transaction.
    ///
    /// # Errors
    ///
    /// Any driver or server failure.
    fn begin(&self) -> TransportResult<()> {
        self.execute("BEGIN", &[]).map(|_| ())
    }

    /// Commits the current transaction.
    ///
    /// # Errors
    ///
    /// Any driver or server failure.
    fn commit(&self) -> TransportResult<()> {
        self.execute("COMMIT", &[]).map(|_| ())
    }

    /// Rolls back the current transaction.
    ///
    /// # Errors
    ///
    /// Any driver or server failure.
    fn rollback(&self) -> TransportResult<()> {
        self.execute("ROLLBACK", &[]).map(|_| ())
    }

    /// Starts a distributed transaction branch.
    ///
    /// # Errors
    ///
    /// Unsupported by default.
    fn start_distributed(&self, _xid: &str) -> TransportResult<()> {
        Err(TransportError::Unsupported {
            operation: "start_distributed",
        })
    }

    /// Ends and prepares a distributed transaction branch.
    ///
    /// # Errors
    ///
    /// Unsupported by default.
    fn prepare_distributed(&self, _xid: &str) -> TransportResult<()> {
        Err(TransportError::Unsupported {
            operation: "prepare_distributed",
        })
    }

    /// Commits a prepared distributed transaction branch.
    ///
    /// # Errors
    ///
    /// Unsupported by default.
    fn commit_distributed(&self, _xid: &str) -> TransportResult<()> {
        Err(TransportError::Unsupported {
            operation: "commit_distributed",
        })
    }

    /// Rolls back a distributed transaction branch.
    ///
    /// # Errors
    ///
    /// Unsupported by default.
    fn rollback_distributed(&self, _xid: &str) -> TransportResult<()> {
        Err(TransportError::Unsupported {
            operation: "rollback_distributed",
        })
    }
}
