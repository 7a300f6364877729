//! XA (two-phase commit) transactions.

use quill_sql_core::{Row, SqlValue, Transport, TransportResult};
use tracing::info;

/// Adds MySQL XA statements to any transport.
///
/// Ordinary statements and local transactions are forwarded unchanged.
#[derive(Debug, Clone)]
pub struct XaTransport<T> {
    inner: T,
}

impl<T> XaTransport<T> {
    /// Wraps a transport.
    pub const fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Returns the wrapped transport.
    pub const fn inner(&self) -> &T {
        &self.inner
    }

    /// Unwraps the transport.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

fn quote_xid(xid: &str) -> String {
    format!("'{}'", xid.replace('\'', "''"))
}

impl<T: Transport> XaTransport<T> {
    fn xa(&self, verb: &str, xid: &str) -> TransportResult<()> {
        self.inner
            .execute(&format!("XA {verb} {}", quote_xid(xid)), &[])
            .map(|_| ())
    }
}

impl<T: Transport> Transport for XaTransport<T> {
    fn query(&self, sql: &str, params: &[SqlValue]) -> TransportResult<Vec<Row>> {
        self.inner.query(sql, params)
    }

    fn execute(&self, sql: &str, params: &[SqlValue]) -> TransportResult<u64> {
        self.inner.execute(sql, params)
    }

    fn last_insert_id(&self) -> TransportResult<Option<SqlValue>> {
        self.inner.last_insert_id()
    }

    fn begin(&self) -> TransportResult<()> {
        self.inner.begin()
    }

    fn commit(&self) -> TransportResult<()> {
        self.inner.commit()
    }

    fn rollback(&self) -> TransportResult<()> {
        self.inner.rollback()
    }

    fn start_distributed(&self, xid: &str) -> TransportResult<()> {
        info!(xid, "Starting XA transaction");
        self.xa("START", xid)
    }

    fn prepare_distributed(&self, xid: &str) -> TransportResult<()> {
        info!(xid, "Preparing XA transaction");
        self.xa("END", xid)?;
        self.xa("PREPARE", xid)
    }

    fn commit_distributed(&self, xid: &str) -> TransportResult<()> {
        info!(xid, "Committing XA transaction");
        self.xa("COMMIT", xid)
    }

    fn rollback_distributed(&self, xid: &str) -> TransportResult<()> {
        info!(xid, "Rolling back XA transaction");
        self.xa("ROLLBACK", xid)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        statements: RefCell<Vec<String>>,
    }

    impl Transport for Recorder {
        fn query(&self, sql: &str, _params: &[SqlValue]) -> TransportResult<Vec<Row>> {
            self.statements.borrow_mut().push(sql.to_string());
            Ok(vec![])
        }

        fn execute(&self, sql: &str, _params: &[SqlValue]) -> TransportResult<u64> {
            self.statements.borrow_mut().push(sql.to_string());
            Ok(0)
        }

        fn last_insert_id(&self) -> TransportResult<Option<SqlValue>> {
            Ok(None)
        }
    }

    #[test]
    fn test_two_phase_statements() {
        let xa = XaTransport::new(Recorder::default());
        xa.start_distributed("tx-1").unwrap();
        xa.execute("UPDATE t SET a = 1 WHERE id = 1", &[]).unwrap();
        xa.prepare_distributed("tx-1").unwrap();
        xa.commit_distributed("tx-1").unwrap();
        assert_eq!(
            *xa.inner().statements.borrow(),
            vec![
                "XA START 'tx-1'",
                "UPDATE t SET a = 1 WHERE id = 1",
                "XA END 'tx-1'",
                "XA PREPARE 'tx-1'",
                "XA COMMIT 'tx-1'",
            ]
        );
    }

    #[test]
    fn test_xid_quotes_are_escaped() {
        let xa = XaTransport::new(Recorder::default());
        xa.rollback_distributed("it's").unwrap();
        assert_eq!(xa.into_inner().statements.into_inner(), vec!["XA ROLLBACK 'it''s'"]);
    }

    #[test]
    fn test_plain_transport_refuses_distributed() {
        assert!(Recorder::default().start_distributed("x").is_err());
    }
}
