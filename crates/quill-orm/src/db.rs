//! Connection handle pairing a dialect with a transport.

use std::collections::HashMap;
use std::fmt;

use quill_sql_core::{
    Delete, Dialect, Insert, Query, QueryPlan, Row, SchemaIntrospection, SqlValue, Transport,
    Update, AGGREGATE_ALIAS,
};
use tracing::{debug, warn};

use crate::error::Result;

/// A database handle: renders plans with its dialect and runs them on its
/// transport.
///
/// Statements run synchronously, one at a time, in program order.
pub struct Db {
    dialect: Box<dyn Dialect>,
    transport: Box<dyn Transport>,
    fields: HashMap<String, Vec<String>>,
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("dialect", &self.dialect.name())
            .field("strict_tables", &self.fields.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Db {
    /// Creates a handle.
    pub fn new(dialect: impl Dialect + 'static, transport: impl Transport + 'static) -> Self {
        Self {
            dialect: Box::new(dialect),
            transport: Box::new(transport),
            fields: HashMap::new(),
        }
    }

    /// Registers the known columns of `table`.
    ///
    /// SELECTs whose primary table is registered validate every column
    /// reference against the list.
    #[must_use]
    pub fn with_fields(mut self, table: &str, fields: &[&str]) -> Self {
        self.fields.insert(
            table.to_string(),
            fields.iter().map(|f| (*f).to_string()).collect(),
        );
        self
    }

    /// Registers the columns of `table` as reported by `schema`.
    ///
    /// # Errors
    ///
    /// Any introspection failure.
    pub fn load_fields(&mut self, schema: &dyn SchemaIntrospection, table: &str) -> Result<()> {
        let names = schema.field_names(table)?;
        debug!(table, fields = names.len(), "Loaded table fields");
        self.fields.insert(table.to_string(), names);
        Ok(())
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    fn prepare(&self, query: &Query) -> QueryPlan {
        let mut plan = query.plan().clone();
        if plan.known_fields.is_none() {
            if let Some(fields) = plan.table_name().and_then(|t| self.fields.get(t)) {
                plan.known_fields = Some(fields.clone());
            }
        }
        plan
    }

    /// Runs a SELECT and returns every row.
    ///
    /// # Errors
    ///
    /// Rendering or transport failure.
    pub fn select(&self, query: &Query) -> Result<Vec<Row>> {
        let (sql, params) = self.dialect.render_select(&self.prepare(query))?;
        debug!(sql = %sql, params = params.len(), "Executing SQL");
        Ok(self.transport.query(&sql, &params)?)
    }

    /// Runs a SELECT limited to one row.
    ///
    /// # Errors
    ///
    /// Rendering or transport failure.
    pub fn find(&self, query: &Query) -> Result<Option<Row>> {
        let query = query.clone().limit(1);
        Ok(self.select(&query)?.into_iter().next())
    }

    /// Runs an aggregate query and returns its value.
    ///
    /// # Errors
    ///
    /// Rendering or transport failure.
    pub fn aggregate(&self, query: &Query) -> Result<Option<SqlValue>> {
        let row = self.find(query)?;
        Ok(row.and_then(|mut row| {
            row.shift_remove(AGGREGATE_ALIAS)
                .or_else(|| row.into_values().next())
        }))
    }

    /// Renders a SELECT with values inlined, without running it.
    ///
    /// # Errors
    ///
    /// Rendering failure.
    pub fn fetch_sql(&self, query: &Query) -> Result<String> {
        Ok(self.dialect.render_inline(&self.prepare(query))?)
    }

    /// Runs an INSERT and returns the affected row count.
    ///
    /// # Errors
    ///
    /// Rendering or transport failure.
    pub fn insert(&self, insert: &Insert) -> Result<u64> {
        let (sql, params) = self.dialect.render_insert(insert.plan())?;
        self.execute(&sql, &params)
    }

    /// Runs an UPDATE and returns the affected row count.
    ///
    /// # Errors
    ///
    /// Rendering or transport failure.
    pub fn update(&self, update: &Update) -> Result<u64> {
        let (sql, params) = self.dialect.render_update(update.plan())?;
        self.execute(&sql, &params)
    }

    /// Runs a DELETE and returns the affected row count.
    ///
    /// # Errors
    ///
    /// Rendering or transport failure.
    pub fn delete(&self, delete: &Delete) -> Result<u64> {
        let (sql, params) = self.dialect.render_delete(delete.plan())?;
        self.execute(&sql, &params)
    }

    /// Executes a raw statement.
    ///
    /// # Errors
    ///
    /// Transport failure.
    pub fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        debug!(sql = %sql, params = params.len(), "Executing SQL");
        Ok(self.transport.execute(sql, params)?)
    }

    /// Returns the id generated by the last INSERT.
    ///
    /// # Errors
    ///
    /// Transport failure.
    pub fn last_insert_id(&self) -> Result<Option<SqlValue>> {
        Ok(self.transport.last_insert_id()?)
    }

    /// Runs `work` inside a local transaction.
    ///
    /// Commits when `work` succeeds and rolls back when it fails; the
    /// original error is returned even if the rollback fails too.
    ///
    /// # Errors
    ///
    /// Whatever `work` returns, or a failure to begin or commit.
    pub fn transaction<T>(&self, work: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.transport.begin()?;
        match work(self) {
            Ok(value) => {
                self.transport.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.transport.rollback() {
                    warn!(error = %rollback, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Starts a distributed transaction branch.
    ///
    /// # Errors
    ///
    /// Transport failure, or a transport without distributed support.
    pub fn start_xa(&self, xid: &str) -> Result<()> {
        Ok(self.transport.start_distributed(xid)?)
    }

    /// Ends and prepares a distributed transaction branch.
    ///
    /// # Errors
    ///
    /// Transport failure, or a transport without distributed support.
    pub fn prepare_xa(&self, xid: &str) -> Result<()> {
        Ok(self.transport.prepare_distributed(xid)?)
    }

    /// Commits a prepared distributed transaction branch.
    ///
    /// # Errors
    ///
    /// Transport failure, or a transport without distributed support.
    pub fn commit_xa(&self, xid: &str) -> Result<()> {
        Ok(self.transport.commit_distributed(xid)?)
    }

    /// Rolls back a distributed transaction branch.
    ///
    /// # Errors
    ///
    /// Transport failure, or a transport without distributed support.
    pub fn rollback_xa(&self, xid: &str) -> Result<()> {
        Ok(self.transport.rollback_distributed(xid)?)
    }
}
