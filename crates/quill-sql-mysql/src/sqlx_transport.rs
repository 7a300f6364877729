//! Blocking [`Transport`] over an sqlx MySQL connection.

use std::cell::{Cell, RefCell};

use quill_sql_core::{Row, SqlValue, Transport, TransportError, TransportResult};
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, ConnectOptions, Row as _, ValueRef};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::MysqlConfig;

/// A single MySQL connection driven by a private Tokio runtime.
///
/// Every call blocks on the runtime. One connection backs the whole
/// transport, so `BEGIN` / `COMMIT` and XA statements reach the same
/// session.
pub struct SqlxTransport {
    runtime: Runtime,
    connection: RefCell<MySqlConnection>,
    last_insert_id: Cell<u64>,
}

fn driver_error(err: impl std::error::Error + Send + Sync + 'static) -> TransportError {
    TransportError::Other(Box::new(err))
}

impl MysqlConfig {
    /// Builds sqlx connect options from this configuration.
    #[must_use]
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.hostname)
            .username(&self.username)
            .database(&self.database);
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        if let Some(port) = self.hostport {
            options = options.port(port);
        }
        if let Some(socket) = self.socket.as_deref().filter(|s| !s.is_empty()) {
            options = options.socket(socket);
        }
        if let Some(charset) = self.charset.as_deref().filter(|c| !c.is_empty()) {
            options = options.charset(charset);
        }
        options
    }
}

impl SqlxTransport {
    /// Opens a connection.
    ///
    /// # Errors
    ///
    /// Fails if the runtime cannot start or the server refuses the connection.
    pub fn connect(config: &MysqlConfig) -> TransportResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(driver_error)?;
        let connection = runtime
            .block_on(config.connect_options().connect())
            .map_err(driver_error)?;
        debug!(host = %config.hostname, database = %config.database, "Connected to MySQL");
        Ok(Self {
            runtime,
            connection: RefCell::new(connection),
            last_insert_id: Cell::new(0),
        })
    }
}

/// Binds a SqlValue parameter to a raw query.
fn bind_param<'q>(
    query: sqlx::query::Query<'q, sqlx::MySql, MySqlArguments>,
    value: &SqlValue,
) -> sqlx::query::Query<'q, sqlx::MySql, MySqlArguments> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Blob(b) => query.bind(b.clone()),
        SqlValue::Json(v) => query.bind(v.to_string()),
    }
}

/// Decodes one column, trying the widest Rust types first.
fn decode(row: &MySqlRow, index: usize) -> SqlValue {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return SqlValue::Null,
        Ok(_) => {}
        Err(err) => {
            warn!(index, error = %err, "Undecodable column");
            return SqlValue::Null;
        }
    }
    if let Ok(n) = row.try_get::<i64, _>(index) {
        return SqlValue::Int(n);
    }
    if let Ok(n) = row.try_get::<u64, _>(index) {
        return i64::try_from(n).map_or_else(|_| SqlValue::Text(n.to_string()), SqlValue::Int);
    }
    if let Ok(f) = row.try_get::<f64, _>(index) {
        return SqlValue::Float(f);
    }
    if let Ok(s) = row.try_get::<String, _>(index) {
        return SqlValue::Text(s);
    }
    match row.try_get::<Vec<u8>, _>(index) {
        Ok(bytes) => String::from_utf8(bytes).map_or_else(|e| SqlValue::Blob(e.into_bytes()), SqlValue::Text),
        Err(err) => {
            warn!(index, error = %err, "Undecodable column");
            SqlValue::Null
        }
    }
}

fn to_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .map(|column| (column.name().to_string(), decode(row, column.ordinal())))
        .collect()
}

impl Transport for SqlxTransport {
    fn query(&self, sql: &str, params: &[SqlValue]) -> TransportResult<Vec<Row>> {
        let query = params
            .iter()
            .fold(sqlx::query(sql), |query, param| bind_param(query, param));
        let mut connection = self.connection.borrow_mut();
        let rows = self
            .runtime
            .block_on(query.fetch_all(&mut *connection))
            .map_err(driver_error)?;
        Ok(rows.iter().map(to_row).collect())
    }

    fn execute(&self, sql: &str, params: &[SqlValue]) -> TransportResult<u64> {
        let query = params
            .iter()
            .fold(sqlx::query(sql), |query, param| bind_param(query, param));
        let mut connection = self.connection.borrow_mut();
        let result = self
            .runtime
            .block_on(query.execute(&mut *connection))
            .map_err(driver_error)?;
        self.last_insert_id.set(result.last_insert_id());
        Ok(result.rows_affected())
    }

    fn last_insert_id(&self) -> TransportResult<Option<SqlValue>> {
        Ok(match self.last_insert_id.get() {
            0 => None,
            id => Some(i64::try_from(id).map_or_else(|_| SqlValue::Text(id.to_string()), SqlValue::Int)),
        })
    }
}
