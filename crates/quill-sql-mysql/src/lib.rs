//! # quill-sql-mysql
//!
//! MySQL support for `quill-sql-core`.
//!
//! # How MySQL differs from other dialects
//!
//! - **Identifier quoting**: MySQL quotes identifiers with backticks
//!   (`` ` ``). See [identifiers].
//! - **[LIMIT]**: pagination is `LIMIT count` or `LIMIT offset,count`.
//! - **[Locking reads]**: `FOR UPDATE` for exclusive locks and
//!   `LOCK IN SHARE MODE` for shared locks.
//! - **[JSON]**: nested field access `profile->address->city` renders as
//!   ``json_extract(`profile`, '$.address.city')``.
//! - **Random order**: `rand()`.
//! - **[XA transactions]**: two-phase commit through `XA START` /
//!   `XA END` / `XA PREPARE` / `XA COMMIT` / `XA ROLLBACK`, provided by
//!   [`XaTransport`].
//! - **Introspection**: [`MysqlSchema`] reads `SHOW COLUMNS` and
//!   `SHOW TABLES`.
//!
//! With the `sqlx` feature, `SqlxTransport` executes statements on a real
//! server.
//!
//! [identifiers]: https://dev.mysql.com/doc/refman/8.0/en/identifiers.html
//! [LIMIT]: https://dev.mysql.com/doc/refman/8.0/en/select.html
//! [Locking reads]: https://dev.mysql.com/doc/refman/8.0/en/innodb-locking-reads.html
//! [JSON]: https://dev.mysql.com/doc/refman/8.0/en/json-search-functions.html
//! [XA transactions]: https://dev.mysql.com/doc/refman/8.0/en/xa-statements.html
//!
//! ## Example
//!
//! ```rust
//! use quill_sql_core::{Dialect, Query};
//! use quill_sql_mysql::MysqlDialect;
//!
//! let (sql, params) = MysqlDialect
//!     .render_select(
//!         Query::table("users")
//!             .where_eq("status", 1)
//!             .limit_offset(10, 5)
//!             .plan(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(sql, "SELECT * FROM `users` WHERE `status` = ? LIMIT 10,5");
//! assert_eq!(params.len(), 1);
//! ```

mod config;
mod dialect;
mod schema;
#[cfg(feature = "sqlx")]
mod sqlx_transport;
mod xa;

pub use config::MysqlConfig;
pub use dialect::MysqlDialect;
pub use schema::{parse_column, MysqlSchema};
#[cfg(feature = "sqlx")]
pub use sqlx_transport::SqlxTransport;
pub use xa::XaTransport;
