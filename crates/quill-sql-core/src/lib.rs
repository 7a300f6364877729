//! # quill-sql-core
//!
//! Dialect-neutral query plans and parameterized SQL rendering.
//!
//! This crate provides:
//! - A fluent [`Query`] builder producing an immutable [`QueryPlan`]
//! - INSERT / UPDATE / DELETE builders
//! - A [`Dialect`] trait whose hooks (key parsing, pagination, locking,
//!   random order, placeholders) render plans into SQL text and parameters
//! - The [`Transport`] and [`SchemaIntrospection`] interfaces used to
//!   execute statements
//!
//! ## Building and rendering
//!
//! ```rust
//! use quill_sql_core::{Dialect, GenericDialect, Query, SqlValue};
//!
//! let query = Query::table("users")
//!     .where_eq("status", 1)
//!     .order("-id")
//!     .limit(10);
//!
//! let (sql, params) = GenericDialect.render_select(query.plan()).unwrap();
//! assert_eq!(
//!     sql,
//!     r#"SELECT * FROM "users" WHERE "status" = ? ORDER BY "id" DESC LIMIT 10"#
//! );
//! assert_eq!(params, vec![SqlValue::Int(1)]);
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Values are always bound as parameters. Only [`Raw`] fragments reach the
//! SQL text verbatim, and they carry their own parameters:
//!
//! ```rust
//! use quill_sql_core::{raw, Dialect, GenericDialect, Query};
//!
//! let user_input = "'; DROP TABLE users; --";
//! let (sql, params) = GenericDialect
//!     .render_select(
//!         Query::table("users")
//!             .where_eq("name", user_input)
//!             .where_raw(raw("score > ?").with(10))
//!             .plan(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(sql, r#"SELECT * FROM "users" WHERE "name" = ? AND score > ?"#);
//! assert_eq!(params.len(), 2);
//! ```

pub mod builder;
pub mod dialect;
pub mod error;
pub mod plan;
pub mod schema;
pub mod transport;

pub use builder::{
    raw, CompareOp, Condition, Delete, Insert, KeyValue, Logic, Operand, Predicate, Query, Raw,
    SqlValue, ToSqlValue, Update,
};
pub use dialect::{Dialect, GenericDialect, KeyContext};
pub use error::{BuildError, Result};
pub use plan::{
    Aggregate, AggregateFn, JoinType, Limit, Lock, OrderBy, QueryPlan, TableRef, AGGREGATE_ALIAS,
};
pub use schema::{ColumnInfo, SchemaIntrospection};
pub use transport::{Row, Transport, TransportError, TransportResult};
