//! Statement builders.
//!
//! Builders only collect intent; they never produce SQL on their own. Turn a
//! plan into text with a [`Dialect`](crate::dialect::Dialect):
//!
//! ```rust
//! use quill_sql_core::builder::Query;
//! use quill_sql_core::dialect::{Dialect, GenericDialect};
//!
//! let (sql, params) = GenericDialect
//!     .render_select(Query::table("users").where_eq("active", true).plan())
//!     .unwrap();
//!
//! assert_eq!(sql, r#"SELECT * FROM "users" WHERE "active" = ?"#);
//! assert_eq!(params.len(), 1);
//! ```

mod delete;
pub mod expr;
mod insert;
mod select;
mod update;
pub mod value;

pub use delete::{Delete, DeletePlan};
pub use expr::{raw, CompareOp, Condition, Logic, Operand, Predicate, Raw};
pub use insert::{Insert, InsertPlan};
pub use select::Query;
pub use update::{Update, UpdatePlan};
pub use value::{KeyValue, SqlValue, ToSqlValue};
