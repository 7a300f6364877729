//! # quill-orm
//!
//! Records, relations and eager loading on top of `quill-sql-core`.
//!
//! This crate provides:
//! - [`ModelDef`] and [`RelationDef`] for static model declarations
//! - [`Db`], pairing a dialect with a transport
//! - [`Record`] for change-tracked rows with lazily loaded relations
//! - [`ModelQuery`] for queries with eager loading, relation counts and
//!   existence filters
//! - [`Relation`] for per-owner relation queries and writes
//!
//! ## Relations
//!
//! ```rust
//! use quill_orm::{Db, ModelDef, RelationDef, Related};
//! use quill_sql_core::{GenericDialect, Row, SqlValue, Transport, TransportResult};
//!
//! static USER_RELATIONS: [RelationDef; 1] =
//!     [RelationDef::has_many("posts", &POST, "user_id", "id")];
//! static USER: ModelDef = ModelDef::new("User", "users").relations(&USER_RELATIONS);
//! static POST: ModelDef = ModelDef::new("Post", "posts");
//!
//! /// Answers every SELECT with the same two rows.
//! struct Canned;
//!
//! impl Transport for Canned {
//!     fn query(&self, _sql: &str, _params: &[SqlValue]) -> TransportResult<Vec<Row>> {
//!         let row = |id: i64| -> Row {
//!             [("id", id), ("user_id", 1)]
//!                 .into_iter()
//!                 .map(|(k, v)| (k.to_string(), SqlValue::Int(v)))
//!                 .collect()
//!         };
//!         Ok(vec![row(1), row(2)])
//!     }
//!
//!     fn execute(&self, _sql: &str, _params: &[SqlValue]) -> TransportResult<u64> {
//!         Ok(0)
//!     }
//!
//!     fn last_insert_id(&self) -> TransportResult<Option<SqlValue>> {
//!         Ok(None)
//!     }
//! }
//!
//! let db = Db::new(GenericDialect, Canned);
//! let users = USER.query().with("posts").select(&db).unwrap();
//! assert_eq!(users.len(), 2);
//! match users[0].relation("posts") {
//!     Some(Related::Many(posts)) => assert_eq!(posts.len(), 2),
//!     other => panic!("unexpected {other:?}"),
//! }
//! // User 2 has no posts: the canned rows all point at user 1.
//! assert!(users[1].relation("posts").unwrap().as_many().is_empty());
//! ```

mod db;
mod error;
mod model;
mod query;
mod record;
pub mod relation;

pub use db::Db;
pub use error::{OrmError, Result};
pub use model::ModelDef;
pub use query::{ModelQuery, Scope};
pub use record::{ParentRef, Record, Related};
pub use relation::{BatchSave, Relation, RelationDef, RelationKind};

// Re-export commonly used types from quill-sql-core
pub use quill_sql_core::{AggregateFn, KeyValue, Row, SqlValue, ToSqlValue};
