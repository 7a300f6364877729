//! # quill-sql-oracle
//!
//! Oracle support for `quill-sql-core`.
//!
//! # How Oracle differs from other dialects
//!
//! - **No LIMIT/OFFSET**: the statement is wrapped so that [ROWNUM] is
//!   computed first, then filtered: `WHERE (numrow>O) AND (numrow<=O+C)`
//!   for an offset `O` and count `C`, `WHERE (numrow>0 AND numrow<=C)`
//!   for a count alone.
//! - **Bind variables**: placeholders are positional `:1`, `:2`, ...
//! - **Identifiers** are emitted unquoted.
//! - **[Locking]**: exclusive locks never wait (`FOR UPDATE NOWAIT`); shared
//!   row locks are not expressible.
//! - **JSON**: nested field access `doc->a->b` renders with dot notation,
//!   `doc."a"."b"`.
//! - **Random order**: [`DBMS_RANDOM.value`].
//! - **No multi-row `VALUES`**: one INSERT per row.
//!
//! [ROWNUM]: https://docs.oracle.com/en/database/oracle/oracle-database/19/sqlrf/ROWNUM-Pseudocolumn.html
//! [Locking]: https://docs.oracle.com/en/database/oracle/oracle-database/19/sqlrf/SELECT.html
//! [`DBMS_RANDOM.value`]: https://docs.oracle.com/en/database/oracle/oracle-database/19/arpls/DBMS_RANDOM.html
//!
//! ## Example
//!
//! ```rust
//! use quill_sql_core::{Dialect, Query};
//! use quill_sql_oracle::OracleDialect;
//!
//! let (sql, _) = OracleDialect
//!     .render_select(Query::table("users").limit_offset(10, 5).plan())
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM (SELECT quill.*, rownum AS numrow FROM (SELECT * FROM users) quill ) \
//!      WHERE (numrow>10) AND (numrow<=15)"
//! );
//! ```

mod dialect;

pub use dialect::{OracleDialect, ORACLE_SELECT_TEMPLATE};
