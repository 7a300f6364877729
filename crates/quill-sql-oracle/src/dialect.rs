//! Oracle dialect implementation.

use quill_sql_core::dialect::Dialect;
use quill_sql_core::error::{BuildError, Result};
use quill_sql_core::plan::{Limit, Lock};

/// SELECT template wrapping the statement in a row-numbering subquery.
pub const ORACLE_SELECT_TEMPLATE: &str = concat!(
    "SELECT * FROM (SELECT quill.*, rownum AS numrow FROM (",
    "SELECT%DISTINCT% %FIELD% FROM %TABLE%%JOIN%%WHERE%%GROUP%%HAVING%%ORDER%",
    ") quill )%LIMIT%%LOCK%%COMMENT%",
);

/// Oracle dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct OracleDialect;

impl OracleDialect {
    /// Creates a new Oracle dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn identifier_quote(&self) -> Option<char> {
        None
    }

    fn placeholder(&self, index: usize) -> String {
        format!(":{index}")
    }

    fn select_template(&self) -> &'static str {
        ORACLE_SELECT_TEMPLATE
    }

    fn supports_multi_row_insert(&self) -> bool {
        false
    }

    fn json_path(&self, column: &str, path: &[&str]) -> Result<String> {
        let path: String = path
            .iter()
            .map(|segment| format!(".\"{}\"", segment.replace('"', "\"\"")))
            .collect();
        Ok(format!("{column}{path}"))
    }

    /// Filters on the synthetic `numrow` column: lower bound exclusive,
    /// upper bound inclusive.
    fn render_limit(&self, limit: Limit) -> Result<String> {
        Ok(match limit {
            Limit::Count(count) => format!(" WHERE (numrow>0 AND numrow<={count})"),
            Limit::Range { offset, count } => format!(
                " WHERE (numrow>{offset}) AND (numrow<={})",
                offset.saturating_add(count)
            ),
        })
    }

    fn render_lock(&self, lock: Lock) -> Result<String> {
        match lock {
            Lock::None => Ok(String::new()),
            Lock::Exclusive => Ok(String::from(" FOR UPDATE NOWAIT")),
            Lock::Shared => Err(BuildError::unsupported(self.name(), "shared row locks")),
        }
    }

    fn random_order(&self) -> &'static str {
        "DBMS_RANDOM.value"
    }
}
