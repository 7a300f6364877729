//! MySQL dialect implementation.

use std::sync::LazyLock;

use quill_sql_core::dialect::Dialect;
use quill_sql_core::error::{BuildError, Result};
use quill_sql_core::plan::{Limit, Lock};
use regex::Regex;

/// Tokens accepted as column keys in strict mode.
static PLAIN_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\.\*]+$").expect("valid key pattern"));

/// MySQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> Option<char> {
        Some('`')
    }

    fn validate_strict_key(&self, key: &str) -> Result<()> {
        if PLAIN_KEY.is_match(key) {
            Ok(())
        } else {
            Err(BuildError::SchemaMismatch(format!(
                "`{key}` is not a plain column reference"
            )))
        }
    }

    fn json_path(&self, column: &str, path: &[&str]) -> Result<String> {
        let path = path.join(".").replace('\'', "''");
        Ok(format!("json_extract({column}, '$.{path}')"))
    }

    fn render_limit(&self, limit: Limit) -> Result<String> {
        Ok(match limit {
            Limit::Count(count) => format!(" LIMIT {count}"),
            Limit::Range { offset, count } => format!(" LIMIT {offset},{count}"),
        })
    }

    fn render_lock(&self, lock: Lock) -> Result<String> {
        Ok(match lock {
            Lock::None => String::new(),
            Lock::Exclusive => String::from(" FOR UPDATE"),
            Lock::Shared => String::from(" LOCK IN SHARE MODE"),
        })
    }

    fn random_order(&self) -> &'static str {
        "rand()"
    }
}
