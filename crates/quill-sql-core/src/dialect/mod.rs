//! SQL Dialect support.
//!
//! Different databases have slightly different SQL syntax. A [`Dialect`]
//! renders the dialect-neutral plans from [`crate::plan`] and
//! [`crate::builder`] into SQL text plus bound parameters.
//!
//! Rendering is template driven. [`Dialect::select_template`] returns a
//! SELECT skeleton containing section tokens (`%DISTINCT%`, `%FIELD%`,
//! `%TABLE%`, `%JOIN%`, `%WHERE%`, `%GROUP%`, `%HAVING%`, `%ORDER%`,
//! `%LIMIT%`, `%LOCK%`, `%COMMENT%`). Tokens are expanded left to right, so
//! bound parameters always follow placeholder order in the final text.
//!
//! Every hook has a default matching ANSI SQL; dialects override only what
//! differs.

mod generic;
mod render;

pub use generic::GenericDialect;

use crate::builder::{DeletePlan, InsertPlan, SqlValue, UpdatePlan};
use crate::error::{BuildError, Result};
use crate::plan::{Limit, Lock, QueryPlan, TableRef};

use render::Renderer;

/// SELECT template used by dialects with native LIMIT support.
pub const DEFAULT_SELECT_TEMPLATE: &str =
    "SELECT%DISTINCT% %FIELD% FROM %TABLE%%JOIN%%WHERE%%GROUP%%HAVING%%ORDER%%LIMIT%%LOCK%%COMMENT%";

/// What a key parser knows about the statement being rendered.
#[derive(Debug, Clone, Default)]
pub struct KeyContext<'a> {
    tables: Vec<&'a TableRef>,
    known_fields: Option<&'a [String]>,
}

impl<'a> KeyContext<'a> {
    /// Context for a SELECT plan: its tables, joins and known fields.
    #[must_use]
    pub fn for_plan(plan: &'a QueryPlan) -> Self {
        Self {
            tables: plan
                .tables
                .iter()
                .chain(plan.joins.iter().map(|j| &j.table))
                .collect(),
            known_fields: plan.known_fields.as_deref(),
        }
    }

    /// Context without tables or strict validation.
    #[must_use]
    pub fn bare() -> Self {
        Self::default()
    }

    /// Returns whether column references are validated.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.known_fields.is_some()
    }

    /// Resolves a table name to its declared alias, or returns it unchanged.
    #[must_use]
    pub fn resolve_table<'k>(&self, table: &'k str) -> &'k str
    where
        'a: 'k,
    {
        self.tables
            .iter()
            .copied()
            .find(|t| t.name == table)
            .and_then(|t| t.alias.as_deref())
            .unwrap_or(table)
    }

    /// Returns whether `table` names the first FROM table, by name or alias.
    ///
    /// Known fields describe only that table, so columns qualified with a
    /// joined table are not checked.
    #[must_use]
    pub fn is_primary(&self, table: &str) -> bool {
        self.tables.first().is_some_and(|primary| {
            primary.name == table || primary.alias.as_deref() == Some(table)
        })
    }

    /// Fails with [`BuildError::SchemaMismatch`] when strict and `column` is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is not in the known-field list.
    pub fn check_field(&self, column: &str) -> Result<()> {
        match self.known_fields {
            Some(known) if column != "*" && !known.iter().any(|k| k == column) => Err(
                BuildError::SchemaMismatch(format!("unknown field `{column}`")),
            ),
            _ => Ok(()),
        }
    }
}

/// Returns whether a key token is a numeric literal.
#[must_use]
pub fn is_numeric(key: &str) -> bool {
    let digits = key.strip_prefix('-').unwrap_or(key);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|c| *c == '.').count() <= 1
        && digits.chars().any(|c| c.is_ascii_digit())
}

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character, or `None` if identifiers are
    /// emitted bare.
    fn identifier_quote(&self) -> Option<char> {
        Some('"')
    }

    /// Quotes an identifier, doubling embedded quote characters.
    fn quote_identifier(&self, name: &str) -> String {
        match self.identifier_quote() {
            Some(quote) if name != "*" => {
                let escaped = name.replace(quote, &format!("{quote}{quote}"));
                format!("{quote}{escaped}{quote}")
            }
            _ => name.to_string(),
        }
    }

    /// Returns the placeholder for the `index`-th (1-based) bound parameter.
    fn placeholder(&self, _index: usize) -> String {
        String::from("?")
    }

    /// Returns the SELECT template.
    fn select_template(&self) -> &'static str {
        DEFAULT_SELECT_TEMPLATE
    }

    /// Returns whether several rows can share one INSERT statement.
    fn supports_multi_row_insert(&self) -> bool {
        true
    }

    /// Returns whether a key token is an expression that must not be quoted.
    fn is_expression(&self, key: &str) -> bool {
        key.chars()
            .any(|c| matches!(c, ',' | '\'' | '"' | '`' | '*' | '(' | ')') || c.is_whitespace())
    }

    /// Rejects tokens the dialect refuses in strict mode.
    ///
    /// # Errors
    ///
    /// The default accepts every token.
    fn validate_strict_key(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    /// Renders structured access into `column` (already rendered) along `path`.
    ///
    /// # Errors
    ///
    /// The default fails with [`BuildError::Unsupported`].
    fn json_path(&self, _column: &str, _path: &[&str]) -> Result<String> {
        Err(BuildError::unsupported(self.name(), "structured field access"))
    }

    /// Parses a column key into SQL.
    ///
    /// Numeric literals pass through. Function calls are left alone.
    /// `column->a->b` becomes the dialect's structured accessor. A
    /// `table.column` reference resolves the table alias. Plain identifiers
    /// are quoted.
    ///
    /// # Errors
    ///
    /// Fails with [`BuildError::SchemaMismatch`] in strict mode for unknown
    /// or malformed columns.
    fn parse_key(&self, key: &str, ctx: &KeyContext<'_>) -> Result<String> {
        let key = key.trim();
        if key.is_empty() {
            return Err(BuildError::InvalidQuery(String::from("empty column key")));
        }
        if is_numeric(key) {
            return Ok(key.to_string());
        }
        if key.contains('(') {
            if ctx.is_strict() {
                self.validate_strict_key(key)?;
            }
            return Ok(key.to_string());
        }
        if let Some((column, path)) = key.split_once("->") {
            let column = self.parse_key(column, ctx)?;
            let segments: Vec<&str> = path.split("->").map(str::trim).collect();
            if segments.iter().any(|s| s.is_empty()) {
                return Err(BuildError::InvalidQuery(format!("bad field path `{key}`")));
            }
            return self.json_path(&column, &segments);
        }
        if ctx.is_strict() {
            self.validate_strict_key(key)?;
        }
        if self.is_expression(key) && !key.ends_with(".*") && key != "*" {
            return Ok(key.to_string());
        }
        if let Some((table, column)) = key.rsplit_once('.') {
            if ctx.is_primary(table) {
                ctx.check_field(column)?;
            }
            let table = ctx.resolve_table(table);
            let table = table
                .split('.')
                .map(|part| self.quote_identifier(part))
                .collect::<Vec<_>>()
                .join(".");
            return Ok(format!("{table}.{}", self.quote_identifier(column)));
        }
        ctx.check_field(key)?;
        Ok(self.quote_identifier(key))
    }

    /// Renders a table reference with its alias.
    fn parse_table(&self, table: &TableRef) -> String {
        let name = table
            .name
            .split('.')
            .map(|part| self.quote_identifier(part))
            .collect::<Vec<_>>()
            .join(".");
        match &table.alias {
            Some(alias) => format!("{name} {}", self.quote_identifier(alias)),
            None => name,
        }
    }

    /// Renders the pagination clause.
    ///
    /// # Errors
    ///
    /// The default never fails.
    fn render_limit(&self, limit: Limit) -> Result<String> {
        Ok(match limit {
            Limit::Count(count) => format!(" LIMIT {count}"),
            Limit::Range { offset, count } => format!(" LIMIT {count} OFFSET {offset}"),
        })
    }

    /// Renders the row-lock clause.
    ///
    /// # Errors
    ///
    /// The default fails with [`BuildError::Unsupported`] for shared locks.
    fn render_lock(&self, lock: Lock) -> Result<String> {
        match lock {
            Lock::None => Ok(String::new()),
            Lock::Exclusive => Ok(String::from(" FOR UPDATE")),
            Lock::Shared => Err(BuildError::unsupported(self.name(), "shared row locks")),
        }
    }

    /// Returns the pseudo-random ordering expression.
    fn random_order(&self) -> &'static str {
        "RANDOM()"
    }

    /// Renders a SELECT plan.
    ///
    /// # Errors
    ///
    /// Fails if the plan has no table, or with any hook error.
    fn render_select(&self, plan: &QueryPlan) -> Result<(String, Vec<SqlValue>)> {
        let mut renderer = Renderer::new(self, false);
        renderer.select(plan)?;
        Ok(renderer.finish())
    }

    /// Renders a SELECT plan with every parameter inlined, for display.
    ///
    /// # Errors
    ///
    /// Same as [`Dialect::render_select`].
    fn render_inline(&self, plan: &QueryPlan) -> Result<String> {
        let mut renderer = Renderer::new(self, true);
        renderer.select(plan)?;
        Ok(renderer.finish().0)
    }

    /// Renders an INSERT plan.
    ///
    /// # Errors
    ///
    /// Fails without columns, or with several rows where unsupported.
    fn render_insert(&self, plan: &InsertPlan) -> Result<(String, Vec<SqlValue>)> {
        let mut renderer = Renderer::new(self, false);
        renderer.insert(plan)?;
        Ok(renderer.finish())
    }

    /// Renders an UPDATE plan.
    ///
    /// # Errors
    ///
    /// Fails without assignments or without conditions.
    fn render_update(&self, plan: &UpdatePlan) -> Result<(String, Vec<SqlValue>)> {
        let mut renderer = Renderer::new(self, false);
        renderer.update(plan)?;
        Ok(renderer.finish())
    }

    /// Renders a DELETE plan.
    ///
    /// # Errors
    ///
    /// Fails without conditions.
    fn render_delete(&self, plan: &DeletePlan) -> Result<(String, Vec<SqlValue>)> {
        let mut renderer = Renderer::new(self, false);
        renderer.delete(plan)?;
        Ok(renderer.finish())
    }
}
