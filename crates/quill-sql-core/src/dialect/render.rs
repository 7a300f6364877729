//! Template expansion shared by every dialect.

use tracing::trace;

use super::{Dialect, KeyContext, DEFAULT_SELECT_TEMPLATE};
use crate::builder::expr::{CompareOp, Condition, Operand, Predicate, Raw};
use crate::builder::{DeletePlan, InsertPlan, SqlValue, UpdatePlan};
use crate::error::{BuildError, Result};
use crate::plan::{Field, OrderBy, OrderDirection, QueryPlan, TableRef, AGGREGATE_ALIAS};

/// Accumulates SQL text and parameters for one statement.
///
/// Subqueries render into the same buffer, so placeholder numbering is
/// global to the statement.
pub(super) struct Renderer<'d, D: Dialect + ?Sized> {
    dialect: &'d D,
    inline: bool,
    depth: usize,
    sql: String,
    params: Vec<SqlValue>,
}

impl<'d, D: Dialect + ?Sized> Renderer<'d, D> {
    pub(super) const fn new(dialect: &'d D, inline: bool) -> Self {
        Self {
            dialect,
            inline,
            depth: 0,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    pub(super) fn finish(self) -> (String, Vec<SqlValue>) {
        trace!(
            dialect = self.dialect.name(),
            sql = %self.sql,
            params = self.params.len(),
            "Rendered statement"
        );
        (self.sql, self.params)
    }

    fn bind(&mut self, value: SqlValue) {
        if self.inline {
            self.sql.push_str(&value.to_sql_inline());
            return;
        }
        self.params.push(value);
        let placeholder = self.dialect.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
    }

    /// Splices a raw fragment, rewriting each `?` outside quotes to a bound
    /// parameter.
    fn splice(&mut self, raw: &Raw) -> Result<()> {
        let mut params = raw.params.iter();
        let mut quoted = false;
        for c in raw.sql.chars() {
            match c {
                '\'' => {
                    quoted = !quoted;
                    self.sql.push(c);
                }
                '?' if !quoted => {
                    let value = params.next().ok_or_else(|| {
                        BuildError::InvalidQuery(format!(
                            "raw fragment `{}` has more placeholders than parameters",
                            raw.sql
                        ))
                    })?;
                    self.bind(value.clone());
                }
                _ => self.sql.push(c),
            }
        }
        if params.next().is_some() {
            return Err(BuildError::InvalidQuery(format!(
                "raw fragment `{}` has more parameters than placeholders",
                raw.sql
            )));
        }
        Ok(())
    }

    fn key(&mut self, key: &str, ctx: &KeyContext<'_>) -> Result<()> {
        let key = self.dialect.parse_key(key, ctx)?;
        self.sql.push_str(&key);
        Ok(())
    }

    // SELECT

    pub(super) fn select(&mut self, plan: &QueryPlan) -> Result<()> {
        if plan.tables.is_empty() {
            return Err(BuildError::InvalidQuery(String::from(
                "SELECT requires a table",
            )));
        }
        let ctx = KeyContext::for_plan(plan);
        // Unpaginated subqueries skip dialect wrappers so they stay scalar.
        let mut rest = if self.depth > 0 && plan.limit.is_none() {
            DEFAULT_SELECT_TEMPLATE
        } else {
            self.dialect.select_template()
        };
        while let Some(start) = rest.find('%') {
            self.sql.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('%') else {
                self.sql.push_str(&rest[start..]);
                return Ok(());
            };
            self.section(&after[..end], plan, &ctx)?;
            rest = &after[end + 1..];
        }
        self.sql.push_str(rest);
        Ok(())
    }

    fn subquery(&mut self, plan: &QueryPlan) -> Result<()> {
        self.depth += 1;
        let rendered = self.select(plan);
        self.depth -= 1;
        rendered
    }

    fn section(&mut self, token: &str, plan: &QueryPlan, ctx: &KeyContext<'_>) -> Result<()> {
        match token {
            "DISTINCT" => {
                if plan.distinct {
                    self.sql.push_str(" DISTINCT");
                }
                Ok(())
            }
            "FIELD" => self.fields(plan, ctx),
            "TABLE" => {
                self.tables(&plan.tables);
                Ok(())
            }
            "JOIN" => self.joins(plan, ctx),
            "WHERE" => {
                if !plan.conditions.is_empty() {
                    self.sql.push_str(" WHERE ");
                    self.conditions(&plan.conditions, ctx)?;
                }
                Ok(())
            }
            "GROUP" => self.group(plan, ctx),
            "HAVING" => match &plan.having {
                Some(having) => {
                    self.sql.push_str(" HAVING ");
                    self.splice(having)
                }
                None => Ok(()),
            },
            "ORDER" => self.order(plan, ctx),
            "LIMIT" => {
                if let Some(limit) = plan.limit {
                    let clause = self.dialect.render_limit(limit)?;
                    self.sql.push_str(&clause);
                }
                Ok(())
            }
            "LOCK" => {
                let clause = self.dialect.render_lock(plan.lock)?;
                self.sql.push_str(&clause);
                Ok(())
            }
            "COMMENT" => {
                if let Some(comment) = &plan.comment {
                    let comment = comment.replace("*/", "");
                    self.sql.push_str(&format!(" /* {} */", comment.trim()));
                }
                Ok(())
            }
            other => Err(BuildError::InvalidQuery(format!(
                "unknown template section `{other}`"
            ))),
        }
    }

    fn fields(&mut self, plan: &QueryPlan, ctx: &KeyContext<'_>) -> Result<()> {
        if let Some(aggregate) = &plan.aggregate {
            self.sql.push_str(aggregate.func.as_sql());
            self.sql.push('(');
            if aggregate.distinct {
                self.sql.push_str("DISTINCT ");
            }
            self.key(&aggregate.field, ctx)?;
            self.sql.push_str(") AS ");
            self.sql
                .push_str(&self.dialect.quote_identifier(AGGREGATE_ALIAS));
            return Ok(());
        }
        if plan.fields.is_empty() {
            self.sql.push('*');
            return Ok(());
        }
        for (i, field) in plan.fields.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            let alias = match field {
                Field::Column { name, alias } => {
                    self.key(name, ctx)?;
                    alias.as_deref()
                }
                Field::Raw { expr, alias } => {
                    self.splice(expr)?;
                    alias.as_deref()
                }
                Field::Subquery { query, alias } => {
                    self.sql.push('(');
                    self.subquery(query)?;
                    self.sql.push(')');
                    Some(alias.as_str())
                }
            };
            if let Some(alias) = alias {
                self.sql.push_str(" AS ");
                self.sql.push_str(&self.dialect.quote_identifier(alias));
            }
        }
        Ok(())
    }

    fn tables(&mut self, tables: &[TableRef]) {
        let rendered: Vec<String> = tables.iter().map(|t| self.dialect.parse_table(t)).collect();
        self.sql.push_str(&rendered.join(", "));
    }

    fn joins(&mut self, plan: &QueryPlan, ctx: &KeyContext<'_>) -> Result<()> {
        for join in &plan.joins {
            self.sql.push(' ');
            self.sql.push_str(join.kind.as_sql());
            self.sql.push_str(" JOIN ");
            self.sql.push_str(&self.dialect.parse_table(&join.table));
            if !join.on.is_empty() {
                self.sql.push_str(" ON ");
                self.conditions(&join.on, ctx)?;
            }
        }
        Ok(())
    }

    fn group(&mut self, plan: &QueryPlan, ctx: &KeyContext<'_>) -> Result<()> {
        for (i, column) in plan.group.iter().enumerate() {
            self.sql.push_str(if i == 0 { " GROUP BY " } else { ", " });
            self.key(column, ctx)?;
        }
        Ok(())
    }

    fn order(&mut self, plan: &QueryPlan, ctx: &KeyContext<'_>) -> Result<()> {
        for (i, order) in plan.order.iter().enumerate() {
            self.sql.push_str(if i == 0 { " ORDER BY " } else { ", " });
            match order {
                OrderBy::Column { column, direction } => {
                    self.key(column, ctx)?;
                    self.sql.push_str(match direction {
                        OrderDirection::Asc => " ASC",
                        OrderDirection::Desc => " DESC",
                    });
                }
                OrderBy::Random => self.sql.push_str(self.dialect.random_order()),
                OrderBy::Raw(raw) => self.splice(raw)?,
            }
        }
        Ok(())
    }

    // Predicates

    fn conditions(&mut self, conditions: &[Condition], ctx: &KeyContext<'_>) -> Result<()> {
        for (i, condition) in conditions.iter().enumerate() {
            if i > 0 {
                self.sql.push(' ');
                self.sql.push_str(condition.logic.as_sql());
                self.sql.push(' ');
            }
            self.predicate(&condition.predicate, ctx)?;
        }
        Ok(())
    }

    fn predicate(&mut self, predicate: &Predicate, ctx: &KeyContext<'_>) -> Result<()> {
        match predicate {
            Predicate::Compare { field, op, value } => {
                self.key(field, ctx)?;
                match value {
                    Operand::Value(v) if v.is_null() && matches!(op, CompareOp::Eq) => {
                        self.sql.push_str(" IS NULL");
                    }
                    Operand::Value(v) if v.is_null() && matches!(op, CompareOp::Ne) => {
                        self.sql.push_str(" IS NOT NULL");
                    }
                    Operand::Value(v) => {
                        self.sql.push_str(&format!(" {op} "));
                        self.bind(v.clone());
                    }
                    Operand::Column(column) => {
                        self.sql.push_str(&format!(" {op} "));
                        self.key(column, ctx)?;
                    }
                    Operand::Raw(raw) => {
                        self.sql.push_str(&format!(" {op} "));
                        self.splice(raw)?;
                    }
                }
            }
            Predicate::In {
                field,
                values,
                negated,
            } => {
                if values.is_empty() {
                    self.sql.push_str(if *negated { "1 = 1" } else { "0 = 1" });
                    return Ok(());
                }
                self.key(field, ctx)?;
                self.sql
                    .push_str(if *negated { " NOT IN (" } else { " IN (" });
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.sql.push_str(", ");
                    }
                    self.bind(value.clone());
                }
                self.sql.push(')');
            }
            Predicate::Null { field, negated } => {
                self.key(field, ctx)?;
                self.sql
                    .push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Predicate::Between {
                field,
                low,
                high,
                negated,
            } => {
                self.key(field, ctx)?;
                self.sql
                    .push_str(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                self.bind(low.clone());
                self.sql.push_str(" AND ");
                self.bind(high.clone());
            }
            Predicate::Exp { field, expr } => {
                self.key(field, ctx)?;
                self.sql.push(' ');
                self.splice(expr)?;
            }
            Predicate::Exists { query, negated } => {
                self.sql
                    .push_str(if *negated { "NOT EXISTS (" } else { "EXISTS (" });
                self.subquery(query)?;
                self.sql.push(')');
            }
            Predicate::Subquery { query, op, value } => {
                self.sql.push('(');
                self.subquery(query)?;
                self.sql.push_str(&format!(") {op} "));
                self.bind(value.clone());
            }
            Predicate::Raw(raw) => self.splice(raw)?,
            Predicate::Group(inner) => {
                if inner.is_empty() {
                    self.sql.push_str("1 = 1");
                } else {
                    self.sql.push('(');
                    self.conditions(inner, ctx)?;
                    self.sql.push(')');
                }
            }
        }
        Ok(())
    }

    // DML

    fn target(&mut self, table: &str) {
        let table = self.dialect.parse_table(&TableRef::new(table));
        self.sql.push_str(&table);
    }

    pub(super) fn insert(&mut self, plan: &InsertPlan) -> Result<()> {
        if plan.table.is_empty() || plan.columns.is_empty() || plan.rows.is_empty() {
            return Err(BuildError::InvalidQuery(String::from(
                "INSERT requires a table, columns and at least one row",
            )));
        }
        if plan.rows.len() > 1 && !self.dialect.supports_multi_row_insert() {
            return Err(BuildError::unsupported(
                self.dialect.name(),
                "multi-row INSERT",
            ));
        }
        let ctx = KeyContext::bare();
        self.sql.push_str("INSERT INTO ");
        self.target(&plan.table);
        self.sql.push_str(" (");
        for (i, column) in plan.columns.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.key(column, &ctx)?;
        }
        self.sql.push_str(") VALUES ");
        for (r, row) in plan.rows.iter().enumerate() {
            if row.len() != plan.columns.len() {
                return Err(BuildError::InvalidQuery(format!(
                    "INSERT row {r} has {} values for {} columns",
                    row.len(),
                    plan.columns.len()
                )));
            }
            if r > 0 {
                self.sql.push_str(", ");
            }
            self.sql.push('(');
            for (i, value) in row.iter().enumerate() {
                if i > 0 {
                    self.sql.push_str(", ");
                }
                self.bind(value.clone());
            }
            self.sql.push(')');
        }
        Ok(())
    }

    pub(super) fn update(&mut self, plan: &UpdatePlan) -> Result<()> {
        if plan.assignments.is_empty() {
            return Err(BuildError::InvalidQuery(String::from(
                "UPDATE requires at least one assignment",
            )));
        }
        if plan.conditions.is_empty() {
            return Err(BuildError::InvalidQuery(String::from(
                "UPDATE without conditions",
            )));
        }
        let ctx = KeyContext::bare();
        self.sql.push_str("UPDATE ");
        self.target(&plan.table);
        self.sql.push_str(" SET ");
        for (i, (column, value)) in plan.assignments.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.key(column, &ctx)?;
            self.sql.push_str(" = ");
            self.bind(value.clone());
        }
        self.sql.push_str(" WHERE ");
        self.conditions(&plan.conditions, &ctx)
    }

    pub(super) fn delete(&mut self, plan: &DeletePlan) -> Result<()> {
        if plan.conditions.is_empty() {
            return Err(BuildError::InvalidQuery(String::from(
                "DELETE without conditions",
            )));
        }
        let ctx = KeyContext::bare();
        self.sql.push_str("DELETE FROM ");
        self.target(&plan.table);
        self.sql.push_str(" WHERE ");
        self.conditions(&plan.conditions, &ctx)
    }
}
