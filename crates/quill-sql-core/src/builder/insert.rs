//! INSERT statement builder.

use super::value::{SqlValue, ToSqlValue};

/// Dialect-neutral INSERT statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsertPlan {
    /// Target table.
    pub table: String,
    /// Column list.
    pub columns: Vec<String>,
    /// One value row per inserted record, in column order.
    pub rows: Vec<Vec<SqlValue>>,
}

/// An INSERT builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insert {
    plan: InsertPlan,
}

impl Insert {
    /// Creates a new INSERT builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Specifies the table to insert into.
    #[must_use]
    pub fn into_table(mut self, table: &str) -> Self {
        self.plan.table = table.to_string();
        self
    }

    /// Sets one column of a single-row insert.
    #[must_use]
    pub fn set<T: ToSqlValue>(mut self, column: &str, value: T) -> Self {
        if self.plan.rows.is_empty() {
            self.plan.rows.push(vec![]);
        }
        self.plan.columns.push(column.to_string());
        for row in &mut self.plan.rows {
            row.push(SqlValue::Null);
        }
        if let Some(slot) = self.plan.rows.first_mut().and_then(|r| r.last_mut()) {
            *slot = value.to_sql_value();
        }
        self
    }

    /// Appends a row given as `(column, value)` pairs.
    ///
    /// The first row fixes the column list; later rows are reordered to it and
    /// missing columns become NULL.
    #[must_use]
    pub fn row<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToSqlValue,
    {
        let pairs: Vec<(String, SqlValue)> = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.to_sql_value()))
            .collect();
        if self.plan.columns.is_empty() {
            self.plan.columns = pairs.iter().map(|(k, _)| k.clone()).collect();
            self.plan.rows.push(pairs.into_iter().map(|(_, v)| v).collect());
            return self;
        }
        let row = self
            .plan
            .columns
            .iter()
            .map(|column| {
                pairs
                    .iter()
                    .find(|(k, _)| k == column)
                    .map_or(SqlValue::Null, |(_, v)| v.clone())
            })
            .collect();
        self.plan.rows.push(row);
        self
    }

    /// Returns the underlying plan.
    #[must_use]
    pub const fn plan(&self) -> &InsertPlan {
        &self.plan
    }

    /// Consumes the builder, returning the plan.
    #[must_use]
    pub fn into_plan(self) -> InsertPlan {
        self.plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_builds_single_row() {
        let plan = Insert::new()
            .into_table("users")
            .set("name", "Alice")
            .set("age", 30)
            .into_plan();
        assert_eq!(plan.columns, vec!["name", "age"]);
        assert_eq!(
            plan.rows,
            vec![vec![SqlValue::Text("Alice".into()), SqlValue::Int(30)]]
        );
    }

    #[test]
    fn test_rows_follow_first_column_order() {
        let plan = Insert::new()
            .into_table("users")
            .row([("name", SqlValue::Text("a".into())), ("age", SqlValue::Int(1))])
            .row([("age", SqlValue::Int(2))])
            .into_plan();
        assert_eq!(plan.rows[1], vec![SqlValue::Null, SqlValue::Int(2)]);
    }
}
