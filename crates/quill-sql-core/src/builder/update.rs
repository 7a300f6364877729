//! UPDATE statement builder.

use super::expr::{CompareOp, Condition, Operand, Predicate};
use super::value::{SqlValue, ToSqlValue};

/// Dialect-neutral UPDATE statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdatePlan {
    /// Target table.
    pub table: String,
    /// SET assignments, in order.
    pub assignments: Vec<(String, SqlValue)>,
    /// WHERE conditions. Rendering refuses an empty list.
    pub conditions: Vec<Condition>,
}

/// An UPDATE builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    plan: UpdatePlan,
}

impl Update {
    /// Creates a new UPDATE builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Specifies the table to update.
    #[must_use]
    pub fn table(mut self, table: &str) -> Self {
        self.plan.table = table.to_string();
        self
    }

    /// Adds a SET assignment.
    #[must_use]
    pub fn set<T: ToSqlValue>(mut self, column: &str, value: T) -> Self {
        self.plan
            .assignments
            .push((column.to_string(), value.to_sql_value()));
        self
    }

    /// Adds a `column = value` condition.
    #[must_use]
    pub fn where_eq(self, column: &str, value: impl Into<Operand>) -> Self {
        self.condition(Condition::and(Predicate::Compare {
            field: column.to_string(),
            op: CompareOp::Eq,
            value: value.into(),
        }))
    }

    /// Adds a condition.
    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.plan.conditions.push(condition);
        self
    }

    /// Returns the underlying plan.
    #[must_use]
    pub const fn plan(&self) -> &UpdatePlan {
        &self.plan
    }

    /// Consumes the builder, returning the plan.
    #[must_use]
    pub fn into_plan(self) -> UpdatePlan {
        self.plan
    }
}
