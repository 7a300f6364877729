//! DELETE statement builder.
//!
//! Like UPDATE, a DELETE without conditions is refused at render time.

use super::expr::{CompareOp, Condition, Operand, Predicate};
use super::value::ToSqlValue;

/// Dialect-neutral DELETE statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeletePlan {
    /// Target table.
    pub table: String,
    /// WHERE conditions.
    pub conditions: Vec<Condition>,
}

/// A DELETE builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delete {
    plan: DeletePlan,
}

impl Delete {
    /// Creates a new DELETE builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Specifies the table to delete from.
    #[must_use]
    pub fn from(mut self, table: &str) -> Self {
        self.plan.table = table.to_string();
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

    /// Adds a `column IN (...)` condition.
    #[must_use]
    pub fn where_in<I, T>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSqlValue,
    {
        self.condition(Condition::and(Predicate::In {
            field: column.to_string(),
            values: values.into_iter().map(ToSqlValue::to_sql_value).collect(),
            negated: false,
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
    pub const fn plan(&self) -> &DeletePlan {
        &self.plan
    }

    /// Consumes the builder, returning the plan.
    #[must_use]
    pub fn into_plan(self) -> DeletePlan {
        self.plan
    }
}
