//! Fluent SELECT builder.
//!
//! [`Query`] is a thin, by-value wrapper around a [`QueryPlan`]. Every method
//! consumes the builder and returns it, so queries compose naturally:
//!
//! ```rust
//! use quill_sql_core::builder::{CompareOp, Query};
//!
//! let query = Query::table("posts")
//!     .where_eq("status", 1)
//!     .where_cmp("views", CompareOp::Gt, 100)
//!     .order("-created_at")
//!     .limit_offset(10, 5);
//!
//! assert_eq!(query.plan().conditions.len(), 2);
//! ```

use super::expr::{CompareOp, Condition, Logic, Operand, Predicate, Raw};
use super::value::ToSqlValue;
use crate::plan::{
    Aggregate, AggregateFn, Field, Join, JoinType, Limit, Lock, OrderBy, QueryPlan, TableRef,
};

/// A fluent SELECT builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    plan: QueryPlan,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query over a table.
    #[must_use]
    pub fn table(name: &str) -> Self {
        Self::new().from(name)
    }

    /// Wraps an existing plan.
    #[must_use]
    pub const fn from_plan(plan: QueryPlan) -> Self {
        Self { plan }
    }

    /// Sets the primary table, keeping any alias already declared.
    #[must_use]
    pub fn from(mut self, name: &str) -> Self {
        match self.plan.tables.first_mut() {
            Some(table) => table.name = name.to_string(),
            None => self.plan.tables.push(TableRef::new(name)),
        }
        self
    }

    /// Aliases the primary table.
    #[must_use]
    pub fn alias(mut self, alias: &str) -> Self {
        if let Some(table) = self.plan.tables.first_mut() {
            table.alias = Some(alias.to_string());
        }
        self
    }

    // Projection

    /// Adds a projected column (`*` and `table.*` are accepted).
    #[must_use]
    pub fn field(mut self, name: &str) -> Self {
        self.plan.fields.push(Field::Column {
            name: name.to_string(),
            alias: None,
        });
        self
    }

    /// Adds several projected columns.
    #[must_use]
    pub fn fields(self, names: &[&str]) -> Self {
        names.iter().fold(self, |q, name| q.field(name))
    }

    /// Adds an aliased projected column.
    #[must_use]
    pub fn field_as(mut self, name: &str, alias: &str) -> Self {
        self.plan.fields.push(Field::Column {
            name: name.to_string(),
            alias: Some(alias.to_string()),
        });
        self
    }

    /// Adds a raw projected expression.
    #[must_use]
    pub fn field_raw(mut self, expr: Raw, alias: Option<&str>) -> Self {
        self.plan.fields.push(Field::Raw {
            expr,
            alias: alias.map(String::from),
        });
        self
    }

    /// Adds a scalar subquery projected under `alias`.
    #[must_use]
    pub fn field_subquery(mut self, query: Self, alias: &str) -> Self {
        self.plan.fields.push(Field::Subquery {
            query: Box::new(query.plan),
            alias: alias.to_string(),
        });
        self
    }

    /// Sets SELECT DISTINCT.
    #[must_use]
    pub const fn distinct(mut self, distinct: bool) -> Self {
        self.plan.distinct = distinct;
        self
    }

    // Conditions

    /// Appends a condition.
    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.plan.conditions.push(condition);
        self
    }

    fn push(self, logic: Logic, predicate: Predicate) -> Self {
        self.condition(Condition { logic, predicate })
    }

    /// `field = value`.
    #[must_use]
    pub fn where_eq(self, field: &str, value: impl Into<Operand>) -> Self {
        self.where_cmp(field, CompareOp::Eq, value)
    }

    /// `field op value`.
    #[must_use]
    pub fn where_cmp(self, field: &str, op: CompareOp, value: impl Into<Operand>) -> Self {
        self.push(
            Logic::And,
            Predicate::Compare {
                field: field.to_string(),
                op,
                value: value.into(),
            },
        )
    }

    /// `field op other_column`.
    #[must_use]
    pub fn where_column(self, field: &str, op: CompareOp, other: &str) -> Self {
        self.where_cmp(field, op, Operand::Column(other.to_string()))
    }

    /// `OR field = value`.
    #[must_use]
    pub fn or_where_eq(self, field: &str, value: impl Into<Operand>) -> Self {
        self.or_where_cmp(field, CompareOp::Eq, value)
    }

    /// `OR field op value`.
    #[must_use]
    pub fn or_where_cmp(self, field: &str, op: CompareOp, value: impl Into<Operand>) -> Self {
        self.push(
            Logic::Or,
            Predicate::Compare {
                field: field.to_string(),
                op,
                value: value.into(),
            },
        )
    }

    /// `field IN (...)`. An empty list never matches.
    #[must_use]
    pub fn where_in<I, T>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSqlValue,
    {
        self.push(
            Logic::And,
            Predicate::In {
                field: field.to_string(),
                values: values.into_iter().map(ToSqlValue::to_sql_value).collect(),
                negated: false,
            },
        )
    }

    /// `field NOT IN (...)`. An empty list always matches.
    #[must_use]
    pub fn where_not_in<I, T>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSqlValue,
    {
        self.push(
            Logic::And,
            Predicate::In {
                field: field.to_string(),
                values: values.into_iter().map(ToSqlValue::to_sql_value).collect(),
                negated: true,
            },
        )
    }

    /// `field IS NULL`.
    #[must_use]
    pub fn where_null(self, field: &str) -> Self {
        self.push(
            Logic::And,
            Predicate::Null {
                field: field.to_string(),
                negated: false,
            },
        )
    }

    /// `field IS NOT NULL`.
    #[must_use]
    pub fn where_not_null(self, field: &str) -> Self {
        self.push(
            Logic::And,
            Predicate::Null {
                field: field.to_string(),
                negated: true,
            },
        )
    }

    /// `field LIKE pattern`.
    #[must_use]
    pub fn where_like(self, field: &str, pattern: &str) -> Self {
        self.where_cmp(field, CompareOp::Like, pattern)
    }

    /// `field BETWEEN low AND high`.
    #[must_use]
    pub fn where_between(self, field: &str, low: impl ToSqlValue, high: impl ToSqlValue) -> Self {
        self.push(
            Logic::And,
            Predicate::Between {
                field: field.to_string(),
                low: low.to_sql_value(),
                high: high.to_sql_value(),
                negated: false,
            },
        )
    }

    /// A column followed by a raw expression, e.g. `("id", raw("= users.user_id"))`.
    #[must_use]
    pub fn where_exp(self, field: &str, expr: Raw) -> Self {
        self.push(
            Logic::And,
            Predicate::Exp {
                field: field.to_string(),
                expr,
            },
        )
    }

    /// A raw predicate.
    #[must_use]
    pub fn where_raw(self, expr: Raw) -> Self {
        self.push(Logic::And, Predicate::Raw(expr))
    }

    /// `OR` a raw predicate.
    #[must_use]
    pub fn or_where_raw(self, expr: Raw) -> Self {
        self.push(Logic::Or, Predicate::Raw(expr))
    }

    /// `EXISTS (subquery)`.
    #[must_use]
    pub fn where_exists(self, query: Self) -> Self {
        self.push(
            Logic::And,
            Predicate::Exists {
                query: Box::new(query.plan),
                negated: false,
            },
        )
    }

    /// `NOT EXISTS (subquery)`.
    #[must_use]
    pub fn where_not_exists(self, query: Self) -> Self {
        self.push(
            Logic::And,
            Predicate::Exists {
                query: Box::new(query.plan),
                negated: true,
            },
        )
    }

    /// `(subquery) op value`, for scalar subqueries such as counts.
    #[must_use]
    pub fn where_subquery(self, query: Self, op: CompareOp, value: impl ToSqlValue) -> Self {
        self.push(
            Logic::And,
            Predicate::Subquery {
                query: Box::new(query.plan),
                op,
                value: value.to_sql_value(),
            },
        )
    }

    /// A parenthesized group built on a blank query.
    #[must_use]
    pub fn where_group(self, build: impl FnOnce(Self) -> Self) -> Self {
        let group = build(Self::new()).plan.conditions;
        self.push(Logic::And, Predicate::Group(group))
    }

    /// `OR` a parenthesized group built on a blank query.
    #[must_use]
    pub fn or_where_group(self, build: impl FnOnce(Self) -> Self) -> Self {
        let group = build(Self::new()).plan.conditions;
        self.push(Logic::Or, Predicate::Group(group))
    }

    /// Drops every top-level condition on `field`.
    ///
    /// A qualified field (`Post.user_id`) also matches its bare column name.
    #[must_use]
    pub fn remove_where_field(mut self, field: &str) -> Self {
        self.plan.conditions.retain(|c| {
            c.predicate
                .field()
                .is_none_or(|f| f != field && f.rsplit('.').next() != Some(field))
        });
        self
    }

    /// Drops every condition.
    #[must_use]
    pub fn remove_wheres(mut self) -> Self {
        self.plan.conditions.clear();
        self
    }

    // Joins

    /// Adds a join with explicit ON conditions.
    #[must_use]
    pub fn join_with(mut self, kind: JoinType, table: TableRef, on: Vec<Condition>) -> Self {
        self.plan.joins.push(Join { table, on, kind });
        self
    }

    /// `INNER JOIN table ON left = right`.
    #[must_use]
    pub fn join(self, table: TableRef, left: &str, right: &str) -> Self {
        self.join_kind(JoinType::Inner, table, left, right)
    }

    /// `LEFT JOIN table ON left = right`.
    #[must_use]
    pub fn left_join(self, table: TableRef, left: &str, right: &str) -> Self {
        self.join_kind(JoinType::Left, table, left, right)
    }

    /// `RIGHT JOIN table ON left = right`.
    #[must_use]
    pub fn right_join(self, table: TableRef, left: &str, right: &str) -> Self {
        self.join_kind(JoinType::Right, table, left, right)
    }

    /// Joins on a column equality with the given join kind.
    #[must_use]
    pub fn join_kind(self, kind: JoinType, table: TableRef, left: &str, right: &str) -> Self {
        let on = Condition::and(Predicate::Compare {
            field: left.to_string(),
            op: CompareOp::Eq,
            value: Operand::Column(right.to_string()),
        });
        self.join_with(kind, table, vec![on])
    }

    // Ordering, grouping, pagination

    /// Adds an ordering, `-` prefixed for descending.
    #[must_use]
    pub fn order(mut self, spec: &str) -> Self {
        self.plan.order.push(OrderBy::parse(spec));
        self
    }

    /// Adds an ordering.
    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.plan.order.push(order);
        self
    }

    /// Orders randomly, using the dialect's random function.
    #[must_use]
    pub fn order_rand(self) -> Self {
        self.order_by(OrderBy::Random)
    }

    /// Adds a raw ordering expression.
    #[must_use]
    pub fn order_raw(self, expr: Raw) -> Self {
        self.order_by(OrderBy::Raw(expr))
    }

    /// Adds a GROUP BY column.
    #[must_use]
    pub fn group(mut self, column: &str) -> Self {
        self.plan.group.push(column.to_string());
        self
    }

    /// Sets the HAVING predicate.
    #[must_use]
    pub fn having(mut self, expr: Raw) -> Self {
        self.plan.having = Some(expr);
        self
    }

    /// Returns at most `count` rows.
    #[must_use]
    pub const fn limit(mut self, count: u64) -> Self {
        self.plan.limit = Some(Limit::Count(count));
        self
    }

    /// Returns at most `count` rows after skipping `offset`.
    #[must_use]
    pub const fn limit_offset(mut self, offset: u64, count: u64) -> Self {
        self.plan.limit = Some(Limit::Range { offset, count });
        self
    }

    /// Selects a 1-based page of `size` rows.
    ///
    /// Page 0 reads as page 1; offsets past `u64::MAX` saturate.
    #[must_use]
    pub const fn page(self, page: u64, size: u64) -> Self {
        self.limit_offset(page.saturating_sub(1).saturating_mul(size), size)
    }

    /// Clears pagination.
    #[must_use]
    pub const fn unlimited(mut self) -> Self {
        self.plan.limit = None;
        self
    }

    /// Requests (or drops) an exclusive row lock.
    #[must_use]
    pub const fn lock(self, lock: bool) -> Self {
        self.lock_mode(if lock { Lock::Exclusive } else { Lock::None })
    }

    /// Requests a specific lock mode.
    #[must_use]
    pub const fn lock_mode(mut self, lock: Lock) -> Self {
        self.plan.lock = lock;
        self
    }

    /// Appends a trailing comment.
    #[must_use]
    pub fn comment(mut self, comment: &str) -> Self {
        self.plan.comment = Some(comment.to_string());
        self
    }

    /// Validates every column reference against `known`.
    #[must_use]
    pub fn strict(mut self, known: &[&str]) -> Self {
        self.plan.known_fields = Some(known.iter().map(|s| (*s).to_string()).collect());
        self
    }

    /// Replaces the projection with an aggregate.
    #[must_use]
    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.plan.aggregate = Some(aggregate);
        self
    }

    /// `COUNT(field)` projection.
    #[must_use]
    pub fn count(self, field: &str) -> Self {
        self.aggregate(Aggregate::new(AggregateFn::Count, field))
    }

    // Access

    /// Returns the underlying plan.
    #[must_use]
    pub const fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    /// Consumes the builder, returning the plan.
    #[must_use]
    pub fn into_plan(self) -> QueryPlan {
        self.plan
    }

    /// Returns whether a top-level condition constrains `field`.
    #[must_use]
    pub fn has_condition_on(&self, field: &str) -> bool {
        self.plan
            .conditions
            .iter()
            .any(|c| c.predicate.field() == Some(field))
    }
}

impl From<QueryPlan> for Query {
    fn from(plan: QueryPlan) -> Self {
        Self::from_plan(plan)
    }
}
