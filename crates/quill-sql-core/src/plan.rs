//! The dialect-neutral query plan.
//!
//! A [`QueryPlan`] is plain data describing one SELECT statement. It is
//! assembled through the fluent [`Query`](crate::builder::Query) and handed
//! to a [`Dialect`](crate::dialect::Dialect) by shared reference, so a render
//! call can never change it.

use crate::builder::expr::{Condition, Raw};

/// A table reference with an optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    /// Table name.
    pub name: String,
    /// Alias.
    pub alias: Option<String>,
}

impl TableRef {
    /// Creates a table reference without alias.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// Creates an aliased table reference.
    #[must_use]
    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }
}

/// Join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    /// INNER JOIN
    #[default]
    Inner,
    /// LEFT JOIN
    Left,
    /// RIGHT JOIN
    Right,
}

impl JoinType {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }
}

/// A join clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Joined table.
    pub table: TableRef,
    /// ON conditions.
    pub on: Vec<Condition>,
    /// Join kind.
    pub kind: JoinType,
}

/// A projected field.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A column (or `*`, or `table.*`), optionally aliased.
    Column {
        /// Column token.
        name: String,
        /// Alias.
        alias: Option<String>,
    },
    /// A raw expression, optionally aliased.
    Raw {
        /// Expression.
        expr: Raw,
        /// Alias.
        alias: Option<String>,
    },
    /// A scalar subquery, always aliased.
    Subquery {
        /// Subquery plan.
        query: Box<QueryPlan>,
        /// Alias.
        alias: String,
    },
}

/// Order direction for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending order (ASC)
    Asc,
    /// Descending order (DESC)
    Desc,
}

/// An ordering specification.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderBy {
    /// Order by a column.
    Column {
        /// Column to order by
        column: String,
        /// Order direction
        direction: OrderDirection,
    },
    /// The dialect's pseudo-random order.
    Random,
    /// A raw ordering expression.
    Raw(Raw),
}

impl OrderBy {
    /// Creates a new ascending order specification.
    #[must_use]
    pub fn asc(column: &str) -> Self {
        Self::Column {
            column: column.to_string(),
            direction: OrderDirection::Asc,
        }
    }

    /// Creates a new descending order specification.
    #[must_use]
    pub fn desc(column: &str) -> Self {
        Self::Column {
            column: column.to_string(),
            direction: OrderDirection::Desc,
        }
    }

    /// Parses an order specification.
    ///
    /// Prefix with `-` for descending order.
    /// Example: `"-created_at"` for descending, `"name"` for ascending.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        if let Some(column) = spec.strip_prefix('-') {
            Self::desc(column)
        } else {
            Self::asc(spec)
        }
    }
}

/// Pagination bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// First `n` rows.
    Count(u64),
    /// `count` rows after skipping `offset`.
    Range {
        /// Rows to skip.
        offset: u64,
        /// Rows to return.
        count: u64,
    },
}

impl Limit {
    /// Returns `(offset, count)`, with a zero offset for [`Limit::Count`].
    #[must_use]
    pub const fn bounds(self) -> (u64, u64) {
        match self {
            Self::Count(count) => (0, count),
            Self::Range { offset, count } => (offset, count),
        }
    }
}

/// Row lock requested by a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lock {
    /// No lock.
    #[default]
    None,
    /// Exclusive row lock.
    Exclusive,
    /// Shared row lock.
    Shared,
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    /// COUNT
    Count,
    /// SUM
    Sum,
    /// AVG
    Avg,
    /// MAX
    Max,
    /// MIN
    Min,
}

impl AggregateFn {
    /// Returns the SQL function name.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Max => "MAX",
            Self::Min => "MIN",
        }
    }
}

/// Column alias under which an aggregate result is projected.
pub const AGGREGATE_ALIAS: &str = "aggregate";

/// An aggregate projection replacing the field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    /// Function.
    pub func: AggregateFn,
    /// Column, or `*`.
    pub field: String,
    /// Whether to aggregate only distinct values.
    pub distinct: bool,
}

impl Aggregate {
    /// Creates a COUNT(*) aggregate.
    #[must_use]
    pub fn count_all() -> Self {
        Self::new(AggregateFn::Count, "*")
    }

    /// Creates an aggregate over a column.
    #[must_use]
    pub fn new(func: AggregateFn, field: &str) -> Self {
        Self {
            func,
            field: field.to_string(),
            distinct: false,
        }
    }
}

/// Dialect-neutral representation of one SELECT statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryPlan {
    /// FROM tables.
    pub tables: Vec<TableRef>,
    /// Join clauses, in order.
    pub joins: Vec<Join>,
    /// WHERE conditions, in order.
    pub conditions: Vec<Condition>,
    /// Projected fields; empty means `*`.
    pub fields: Vec<Field>,
    /// SELECT DISTINCT.
    pub distinct: bool,
    /// GROUP BY columns.
    pub group: Vec<String>,
    /// HAVING predicate.
    pub having: Option<Raw>,
    /// ORDER BY specifications.
    pub order: Vec<OrderBy>,
    /// Pagination.
    pub limit: Option<Limit>,
    /// Row lock.
    pub lock: Lock,
    /// Aggregate projection.
    pub aggregate: Option<Aggregate>,
    /// Trailing SQL comment.
    pub comment: Option<String>,
    /// Known columns; when set, column references are validated strictly.
    pub known_fields: Option<Vec<String>>,
}

impl QueryPlan {
    /// Returns the primary table name.
    #[must_use]
    pub fn table_name(&self) -> Option<&str> {
        self.tables.first().map(|t| t.name.as_str())
    }

    /// Resolves a table name to the alias declared for it, if any.
    #[must_use]
    pub fn alias_for(&self, table: &str) -> Option<&str> {
        self.tables
            .iter()
            .chain(self.joins.iter().map(|j| &j.table))
            .find(|t| t.name == table)
            .and_then(|t| t.alias.as_deref())
    }
}
