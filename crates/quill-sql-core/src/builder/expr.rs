//! Predicate and operand types.
//!
//! Operands are a tagged union so that the dialect can decide, per variant,
//! whether a token is bound as a parameter, parsed as a column reference or
//! spliced verbatim.

use std::fmt;

use super::value::{SqlValue, ToSqlValue};
use crate::plan::QueryPlan;

/// A raw SQL fragment with its own positional (`?`) parameters.
///
/// **Warning**: Only use this for SQL fragments that don't contain user input.
#[derive(Debug, Clone, PartialEq)]
pub struct Raw {
    /// SQL text, using `?` for each parameter.
    pub sql: String,
    /// Parameters, in placeholder order.
    pub params: Vec<SqlValue>,
}

impl Raw {
    /// Creates a raw fragment without parameters.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: vec![],
        }
    }

    /// Creates a raw fragment with parameters.
    #[must_use]
    pub fn with_params(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Appends a parameter for the next `?`.
    #[must_use]
    pub fn with(mut self, value: impl ToSqlValue) -> Self {
        self.params.push(value.to_sql_value());
        self
    }
}

/// Creates a raw SQL fragment.
#[must_use]
pub fn raw(sql: impl Into<String>) -> Raw {
    Raw::new(sql)
}

/// The right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A literal, bound as a parameter.
    Value(SqlValue),
    /// A column reference, parsed by the dialect.
    Column(String),
    /// A raw fragment, spliced verbatim.
    Raw(Raw),
}

impl<T: ToSqlValue> From<T> for Operand {
    fn from(value: T) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl From<Raw> for Operand {
    fn from(value: Raw) -> Self {
        Self::Raw(value)
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal (=)
    Eq,
    /// Not equal (<>)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
    /// LIKE
    Like,
    /// NOT LIKE
    NotLike,
}

impl CompareOp {
    /// Returns the SQL operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }

    /// Parses an operator token such as `">="` or `"like"`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "=" | "EQ" => Some(Self::Eq),
            "<>" | "!=" | "NEQ" => Some(Self::Ne),
            ">" | "GT" => Some(Self::Gt),
            ">=" | "EGT" => Some(Self::Gte),
            "<" | "LT" => Some(Self::Lt),
            "<=" | "ELT" => Some(Self::Lte),
            "LIKE" => Some(Self::Like),
            "NOT LIKE" => Some(Self::NotLike),
            _ => None,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// How a condition is joined to the conditions before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Logic {
    /// AND
    #[default]
    And,
    /// OR
    Or,
}

impl Logic {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A single predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field op operand`
    Compare {
        /// Left-hand column.
        field: String,
        /// Operator.
        op: CompareOp,
        /// Right-hand side.
        value: Operand,
    },
    /// `field [NOT] IN (...)`
    In {
        /// Column.
        field: String,
        /// Candidate values.
        values: Vec<SqlValue>,
        /// NOT IN when set.
        negated: bool,
    },
    /// `field IS [NOT] NULL`
    Null {
        /// Column.
        field: String,
        /// IS NOT NULL when set.
        negated: bool,
    },
    /// `field [NOT] BETWEEN low AND high`
    Between {
        /// Column.
        field: String,
        /// Lower bound.
        low: SqlValue,
        /// Upper bound.
        high: SqlValue,
        /// NOT BETWEEN when set.
        negated: bool,
    },
    /// A column followed by a raw expression, e.g. `score` + `> avg_score`.
    Exp {
        /// Column.
        field: String,
        /// Raw remainder.
        expr: Raw,
    },
    /// `[NOT] EXISTS (subquery)`
    Exists {
        /// Subquery.
        query: Box<QueryPlan>,
        /// NOT EXISTS when set.
        negated: bool,
    },
    /// `(scalar subquery) op value`
    Subquery {
        /// Subquery producing one value.
        query: Box<QueryPlan>,
        /// Operator.
        op: CompareOp,
        /// Right-hand value, bound as a parameter.
        value: SqlValue,
    },
    /// Raw SQL predicate.
    Raw(Raw),
    /// Parenthesized group of conditions.
    Group(Vec<Condition>),
}

impl Predicate {
    /// Returns the column this predicate constrains, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Compare { field, .. }
            | Self::In { field, .. }
            | Self::Null { field, .. }
            | Self::Between { field, .. }
            | Self::Exp { field, .. } => Some(field),
            Self::Exists { .. } | Self::Subquery { .. } | Self::Raw(_) | Self::Group(_) => None,
        }
    }

    fn field_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Compare { field, .. }
            | Self::In { field, .. }
            | Self::Null { field, .. }
            | Self::Between { field, .. }
            | Self::Exp { field, .. } => Some(field),
            Self::Exists { .. } | Self::Subquery { .. } | Self::Raw(_) | Self::Group(_) => None,
        }
    }
}

/// A predicate together with its logical connector.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Connector to the previous condition (ignored for the first one).
    pub logic: Logic,
    /// The predicate.
    pub predicate: Predicate,
}

impl Condition {
    /// Creates an AND condition.
    #[must_use]
    pub const fn and(predicate: Predicate) -> Self {
        Self {
            logic: Logic::And,
            predicate,
        }
    }

    /// Creates an OR condition.
    #[must_use]
    pub const fn or(predicate: Predicate) -> Self {
        Self {
            logic: Logic::Or,
            predicate,
        }
    }

    /// Prefixes an unqualified column with `qualifier.`, recursing into groups.
    pub fn qualify(&mut self, qualifier: &str) {
        match &mut self.predicate {
            Predicate::Group(inner) => inner.iter_mut().for_each(|c| c.qualify(qualifier)),
            predicate => {
                if let Some(field) = predicate.field_mut() {
                    if !field.contains('.') && !field.contains('(') {
                        *field = format!("{qualifier}.{field}");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_op_parse() {
        assert_eq!(CompareOp::parse(">="), Some(CompareOp::Gte));
        assert_eq!(CompareOp::parse("egt"), Some(CompareOp::Gte));
        assert_eq!(CompareOp::parse("!="), Some(CompareOp::Ne));
        assert_eq!(CompareOp::parse("not like"), Some(CompareOp::NotLike));
        assert_eq!(CompareOp::parse("~"), None);
    }

    #[test]
    fn test_qualify_skips_qualified_fields() {
        let mut plain = Condition::and(Predicate::Null {
            field: "deleted_at".into(),
            negated: false,
        });
        plain.qualify("Post");
        assert_eq!(plain.predicate.field(), Some("Post.deleted_at"));

        let mut qualified = Condition::and(Predicate::Null {
            field: "User.deleted_at".into(),
            negated: false,
        });
        qualified.qualify("Post");
        assert_eq!(qualified.predicate.field(), Some("User.deleted_at"));
    }

    #[test]
    fn test_qualify_recurses_into_groups() {
        let mut group = Condition::and(Predicate::Group(vec![Condition::or(Predicate::Compare {
            field: "status".into(),
            op: CompareOp::Eq,
            value: 1.into(),
        })]));
        group.qualify("Comment");
        match group.predicate {
            Predicate::Group(inner) => assert_eq!(inner[0].predicate.field(), Some("Comment.status")),
            other => panic!("expected group, got {other:?}"),
        }
    }
}
