#![allow(dead_code)]

use quill_sql_core::{BuildError, Dialect, GenericDialect, Query, SqlValue};

pub fn render(query: &Query) -> (String, Vec<SqlValue>) {
    GenericDialect
        .render_select(query.plan())
        .unwrap_or_else(|e| panic!("Failed to render: {query:?}\nError: {e:?}"))
}

pub fn render_sql(query: &Query) -> String {
    render(query).0
}

pub fn render_err(query: &Query) -> BuildError {
    GenericDialect
        .render_select(query.plan())
        .expect_err(&format!("Expected render error for: {query:?}"))
}

/// Asserts that the text holds exactly one placeholder per parameter.
pub fn assert_balanced(sql: &str, params: &[SqlValue]) {
    let placeholders = sql.matches('?').count();
    assert_eq!(
        placeholders,
        params.len(),
        "Placeholder mismatch.\n  SQL:    {sql}\n  Params: {params:?}"
    );
}
