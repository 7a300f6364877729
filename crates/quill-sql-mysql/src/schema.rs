//! Schema introspection through `SHOW COLUMNS` / `SHOW TABLES`.

use quill_sql_core::{ColumnInfo, Row, SchemaIntrospection, SqlValue, Transport, TransportResult};
use tracing::warn;

/// Reads MySQL schema information over a transport.
#[derive(Debug, Clone, Copy)]
pub struct MysqlSchema<'t, T: ?Sized> {
    transport: &'t T,
}

impl<'t, T: Transport + ?Sized> MysqlSchema<'t, T> {
    /// Creates an introspector over `transport`.
    pub const fn new(transport: &'t T) -> Self {
        Self { transport }
    }

    /// Runs `EXPLAIN` on a statement and returns the first plan row.
    ///
    /// Logs a warning when the plan needs a filesort or a temporary table.
    ///
    /// # Errors
    ///
    /// Any transport failure.
    pub fn explain(&self, sql: &str, params: &[SqlValue]) -> TransportResult<Option<Row>> {
        let row = self
            .transport
            .query(&format!("EXPLAIN {sql}"), params)?
            .into_iter()
            .next();
        if let Some(extra) = row.as_ref().and_then(|r| text(r, "extra")) {
            if extra.contains("filesort") || extra.contains("temporary") {
                warn!(sql = %sql, extra = %extra, "Query plan needs filesort or temporary table");
            }
        }
        Ok(row)
    }
}

/// Quotes a table token for `SHOW COLUMNS`, dropping any alias.
fn quote_table(table: &str) -> String {
    let table = table.split_whitespace().next().unwrap_or_default();
    if table.contains('`') {
        return table.to_string();
    }
    format!("`{}`", table.replace('.', "`.`"))
}

/// Looks a column up case-insensitively and returns it as text.
fn text(row: &Row, column: &str) -> Option<String> {
    let value = row
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(column))
        .map(|(_, v)| v)?;
    value_text(value)
}

fn value_text(value: &SqlValue) -> Option<String> {
    match value {
        SqlValue::Null => None,
        SqlValue::Text(s) => Some(s.clone()),
        SqlValue::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
        SqlValue::Int(n) => Some(n.to_string()),
        SqlValue::Float(f) => Some(f.to_string()),
        SqlValue::Bool(b) => Some(b.to_string()),
        SqlValue::Json(v) => Some(v.as_str().map_or_else(|| v.to_string(), str::to_string)),
    }
}

/// Parses one `SHOW COLUMNS` row.
#[must_use]
pub fn parse_column(row: &Row) -> Option<ColumnInfo> {
    let name = text(row, "field")?;
    let flag = |column: &str, expected: &str| {
        text(row, column).is_some_and(|v| v.eq_ignore_ascii_case(expected))
    };
    Some(ColumnInfo {
        name,
        ty: text(row, "type").unwrap_or_default(),
        nullable: flag("null", "yes"),
        default: text(row, "default"),
        primary_key: flag("key", "pri"),
        auto_increment: flag("extra", "auto_increment"),
    })
}

impl<T: Transport + ?Sized> SchemaIntrospection for MysqlSchema<'_, T> {
    fn columns_of(&self, table: &str) -> TransportResult<Vec<ColumnInfo>> {
        let sql = format!("SHOW COLUMNS FROM {}", quote_table(table));
        Ok(self
            .transport
            .query(&sql, &[])?
            .iter()
            .filter_map(parse_column)
            .collect())
    }

    fn tables_of(&self, database: Option<&str>) -> TransportResult<Vec<String>> {
        let sql = match database.filter(|d| !d.is_empty()) {
            Some(database) => format!("SHOW TABLES FROM {}", quote_table(database)),
            None => String::from("SHOW TABLES"),
        };
        Ok(self
            .transport
            .query(&sql, &[])?
            .iter()
            .filter_map(|row| row.values().next().and_then(value_text))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct Canned {
        rows: Vec<Row>,
        seen: RefCell<Vec<String>>,
    }

    impl Transport for Canned {
        fn query(&self, sql: &str, _params: &[SqlValue]) -> TransportResult<Vec<Row>> {
            self.seen.borrow_mut().push(sql.to_string());
            Ok(self.rows.clone())
        }

        fn execute(&self, _sql: &str, _params: &[SqlValue]) -> TransportResult<u64> {
            Ok(0)
        }

        fn last_insert_id(&self) -> TransportResult<Option<SqlValue>> {
            Ok(None)
        }
    }

    fn row(pairs: &[(&str, SqlValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn t(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    #[test]
    fn test_columns_of_parses_show_columns() {
        let transport = Canned {
            rows: vec![
                row(&[
                    ("Field", t("id")),
                    ("Type", t("int(11) unsigned")),
                    ("Null", t("NO")),
                    ("Key", t("PRI")),
                    ("Default", SqlValue::Null),
                    ("Extra", t("auto_increment")),
                ]),
                row(&[
                    ("Field", t("nickname")),
                    ("Type", t("varchar(64)")),
                    ("Null", t("YES")),
                    ("Key", t("")),
                    ("Default", t("anon")),
                    ("Extra", t("")),
                ]),
            ],
            seen: RefCell::default(),
        };
        let columns = MysqlSchema::new(&transport).columns_of("blog.users u").unwrap();
        assert_eq!(transport.seen.borrow()[0], "SHOW COLUMNS FROM `blog`.`users`");
        assert_eq!(
            columns[0],
            ColumnInfo {
                name: "id".into(),
                ty: "int(11) unsigned".into(),
                nullable: false,
                default: None,
                primary_key: true,
                auto_increment: true,
            }
        );
        assert!(columns[1].nullable);
        assert_eq!(columns[1].default.as_deref(), Some("anon"));
    }

    #[test]
    fn test_tables_of_takes_first_column() {
        let transport = Canned {
            rows: vec![
                row(&[("Tables_in_blog", t("posts"))]),
                row(&[("Tables_in_blog", t("users"))]),
            ],
            seen: RefCell::default(),
        };
        let schema = MysqlSchema::new(&transport);
        assert_eq!(schema.tables_of(Some("blog")).unwrap(), vec!["posts", "users"]);
        assert_eq!(schema.field_names("x").unwrap(), Vec::<String>::new());
        assert_eq!(transport.seen.borrow()[0], "SHOW TABLES FROM `blog`");
    }

    #[test]
    fn test_explain_returns_first_row() {
        let transport = Canned {
            rows: vec![row(&[("id", SqlValue::Int(1)), ("Extra", t("Using filesort"))])],
            seen: RefCell::default(),
        };
        let plan = MysqlSchema::new(&transport)
            .explain("SELECT * FROM t ORDER BY a", &[])
            .unwrap()
            .unwrap();
        assert_eq!(plan.get("id"), Some(&SqlValue::Int(1)));
        assert_eq!(transport.seen.borrow()[0], "EXPLAIN SELECT * FROM t ORDER BY a");
    }
}
