//! Schema introspection interface.

use serde::{Deserialize, Serialize};

use crate::transport::TransportResult;

/// One column as reported by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared type, as the server spells it.
    #[serde(rename = "type")]
    pub ty: String,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Default value, if any.
    pub default: Option<String>,
    /// Whether the column is (part of) the primary key.
    pub primary_key: bool,
    /// Whether the server generates values for the column.
    pub auto_increment: bool,
}

/// Lists tables and their columns.
pub trait SchemaIntrospection {
    /// Returns the columns of `table`, in declaration order.
    ///
    /// # Errors
    ///
    /// Any transport failure.
    fn columns_of(&self, table: &str) -> TransportResult<Vec<ColumnInfo>>;

    /// Returns the table names of `database`, or of the current one.
    ///
    /// # Errors
    ///
    /// Any transport failure.
    fn tables_of(&self, database: Option<&str>) -> TransportResult<Vec<String>>;

    /// Returns the column names of `table`, for strict field validation.
    ///
    /// # Errors
    ///
    /// Any transport failure.
    fn field_names(&self, table: &str) -> TransportResult<Vec<String>> {
        Ok(self
            .columns_of(table)?
            .into_iter()
            .map(|c| c.name)
            .collect())
    }
}
