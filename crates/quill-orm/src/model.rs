//! Model definitions.
//!
//! A model is described by a `static` [`ModelDef`]: its name, table,
//! primary key and the relations it declares. Definitions refer to each
//! other by `&'static` reference, so two models can point at one another:
//!
//! ```rust
//! use quill_orm::{ModelDef, RelationDef};
//!
//! static USER_RELATIONS: [RelationDef; 1] =
//!     [RelationDef::has_many("posts", &POST, "user_id", "id")];
//! static USER: ModelDef = ModelDef::new("User", "users").relations(&USER_RELATIONS);
//!
//! static POST_RELATIONS: [RelationDef; 1] =
//!     [RelationDef::belongs_to("author", &USER, "user_id", "id")];
//! static POST: ModelDef = ModelDef::new("Post", "posts").relations(&POST_RELATIONS);
//!
//! assert_eq!(USER.relation("posts").unwrap().related.table, "posts");
//! assert_eq!(POST.relation("author").unwrap().related.name, "User");
//! ```

use quill_sql_core::ToSqlValue;

use crate::db::Db;
use crate::error::{OrmError, Result};
use crate::query::ModelQuery;
use crate::record::Record;
use crate::relation::RelationDef;

/// Static description of a model.
#[derive(Debug)]
pub struct ModelDef {
    /// Model name, used as the table alias in relation subqueries.
    pub name: &'static str,
    /// Table name.
    pub table: &'static str,
    /// Primary key column.
    pub pk: &'static str,
    /// Declared relations.
    pub relations: &'static [RelationDef],
}

impl ModelDef {
    /// Creates a definition with an `id` primary key and no relations.
    #[must_use]
    pub const fn new(name: &'static str, table: &'static str) -> Self {
        Self {
            name,
            table,
            pk: "id",
            relations: &[],
        }
    }

    /// Sets the primary key column.
    #[must_use]
    pub const fn pk(mut self, pk: &'static str) -> Self {
        self.pk = pk;
        self
    }

    /// Sets the declared relations.
    #[must_use]
    pub const fn relations(mut self, relations: &'static [RelationDef]) -> Self {
        self.relations = relations;
        self
    }

    /// Looks a relation up by name.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&'static RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Looks a relation up by name, failing if it is not declared.
    ///
    /// # Errors
    ///
    /// [`OrmError::UnknownRelation`].
    pub fn require_relation(&self, name: &str) -> Result<&'static RelationDef> {
        self.relation(name).ok_or_else(|| OrmError::UnknownRelation {
            model: self.name,
            relation: name.to_string(),
        })
    }

    /// Starts a query over this model's table.
    #[must_use]
    pub fn query(&'static self) -> ModelQuery<'static> {
        ModelQuery::new(self)
    }

    /// Creates an unsaved record of this model.
    #[must_use]
    pub fn record(&'static self) -> Record {
        Record::new(self)
    }

    /// Fetches one record by primary key.
    ///
    /// # Errors
    ///
    /// Rendering or transport failure.
    pub fn get(&'static self, db: &Db, key: impl ToSqlValue) -> Result<Option<Record>> {
        self.query().where_eq(self.pk, key.to_sql_value()).find(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TAG: ModelDef = ModelDef::new("Tag", "tags").pk("tag_id");

    #[test]
    fn test_model_def_defaults() {
        let def = ModelDef::new("User", "users");
        assert_eq!(def.pk, "id");
        assert!(def.relations.is_empty());
        assert_eq!(TAG.pk, "tag_id");
    }

    #[test]
    fn test_unknown_relation() {
        let err = TAG.require_relation("posts").unwrap_err();
        assert_eq!(err.to_string(), "unknown relation `posts` on Tag");
    }
}
