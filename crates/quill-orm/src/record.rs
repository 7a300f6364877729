//! Records: rows bound to a model.

use indexmap::IndexMap;
use quill_sql_core::{Delete, Insert, KeyValue, Query, Row, SqlValue, ToSqlValue, Update};
use serde_json::{Map, Value};

use crate::db::Db;
use crate::error::{OrmError, Result};
use crate::model::ModelDef;
use crate::relation::Relation;

/// The resolved value of one relation slot on a record.
#[derive(Debug, Clone)]
pub enum Related {
    /// A single related record.
    One(Box<Record>),
    /// A collection of related records, possibly empty.
    Many(Vec<Record>),
    /// A single-valued relation with no match.
    Absent,
}

impl Related {
    /// Returns the record of a single-valued relation.
    #[must_use]
    pub fn as_one(&self) -> Option<&Record> {
        match self {
            Self::One(record) => Some(&**record),
            Self::Many(_) | Self::Absent => None,
        }
    }

    /// Returns the related records as a slice.
    #[must_use]
    pub fn as_many(&self) -> &[Record] {
        match self {
            Self::One(record) => std::slice::from_ref(&**record),
            Self::Many(records) => records,
            Self::Absent => &[],
        }
    }

    /// Returns whether the slot holds nothing.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    fn to_json(&self) -> Value {
        match self {
            Self::One(record) => record.to_json(),
            Self::Many(records) => Value::Array(records.iter().map(Record::to_json).collect()),
            Self::Absent => Value::Null,
        }
    }
}

/// Back-reference from a related record to the record that loaded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    /// Owner model name.
    pub model: &'static str,
    /// Owner primary key.
    pub key: Option<KeyValue>,
    /// Position of the owner in the batch it was loaded with.
    pub index: Option<usize>,
}

impl ParentRef {
    /// Builds a reference to `owner`.
    #[must_use]
    pub fn of(owner: &Record, index: Option<usize>) -> Self {
        Self {
            model: owner.model.name,
            key: owner.key(),
            index,
        }
    }
}

/// A row of a model's table, with change tracking and loaded relations.
#[derive(Debug, Clone)]
pub struct Record {
    model: &'static ModelDef,
    data: Row,
    origin: Row,
    appended: Row,
    exists: bool,
    pivot: Option<Row>,
    parent: Option<ParentRef>,
    relations: IndexMap<String, Related>,
}

impl Record {
    /// Creates an unsaved record.
    #[must_use]
    pub fn new(model: &'static ModelDef) -> Self {
        Self {
            model,
            data: Row::new(),
            origin: Row::new(),
            appended: Row::new(),
            exists: false,
            pivot: None,
            parent: None,
            relations: IndexMap::new(),
        }
    }

    /// Wraps a fetched row.
    #[must_use]
    pub fn from_row(model: &'static ModelDef, row: Row) -> Self {
        Self {
            origin: row.clone(),
            data: row,
            exists: true,
            ..Self::new(model)
        }
    }

    /// Returns the model.
    #[must_use]
    pub const fn model(&self) -> &'static ModelDef {
        self.model
    }

    /// Returns a column value, falling back to bound attributes.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.data.get(column).or_else(|| self.appended.get(column))
    }

    /// Sets a column value.
    pub fn set(&mut self, column: &str, value: impl ToSqlValue) -> &mut Self {
        self.data.insert(column.to_string(), value.to_sql_value());
        self
    }

    /// Sets a column value, builder style.
    #[must_use]
    pub fn with(mut self, column: &str, value: impl ToSqlValue) -> Self {
        self.set(column, value);
        self
    }

    /// Sets every column of `row`.
    #[must_use]
    pub fn fill(mut self, row: Row) -> Self {
        self.data.extend(row);
        self
    }

    /// Returns the column values.
    #[must_use]
    pub const fn data(&self) -> &Row {
        &self.data
    }

    /// Returns the primary key.
    #[must_use]
    pub fn key(&self) -> Option<KeyValue> {
        self.key_of(self.model.pk)
    }

    /// Returns a column as a join key; NULL and unset columns have none.
    #[must_use]
    pub fn key_of(&self, column: &str) -> Option<KeyValue> {
        self.get(column).and_then(SqlValue::as_key)
    }

    /// Returns whether the record is persisted.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.exists
    }

    /// Columns changed since the record was fetched or last saved.
    #[must_use]
    pub fn changes(&self) -> Vec<(&str, &SqlValue)> {
        self.data
            .iter()
            .filter(|(column, value)| self.origin.get(column.as_str()) != Some(*value))
            .map(|(column, value)| (column.as_str(), value))
            .collect()
    }

    /// Returns the owner this record was loaded through.
    #[must_use]
    pub const fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    pub(crate) fn set_parent(&mut self, parent: ParentRef) {
        self.parent = Some(parent);
    }

    /// Returns the pivot row of a many-to-many match.
    #[must_use]
    pub const fn pivot(&self) -> Option<&Row> {
        self.pivot.as_ref()
    }

    pub(crate) fn set_pivot(&mut self, pivot: Row) {
        self.pivot = Some(pivot);
    }

    /// Copies an attribute from a related record onto this one.
    ///
    /// Bound attributes are readable through [`Record::get`] but never
    /// saved.
    pub(crate) fn bind_attr(&mut self, alias: &str, value: SqlValue) -> Result<()> {
        if self.data.contains_key(alias) || self.appended.contains_key(alias) {
            return Err(OrmError::BindConflict(alias.to_string()));
        }
        self.appended.insert(alias.to_string(), value);
        Ok(())
    }

    /// Returns a loaded relation.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&Related> {
        self.relations.get(name)
    }

    /// Stores a relation value.
    pub fn set_relation(&mut self, name: &str, related: Related) {
        self.relations.insert(name.to_string(), related);
    }

    /// Forgets one loaded relation.
    pub fn reset_relation(&mut self, name: &str) -> Option<Related> {
        self.relations.shift_remove(name)
    }

    /// Forgets every loaded relation.
    pub fn reset_relations(&mut self) {
        self.relations.clear();
    }

    /// Loads a relation on first access and caches it.
    ///
    /// # Errors
    ///
    /// An undeclared relation, or a failing query.
    pub fn load(&mut self, db: &Db, name: &str) -> Result<&Related> {
        self.load_with(db, name, &[], None)
    }

    /// Like [`Record::load`], with nested relations and a scope.
    ///
    /// # Errors
    ///
    /// An undeclared relation, or a failing query.
    pub fn load_with(
        &mut self,
        db: &Db,
        name: &str,
        nested: &[&str],
        scope: Option<&dyn Fn(Query) -> Query>,
    ) -> Result<&Related> {
        if !self.relations.contains_key(name) {
            let def = self.model.require_relation(name)?;
            let related = Relation::new(self.model, def).resolve(db, self, nested, scope)?;
            self.relations.insert(name.to_string(), related);
        }
        Ok(&self.relations[name])
    }

    /// Inserts a new record or updates the changed columns of a persisted one.
    ///
    /// Returns `false` when there was nothing to write.
    ///
    /// # Errors
    ///
    /// A persisted record without a primary key, or a failing statement.
    pub fn save(&mut self, db: &Db) -> Result<bool> {
        let pk = self.model.pk;
        if self.exists {
            let changes = self.changes();
            if changes.is_empty() {
                return Ok(false);
            }
            let key = self
                .origin
                .get(pk)
                .or_else(|| self.data.get(pk))
                .filter(|v| !v.is_null())
                .cloned()
                .ok_or_else(|| OrmError::MissingKey(pk.to_string()))?;
            let update = changes
                .into_iter()
                .fold(Update::new().table(self.model.table), |update, (column, value)| {
                    update.set(column, value)
                })
                .where_eq(pk, key);
            db.update(&update)?;
        } else {
            let insert = Insert::new().into_table(self.model.table).row(&self.data);
            db.insert(&insert)?;
            if self.data.get(pk).is_none_or(SqlValue::is_null) {
                if let Some(id) = db.last_insert_id()? {
                    self.data.insert(pk.to_string(), id);
                }
            }
            self.exists = true;
        }
        self.origin = self.data.clone();
        Ok(true)
    }

    /// Deletes a persisted record by primary key.
    ///
    /// # Errors
    ///
    /// A record without a primary key, or a failing statement.
    pub fn delete(&mut self, db: &Db) -> Result<bool> {
        if !self.exists {
            return Ok(false);
        }
        let pk = self.model.pk;
        let key = self
            .data
            .get(pk)
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| OrmError::MissingKey(pk.to_string()))?;
        db.delete(&Delete::new().from(self.model.table).where_eq(pk, key))?;
        self.exists = false;
        Ok(true)
    }

    /// Serializes columns, bound attributes, pivot and loaded relations.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object: Map<String, Value> = self
            .data
            .iter()
            .chain(&self.appended)
            .map(|(k, v)| (k.clone(), serde_json::to_value(v).unwrap_or(Value::Null)))
            .collect();
        if let Some(pivot) = &self.pivot {
            object.insert(
                String::from("pivot"),
                serde_json::to_value(pivot).unwrap_or(Value::Null),
            );
        }
        for (name, related) in &self.relations {
            object.insert(name.clone(), related.to_json());
        }
        Value::Object(object)
    }
}
