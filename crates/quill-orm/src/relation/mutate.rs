//! Writes through a relation.

use quill_sql_core::{Delete, Insert, Row, SqlValue, ToSqlValue};
use tracing::warn;

use super::{Relation, RelationKind};
use crate::db::Db;
use crate::error::{OrmError, Result};
use crate::record::{ParentRef, Record, Related};

/// Outcome of [`Relation::save_all`].
#[derive(Debug)]
pub enum BatchSave {
    /// Nothing was given to save.
    Empty,
    /// Every record was saved.
    Complete(Vec<Record>),
    /// At least one record failed; results keep input order.
    Partial(Vec<Result<Record>>),
}

impl BatchSave {
    /// Returns whether every given record was saved.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

fn key_value(record: &Record, column: &str) -> Result<SqlValue> {
    record
        .get(column)
        .filter(|value| !value.is_null())
        .cloned()
        .ok_or_else(|| OrmError::MissingKey(column.to_string()))
}

impl Relation {
    /// Points `owner` at `related` and saves the owner.
    ///
    /// # Errors
    ///
    /// Anything but `BelongsTo`, a related record without the referenced
    /// key, or a failing save.
    pub fn associate(&self, db: &Db, owner: &mut Record, mut related: Record) -> Result<()> {
        let RelationKind::BelongsTo {
            foreign_key,
            owner_key,
        } = self.def.kind
        else {
            return Err(self.unsupported("associate"));
        };
        owner.set(foreign_key, key_value(&related, owner_key)?);
        owner.save(db)?;
        related.set_parent(ParentRef::of(owner, None));
        owner.set_relation(self.def.name, Related::One(Box::new(related)));
        Ok(())
    }

    /// Clears the owner's foreign key and saves the owner.
    ///
    /// # Errors
    ///
    /// Anything but `BelongsTo`, or a failing save.
    pub fn dissociate(&self, db: &Db, owner: &mut Record) -> Result<()> {
        let RelationKind::BelongsTo { foreign_key, .. } = self.def.kind else {
            return Err(self.unsupported("dissociate"));
        };
        owner.set(foreign_key, SqlValue::Null);
        owner.save(db)?;
        owner.set_relation(self.def.name, Related::Absent);
        Ok(())
    }

    /// Creates a related record linked to `owner`.
    ///
    /// Child kinds stamp the owner key (and the morph type) onto `data`;
    /// `BelongsToMany` inserts the record and then a pivot row.
    ///
    /// # Errors
    ///
    /// `BelongsTo`, an owner without the needed key, or a failing statement.
    pub fn save(&self, db: &Db, owner: &Record, data: Row) -> Result<Record> {
        let mut record = Record::new(self.def.related).fill(data);
        match self.def.kind {
            RelationKind::BelongsTo { .. } => return Err(self.unsupported("save")),
            RelationKind::HasOne {
                foreign_key,
                local_key,
            }
            | RelationKind::HasMany {
                foreign_key,
                local_key,
            } => {
                record.set(foreign_key, key_value(owner, local_key)?);
                record.save(db)?;
            }
            RelationKind::MorphOne {
                morph_key,
                morph_type,
                type_tag,
            }
            | RelationKind::MorphMany {
                morph_key,
                morph_type,
                type_tag,
            } => {
                record
                    .set(morph_key, key_value(owner, owner.model().pk)?)
                    .set(morph_type, type_tag);
                record.save(db)?;
            }
            RelationKind::BelongsToMany { .. } => {
                key_value(owner, owner.model().pk)?;
                record.save(db)?;
                let related_key = key_value(&record, self.def.related.pk)?;
                self.attach(db, owner, related_key, Row::new())?;
            }
        }
        record.set_parent(ParentRef::of(owner, None));
        Ok(record)
    }

    /// Saves each row of `data_set` through [`Relation::save`].
    ///
    /// Failures do not stop the batch; they are logged and reported in
    /// [`BatchSave::Partial`].
    ///
    /// # Errors
    ///
    /// `BelongsTo`, which cannot save children.
    pub fn save_all(&self, db: &Db, owner: &Record, data_set: Vec<Row>) -> Result<BatchSave> {
        if matches!(self.def.kind, RelationKind::BelongsTo { .. }) {
            return Err(self.unsupported("save_all"));
        }
        if data_set.is_empty() {
            return Ok(BatchSave::Empty);
        }
        let results: Vec<Result<Record>> = data_set
            .into_iter()
            .enumerate()
            .map(|(index, data)| {
                self.save(db, owner, data).inspect_err(|err| {
                    warn!(relation = self.def.name, index, error = %err, "Related record not saved");
                })
            })
            .collect();
        if results.iter().all(Result::is_ok) {
            Ok(BatchSave::Complete(results.into_iter().flatten().collect()))
        } else {
            Ok(BatchSave::Partial(results))
        }
    }

    /// Inserts a pivot row linking `owner` to the related key.
    ///
    /// # Errors
    ///
    /// Anything but `BelongsToMany`, an owner without a primary key, or a
    /// failing insert.
    pub fn attach(
        &self,
        db: &Db,
        owner: &Record,
        related_key: impl ToSqlValue,
        pivot_data: Row,
    ) -> Result<u64> {
        let RelationKind::BelongsToMany {
            pivot,
            foreign_key,
            local_key,
        } = self.def.kind
        else {
            return Err(self.unsupported("attach"));
        };
        let mut row = pivot_data;
        row.insert(local_key.to_string(), key_value(owner, owner.model().pk)?);
        row.insert(foreign_key.to_string(), related_key.to_sql_value());
        db.insert(&Insert::new().into_table(pivot).row(&row))
    }

    /// Deletes pivot rows of `owner`, all of them when `related_keys` is
    /// empty.
    ///
    /// # Errors
    ///
    /// Anything but `BelongsToMany`, an owner without a primary key, or a
    /// failing delete.
    pub fn detach(&self, db: &Db, owner: &Record, related_keys: &[SqlValue]) -> Result<u64> {
        let RelationKind::BelongsToMany {
            pivot,
            foreign_key,
            local_key,
        } = self.def.kind
        else {
            return Err(self.unsupported("detach"));
        };
        let mut delete = Delete::new()
            .from(pivot)
            .where_eq(local_key, key_value(owner, owner.model().pk)?);
        if !related_keys.is_empty() {
            delete = delete.where_in(foreign_key, related_keys);
        }
        db.delete(&delete)
    }
}
