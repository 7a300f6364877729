//! Batched eager loading.
//!
//! Each relation level costs one query: owner keys are collected, deduped
//! and fetched with a single `IN`, and the rows are partitioned back onto
//! their owners by join key.

use std::collections::HashMap;

use indexmap::IndexMap;
use quill_sql_core::{KeyValue, Query, SqlValue};
use tracing::debug;

use super::{Relation, RelationKind};
use crate::db::Db;
use crate::error::Result;
use crate::model::ModelDef;
use crate::record::{ParentRef, Record, Related};

/// Groups dotted paths by their first segment.
///
/// `["posts.comments", "posts", "profile"]` becomes
/// `{"posts": ["comments"], "profile": []}`.
fn group_paths<'a>(paths: &[&'a str]) -> IndexMap<&'a str, Vec<&'a str>> {
    let mut groups: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for &path in paths {
        let path = path.trim();
        if path.is_empty() {
            continue;
        }
        match path.split_once('.') {
            Some((head, rest)) => groups.entry(head).or_default().push(rest),
            None => {
                groups.entry(path).or_default();
            }
        }
    }
    groups
}

/// Eager loads dotted relation `paths` onto `records` of `model`.
///
/// # Errors
///
/// An undeclared relation, or a failing query.
pub fn load_nested(
    db: &Db,
    records: &mut [Record],
    model: &'static ModelDef,
    paths: &[&str],
) -> Result<()> {
    for (name, nested) in group_paths(paths) {
        let def = model.require_relation(name)?;
        Relation::new(model, def).eager_many(db, records, &nested, None)?;
    }
    Ok(())
}

impl Relation {
    /// Loads this relation for every owner in `records` with one query.
    ///
    /// Owners without a key, or without matches, get an empty collection or
    /// [`Related::Absent`]. When the declaration binds attributes, single
    /// matches are copied onto the owner instead of stored as a relation.
    ///
    /// # Errors
    ///
    /// A failing query, an unknown nested relation, or a bound attribute
    /// clashing with an owner attribute.
    pub fn eager_many(
        &mut self,
        db: &Db,
        records: &mut [Record],
        nested: &[&str],
        scope: Option<&dyn Fn(Query) -> Query>,
    ) -> Result<()> {
        let owner_column = self.owner_column();
        // First raw value seen per join key; that value is what gets bound.
        let mut keys: IndexMap<KeyValue, SqlValue> = IndexMap::new();
        for value in records.iter().filter_map(|record| record.get(owner_column)) {
            if let Some(key) = value.as_key() {
                keys.entry(key).or_insert_with(|| value.clone());
            }
        }
        let mut matches: HashMap<KeyValue, Vec<Record>> = HashMap::new();
        if keys.is_empty() {
            debug!(relation = self.def.name, "No owner keys, skipping eager load");
        } else {
            for record in self.fetch_batch(db, &keys, nested, scope)? {
                if let Some(key) = self.match_key(&record) {
                    matches.entry(key).or_default().push(record);
                }
            }
        }
        for (index, owner) in records.iter_mut().enumerate() {
            let parent = ParentRef::of(owner, Some(index));
            let related: Vec<Record> = owner
                .key_of(owner_column)
                .and_then(|key| matches.get(&key))
                .into_iter()
                .flatten()
                .map(|record| {
                    let mut record = record.clone();
                    record.set_parent(parent.clone());
                    record
                })
                .collect();
            if self.def.kind.is_many() {
                owner.set_relation(self.def.name, Related::Many(related));
            } else {
                self.assign_one(owner, related.into_iter().next())?;
            }
        }
        Ok(())
    }

    /// Loads this relation for a single owner.
    ///
    /// # Errors
    ///
    /// See [`Relation::eager_many`].
    pub fn eager_one(
        &mut self,
        db: &Db,
        record: &mut Record,
        nested: &[&str],
        scope: Option<&dyn Fn(Query) -> Query>,
    ) -> Result<()> {
        self.eager_many(db, std::slice::from_mut(record), nested, scope)
    }

    fn fetch_batch(
        &mut self,
        db: &Db,
        keys: &IndexMap<KeyValue, SqlValue>,
        nested: &[&str],
        scope: Option<&dyn Fn(Query) -> Query>,
    ) -> Result<Vec<Record>> {
        let related_column = self.related_column();
        let mut query = std::mem::take(&mut self.query);
        query = if self.def.kind.morph().is_some() {
            query.remove_wheres()
        } else {
            query.remove_where_field(&related_column)
        };
        if let Some(scope) = scope {
            query = scope(query);
        }
        query = match keys.first() {
            Some((_, value)) if keys.len() == 1 => query.where_eq(&related_column, value),
            _ => query.where_in(&related_column, keys.values()),
        };
        let query = self.with_morph_type(query);
        self.base_applied = true;
        let rows = db.select(&query);
        self.query = query;
        let rows = rows?;
        debug!(
            relation = self.def.name,
            keys = keys.len(),
            rows = rows.len(),
            "Eager loaded relation"
        );
        let mut records: Vec<Record> = rows.into_iter().map(|row| self.hydrate(row)).collect();
        load_nested(db, &mut records, self.def.related, nested)?;
        Ok(records)
    }

    /// Key a fetched record is matched to its owner by.
    fn match_key(&self, record: &Record) -> Option<KeyValue> {
        match self.def.kind {
            RelationKind::BelongsToMany { local_key, .. } => record
                .pivot()
                .and_then(|pivot| pivot.get(local_key))
                .and_then(SqlValue::as_key),
            _ => record.key_of(&self.related_column()),
        }
    }

    fn assign_one(&self, owner: &mut Record, related: Option<Record>) -> Result<()> {
        if self.def.bind.is_empty() {
            let related = related.map_or(Related::Absent, |record| Related::One(Box::new(record)));
            owner.set_relation(self.def.name, related);
            return Ok(());
        }
        for (attribute, alias) in self.def.bind {
            let value = related
                .as_ref()
                .and_then(|record| record.get(attribute))
                .cloned()
                .unwrap_or(SqlValue::Null);
            owner.bind_attr(alias, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_paths() {
        let groups = group_paths(&["posts.comments.author", "posts", " profile ", "", "posts.tags"]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["posts"], vec!["comments.author", "tags"]);
        assert!(groups["profile"].is_empty());
    }
}
