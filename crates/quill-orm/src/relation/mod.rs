//! Relation descriptors and the queries they build.
//!
//! A [`RelationDef`] is the static declaration on a model; a [`Relation`]
//! is one use of it, carrying the related-model query that lazy loads,
//! eager loads, counts and existence filters are built from.
//!
//! | Kind            | Owner column   | Related column           |
//! |-----------------|----------------|--------------------------|
//! | `BelongsTo`     | `foreign_key`  | `owner_key`              |
//! | `HasOne`        | `local_key`    | `foreign_key`            |
//! | `HasMany`       | `local_key`    | `foreign_key`            |
//! | `MorphOne`      | primary key    | `morph_key` + type tag   |
//! | `MorphMany`     | primary key    | `morph_key` + type tag   |
//! | `BelongsToMany` | primary key    | `pivot.local_key`        |

mod eager;
mod mutate;

pub use eager::load_nested;
pub use mutate::BatchSave;

use quill_sql_core::{
    Aggregate, AggregateFn, CompareOp, Condition, JoinType, Predicate, Query, Row, SqlValue,
    TableRef,
};
use tracing::debug;

use crate::db::Db;
use crate::error::{OrmError, Result};
use crate::model::ModelDef;
use crate::record::{ParentRef, Record, Related};

/// Column prefix under which pivot columns are selected.
pub const PIVOT_PREFIX: &str = "pivot__";

/// The shape of a relation and the columns it joins on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// The owner holds a key to one related record.
    BelongsTo {
        /// Owner column referencing the related record.
        foreign_key: &'static str,
        /// Related column it references, usually the primary key.
        owner_key: &'static str,
    },
    /// One related record holds a key to the owner.
    HasOne {
        /// Related column referencing the owner.
        foreign_key: &'static str,
        /// Owner column it references.
        local_key: &'static str,
    },
    /// Many related records hold a key to the owner.
    HasMany {
        /// Related column referencing the owner.
        foreign_key: &'static str,
        /// Owner column it references.
        local_key: &'static str,
    },
    /// One related record points at the owner through a key and a type tag.
    MorphOne {
        /// Related column holding the owner key.
        morph_key: &'static str,
        /// Related column holding the owner type.
        morph_type: &'static str,
        /// Type tag identifying the owner model.
        type_tag: &'static str,
    },
    /// Many related records point at the owner through a key and a type tag.
    MorphMany {
        /// Related column holding the owner key.
        morph_key: &'static str,
        /// Related column holding the owner type.
        morph_type: &'static str,
        /// Type tag identifying the owner model.
        type_tag: &'static str,
    },
    /// Owner and related records are linked through a pivot table.
    BelongsToMany {
        /// Pivot table.
        pivot: &'static str,
        /// Pivot column referencing the related record.
        foreign_key: &'static str,
        /// Pivot column referencing the owner.
        local_key: &'static str,
    },
}

impl RelationKind {
    /// Returns the kind name used in error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BelongsTo { .. } => "BelongsTo",
            Self::HasOne { .. } => "HasOne",
            Self::HasMany { .. } => "HasMany",
            Self::MorphOne { .. } => "MorphOne",
            Self::MorphMany { .. } => "MorphMany",
            Self::BelongsToMany { .. } => "BelongsToMany",
        }
    }

    /// Returns whether the relation yields a collection.
    #[must_use]
    pub const fn is_many(&self) -> bool {
        matches!(
            self,
            Self::HasMany { .. } | Self::MorphMany { .. } | Self::BelongsToMany { .. }
        )
    }

    /// Returns the type column and tag of a polymorphic relation.
    #[must_use]
    pub const fn morph(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::MorphOne {
                morph_type,
                type_tag,
                ..
            }
            | Self::MorphMany {
                morph_type,
                type_tag,
                ..
            } => Some((*morph_type, *type_tag)),
            _ => None,
        }
    }
}

/// A relation declared on a model.
#[derive(Debug)]
pub struct RelationDef {
    /// Relation name, also the slot name on loaded records.
    pub name: &'static str,
    /// Shape and join columns.
    pub kind: RelationKind,
    /// Related model.
    pub related: &'static ModelDef,
    /// Join type used by [`Relation::has_where`].
    pub join_type: JoinType,
    /// `(attribute, alias)` pairs copied from the related record onto the
    /// owner during eager loads of single-valued relations.
    pub bind: &'static [(&'static str, &'static str)],
}

impl RelationDef {
    const fn build(name: &'static str, related: &'static ModelDef, kind: RelationKind) -> Self {
        Self {
            name,
            kind,
            related,
            join_type: JoinType::Inner,
            bind: &[],
        }
    }

    /// The owner's `foreign_key` references the related `owner_key`.
    #[must_use]
    pub const fn belongs_to(
        name: &'static str,
        related: &'static ModelDef,
        foreign_key: &'static str,
        owner_key: &'static str,
    ) -> Self {
        Self::build(
            name,
            related,
            RelationKind::BelongsTo {
                foreign_key,
                owner_key,
            },
        )
    }

    /// One related record's `foreign_key` references the owner's `local_key`.
    #[must_use]
    pub const fn has_one(
        name: &'static str,
        related: &'static ModelDef,
        foreign_key: &'static str,
        local_key: &'static str,
    ) -> Self {
        Self::build(
            name,
            related,
            RelationKind::HasOne {
                foreign_key,
                local_key,
            },
        )
    }

    /// Related records' `foreign_key` references the owner's `local_key`.
    #[must_use]
    pub const fn has_many(
        name: &'static str,
        related: &'static ModelDef,
        foreign_key: &'static str,
        local_key: &'static str,
    ) -> Self {
        Self::build(
            name,
            related,
            RelationKind::HasMany {
                foreign_key,
                local_key,
            },
        )
    }

    /// One polymorphic child tagged with `type_tag`.
    #[must_use]
    pub const fn morph_one(
        name: &'static str,
        related: &'static ModelDef,
        morph_key: &'static str,
        morph_type: &'static str,
        type_tag: &'static str,
    ) -> Self {
        Self::build(
            name,
            related,
            RelationKind::MorphOne {
                morph_key,
                morph_type,
                type_tag,
            },
        )
    }

    /// Polymorphic children tagged with `type_tag`.
    #[must_use]
    pub const fn morph_many(
        name: &'static str,
        related: &'static ModelDef,
        morph_key: &'static str,
        morph_type: &'static str,
        type_tag: &'static str,
    ) -> Self {
        Self::build(
            name,
            related,
            RelationKind::MorphMany {
                morph_key,
                morph_type,
                type_tag,
            },
        )
    }

    /// Many-to-many through `pivot`.
    #[must_use]
    pub const fn belongs_to_many(
        name: &'static str,
        related: &'static ModelDef,
        pivot: &'static str,
        foreign_key: &'static str,
        local_key: &'static str,
    ) -> Self {
        Self::build(
            name,
            related,
            RelationKind::BelongsToMany {
                pivot,
                foreign_key,
                local_key,
            },
        )
    }

    /// Sets the join type used by [`Relation::has_where`].
    #[must_use]
    pub const fn join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        self
    }

    /// Copies related attributes onto the owner as `(attribute, alias)`.
    #[must_use]
    pub const fn bind(mut self, attrs: &'static [(&'static str, &'static str)]) -> Self {
        self.bind = attrs;
        self
    }
}

/// One use of a relation declared on `owner`.
#[derive(Debug, Clone)]
pub struct Relation {
    owner: &'static ModelDef,
    def: &'static RelationDef,
    query: Query,
    base_applied: bool,
}

impl Relation {
    /// Starts a relation from its declaration.
    #[must_use]
    pub fn new(owner: &'static ModelDef, def: &'static RelationDef) -> Self {
        let related = def.related;
        let query = match def.kind {
            RelationKind::BelongsToMany {
                pivot,
                foreign_key,
                local_key,
            } => Query::table(related.table)
                .field(&format!("{}.*", related.table))
                .field_as(
                    &format!("{pivot}.{local_key}"),
                    &format!("{PIVOT_PREFIX}{local_key}"),
                )
                .field_as(
                    &format!("{pivot}.{foreign_key}"),
                    &format!("{PIVOT_PREFIX}{foreign_key}"),
                )
                .join(
                    TableRef::new(pivot),
                    &format!("{pivot}.{foreign_key}"),
                    &format!("{}.{}", related.table, related.pk),
                ),
            _ => Query::table(related.table),
        };
        Self {
            owner,
            def,
            query,
            base_applied: false,
        }
    }

    /// Returns the declaration.
    #[must_use]
    pub const fn def(&self) -> &'static RelationDef {
        self.def
    }

    /// Returns the related-model query in its current state.
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Refines the related-model query.
    #[must_use]
    pub fn scope(mut self, build: impl FnOnce(Query) -> Query) -> Self {
        self.query = build(self.query);
        self
    }

    /// Consumes the relation, returning its query.
    #[must_use]
    pub fn into_query(self) -> Query {
        self.query
    }

    /// Owner column whose value identifies the related rows.
    pub(crate) const fn owner_column(&self) -> &'static str {
        match self.def.kind {
            RelationKind::BelongsTo { foreign_key, .. } => foreign_key,
            RelationKind::HasOne { local_key, .. } | RelationKind::HasMany { local_key, .. } => {
                local_key
            }
            RelationKind::MorphOne { .. }
            | RelationKind::MorphMany { .. }
            | RelationKind::BelongsToMany { .. } => self.owner.pk,
        }
    }

    /// Column of the related query matched against owner keys.
    pub(crate) fn related_column(&self) -> String {
        match self.def.kind {
            RelationKind::BelongsTo { owner_key, .. } => owner_key.to_string(),
            RelationKind::HasOne { foreign_key, .. } | RelationKind::HasMany { foreign_key, .. } => {
                foreign_key.to_string()
            }
            RelationKind::MorphOne { morph_key, .. } | RelationKind::MorphMany { morph_key, .. } => {
                morph_key.to_string()
            }
            RelationKind::BelongsToMany {
                pivot, local_key, ..
            } => format!("{pivot}.{local_key}"),
        }
    }

    pub(crate) const fn unsupported(&self, operation: &'static str) -> OrmError {
        OrmError::UnsupportedRelation {
            kind: self.def.kind.name(),
            operation,
        }
    }

    /// Adds the morph type filter, if any.
    fn with_morph_type(&self, query: Query) -> Query {
        match self.def.kind.morph() {
            Some((morph_type, type_tag)) => query.where_eq(morph_type, type_tag),
            None => query,
        }
    }

    /// Drops predicates on the join columns so they can be replaced.
    fn without_key_filter(&self, query: Query) -> Query {
        let query = query.remove_where_field(&self.related_column());
        match self.def.kind.morph() {
            Some((morph_type, _)) => query.remove_where_field(morph_type),
            None => query,
        }
    }

    /// Wraps a fetched row, splitting out pivot columns.
    pub(crate) fn hydrate(&self, row: Row) -> Record {
        if !matches!(self.def.kind, RelationKind::BelongsToMany { .. }) {
            return Record::from_row(self.def.related, row);
        }
        let (pivot, data): (Row, Row) = row
            .into_iter()
            .partition(|(column, _)| column.starts_with(PIVOT_PREFIX));
        let mut record = Record::from_row(self.def.related, data);
        record.set_pivot(
            pivot
                .into_iter()
                .map(|(column, value)| (column[PIVOT_PREFIX.len()..].to_string(), value))
                .collect(),
        );
        record
    }

    fn empty(&self) -> Related {
        if self.def.kind.is_many() {
            Related::Many(vec![])
        } else {
            Related::Absent
        }
    }

    fn collect(&self, records: Vec<Record>) -> Related {
        if self.def.kind.is_many() {
            Related::Many(records)
        } else {
            records
                .into_iter()
                .next()
                .map_or(Related::Absent, |r| Related::One(Box::new(r)))
        }
    }

    /// Restricts the related query to `parent`'s rows.
    ///
    /// Applies at most once per relation; a parent without a key adds
    /// nothing.
    pub fn apply_base_scope(&mut self, parent: &Record) {
        if self.base_applied {
            return;
        }
        self.base_applied = true;
        let Some(key) = parent
            .get(self.owner_column())
            .filter(|v| !v.is_null())
            .cloned()
        else {
            return;
        };
        let query = std::mem::take(&mut self.query).where_eq(&self.related_column(), key);
        self.query = self.with_morph_type(query);
    }

    /// Loads the related records of one parent.
    ///
    /// A parent without a key yields an empty result without querying.
    ///
    /// # Errors
    ///
    /// A failing query, or an unknown nested relation.
    pub fn resolve(
        &mut self,
        db: &Db,
        parent: &Record,
        nested: &[&str],
        scope: Option<&dyn Fn(Query) -> Query>,
    ) -> Result<Related> {
        let Some(key) = parent
            .get(self.owner_column())
            .filter(|v| !v.is_null())
            .cloned()
        else {
            debug!(relation = self.def.name, "Relation key unset, skipping query");
            return Ok(self.empty());
        };
        let mut query = std::mem::take(&mut self.query);
        if let Some(scope) = scope {
            query = scope(query);
        }
        let query = self.with_morph_type(
            self.without_key_filter(query)
                .where_eq(&self.related_column(), key),
        );
        self.base_applied = true;
        let rows = if self.def.kind.is_many() {
            db.select(&query)
        } else {
            db.find(&query).map(|row| row.into_iter().collect())
        };
        self.query = query;
        let rows: Vec<_> = rows?;
        let mut records: Vec<Record> = rows.into_iter().map(|row| self.hydrate(row)).collect();
        load_nested(db, &mut records, self.def.related, nested)?;
        let parent_ref = ParentRef::of(parent, None);
        for record in &mut records {
            record.set_parent(parent_ref.clone());
        }
        Ok(self.collect(records))
    }

    /// Kinds whose join can be expressed as an owner/related column pair.
    fn require_direct(&self, operation: &'static str) -> Result<()> {
        match self.def.kind {
            RelationKind::BelongsTo { .. }
            | RelationKind::HasOne { .. }
            | RelationKind::HasMany { .. } => Ok(()),
            _ => Err(self.unsupported(operation)),
        }
    }

    /// Aliases for owner and related tables in correlated queries.
    fn aliases(&self) -> (&'static str, String) {
        let owner = self.owner.name;
        let related = self.def.related.name;
        if owner == related {
            (owner, format!("{related}_related"))
        } else {
            (owner, related.to_string())
        }
    }

    /// Owner query filtered on the number of related rows.
    ///
    /// `>= 1` / `> 0` render as `EXISTS`, `< 1` / `= 0` as `NOT EXISTS`, and
    /// anything else compares a correlated `COUNT(count_field)`. The owner
    /// table is aliased with its model name.
    ///
    /// # Errors
    ///
    /// [`OrmError::UnsupportedRelation`] for polymorphic and many-to-many
    /// relations.
    pub fn has(&self, op: CompareOp, count: i64, count_field: &str) -> Result<Query> {
        let condition = self.has_condition(op, count, count_field)?;
        Ok(Query::table(self.owner.table)
            .alias(self.owner.name)
            .condition(condition))
    }

    pub(crate) fn has_condition(
        &self,
        op: CompareOp,
        count: i64,
        count_field: &str,
    ) -> Result<Condition> {
        self.require_direct("has")?;
        let (owner_alias, related_alias) = self.aliases();
        let related_key = format!("{related_alias}.{}", self.related_column());
        let correlated = Query::table(self.def.related.table)
            .alias(&related_alias)
            .where_column(
                &related_key,
                CompareOp::Eq,
                &format!("{owner_alias}.{}", self.owner_column()),
            );
        let negated = match (op, count) {
            (CompareOp::Gte, 1) | (CompareOp::Gt | CompareOp::Ne, 0) => Some(false),
            (CompareOp::Lt, 1) | (CompareOp::Eq | CompareOp::Lte, 0) => Some(true),
            _ => None,
        };
        let predicate = match negated {
            Some(negated) => Predicate::Exists {
                query: Box::new(correlated.field(&related_key).into_plan()),
                negated,
            },
            None => {
                let count_field = if count_field == "*" || count_field.contains('.') {
                    count_field.to_string()
                } else {
                    format!("{related_alias}.{count_field}")
                };
                Predicate::Subquery {
                    query: Box::new(correlated.count(&count_field).into_plan()),
                    op,
                    value: SqlValue::Int(count),
                }
            }
        };
        Ok(Condition::and(predicate))
    }

    /// Owner query joined to the related table and filtered by `filter`.
    ///
    /// Unqualified columns in `filter` refer to the related table; `fields`
    /// default to every owner column.
    ///
    /// # Errors
    ///
    /// [`OrmError::UnsupportedRelation`] for polymorphic and many-to-many
    /// relations.
    pub fn has_where(&self, filter: impl FnOnce(Query) -> Query, fields: &[&str]) -> Result<Query> {
        self.require_direct("has_where")?;
        let (owner_alias, related_alias) = self.aliases();
        let mut query = Query::table(self.owner.table).alias(owner_alias);
        query = if fields.is_empty() {
            query.field(&format!("{owner_alias}.*"))
        } else {
            fields.iter().fold(query, |query, field| {
                if field.contains('.') {
                    query.field(field)
                } else {
                    query.field(&format!("{owner_alias}.{field}"))
                }
            })
        };
        query = query.join_kind(
            self.def.join_type,
            TableRef::aliased(self.def.related.table, related_alias.as_str()),
            &format!("{owner_alias}.{}", self.owner_column()),
            &format!("{related_alias}.{}", self.related_column()),
        );
        for mut condition in filter(Query::new()).into_plan().conditions {
            condition.qualify(&related_alias);
            query = query.condition(condition);
        }
        Ok(query)
    }

    /// Counts the related rows of one record.
    ///
    /// A record without a key counts zero without querying.
    ///
    /// # Errors
    ///
    /// A failing query.
    pub fn count_for(
        &self,
        db: &Db,
        record: &Record,
        scope: Option<&dyn Fn(Query) -> Query>,
    ) -> Result<i64> {
        let Some(key) = record
            .get(self.owner_column())
            .filter(|v| !v.is_null())
            .cloned()
        else {
            return Ok(0);
        };
        let mut query = self.without_key_filter(self.query.clone());
        if let Some(scope) = scope {
            query = scope(query);
        }
        let query = self
            .with_morph_type(query.where_eq(&self.related_column(), key))
            .count("*");
        Ok(db
            .aggregate(&query)?
            .and_then(|value| value.as_i64())
            .unwrap_or(0))
    }

    /// Correlated `COUNT(*)` of related rows per owner row.
    ///
    /// The subquery refers to the owner by its table name.
    #[must_use]
    pub fn count_subquery(&self, scope: Option<&dyn Fn(Query) -> Query>) -> Query {
        self.count_subquery_on(self.owner.table, scope)
    }

    /// Like [`Relation::count_subquery`], for an owner table known as
    /// `owner_ref`.
    #[must_use]
    pub fn count_subquery_on(
        &self,
        owner_ref: &str,
        scope: Option<&dyn Fn(Query) -> Query>,
    ) -> Query {
        self.aggregate_subquery_on(owner_ref, AggregateFn::Count, "*", scope)
    }

    /// Correlated `func(field)` over related rows, for an owner table known
    /// as `owner_ref`.
    ///
    /// An unqualified `field` is qualified with the related table.
    #[must_use]
    pub fn aggregate_subquery_on(
        &self,
        owner_ref: &str,
        func: AggregateFn,
        field: &str,
        scope: Option<&dyn Fn(Query) -> Query>,
    ) -> Query {
        let mut query = self.query.clone();
        if let Some(scope) = scope {
            query = scope(query);
        }
        let related_table = self.def.related.table;
        let related_key = match self.def.kind {
            RelationKind::BelongsToMany { .. } => self.related_column(),
            _ => format!("{related_table}.{}", self.related_column()),
        };
        query = query.where_column(
            &related_key,
            CompareOp::Eq,
            &format!("{owner_ref}.{}", self.owner_column()),
        );
        if let Some((morph_type, type_tag)) = self.def.kind.morph() {
            query = query.where_eq(&format!("{related_table}.{morph_type}"), type_tag);
        }
        let field = if field == "*" || field.contains('.') {
            field.to_string()
        } else {
            format!("{related_table}.{field}")
        };
        query.aggregate(Aggregate::new(func, &field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_sql_core::{Dialect, GenericDialect};

    static USER_RELATIONS: [RelationDef; 3] = [
        RelationDef::has_many("posts", &POST, "user_id", "id"),
        RelationDef::morph_many("comments", &COMMENT, "commentable_id", "commentable_type", "user"),
        RelationDef::belongs_to_many("roles", &ROLE, "role_user", "role_id", "user_id"),
    ];
    static USER: ModelDef = ModelDef::new("User", "users").relations(&USER_RELATIONS);
    static POST: ModelDef = ModelDef::new("Post", "posts");
    static COMMENT: ModelDef = ModelDef::new("Comment", "comments");
    static ROLE: ModelDef = ModelDef::new("Role", "roles");

    fn relation(name: &str) -> Relation {
        Relation::new(&USER, USER.relation(name).unwrap())
    }

    fn sql(query: &Query) -> String {
        GenericDialect.render_select(query.plan()).unwrap().0
    }

    #[test]
    fn test_kind_helpers() {
        let kind = USER.relation("comments").unwrap().kind;
        assert_eq!(kind.name(), "MorphMany");
        assert!(kind.is_many());
        assert_eq!(kind.morph(), Some(("commentable_type", "user")));
        assert_eq!(USER.relation("posts").unwrap().kind.morph(), None);
    }

    #[test]
    fn test_base_scope_applies_once() {
        let user = Record::from_row(&USER, Row::from([("id".to_string(), SqlValue::Int(3))]));
        let mut posts = relation("posts");
        posts.apply_base_scope(&user);
        posts.apply_base_scope(&user);
        assert_eq!(
            sql(posts.query()),
            r#"SELECT * FROM "posts" WHERE "user_id" = ?"#
        );
    }

    #[test]
    fn test_base_scope_without_key_adds_nothing() {
        let mut posts = relation("posts");
        posts.apply_base_scope(&Record::new(&USER));
        assert!(posts.query().plan().conditions.is_empty());
    }

    #[test]
    fn test_morph_base_scope_adds_type() {
        let user = Record::from_row(&USER, Row::from([("id".to_string(), SqlValue::Int(3))]));
        let mut comments = relation("comments");
        comments.apply_base_scope(&user);
        assert_eq!(
            sql(comments.query()),
            r#"SELECT * FROM "comments" WHERE "commentable_id" = ? AND "commentable_type" = ?"#
        );
    }

    #[test]
    fn test_pivot_query_and_hydrate() {
        let roles = relation("roles");
        assert_eq!(
            sql(roles.query()),
            concat!(
                r#"SELECT "roles".*, "role_user"."user_id" AS "pivot__user_id", "#,
                r#""role_user"."role_id" AS "pivot__role_id" FROM "roles" "#,
                r#"INNER JOIN "role_user" ON "role_user"."role_id" = "roles"."id""#
            )
        );
        let record = roles.hydrate(Row::from([
            ("id".to_string(), SqlValue::Int(5)),
            ("pivot__user_id".to_string(), SqlValue::Int(1)),
        ]));
        assert_eq!(record.data().len(), 1);
        assert_eq!(record.pivot().unwrap().get("user_id"), Some(&SqlValue::Int(1)));
    }

    #[test]
    fn test_count_subquery_is_correlated() {
        assert_eq!(
            sql(&relation("posts").count_subquery(None)),
            r#"SELECT COUNT(*) AS "aggregate" FROM "posts" WHERE "posts"."user_id" = "users"."id""#
        );
        assert_eq!(
            sql(&relation("comments").count_subquery(None)),
            concat!(
                r#"SELECT COUNT(*) AS "aggregate" FROM "comments" WHERE "#,
                r#""comments"."commentable_id" = "users"."id" AND "comments"."commentable_type" = ?"#
            )
        );
    }

    #[test]
    fn test_aggregate_subquery_qualifies_field() {
        assert_eq!(
            sql(&relation("posts").aggregate_subquery_on("u", AggregateFn::Sum, "views", None)),
            r#"SELECT SUM("posts"."views") AS "aggregate" FROM "posts" WHERE "posts"."user_id" = "u"."id""#
        );
    }

    #[test]
    fn test_unsupported_has() {
        let err = relation("comments").has(CompareOp::Gte, 1, "*").unwrap_err();
        assert!(matches!(
            err,
            OrmError::UnsupportedRelation {
                kind: "MorphMany",
                operation: "has"
            }
        ));
        assert!(relation("roles").has_where(|q| q, &[]).is_err());
    }
}
