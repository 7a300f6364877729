//! Model-level queries with eager loading.

use std::fmt;

use quill_sql_core::{Aggregate, AggregateFn, CompareOp, Operand, Query, SqlValue, ToSqlValue};

use crate::db::Db;
use crate::error::{OrmError, Result};
use crate::model::ModelDef;
use crate::record::Record;
use crate::relation::Relation;

/// A boxed query refinement applied to a relation query.
pub type Scope<'s> = Box<dyn Fn(Query) -> Query + 's>;

struct EagerSpec<'s> {
    name: String,
    nested: Vec<String>,
    scope: Option<Scope<'s>>,
}

struct AggregateSpec<'s> {
    name: String,
    func: AggregateFn,
    field: String,
    scope: Option<Scope<'s>>,
}

impl AggregateSpec<'_> {
    /// Projected column, such as `posts_count` or `posts_sum`.
    fn column(&self) -> String {
        format!("{}_{}", self.name, self.func.as_sql().to_ascii_lowercase())
    }
}

/// A query over one model that returns [`Record`]s.
///
/// ```rust
/// use quill_orm::{ModelDef, RelationDef};
/// use quill_sql_core::{CompareOp, Dialect, GenericDialect};
///
/// static USER_RELATIONS: [RelationDef; 1] =
///     [RelationDef::has_many("posts", &POST, "user_id", "id")];
/// static USER: ModelDef = ModelDef::new("User", "users").relations(&USER_RELATIONS);
/// static POST: ModelDef = ModelDef::new("Post", "posts");
///
/// let query = USER.query().has("posts", CompareOp::Gte, 1).unwrap();
/// let (sql, _) = GenericDialect.render_select(query.query().plan()).unwrap();
/// assert_eq!(
///     sql,
///     concat!(
///         r#"SELECT * FROM "users" "User" WHERE EXISTS (SELECT "Post"."user_id" "#,
///         r#"FROM "posts" "Post" WHERE "Post"."user_id" = "User"."id")"#,
///     )
/// );
/// ```
pub struct ModelQuery<'s> {
    model: &'static ModelDef,
    query: Query,
    with: Vec<EagerSpec<'s>>,
    aggregates: Vec<AggregateSpec<'s>>,
}

impl fmt::Debug for ModelQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelQuery")
            .field("model", &self.model.name)
            .field("query", &self.query)
            .field(
                "with",
                &self.with.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            )
            .field(
                "aggregates",
                &self
                    .aggregates
                    .iter()
                    .map(AggregateSpec::column)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(value: &SqlValue) -> Option<f64> {
    match value {
        SqlValue::Float(f) => Some(*f),
        SqlValue::Int(n) => Some(*n as f64),
        SqlValue::Bool(b) => Some(f64::from(u8::from(*b))),
        SqlValue::Text(s) => s.parse().ok(),
        SqlValue::Json(v) => v.as_f64(),
        SqlValue::Null | SqlValue::Blob(_) => None,
    }
}

impl<'s> ModelQuery<'s> {
    /// Starts a query over `model`'s table.
    #[must_use]
    pub fn new(model: &'static ModelDef) -> Self {
        Self {
            model,
            query: Query::table(model.table),
            with: Vec::new(),
            aggregates: Vec::new(),
        }
    }

    /// Returns the model.
    #[must_use]
    pub const fn model(&self) -> &'static ModelDef {
        self.model
    }

    /// Returns the underlying query.
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Consumes the model query, returning the underlying query.
    #[must_use]
    pub fn into_query(self) -> Query {
        self.query
    }

    /// Refines the underlying query.
    #[must_use]
    pub fn filter(mut self, build: impl FnOnce(Query) -> Query) -> Self {
        self.query = build(self.query);
        self
    }

    /// `field = value`.
    #[must_use]
    pub fn where_eq(self, field: &str, value: impl Into<Operand>) -> Self {
        self.filter(|q| q.where_eq(field, value))
    }

    /// `field IN (...)`.
    #[must_use]
    pub fn where_in<I, T>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSqlValue,
    {
        self.filter(|q| q.where_in(field, values))
    }

    /// Adds an ordering, `-` prefixed for descending.
    #[must_use]
    pub fn order(self, spec: &str) -> Self {
        self.filter(|q| q.order(spec))
    }

    /// Limits the number of records.
    #[must_use]
    pub fn limit(self, count: u64) -> Self {
        self.filter(|q| q.limit(count))
    }

    /// Selects a 1-based page.
    #[must_use]
    pub fn page(self, page: u64, size: u64) -> Self {
        self.filter(|q| q.page(page, size))
    }

    fn eager_spec(&mut self, name: &str) -> &mut EagerSpec<'s> {
        let index = match self.with.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.with.push(EagerSpec {
                    name: name.to_string(),
                    nested: Vec::new(),
                    scope: None,
                });
                self.with.len() - 1
            }
        };
        &mut self.with[index]
    }

    /// Eager loads relations, given as comma-separated dotted paths such as
    /// `"posts.comments,profile"`.
    #[must_use]
    pub fn with(mut self, paths: &str) -> Self {
        for path in paths.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match path.split_once('.') {
                Some((name, rest)) => self.eager_spec(name).nested.push(rest.to_string()),
                None => {
                    self.eager_spec(path);
                }
            }
        }
        self
    }

    /// Eager loads `name`, refining its query with `scope`.
    #[must_use]
    pub fn with_scope(mut self, name: &str, scope: impl Fn(Query) -> Query + 's) -> Self {
        self.eager_spec(name).scope = Some(Box::new(scope));
        self
    }

    /// Adds a `<name>_count` column counting related rows.
    #[must_use]
    pub fn with_count(self, name: &str) -> Self {
        self.with_aggregate(name, AggregateFn::Count, "*")
    }

    /// Like [`ModelQuery::with_count`], counting only rows matching `scope`.
    #[must_use]
    pub fn with_count_scope(mut self, name: &str, scope: impl Fn(Query) -> Query + 's) -> Self {
        self.aggregates.push(AggregateSpec {
            name: name.to_string(),
            func: AggregateFn::Count,
            field: String::from("*"),
            scope: Some(Box::new(scope)),
        });
        self
    }

    /// Adds a `<name>_<func>` column aggregating `field` over related rows,
    /// e.g. `posts_sum` for `SUM(posts.views)`.
    ///
    /// An unqualified `field` refers to the related table.
    #[must_use]
    pub fn with_aggregate(mut self, name: &str, func: AggregateFn, field: &str) -> Self {
        self.aggregates.push(AggregateSpec {
            name: name.to_string(),
            func,
            field: field.to_string(),
            scope: None,
        });
        self
    }

    /// Keeps records whose number of `name` rows satisfies `op count`.
    ///
    /// The model table is aliased with the model name.
    ///
    /// # Errors
    ///
    /// An undeclared relation, or a kind that cannot filter on existence.
    pub fn has(mut self, name: &str, op: CompareOp, count: i64) -> Result<Self> {
        let def = self.model.require_relation(name)?;
        let condition = Relation::new(self.model, def).has_condition(op, count, "*")?;
        self.query = self.query.alias(self.model.name).condition(condition);
        Ok(self)
    }

    /// Joins `name` and keeps records whose related rows match `filter`.
    ///
    /// Projection defaults to every model column; clauses already on the
    /// query are kept.
    ///
    /// # Errors
    ///
    /// An undeclared relation, or a kind that cannot be joined.
    pub fn has_where(
        mut self,
        name: &str,
        filter: impl FnOnce(Query) -> Query,
        fields: &[&str],
    ) -> Result<Self> {
        let def = self.model.require_relation(name)?;
        let joined = Relation::new(self.model, def).has_where(filter, fields)?;
        let mut plan = joined.into_plan();
        let current = self.query.into_plan();
        plan.conditions.extend(current.conditions);
        plan.joins.extend(current.joins);
        if !current.fields.is_empty() {
            plan.fields = current.fields;
        }
        plan.distinct = current.distinct;
        plan.group = current.group;
        plan.having = current.having;
        plan.order = current.order;
        plan.limit = current.limit;
        plan.lock = current.lock;
        plan.comment = current.comment;
        self.query = Query::from_plan(plan);
        Ok(self)
    }

    fn prepared(&self) -> Result<Query> {
        let mut query = self.query.clone();
        if self.aggregates.is_empty() {
            return Ok(query);
        }
        let owner_ref = query
            .plan()
            .tables
            .first()
            .and_then(|t| t.alias.clone())
            .unwrap_or_else(|| self.model.table.to_string());
        if query.plan().fields.is_empty() {
            query = query.field(&format!("{owner_ref}.*"));
        }
        for spec in &self.aggregates {
            let def = self.model.require_relation(&spec.name)?;
            let subquery = Relation::new(self.model, def).aggregate_subquery_on(
                &owner_ref,
                spec.func,
                &spec.field,
                spec.scope.as_deref(),
            );
            query = query.field_subquery(subquery, &spec.column());
        }
        Ok(query)
    }

    fn eager_specs(&self) -> Result<Vec<(Relation, &EagerSpec<'s>)>> {
        self.with
            .iter()
            .map(|spec| {
                let def = self.model.require_relation(&spec.name)?;
                Ok((Relation::new(self.model, def), spec))
            })
            .collect()
    }

    /// Fetches every matching record with its eager relations.
    ///
    /// # Errors
    ///
    /// An undeclared relation, or a failing query.
    pub fn select(&self, db: &Db) -> Result<Vec<Record>> {
        let mut records: Vec<Record> = db
            .select(&self.prepared()?)?
            .into_iter()
            .map(|row| Record::from_row(self.model, row))
            .collect();
        for (mut relation, spec) in self.eager_specs()? {
            let nested: Vec<&str> = spec.nested.iter().map(String::as_str).collect();
            relation.eager_many(db, &mut records, &nested, spec.scope.as_deref())?;
        }
        Ok(records)
    }

    /// Fetches the first matching record.
    ///
    /// # Errors
    ///
    /// An undeclared relation, or a failing query.
    pub fn find(&self, db: &Db) -> Result<Option<Record>> {
        let Some(row) = db.find(&self.prepared()?)? else {
            return Ok(None);
        };
        let mut record = Record::from_row(self.model, row);
        for (mut relation, spec) in self.eager_specs()? {
            let nested: Vec<&str> = spec.nested.iter().map(String::as_str).collect();
            relation.eager_one(db, &mut record, &nested, spec.scope.as_deref())?;
        }
        Ok(Some(record))
    }

    /// Like [`ModelQuery::find`], failing when nothing matches.
    ///
    /// # Errors
    ///
    /// [`OrmError::NotFound`], an undeclared relation, or a failing query.
    pub fn find_or_fail(&self, db: &Db) -> Result<Record> {
        self.find(db)?.ok_or(OrmError::NotFound)
    }

    /// Counts matching rows.
    ///
    /// # Errors
    ///
    /// A failing query.
    pub fn count(&self, db: &Db) -> Result<i64> {
        let value = db.aggregate(&self.query.clone().count("*"))?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
    }

    fn aggregate(&self, db: &Db, func: AggregateFn, field: &str) -> Result<Option<f64>> {
        let query = self.query.clone().aggregate(Aggregate::new(func, field));
        Ok(db.aggregate(&query)?.as_ref().and_then(as_f64))
    }

    /// `SUM(field)`, or `None` when no row matched.
    ///
    /// # Errors
    ///
    /// A failing query.
    pub fn sum(&self, db: &Db, field: &str) -> Result<Option<f64>> {
        self.aggregate(db, AggregateFn::Sum, field)
    }

    /// `AVG(field)`.
    ///
    /// # Errors
    ///
    /// A failing query.
    pub fn avg(&self, db: &Db, field: &str) -> Result<Option<f64>> {
        self.aggregate(db, AggregateFn::Avg, field)
    }

    /// `MAX(field)`.
    ///
    /// # Errors
    ///
    /// A failing query.
    pub fn max(&self, db: &Db, field: &str) -> Result<Option<f64>> {
        self.aggregate(db, AggregateFn::Max, field)
    }

    /// `MIN(field)`.
    ///
    /// # Errors
    ///
    /// A failing query.
    pub fn min(&self, db: &Db, field: &str) -> Result<Option<f64>> {
        self.aggregate(db, AggregateFn::Min, field)
    }

    /// Renders the SELECT with values inlined.
    ///
    /// # Errors
    ///
    /// An undeclared relation, or a rendering failure.
    pub fn fetch_sql(&self, db: &Db) -> Result<String> {
        db.fetch_sql(&self.prepared()?)
    }
}
