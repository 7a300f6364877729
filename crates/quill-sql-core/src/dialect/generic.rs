//! Generic SQL dialect.

use super::Dialect;

/// A generic SQL dialect using ANSI SQL standards.
///
/// Every hook keeps its default: `"` quoting, `?` placeholders,
/// `LIMIT n OFFSET m`, `FOR UPDATE` and `RANDOM()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{raw, CompareOp, Delete, Insert, Query, SqlValue, Update};
    use crate::error::BuildError;
    use crate::plan::{Aggregate, AggregateFn, Lock, TableRef};

    fn render(query: &Query) -> (String, Vec<SqlValue>) {
        GenericDialect::new().render_select(query.plan()).unwrap()
    }

    #[test]
    fn test_generic_dialect() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.name(), "generic");
        assert_eq!(dialect.identifier_quote(), Some('"'));
        assert_eq!(dialect.placeholder(3), "?");
        assert_eq!(dialect.random_order(), "RANDOM()");
    }

    #[test]
    fn test_simple_select() {
        let (sql, params) = render(&Query::table("users").fields(&["id", "name"]));
        assert_eq!(sql, r#"SELECT "id", "name" FROM "users""#);
        assert!(params.is_empty());
    }

    #[test]
    fn test_select_full_clause_order() {
        let query = Query::table("orders")
            .alias("o")
            .distinct(true)
            .field("o.status")
            .left_join(TableRef::aliased("users", "u"), "u.id", "o.user_id")
            .where_eq("o.total", 10)
            .or_where_cmp("o.total", CompareOp::Gt, 100)
            .group("o.status")
            .having(raw("COUNT(*) > ?").with(5))
            .order("-o.status")
            .limit_offset(20, 10)
            .comment("report");
        let (sql, params) = render(&query);
        assert_eq!(
            sql,
            concat!(
                r#"SELECT DISTINCT "o"."status" FROM "orders" "o""#,
                r#" LEFT JOIN "users" "u" ON "u"."id" = "o"."user_id""#,
                r#" WHERE "o"."total" = ? OR "o"."total" > ?"#,
                r#" GROUP BY "o"."status" HAVING COUNT(*) > ?"#,
                r#" ORDER BY "o"."status" DESC LIMIT 10 OFFSET 20 /* report */"#,
            )
        );
        assert_eq!(
            params,
            vec![SqlValue::Int(10), SqlValue::Int(100), SqlValue::Int(5)]
        );
    }

    #[test]
    fn test_table_names_resolve_to_aliases() {
        let (sql, _) = render(&Query::table("users").alias("User").where_eq("users.id", 1));
        assert_eq!(sql, r#"SELECT * FROM "users" "User" WHERE "User"."id" = ?"#);
    }

    #[test]
    fn test_null_comparisons_become_is_null() {
        let (sql, params) = render(
            &Query::table("t")
                .where_eq("a", SqlValue::Null)
                .where_cmp("b", CompareOp::Ne, None::<i32>),
        );
        assert_eq!(sql, r#"SELECT * FROM "t" WHERE "a" IS NULL AND "b" IS NOT NULL"#);
        assert!(params.is_empty());
    }

    #[test]
    fn test_empty_in_never_matches() {
        let (sql, params) = render(&Query::table("t").where_in("id", Vec::<i64>::new()));
        assert_eq!(sql, r#"SELECT * FROM "t" WHERE 0 = 1"#);
        assert!(params.is_empty());
    }

    #[test]
    fn test_exists_subquery_shares_parameters() {
        let sub = Query::table("posts")
            .where_exp("posts.user_id", raw("= users.id"))
            .where_eq("posts.status", 1);
        let (sql, params) = render(&Query::table("users").where_eq("active", true).where_exists(sub));
        assert_eq!(
            sql,
            concat!(
                r#"SELECT * FROM "users" WHERE "active" = ? AND EXISTS ("#,
                r#"SELECT * FROM "posts" WHERE "posts"."user_id" = users.id AND "posts"."status" = ?)"#,
            )
        );
        assert_eq!(params, vec![SqlValue::Bool(true), SqlValue::Int(1)]);
    }

    #[test]
    fn test_aggregate_replaces_fields() {
        let mut aggregate = Aggregate::new(AggregateFn::Count, "user_id");
        aggregate.distinct = true;
        let (sql, _) = render(&Query::table("posts").field("id").aggregate(aggregate));
        assert_eq!(
            sql,
            r#"SELECT COUNT(DISTINCT "user_id") AS "aggregate" FROM "posts""#
        );
    }

    #[test]
    fn test_random_order_and_exclusive_lock() {
        let (sql, _) = render(&Query::table("t").order_rand().limit(1).lock(true));
        assert_eq!(
            sql,
            r#"SELECT * FROM "t" ORDER BY RANDOM() LIMIT 1 FOR UPDATE"#
        );
    }

    #[test]
    fn test_shared_lock_is_unsupported() {
        let err = GenericDialect
            .render_select(Query::table("t").lock_mode(Lock::Shared).plan())
            .unwrap_err();
        assert!(matches!(err, BuildError::Unsupported { dialect: "generic", .. }));
    }

    #[test]
    fn test_json_path_is_unsupported() {
        let err = GenericDialect
            .render_select(Query::table("t").where_eq("meta->name", "x").plan())
            .unwrap_err();
        assert!(matches!(err, BuildError::Unsupported { .. }));
    }

    #[test]
    fn test_missing_table_is_invalid() {
        let err = GenericDialect.render_select(Query::new().plan()).unwrap_err();
        assert!(matches!(err, BuildError::InvalidQuery(_)));
    }

    #[test]
    fn test_strict_mode_rejects_unknown_fields() {
        let query = Query::table("users").strict(&["id", "name"]).where_eq("email", "x");
        let err = GenericDialect.render_select(query.plan()).unwrap_err();
        assert_eq!(err, BuildError::SchemaMismatch(String::from("unknown field `email`")));
    }

    #[test]
    fn test_strict_mode_checks_only_primary_table_columns() {
        let query = Query::table("users")
            .alias("u")
            .strict(&["id", "name"])
            .join(TableRef::new("posts"), "u.id", "posts.user_id")
            .where_eq("posts.title", "x");
        let (sql, _) = render(&query);
        assert_eq!(
            sql,
            r#"SELECT * FROM "users" "u" INNER JOIN "posts" ON "u"."id" = "posts"."user_id" WHERE "posts"."title" = ?"#
        );

        let query = query.where_eq("u.email", "x");
        assert!(matches!(
            GenericDialect.render_select(query.plan()),
            Err(BuildError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_raw_placeholder_count_must_match() {
        let query = Query::table("t").where_raw(raw("a = ? AND b = ?").with(1));
        assert!(matches!(
            GenericDialect.render_select(query.plan()),
            Err(BuildError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_question_marks_inside_quotes_are_literal() {
        let (sql, params) = render(&Query::table("t").where_raw(raw("note = 'why?' AND id = ?").with(3)));
        assert_eq!(sql, r#"SELECT * FROM "t" WHERE note = 'why?' AND id = ?"#);
        assert_eq!(params, vec![SqlValue::Int(3)]);
    }

    #[test]
    fn test_render_inline_substitutes_values() {
        let sql = GenericDialect
            .render_inline(Query::table("users").where_eq("name", "O'Brien").plan())
            .unwrap();
        assert_eq!(sql, r#"SELECT * FROM "users" WHERE "name" = 'O''Brien'"#);
    }

    #[test]
    fn test_insert_update_delete() {
        let dialect = GenericDialect;
        let (sql, params) = dialect
            .render_insert(Insert::new().into_table("users").set("name", "a").set("age", 3).plan())
            .unwrap();
        assert_eq!(sql, r#"INSERT INTO "users" ("name", "age") VALUES (?, ?)"#);
        assert_eq!(params.len(), 2);

        let (sql, _) = dialect
            .render_update(Update::new().table("users").set("name", "b").where_eq("id", 1).plan())
            .unwrap();
        assert_eq!(sql, r#"UPDATE "users" SET "name" = ? WHERE "id" = ?"#);

        let (sql, _) = dialect
            .render_delete(Delete::new().from("users").where_in("id", [1, 2]).plan())
            .unwrap();
        assert_eq!(sql, r#"DELETE FROM "users" WHERE "id" IN (?, ?)"#);
    }

    #[test]
    fn test_unconditional_update_and_delete_are_refused() {
        let dialect = GenericDialect;
        assert!(dialect
            .render_update(Update::new().table("users").set("a", 1).plan())
            .is_err());
        assert!(dialect
            .render_delete(Delete::new().from("users").plan())
            .is_err());
    }
}
