//! Tests for lazy loads, existence filters, counts and relation writes.

mod common;
use common::*;

use quill_orm::{BatchSave, OrmError, Related, Relation};
use quill_sql_core::{CompareOp, Row, SqlValue};

fn relation(model: &'static quill_orm::ModelDef, name: &str) -> Relation {
    Relation::new(model, model.relation(name).unwrap())
}

// ===================================================================
// Lazy loading
// ===================================================================

#[test]
fn lazy_load_queries_once_and_caches() {
    let (db, mock) = mysql_db();
    mock.respond(vec![row(&[("id", int(10)), ("user_id", int(1))])]);
    let mut user = record(&USER, &[("id", int(1))]);

    let posts = user.load(&db, "posts").unwrap().as_many().len();
    user.load(&db, "posts").unwrap();

    assert_eq!(posts, 1);
    assert_eq!(mock.statements(), vec!["SELECT * FROM `posts` WHERE `user_id` = ?"]);
    assert_eq!(mock.params(0), vec![int(1)]);
}

#[test]
fn lazy_single_relation_limits_to_one_row() {
    let (db, mock) = mysql_db();
    mock.respond(vec![row(&[("id", int(3)), ("user_id", int(1))])]);
    let mut user = record(&USER, &[("id", int(1))]);

    let profile = user.load(&db, "profile").unwrap();

    assert!(profile.as_one().is_some());
    assert_eq!(
        mock.statements(),
        vec!["SELECT * FROM `profiles` WHERE `user_id` = ? LIMIT 1"]
    );
}

#[test]
fn lazy_load_with_null_key_skips_query() {
    let (db, mock) = mysql_db();
    let mut post = record(&POST, &[("id", int(1)), ("user_id", SqlValue::Null)]);

    assert!(post.load(&db, "author").unwrap().is_absent());
    assert_eq!(mock.count(), 0);
}

#[test]
fn lazy_load_with_nested_and_scope() {
    let (db, mock) = mysql_db();
    mock.respond(vec![row(&[("id", int(10)), ("user_id", int(1))])])
        .respond(vec![]);
    let mut user = record(&USER, &[("id", int(1))]);
    let published = |q: quill_sql_core::Query| q.where_eq("published", 1);

    let posts = user
        .load_with(&db, "posts", &["comments"], Some(&published))
        .unwrap()
        .as_many();

    assert!(posts[0].relation("comments").unwrap().as_many().is_empty());
    assert_eq!(
        mock.statements(),
        vec![
            "SELECT * FROM `posts` WHERE `published` = ? AND `user_id` = ?",
            "SELECT * FROM `comments` WHERE `commentable_id` = ? AND `commentable_type` = ?",
        ]
    );
}

#[test]
fn lazy_load_unknown_relation() {
    let (db, _mock) = mysql_db();
    let mut user = record(&USER, &[("id", int(1))]);

    let err = user.load(&db, "friends").unwrap_err();

    assert_eq!(err.to_string(), "unknown relation `friends` on User");
}

// ===================================================================
// Existence filters
// ===================================================================

#[test]
fn has_at_least_one_is_exists() {
    let query = USER.query().has("posts", CompareOp::Gte, 1).unwrap();
    let (db, mock) = mysql_db();
    query.select(&db).unwrap();
    assert_eq!(
        mock.statements()[0],
        "SELECT * FROM `users` `User` WHERE EXISTS (SELECT `Post`.`user_id` FROM `posts` `Post` \
         WHERE `Post`.`user_id` = `User`.`id`)"
    );
}

#[test]
fn has_none_is_not_exists() {
    let query = relation(&POST, "author")
        .has(CompareOp::Eq, 0, "*")
        .unwrap();
    let (db, mock) = mysql_db();
    db.select(&query).unwrap();
    assert_eq!(
        mock.statements()[0],
        "SELECT * FROM `posts` `Post` WHERE NOT EXISTS (SELECT `User`.`id` FROM `users` `User` \
         WHERE `User`.`id` = `Post`.`user_id`)"
    );
}

#[test]
fn has_other_counts_compare_a_subquery() {
    let (db, mock) = mysql_db();
    USER.query()
        .has("posts", CompareOp::Gt, 2)
        .unwrap()
        .select(&db)
        .unwrap();
    assert_eq!(
        mock.statements()[0],
        "SELECT * FROM `users` `User` WHERE (SELECT COUNT(*) AS `aggregate` FROM `posts` `Post` \
         WHERE `Post`.`user_id` = `User`.`id`) > ?"
    );
    assert_eq!(mock.params(0), vec![int(2)]);
}

#[test]
fn has_is_unsupported_for_polymorphic_and_pivot_relations() {
    for name in ["comments", "roles"] {
        let err = USER.query().has(name, CompareOp::Gte, 1).unwrap_err();
        assert!(
            matches!(err, OrmError::UnsupportedRelation { operation: "has", .. }),
            "{name}: {err}"
        );
    }
    assert!(matches!(
        USER.query().has_where("comments", |q| q, &[]),
        Err(OrmError::UnsupportedRelation {
            kind: "MorphMany",
            operation: "has_where"
        })
    ));
}

#[test]
fn has_where_joins_and_qualifies_filter() {
    let (db, mock) = mysql_db();
    USER.query()
        .where_eq("User.active", 1)
        .has_where("posts", |q| q.where_eq("status", 2), &[])
        .unwrap()
        .select(&db)
        .unwrap();
    assert_eq!(
        mock.statements()[0],
        "SELECT `User`.* FROM `users` `User` INNER JOIN `posts` `Post` \
         ON `User`.`id` = `Post`.`user_id` WHERE `Post`.`status` = ? AND `User`.`active` = ?"
    );
    assert_eq!(mock.params(0), vec![int(2), int(1)]);
}

#[test]
fn has_where_projects_requested_fields() {
    let query = relation(&USER, "posts")
        .has_where(|q| q, &["id", "Post.title"])
        .unwrap();
    let (db, mock) = mysql_db();
    db.select(&query).unwrap();
    assert!(mock.statements()[0].starts_with("SELECT `User`.`id`, `Post`.`title` FROM"));
}

// ===================================================================
// Counts
// ===================================================================

#[test]
fn count_for_record() {
    let (db, mock) = mysql_db();
    mock.respond(vec![row(&[("aggregate", int(3))])]);
    let user = record(&USER, &[("id", int(1))]);

    let count = relation(&USER, "comments").count_for(&db, &user, None).unwrap();

    assert_eq!(count, 3);
    assert_eq!(
        mock.statements()[0],
        "SELECT COUNT(*) AS `aggregate` FROM `comments` \
         WHERE `commentable_id` = ? AND `commentable_type` = ? LIMIT 1"
    );
}

#[test]
fn count_for_record_without_key_is_zero() {
    let (db, mock) = mysql_db();
    let user = USER.record();
    assert_eq!(relation(&USER, "posts").count_for(&db, &user, None).unwrap(), 0);
    assert_eq!(mock.count(), 0);
}

// ===================================================================
// BelongsTo writes
// ===================================================================

#[test]
fn associate_then_dissociate() {
    let (db, mock) = mysql_db();
    let author = relation(&POST, "author");
    let mut post = record(&POST, &[("id", int(1)), ("user_id", SqlValue::Null)]);
    let user = record(&USER, &[("id", int(4))]);

    author.associate(&db, &mut post, user).unwrap();
    assert_eq!(post.get("user_id"), Some(&int(4)));
    assert!(post.relation("author").unwrap().as_one().is_some());

    author.dissociate(&db, &mut post).unwrap();
    assert_eq!(post.get("user_id"), Some(&SqlValue::Null));
    assert!(post.relation("author").unwrap().is_absent());

    assert_eq!(
        mock.statements(),
        vec![
            "UPDATE `posts` SET `user_id` = ? WHERE `id` = ?",
            "UPDATE `posts` SET `user_id` = ? WHERE `id` = ?",
        ]
    );
    assert_eq!(mock.params(0), vec![int(4), int(1)]);
    assert_eq!(mock.params(1), vec![SqlValue::Null, int(1)]);
}

#[test]
fn associate_needs_related_key() {
    let (db, _mock) = mysql_db();
    let mut post = record(&POST, &[("id", int(1))]);
    let err = relation(&POST, "author")
        .associate(&db, &mut post, USER.record())
        .unwrap_err();
    assert!(matches!(err, OrmError::MissingKey(key) if key == "id"));
}

#[test]
fn associate_is_belongs_to_only() {
    let (db, _mock) = mysql_db();
    let mut user = record(&USER, &[("id", int(1))]);
    let err = relation(&USER, "posts")
        .associate(&db, &mut user, POST.record())
        .unwrap_err();
    assert_eq!(err.to_string(), "relation not support: HasMany cannot associate");
}

// ===================================================================
// Child writes
// ===================================================================

#[test]
fn save_stamps_foreign_key() {
    let (db, mock) = mysql_db();
    let user = record(&USER, &[("id", int(1))]);

    let post = relation(&USER, "posts")
        .save(&db, &user, row(&[("title", text("hi"))]))
        .unwrap();

    assert_eq!(
        mock.statements(),
        vec!["INSERT INTO `posts` (`title`, `user_id`) VALUES (?, ?)"]
    );
    assert_eq!(post.get("id"), Some(&int(101)));
    assert!(post.exists());
    assert_eq!(post.parent().unwrap().model, "User");
}

#[test]
fn morph_save_stamps_key_and_type() {
    let (db, mock) = mysql_db();
    let user = record(&USER, &[("id", int(1))]);

    relation(&USER, "comments")
        .save(&db, &user, row(&[("body", text("x"))]))
        .unwrap();

    assert_eq!(
        mock.statements(),
        vec!["INSERT INTO `comments` (`body`, `commentable_id`, `commentable_type`) VALUES (?, ?, ?)"]
    );
    assert_eq!(mock.params(0), vec![text("x"), int(1), text("user")]);
}

#[test]
fn save_all_reports_each_outcome() {
    let (db, mock) = mysql_db();
    mock.fail_on("`broken`");
    let user = record(&USER, &[("id", int(1))]);
    let posts = relation(&USER, "posts");

    assert!(matches!(
        posts.save_all(&db, &user, vec![]).unwrap(),
        BatchSave::Empty
    ));

    let outcome = posts
        .save_all(
            &db,
            &user,
            vec![
                row(&[("title", text("a"))]),
                row(&[("broken", text("b"))]),
                row(&[("title", text("c"))]),
            ],
        )
        .unwrap();
    let BatchSave::Partial(results) = outcome else {
        panic!("expected a partial save, got {outcome:?}");
    };
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(OrmError::Transport(_))));
    assert!(results[2].is_ok());

    let complete = posts
        .save_all(&db, &user, vec![row(&[("title", text("d"))])])
        .unwrap();
    assert!(complete.is_complete());
}

#[test]
fn save_is_unsupported_on_belongs_to() {
    let (db, _mock) = mysql_db();
    let post = record(&POST, &[("id", int(1))]);
    assert!(matches!(
        relation(&POST, "author").save(&db, &post, Row::new()),
        Err(OrmError::UnsupportedRelation { kind: "BelongsTo", operation: "save" })
    ));
    assert!(relation(&POST, "author").save_all(&db, &post, vec![]).is_err());
}

// ===================================================================
// Pivot writes
// ===================================================================

#[test]
fn attach_and_detach_pivot_rows() {
    let (db, mock) = mysql_db();
    let user = record(&USER, &[("id", int(1))]);
    let roles = relation(&USER, "roles");

    roles
        .attach(&db, &user, 5, row(&[("expires", text("2030-01-01"))]))
        .unwrap();
    roles.detach(&db, &user, &[int(5), int(6)]).unwrap();
    roles.detach(&db, &user, &[]).unwrap();

    assert_eq!(
        mock.statements(),
        vec![
            "INSERT INTO `role_user` (`expires`, `user_id`, `role_id`) VALUES (?, ?, ?)",
            "DELETE FROM `role_user` WHERE `user_id` = ? AND `role_id` IN (?, ?)",
            "DELETE FROM `role_user` WHERE `user_id` = ?",
        ]
    );
}

#[test]
fn pivot_save_inserts_record_then_link() {
    let (db, mock) = mysql_db();
    let user = record(&USER, &[("id", int(1))]);

    let role = relation(&USER, "roles")
        .save(&db, &user, row(&[("name", text("admin"))]))
        .unwrap();

    assert_eq!(role.get("id"), Some(&int(101)));
    assert_eq!(
        mock.statements(),
        vec![
            "INSERT INTO `roles` (`name`) VALUES (?)",
            "INSERT INTO `role_user` (`user_id`, `role_id`) VALUES (?, ?)",
        ]
    );
    assert_eq!(mock.params(1), vec![int(1), int(101)]);
}

#[test]
fn attach_is_pivot_only() {
    let (db, _mock) = mysql_db();
    let user = record(&USER, &[("id", int(1))]);
    assert!(matches!(
        relation(&USER, "posts").attach(&db, &user, 1, Row::new()),
        Err(OrmError::UnsupportedRelation { operation: "attach", .. })
    ));
    assert!(matches!(
        relation(&USER, "profile").detach(&db, &user, &[]),
        Err(OrmError::UnsupportedRelation { operation: "detach", .. })
    ));
}

#[test]
fn dissociate_leaves_cached_absent_slot() {
    let (db, mock) = mysql_db();
    let mut post = record(&POST, &[("id", int(1)), ("user_id", int(4))]);
    relation(&POST, "author").dissociate(&db, &mut post).unwrap();

    assert!(matches!(post.load(&db, "author").unwrap(), Related::Absent));
    assert_eq!(mock.count(), 1);
}
