#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use quill_orm::{Db, ModelDef, Record, RelationDef};
use quill_sql_core::{Row, SqlValue, Transport, TransportError, TransportResult};
use quill_sql_mysql::MysqlDialect;

// ===================================================================
// Models
// ===================================================================

pub static USER_RELATIONS: [RelationDef; 5] = [
    RelationDef::has_many("posts", &POST, "user_id", "id"),
    RelationDef::has_one("profile", &PROFILE, "user_id", "id"),
    RelationDef::has_one("card", &PROFILE, "user_id", "id").bind(&[("nickname", "card_nickname")]),
    RelationDef::morph_many("comments", &COMMENT, "commentable_id", "commentable_type", "user"),
    RelationDef::belongs_to_many("roles", &ROLE, "role_user", "role_id", "user_id"),
];
pub static USER: ModelDef = ModelDef::new("User", "users").relations(&USER_RELATIONS);

pub static POST_RELATIONS: [RelationDef; 3] = [
    RelationDef::belongs_to("author", &USER, "user_id", "id"),
    RelationDef::morph_many("comments", &COMMENT, "commentable_id", "commentable_type", "post"),
    RelationDef::morph_one("cover", &IMAGE, "imageable_id", "imageable_type", "post"),
];
pub static POST: ModelDef = ModelDef::new("Post", "posts").relations(&POST_RELATIONS);

pub static PROFILE: ModelDef = ModelDef::new("Profile", "profiles");
pub static COMMENT: ModelDef = ModelDef::new("Comment", "comments");
pub static IMAGE: ModelDef = ModelDef::new("Image", "images");
pub static ROLE: ModelDef = ModelDef::new("Role", "roles");

// ===================================================================
// Transport
// ===================================================================

#[derive(Default)]
struct State {
    responses: VecDeque<Vec<Row>>,
    log: Vec<(String, Vec<SqlValue>)>,
    next_id: i64,
    last_id: Option<i64>,
    fail_on: Option<String>,
}

impl State {
    fn refuse(&self, sql: &str) -> TransportResult<()> {
        if self.fail_on.as_deref().is_some_and(|needle| sql.contains(needle)) {
            return Err(TransportError::Message(format!("refused: {sql}")));
        }
        Ok(())
    }
}

/// Records every statement and answers SELECTs from a queue.
///
/// Clones share state, so a test keeps one clone to inspect while the
/// `Db` owns the other.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Rc<RefCell<State>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the rows returned by the next SELECT.
    pub fn respond(&self, rows: Vec<Row>) -> &Self {
        self.state.borrow_mut().responses.push_back(rows);
        self
    }

    /// Makes every statement containing `needle` fail.
    pub fn fail_on(&self, needle: &str) {
        self.state.borrow_mut().fail_on = Some(needle.to_string());
    }

    /// Stops failing statements.
    pub fn recover(&self) {
        self.state.borrow_mut().fail_on = None;
    }

    pub fn statements(&self) -> Vec<String> {
        self.state.borrow().log.iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn params(&self, index: usize) -> Vec<SqlValue> {
        self.state.borrow().log[index].1.clone()
    }

    pub fn count(&self) -> usize {
        self.state.borrow().log.len()
    }
}

impl Transport for MockTransport {
    fn query(&self, sql: &str, params: &[SqlValue]) -> TransportResult<Vec<Row>> {
        let mut state = self.state.borrow_mut();
        state.log.push((sql.to_string(), params.to_vec()));
        state.refuse(sql)?;
        Ok(state.responses.pop_front().unwrap_or_default())
    }

    fn execute(&self, sql: &str, params: &[SqlValue]) -> TransportResult<u64> {
        let mut state = self.state.borrow_mut();
        state.log.push((sql.to_string(), params.to_vec()));
        state.refuse(sql)?;
        if sql.starts_with("INSERT") {
            state.next_id += 1;
            state.last_id = Some(state.next_id + 100);
        }
        Ok(1)
    }

    fn last_insert_id(&self) -> TransportResult<Option<SqlValue>> {
        Ok(self.state.borrow().last_id.map(SqlValue::Int))
    }
}

// ===================================================================
// Helpers
// ===================================================================

/// A MySQL-flavoured `Db` over a fresh mock, plus a handle on the mock.
pub fn mysql_db() -> (Db, MockTransport) {
    let mock = MockTransport::new();
    (Db::new(MysqlDialect, mock.clone()), mock)
}

pub fn int(n: i64) -> SqlValue {
    SqlValue::Int(n)
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}

pub fn row(pairs: &[(&str, SqlValue)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

/// Persisted record built from pairs.
pub fn record(model: &'static ModelDef, pairs: &[(&str, SqlValue)]) -> Record {
    Record::from_row(model, row(pairs))
}

/// Primary keys of a slice of records, as integers.
pub fn ids(records: &[Record]) -> Vec<i64> {
    records
        .iter()
        .map(|r| {
            r.get("id")
                .and_then(SqlValue::as_i64)
                .unwrap_or_else(|| panic!("record without integer id: {r:?}"))
        })
        .collect()
}
