//! End-to-end session behavior against a scripted in-memory store.
//!
//! The backend here records every statement and its parameters, serves
//! canned rows for SELECTs, and applies UPDATEs to its stored rows so a
//! later session observes flushed state.

use ormlet::{
    Connection, ConnectionProvider, Entity, EntityMeta, Error, FieldMeta, QueryError, Result, Row,
    SessionFactory, Value,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

// ----------------------------------------------------------------------------
// Fixtures
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Person {
    id: Option<i64>,
    first_name: String,
    last_name: String,
}

static PERSON_META: EntityMeta = EntityMeta::new("Person").table("persons").fields(&[
    FieldMeta::new("id").column("id").identifier(),
    FieldMeta::new("first_name").column("first_name"),
    FieldMeta::new("last_name").column("last_name"),
]);

impl Entity for Person {
    fn meta() -> &'static EntityMeta {
        &PERSON_META
    }

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("first_name", self.first_name.clone().into()),
            ("last_name", self.last_name.clone().into()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            first_name: row.get_named("first_name")?,
            last_name: row.get_named("last_name")?,
        })
    }

    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// Three data fields, one nullable, for the multi-field diff properties.
#[derive(Debug, Clone, PartialEq)]
struct Track {
    id: Option<i64>,
    title: String,
    artist: String,
    plays: Option<i64>,
}

static TRACK_META: EntityMeta = EntityMeta::new("Track").table("tracks").fields(&[
    FieldMeta::new("id").identifier(),
    FieldMeta::new("title"),
    FieldMeta::new("artist"),
    FieldMeta::new("plays"),
]);

impl Entity for Track {
    fn meta() -> &'static EntityMeta {
        &TRACK_META
    }

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("title", self.title.clone().into()),
            ("artist", self.artist.clone().into()),
            ("plays", self.plays.into()),
        ]
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named("id")?,
            title: row.get_named("title")?,
            artist: row.get_named("artist")?,
            plays: row.get_named("plays")?,
        })
    }

    fn id(&self) -> Option<i64> {
        self.id
    }
}

// ----------------------------------------------------------------------------
// In-memory backend
// ----------------------------------------------------------------------------

#[derive(Default)]
struct MemoryStore {
    /// Rows keyed by (table, id).
    rows: Mutex<HashMap<(String, i64), Row>>,
    /// Every SELECT issued, with its bound parameters.
    queries: Mutex<Vec<(String, Vec<Value>)>>,
    /// Every UPDATE issued, with its bound parameters.
    executes: Mutex<Vec<(String, Vec<Value>)>>,
    /// Ids whose UPDATE the store rejects.
    failing_ids: Mutex<HashSet<i64>>,
}

#[derive(Clone, Default)]
struct MemoryProvider {
    store: Arc<MemoryStore>,
}

impl MemoryProvider {
    fn seed(&self, table: &str, id: i64, row: Row) {
        self.store
            .rows
            .lock()
            .unwrap()
            .insert((table.to_string(), id), row);
    }

    fn fail_updates_for(&self, id: i64) {
        self.store.failing_ids.lock().unwrap().insert(id);
    }

    fn query_count(&self) -> usize {
        self.store.queries.lock().unwrap().len()
    }

    fn executes(&self) -> Vec<(String, Vec<Value>)> {
        self.store.executes.lock().unwrap().clone()
    }
}

struct MemoryConnection {
    store: Arc<MemoryStore>,
}

/// Split `select * from <table> where id = ?` back into its table name.
fn parse_select(sql: &str) -> Option<&str> {
    sql.strip_prefix("select * from ")?
        .strip_suffix(" where id = ?")
}

/// Split `update <table> set c1 = ?, ... where id = ?` into table + columns.
fn parse_update(sql: &str) -> Option<(&str, Vec<&str>)> {
    let rest = sql.strip_prefix("update ")?;
    let (table, rest) = rest.split_once(" set ")?;
    let set_list = rest.strip_suffix(" where id = ?")?;
    let columns = set_list
        .split(", ")
        .map(|part| part.strip_suffix(" = ?"))
        .collect::<Option<Vec<_>>>()?;
    Some((table, columns))
}

impl Connection for MemoryConnection {
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.store
            .queries
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));

        let table = parse_select(sql)
            .ok_or_else(|| Error::from(QueryError::new("unsupported query").with_sql(sql)))?;
        let id = params
            .first()
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::from(QueryError::new("missing id parameter")))?;

        let rows = self.store.rows.lock().unwrap();
        Ok(rows
            .get(&(table.to_string(), id))
            .cloned()
            .into_iter()
            .collect())
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        self.store
            .executes
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));

        let (table, columns) = parse_update(sql)
            .ok_or_else(|| Error::from(QueryError::new("unsupported statement").with_sql(sql)))?;
        let id = params
            .last()
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::from(QueryError::new("missing id parameter")))?;

        if self.store.failing_ids.lock().unwrap().contains(&id) {
            return Err(QueryError::new("write rejected by store")
                .with_sql(sql)
                .into());
        }

        let mut rows = self.store.rows.lock().unwrap();
        let key = (table.to_string(), id);
        let Some(existing) = rows.get(&key) else {
            return Ok(0);
        };

        let mut names = Vec::new();
        let mut values = Vec::new();
        for (name, value) in existing.iter() {
            let new_value = columns
                .iter()
                .position(|c| *c == name)
                .map_or_else(|| value.clone(), |i| params[i].clone());
            names.push(name.to_string());
            values.push(new_value);
        }
        rows.insert(key, Row::new(names, values));
        Ok(1)
    }
}

impl ConnectionProvider for MemoryProvider {
    type Conn = MemoryConnection;

    fn acquire(&self) -> Result<Self::Conn> {
        Ok(MemoryConnection {
            store: Arc::clone(&self.store),
        })
    }
}

fn person_row(id: i64, first: &str, last: &str) -> Row {
    Row::new(
        vec![
            "id".to_string(),
            "first_name".to_string(),
            "last_name".to_string(),
        ],
        vec![
            Value::BigInt(id),
            Value::Text(first.to_string()),
            Value::Text(last.to_string()),
        ],
    )
}

fn track_row(id: i64, title: &str, artist: &str, plays: Option<i64>) -> Row {
    Row::new(
        vec![
            "id".to_string(),
            "title".to_string(),
            "artist".to_string(),
            "plays".to_string(),
        ],
        vec![
            Value::BigInt(id),
            Value::Text(title.to_string()),
            Value::Text(artist.to_string()),
            plays.into(),
        ],
    )
}

fn seeded_provider() -> MemoryProvider {
    let provider = MemoryProvider::default();
    provider.seed("persons", 1, person_row(1, "Ivan", "Ivanov"));
    provider.seed("persons", 2, person_row(2, "Taras", "Petrenko"));
    provider.seed("tracks", 1, track_row(1, "Intro", "Okean", None));
    provider
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[test]
fn repeated_find_returns_the_identical_instance() {
    let provider = seeded_provider();
    let mut session = SessionFactory::new(provider).open_session();

    let first = session.find::<Person>(1).unwrap();
    let second = session.find::<Person>(1).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn cache_hit_issues_no_second_select() {
    let provider = seeded_provider();
    let factory = SessionFactory::new(provider.clone());
    let mut session = factory.open_session();

    let _ = session.find::<Person>(1).unwrap();
    let _ = session.find::<Person>(1).unwrap();

    assert_eq!(provider.query_count(), 1);
}

#[test]
fn closing_without_mutation_writes_nothing() {
    let provider = seeded_provider();
    let mut session = SessionFactory::new(provider.clone()).open_session();

    let _ = session.find::<Person>(1).unwrap();
    session.close().unwrap();

    assert!(provider.executes().is_empty());
}

#[test]
fn one_mutation_flushes_exactly_one_update() {
    let provider = seeded_provider();
    let mut session = SessionFactory::new(provider.clone()).open_session();

    let person = session.find::<Person>(1).unwrap();
    person.write().unwrap().first_name = "Stas".to_string();
    session.close().unwrap();

    let executes = provider.executes();
    assert_eq!(executes.len(), 1);
    assert_eq!(
        executes[0],
        (
            "update persons set first_name = ?, last_name = ? where id = ?".to_string(),
            vec![
                Value::Text("Stas".to_string()),
                Value::Text("Ivanov".to_string()),
                Value::BigInt(1),
            ],
        )
    );
}

#[test]
fn multi_field_diff_keeps_unchanged_column_at_its_original_value() {
    let provider = seeded_provider();
    let mut session = SessionFactory::new(provider.clone()).open_session();

    let track = session.find::<Track>(1).unwrap();
    {
        let mut track = track.write().unwrap();
        track.title = "Outro".to_string();
        track.plays = Some(10);
    }
    session.close().unwrap();

    let executes = provider.executes();
    assert_eq!(executes.len(), 1);
    assert_eq!(
        executes[0],
        (
            "update tracks set title = ?, artist = ?, plays = ? where id = ?".to_string(),
            vec![
                Value::Text("Outro".to_string()),
                Value::Text("Okean".to_string()),
                Value::BigInt(10),
                Value::BigInt(1),
            ],
        )
    );
}

#[test]
fn null_to_value_counts_as_a_change() {
    let provider = seeded_provider();
    let mut session = SessionFactory::new(provider.clone()).open_session();

    let track = session.find::<Track>(1).unwrap();
    track.write().unwrap().plays = Some(1);
    session.close().unwrap();

    assert_eq!(provider.executes().len(), 1);
}

#[test]
fn close_clears_tracking_and_a_new_session_reselects() {
    let provider = seeded_provider();
    let factory = SessionFactory::new(provider.clone());

    let mut session = factory.open_session();
    let _ = session.find::<Person>(1).unwrap();
    session.close().unwrap();

    let mut session = factory.open_session();
    let _ = session.find::<Person>(1).unwrap();

    assert_eq!(provider.query_count(), 2);
}

#[test]
fn find_for_a_missing_row_is_not_found() {
    let provider = seeded_provider();
    let mut session = SessionFactory::new(provider).open_session();

    let err = session.find::<Person>(404).unwrap_err();
    match err {
        Error::NotFound(e) => {
            assert_eq!(e.table, "persons");
            assert_eq!(e.id, 404);
        }
        other => panic!("expected not-found, got {other}"),
    }
}

#[test]
fn one_failing_flush_does_not_block_the_other() {
    let provider = seeded_provider();
    provider.fail_updates_for(1);
    let mut session = SessionFactory::new(provider.clone()).open_session();

    let doomed = session.find::<Person>(1).unwrap();
    let fine = session.find::<Person>(2).unwrap();
    doomed.write().unwrap().first_name = "Stas".to_string();
    fine.write().unwrap().first_name = "Ostap".to_string();

    let err = session.close().unwrap_err();
    match err {
        Error::Flush(e) => {
            assert_eq!(e.failures.len(), 1);
            assert_eq!(e.failures[0].id, 1);
        }
        other => panic!("expected flush error, got {other}"),
    }

    // Both updates were attempted, and the survivor landed in the store.
    assert_eq!(provider.executes().len(), 2);
    let mut verify = SessionFactory::new(provider).open_session();
    let fine = verify.find::<Person>(2).unwrap();
    assert_eq!(fine.read().unwrap().first_name, "Ostap");
}

#[test]
fn rename_scenario_round_trips_through_the_store() {
    let provider = seeded_provider();
    let factory = SessionFactory::new(provider.clone());

    let mut session = factory.open_session();
    let person = session.find::<Person>(1).unwrap();
    assert_eq!(
        *person.read().unwrap(),
        Person {
            id: Some(1),
            first_name: "Ivan".to_string(),
            last_name: "Ivanov".to_string(),
        }
    );

    person.write().unwrap().first_name = "Stas".to_string();
    session.close().unwrap();

    let executes = provider.executes();
    assert_eq!(executes.len(), 1);
    assert_eq!(
        executes[0],
        (
            "update persons set first_name = ?, last_name = ? where id = ?".to_string(),
            vec![
                Value::Text("Stas".to_string()),
                Value::Text("Ivanov".to_string()),
                Value::BigInt(1),
            ],
        )
    );

    let mut session = factory.open_session();
    let person = session.find::<Person>(1).unwrap();
    assert_eq!(person.read().unwrap().first_name, "Stas");
    assert_eq!(person.read().unwrap().last_name, "Ivanov");
}
