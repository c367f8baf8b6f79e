//! End to end tests against sqlite: domain registration, generated
//! schemas, transactional inserts, and failure rollback.

use chrono::{FixedOffset, TimeZone, Utc};
use std::time::Duration;
use tokio::sync::watch;

use domainmap::{
    CodeName, Domain, Field, Identity, IntegerSetting, ListSetting, MapError, Object,
    ObjectValues, Range, Setting, SqliteDialect, SqliteDriver, Store, StoreOptions, StringSetting,
    TimestampSetting, Unit, Value,
};

fn string_setting(min: u64, max: u64, single_line: bool) -> Setting {
    Setting::String(StringSetting {
        min_code_points: min,
        max_code_points: max,
        single_line,
    })
}

fn timestamp_setting(with_time_zone_offset: bool) -> Setting {
    Setting::Timestamp(TimestampSetting {
        min: Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
        max: Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap(),
        scale: Duration::from_secs(1),
        with_time_zone_offset,
    })
}

fn integer_setting(min: i128, max: i128, unit: Option<Unit>) -> Setting {
    Setting::Integer(IntegerSetting { min, max, unit })
}

/// Visits record who arrived when, in the zone they arrived in.
fn visit_object() -> Object {
    Object::new("visit")
        .unwrap()
        .with_field(Field::new("arrived", timestamp_setting(true)).unwrap())
        .unwrap()
        .with_field(Field::new("visitor", string_setting(2, 100, true)).unwrap())
        .unwrap()
        .with_field(Field::new("party_size", integer_setting(1, 99, None)).unwrap())
        .unwrap()
        .with_field(
            Field::new("note", string_setting(0, 2000, false))
                .unwrap()
                .with_nullable(true),
        )
        .unwrap()
        .with_field(Field::new("confirmed", Setting::Boolean).unwrap())
        .unwrap()
        .with_identity(Identity::over(["arrived", "visitor"]).unwrap())
}

/// Events carry a time range and an ordered unique tag list.
fn event_object() -> Object {
    Object::new("event")
        .unwrap()
        .with_field(Field::new("title", string_setting(1, 80, true)).unwrap())
        .unwrap()
        .with_field(Field::new("start_time", timestamp_setting(false)).unwrap())
        .unwrap()
        .with_field(Field::new("end_time", timestamp_setting(false)).unwrap())
        .unwrap()
        .with_field(Field::new("published", Setting::Boolean).unwrap())
        .unwrap()
        .with_field(
            Field::new(
                "capacity",
                integer_setting(0, 10_000, Some(Unit::new("seat", "seats").unwrap())),
            )
            .unwrap(),
        )
        .unwrap()
        .with_field(
            Field::new(
                "tags",
                Setting::List(ListSetting {
                    min_length: 0,
                    max_length: 5,
                    ordered: true,
                    unique: true,
                    item: Box::new(string_setting(1, 40, true)),
                }),
            )
            .unwrap(),
        )
        .unwrap()
        .with_identity(Identity::over(["title"]).unwrap())
        .with_range(Range::new("start_time", "end_time", false).unwrap())
}

/// Rooms hold only kinds JSON can express directly.
fn room_object() -> Object {
    Object::new("room")
        .unwrap()
        .with_field(Field::new("name", string_setting(1, 50, true)).unwrap())
        .unwrap()
        .with_field(Field::new("seats", integer_setting(0, 500, None)).unwrap())
        .unwrap()
        .with_field(Field::new("open", Setting::Boolean).unwrap())
        .unwrap()
        .with_identity(Identity::over(["name"]).unwrap())
}

fn schedule_domain() -> Domain {
    Domain::new("schedule")
        .unwrap()
        .with_object(visit_object())
        .unwrap()
        .with_object(event_object())
        .unwrap()
        .with_object(room_object())
        .unwrap()
}

async fn schedule_store() -> (SqliteDriver, Store) {
    let driver = SqliteDriver::open_in_memory().unwrap();
    let mut store = Store::new(driver.clone(), SqliteDialect::new());
    store.add_domain(&schedule_domain()).await.unwrap();
    (driver, store)
}

fn utc(h: u32, m: u32) -> Value {
    Value::from(Utc.with_ymd_and_hms(2026, 9, 1, h, m, 0).unwrap())
}

fn visit(arrived: Value, visitor: &str, party_size: i64) -> Value {
    Value::record([
        ("arrived", arrived),
        ("visitor", Value::from(visitor)),
        ("party_size", Value::from(party_size)),
        ("confirmed", Value::from(true)),
    ])
}

fn event(title: &str, start_hour: u32, end_hour: u32, tags: Vec<Value>) -> Value {
    Value::record([
        ("title", Value::from(title)),
        ("start_time", utc(start_hour, 0)),
        ("end_time", utc(end_hour, 0)),
        ("published", Value::from(false)),
        ("capacity", Value::from(100i64)),
        ("tags", Value::Seq(tags)),
    ])
}

fn one(object: &str, value: Value) -> ObjectValues {
    let mut values = ObjectValues::new();
    values.insert(CodeName::new(object).unwrap(), value);
    values
}

// =============================================================================
// Schema Creation Tests
// =============================================================================

#[tokio::test]
async fn test_add_domain_creates_all_tables() {
    let (driver, _store) = schedule_store().await;

    let tables = driver
        .query_i64("SELECT count(*) FROM sqlite_master WHERE type = 'table'")
        .unwrap();
    // three main tables plus one helper table for the tag list
    assert_eq!(tables, 4);

    let offset_column = driver
        .query_i64("SELECT count(*) FROM pragma_table_info('schedule_visit') WHERE name = 'arrived_tz'")
        .unwrap();
    assert_eq!(offset_column, 1);
}

#[tokio::test]
async fn test_duplicate_domain_is_rejected() {
    let (_driver, mut store) = schedule_store().await;

    let err = store.add_domain(&schedule_domain()).await.unwrap_err();
    assert!(err.to_string().contains("already exists"), "{err}");
}

#[tokio::test]
async fn test_domains_are_addressed_by_name() {
    let (driver, mut store) = schedule_store().await;

    let archive = Domain::new("archive")
        .unwrap()
        .with_object(
            Object::new("entry")
                .unwrap()
                .with_field(Field::new("label", string_setting(1, 60, true)).unwrap())
                .unwrap()
                .with_identity(Identity::over(["label"]).unwrap()),
        )
        .unwrap();
    store.add_domain(&archive).await.unwrap();

    let name = CodeName::new("archive").unwrap();
    let values = one("entry", Value::record([("label", Value::from("box 9"))]));
    store
        .insert_domain_objects(&name, &values, None)
        .await
        .unwrap();

    assert_eq!(
        driver.query_i64("SELECT count(*) FROM archive_entry").unwrap(),
        1
    );
    // the first domain added stays the default target
    store
        .insert_objects(&one("room", Value::record([
            ("name", Value::from("annex")),
            ("seats", Value::from(12i64)),
            ("open", Value::from(true)),
        ])))
        .await
        .unwrap();
    assert_eq!(
        driver.query_i64("SELECT count(*) FROM schedule_room").unwrap(),
        1
    );
}

// =============================================================================
// Insert Tests
// =============================================================================

#[tokio::test]
async fn test_records_and_sequences_insert_together() {
    let (driver, store) = schedule_store().await;

    let mut values = one(
        "visit",
        Value::Seq(vec![
            visit(utc(9, 15), "Priya", 2),
            visit(utc(11, 40), "Marcos", 4),
        ]),
    );
    values.insert(
        CodeName::new("event").unwrap(),
        event("open day", 9, 17, vec![]),
    );
    store.insert_objects(&values).await.unwrap();

    assert_eq!(
        driver.query_i64("SELECT count(*) FROM schedule_visit").unwrap(),
        2
    );
    assert_eq!(
        driver.query_i64("SELECT count(*) FROM schedule_event").unwrap(),
        1
    );
}

#[tokio::test]
async fn test_stored_forms_match_the_mapping() {
    let (driver, store) = schedule_store().await;

    // half past midnight in Kochi is evening of the day before in UTC
    let kochi = FixedOffset::east_opt(19_800).unwrap();
    let arrived = Value::from(kochi.with_ymd_and_hms(2026, 7, 5, 0, 0, 0).unwrap());
    store
        .insert_objects(&one("visit", visit(arrived, "Priya", 2)))
        .await
        .unwrap();

    let stored = driver
        .query_i64(
            "SELECT count(*) FROM schedule_visit \
             WHERE arrived = '2026-07-04T18:30:00' AND arrived_tz = 19800 \
             AND confirmed = 1 AND note IS NULL",
        )
        .unwrap();
    assert_eq!(stored, 1);
}

#[tokio::test]
async fn test_helper_rows_follow_their_event() {
    let (driver, store) = schedule_store().await;

    let tags = vec![
        Value::from("family"),
        Value::from("music"),
        Value::from("outdoor"),
    ];
    store
        .insert_objects(&one("event", event("launch party", 18, 22, tags)))
        .await
        .unwrap();

    let rows = driver
        .query_i64("SELECT count(*) FROM schedule_event__tags WHERE title = 'launch party'")
        .unwrap();
    assert_eq!(rows, 3);
    let second = driver
        .query_i64(
            "SELECT count(*) FROM schedule_event__tags \
             WHERE tags_order = 2 AND tags_item = 'music'",
        )
        .unwrap();
    assert_eq!(second, 1);
}

#[tokio::test]
async fn test_json_input_maps_cleanly() {
    let (driver, store) = schedule_store().await;

    let room = Value::from_json(serde_json::json!({
        "name": "main hall",
        "seats": 120,
        "open": true,
    }));
    store.insert_objects(&one("room", room)).await.unwrap();

    let stored = driver
        .query_i64("SELECT count(*) FROM schedule_room WHERE seats = 120 AND open = 1")
        .unwrap();
    assert_eq!(stored, 1);
}

// =============================================================================
// Failure and Rollback Tests
// =============================================================================

#[tokio::test]
async fn test_duplicate_key_rolls_back_the_batch() {
    let (driver, store) = schedule_store().await;

    store
        .insert_objects(&one("visit", visit(utc(9, 0), "Priya", 2)))
        .await
        .unwrap();

    // the second element repeats the stored key, so the first must not land
    let batch = Value::Seq(vec![
        visit(utc(10, 0), "Marcos", 4),
        visit(utc(9, 0), "Priya", 3),
    ]);
    let err = store.insert_objects(&one("visit", batch)).await.unwrap_err();
    assert!(matches!(err, MapError::Sqlite(_)), "{err}");

    assert_eq!(
        driver.query_i64("SELECT count(*) FROM schedule_visit").unwrap(),
        1
    );
}

#[tokio::test]
async fn test_range_check_rolls_back() {
    let (driver, store) = schedule_store().await;

    let backwards = event("time warp", 17, 9, vec![]);
    let err = store
        .insert_objects(&one("event", backwards))
        .await
        .unwrap_err();
    assert!(matches!(err, MapError::Sqlite(_)), "{err}");

    assert_eq!(
        driver.query_i64("SELECT count(*) FROM schedule_event").unwrap(),
        0
    );
}

#[tokio::test]
async fn test_required_fields_fail_before_sql() {
    let (driver, store) = schedule_store().await;

    let missing = Value::record([("visitor", Value::from("Priya"))]);
    let err = store
        .insert_objects(&one("visit", missing))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("\"arrived\" requires a value"), "{err}");

    assert_eq!(
        driver.query_i64("SELECT count(*) FROM schedule_visit").unwrap(),
        0
    );
}

#[tokio::test]
async fn test_unknown_names_are_reported() {
    let (_driver, store) = schedule_store().await;

    let err = store
        .insert_objects(&one("meeting", Value::record([("x", Value::from(1i64))])))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "object \"meeting\" is not found");

    let name = CodeName::new("nowhere").unwrap();
    let err = store
        .insert_domain_objects(&name, &ObjectValues::new(), None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "domain \"nowhere\" is not found");
}

// =============================================================================
// Options and Cancellation Tests
// =============================================================================

#[tokio::test]
async fn test_cancellation_stops_before_writing() {
    let (driver, store) = schedule_store().await;

    let (_tx, rx) = watch::channel(true);
    let name = CodeName::new("schedule").unwrap();
    let err = store
        .insert_domain_objects(&name, &one("visit", visit(utc(9, 0), "Priya", 2)), Some(rx))
        .await
        .unwrap_err();
    assert!(matches!(err, MapError::Cancelled), "{err}");

    assert_eq!(
        driver.query_i64("SELECT count(*) FROM schedule_visit").unwrap(),
        0
    );
}

#[tokio::test]
async fn test_surrogate_keys_option() {
    let driver = SqliteDriver::open_in_memory().unwrap();
    let mut store = Store::with_options(
        driver.clone(),
        SqliteDialect::new(),
        StoreOptions::default().with_surrogate_keys(true),
    );
    store.add_domain(&schedule_domain()).await.unwrap();

    let batch = Value::Seq(vec![
        visit(utc(9, 0), "Priya", 2),
        visit(utc(10, 0), "Marcos", 4),
    ]);
    store.insert_objects(&one("visit", batch)).await.unwrap();
    assert_eq!(
        driver.query_i64("SELECT max(_id) FROM schedule_visit").unwrap(),
        2
    );

    // list rows need a natural key to reference
    let err = store
        .insert_objects(&one("event", event("launch", 9, 17, vec![Value::from("new")])))
        .await
        .unwrap_err();
    assert!(
        err.to_string().contains("\"tags\" of list is not supported"),
        "{err}"
    );
}

#[tokio::test]
async fn test_file_backed_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.db");

    let mut store = Store::sqlite(&path).unwrap();
    store.add_domain(&schedule_domain()).await.unwrap();
    store
        .insert_objects(&one("visit", visit(utc(9, 0), "Priya", 2)))
        .await
        .unwrap();
    drop(store);

    let driver = SqliteDriver::open(&path).unwrap();
    assert_eq!(
        driver.query_i64("SELECT count(*) FROM schedule_visit").unwrap(),
        1
    );
}
