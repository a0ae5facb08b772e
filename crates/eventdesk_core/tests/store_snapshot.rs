use chrono::NaiveDate;
use eventdesk_core::{
    DbError, EventRepository, EventStatus, NewEvent, RepoError, SnapshotStore,
    StoreEventRepository,
};
use rusqlite::params;
use rusqlite::types::Value;
use std::fs;

#[test]
fn round_trip_across_store_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");

    {
        let store = SnapshotStore::open(&path).unwrap();
        let repo = StoreEventRepository::new(&store);

        let mut spring = NewEvent::new("Spring fair", day(2026, 4, 10));
        spring.venue = "Main hall".to_string();
        spring.is_paid = true;
        spring.price = 12.5;
        repo.create(&spring).unwrap();

        let mut summer = NewEvent::new("Summer camp", day(2026, 7, 1));
        summer.end_date = Some(day(2026, 7, 5));
        summer.status = EventStatus::Ongoing;
        repo.create(&summer).unwrap();
    }

    let reopened = SnapshotStore::open(&path).unwrap();
    let repo = StoreEventRepository::new(&reopened);
    let events = repo.list_all().unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].name, "Summer camp");
    assert_eq!(events[0].end_date, Some(day(2026, 7, 5)));
    assert_eq!(events[0].status, EventStatus::Ongoing);
    assert_eq!(events[1].name, "Spring fair");
    assert_eq!(events[1].venue, "Main hall");
    assert!(events[1].is_paid);
    assert_eq!(events[1].price, 12.5);
}

#[test]
fn run_reports_rows_affected_and_inserted_id() {
    let store = SnapshotStore::in_memory().unwrap();

    let insert = store
        .prepare("INSERT INTO news_ticker (text, link, sort_order) VALUES (?1, ?2, ?3);")
        .run(params!["breaking news", "/news/", 9])
        .unwrap();
    assert_eq!(insert.rows_affected, 1);
    assert!(insert.inserted_id > 0);

    let update = store
        .prepare("UPDATE news_ticker SET active = 0;")
        .run([])
        .unwrap();
    // The three seeded rows plus the one above.
    assert_eq!(update.rows_affected, 4);
}

#[test]
fn get_one_returns_none_when_absent() {
    let store = SnapshotStore::in_memory().unwrap();
    let row = store
        .prepare("SELECT * FROM events WHERE id = ?1;")
        .get_one(params![42])
        .unwrap();
    assert!(row.is_none());
}

#[test]
fn malformed_statement_fails_on_execution() {
    let store = SnapshotStore::in_memory().unwrap();
    let result = store.prepare("SELEC nonsense FROM nowhere;").get_all([]);
    assert!(matches!(result, Err(DbError::Sqlite(_))));
}

#[test]
fn unique_credential_collision_is_a_statement_error() {
    let store = SnapshotStore::in_memory().unwrap();
    let result = store
        .prepare("INSERT INTO admin (username, password) VALUES (?1, ?2);")
        .run(params!["admin", "irrelevant"]);
    assert!(matches!(result, Err(DbError::Sqlite(_))));
}

#[test]
fn corrupt_snapshot_file_is_fatal_at_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");
    fs::write(&path, b"this is not a database").unwrap();

    let result = SnapshotStore::open(&path);
    assert!(matches!(result, Err(DbError::SnapshotLoad { .. })));
}

#[test]
fn flush_failure_surfaces_to_the_mutating_call() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    fs::create_dir(&data_dir).unwrap();

    let store = SnapshotStore::open(data_dir.join("store.db")).unwrap();
    fs::remove_dir_all(&data_dir).unwrap();

    let result = store
        .prepare("INSERT INTO news_ticker (text) VALUES (?1);")
        .run(params!["lost update"]);
    assert!(matches!(result, Err(DbError::SnapshotWrite { .. })));
}

#[test]
fn configure_is_best_effort() {
    let store = SnapshotStore::in_memory().unwrap();
    assert!(store.configure("foreign_keys = ON"));
    assert!(!store.configure("journal_mode("));
}

#[test]
fn defaults_are_seeded_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");

    {
        let store = SnapshotStore::open(&path).unwrap();
        assert_eq!(count(&store, "admin"), 1);
        assert_eq!(count(&store, "news_ticker"), 3);
    }

    let reopened = SnapshotStore::open(&path).unwrap();
    assert_eq!(count(&reopened, "admin"), 1);
    assert_eq!(count(&reopened, "news_ticker"), 3);
}

#[test]
fn events_serialize_for_collaborators() {
    let store = SnapshotStore::in_memory().unwrap();
    let repo = StoreEventRepository::new(&store);

    let id = repo.create(&NewEvent::new("Open day", day(2026, 4, 10))).unwrap();
    let event = repo.get(id).unwrap().unwrap();

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["name"], "Open day");
    assert_eq!(json["date"], "2026-04-10");
    assert_eq!(json["end_date"], serde_json::Value::Null);
    assert_eq!(json["status"], "upcoming");
}

#[test]
fn gallery_rows_require_an_existing_event() {
    let store = SnapshotStore::in_memory().unwrap();
    let repo = StoreEventRepository::new(&store);

    let result = repo.add_gallery_image(9999, "/uploads/orphan.jpg");
    assert!(matches!(result, Err(RepoError::Db(DbError::Sqlite(_)))));
}

fn count(store: &SnapshotStore, table: &str) -> i64 {
    let record = store
        .prepare(format!("SELECT COUNT(*) AS n FROM {table};"))
        .get_one([])
        .unwrap()
        .unwrap();
    match record.get("n") {
        Some(Value::Integer(n)) => *n,
        other => panic!("unexpected count value: {other:?}"),
    }
}

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
