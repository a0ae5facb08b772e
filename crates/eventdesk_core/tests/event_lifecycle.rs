use chrono::NaiveDate;
use eventdesk_core::{
    EventLifecycle, EventRepository, EventStatus, NewEvent, SnapshotStore, StoreEventRepository,
};
use std::sync::Arc;
use std::time::Duration;

const TODAY: (i32, u32, u32) = (2026, 6, 15);

#[test]
fn end_date_expiry_overrides_the_upcoming_exemption() {
    let (store, lifecycle) = setup();
    let repo = StoreEventRepository::new(&store);
    let id = create_event(&repo, "ended", day(2026, 6, 1), Some(day(2026, 6, 14)), EventStatus::Upcoming);

    let transitions = lifecycle.refresh_on(today()).unwrap();

    assert_eq!(transitions, 1);
    assert_eq!(status_of(&repo, id), EventStatus::Recent);
}

#[test]
fn upcoming_events_are_exempt_from_date_based_expiry() {
    let (store, lifecycle) = setup();
    let repo = StoreEventRepository::new(&store);
    let id = create_event(&repo, "kept visible", day(2026, 6, 14), None, EventStatus::Upcoming);

    let transitions = lifecycle.refresh_on(today()).unwrap();

    assert_eq!(transitions, 0);
    assert_eq!(status_of(&repo, id), EventStatus::Upcoming);
}

#[test]
fn start_day_promotes_upcoming_to_ongoing() {
    let (store, lifecycle) = setup();
    let repo = StoreEventRepository::new(&store);
    let id = create_event(&repo, "starts today", today(), None, EventStatus::Upcoming);

    lifecycle.refresh_on(today()).unwrap();

    assert_eq!(status_of(&repo, id), EventStatus::Ongoing);
}

#[test]
fn ongoing_events_expire_once_their_start_has_passed() {
    let (store, lifecycle) = setup();
    let repo = StoreEventRepository::new(&store);
    let id = create_event(&repo, "wrapped up", day(2026, 6, 14), None, EventStatus::Ongoing);

    lifecycle.refresh_on(today()).unwrap();

    assert_eq!(status_of(&repo, id), EventStatus::Recent);
}

#[test]
fn future_dated_events_are_restored_to_upcoming() {
    let (store, lifecycle) = setup();
    let repo = StoreEventRepository::new(&store);
    let id = create_event(&repo, "rescheduled", day(2026, 6, 20), None, EventStatus::Ongoing);

    lifecycle.refresh_on(today()).unwrap();

    assert_eq!(status_of(&repo, id), EventStatus::Upcoming);
}

#[test]
fn refresh_is_idempotent_without_date_or_data_changes() {
    let (store, lifecycle) = setup();
    let repo = StoreEventRepository::new(&store);
    create_event(&repo, "ended", day(2026, 6, 1), Some(day(2026, 6, 10)), EventStatus::Upcoming);
    create_event(&repo, "starts today", today(), None, EventStatus::Upcoming);
    create_event(&repo, "future", day(2026, 7, 1), None, EventStatus::Upcoming);

    let first = lifecycle.refresh_on(today()).unwrap();
    let second = lifecycle.refresh_on(today()).unwrap();

    assert_eq!(first, 2);
    assert_eq!(second, 0);
}

#[test]
fn periodic_timer_applies_transitions() {
    let (store, lifecycle) = setup();
    let lifecycle = Arc::new(lifecycle);
    let repo = StoreEventRepository::new(&store);
    let id = create_event(
        &repo,
        "long over",
        day(2000, 1, 1),
        Some(day(2000, 1, 2)),
        EventStatus::Upcoming,
    );

    let timer = lifecycle.start_timer(Duration::from_millis(25));

    let mut advanced = false;
    for _ in 0..80 {
        if status_of(&repo, id) == EventStatus::Recent {
            advanced = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    timer.stop();

    assert!(advanced, "timer never re-derived the event status");
}

fn setup() -> (Arc<SnapshotStore>, EventLifecycle) {
    let store = Arc::new(SnapshotStore::in_memory().unwrap());
    let lifecycle = EventLifecycle::new(Arc::clone(&store));
    (store, lifecycle)
}

fn create_event(
    repo: &StoreEventRepository<'_>,
    name: &str,
    date: NaiveDate,
    end_date: Option<NaiveDate>,
    status: EventStatus,
) -> i64 {
    let mut payload = NewEvent::new(name, date);
    payload.end_date = end_date;
    payload.status = status;
    repo.create(&payload).unwrap()
}

fn status_of(repo: &StoreEventRepository<'_>, id: i64) -> EventStatus {
    repo.get(id).unwrap().unwrap().status
}

fn today() -> NaiveDate {
    day(TODAY.0, TODAY.1, TODAY.2)
}

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
