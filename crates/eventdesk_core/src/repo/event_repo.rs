//! Event and gallery repository.
//!
//! # Responsibility
//! - CRUD over the `events` table, including the admin status override.
//! - Gallery image rows owned by an event, and the file-path bookkeeping
//!   the caller needs to clean up uploads after deletions.
//!
//! # Invariants
//! - `delete` removes gallery rows before the owning event row and reports
//!   every referenced image path back to the caller; removing the files
//!   themselves is the caller's responsibility at the boundary.
//! - Targeted updates against a missing id fail with `RepoError::NotFound`.

use super::{
    date_field, date_to_db, flag_field, flag_to_int, int_field, opt_date_field, real_field,
    text_field, RepoError, RepoResult,
};
use crate::db::store::Record;
use crate::db::SnapshotStore;
use crate::model::content::GalleryImage;
use crate::model::event::{Event, EventStatus, NewEvent};
use rusqlite::params;

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    date,
    end_date,
    venue,
    description,
    cover_image,
    registration_open,
    is_paid,
    price,
    registration_link,
    status,
    created_at
FROM events";

/// Image paths released by deleting an event. The caller owns removing the
/// files from upload storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemovedEventFiles {
    pub cover_image: Option<String>,
    pub gallery: Vec<String>,
}

/// Repository interface for events and their gallery.
pub trait EventRepository {
    fn create(&self, event: &NewEvent) -> RepoResult<i64>;
    fn update(&self, id: i64, event: &NewEvent) -> RepoResult<()>;
    fn get(&self, id: i64) -> RepoResult<Option<Event>>;
    fn list_all(&self) -> RepoResult<Vec<Event>>;
    fn list_by_status(&self, status: EventStatus) -> RepoResult<Vec<Event>>;
    fn set_status(&self, id: i64, status: EventStatus) -> RepoResult<()>;
    fn delete(&self, id: i64) -> RepoResult<RemovedEventFiles>;
    fn add_gallery_image(&self, event_id: i64, image_path: &str) -> RepoResult<i64>;
    fn gallery(&self, event_id: i64) -> RepoResult<Vec<GalleryImage>>;
    fn delete_gallery_image(&self, image_id: i64) -> RepoResult<String>;
}

/// Snapshot-store-backed event repository.
pub struct StoreEventRepository<'store> {
    store: &'store SnapshotStore,
}

impl<'store> StoreEventRepository<'store> {
    pub fn new(store: &'store SnapshotStore) -> Self {
        Self { store }
    }
}

impl EventRepository for StoreEventRepository<'_> {
    fn create(&self, event: &NewEvent) -> RepoResult<i64> {
        let outcome = self
            .store
            .prepare(
                "INSERT INTO events (
                    name, date, end_date, venue, description, cover_image,
                    registration_open, is_paid, price, registration_link, status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            )
            .run(params![
                event.name.as_str(),
                date_to_db(event.date),
                event.end_date.map(date_to_db),
                event.venue.as_str(),
                event.description.as_str(),
                event.cover_image.as_str(),
                flag_to_int(event.registration_open),
                flag_to_int(event.is_paid),
                event.price,
                event.registration_link.as_str(),
                event.status.as_str(),
            ])?;
        Ok(outcome.inserted_id)
    }

    fn update(&self, id: i64, event: &NewEvent) -> RepoResult<()> {
        let outcome = self
            .store
            .prepare(
                "UPDATE events SET
                    name = ?1, date = ?2, end_date = ?3, venue = ?4, description = ?5,
                    cover_image = ?6, registration_open = ?7, is_paid = ?8, price = ?9,
                    registration_link = ?10, status = ?11
                 WHERE id = ?12;",
            )
            .run(params![
                event.name.as_str(),
                date_to_db(event.date),
                event.end_date.map(date_to_db),
                event.venue.as_str(),
                event.description.as_str(),
                event.cover_image.as_str(),
                flag_to_int(event.registration_open),
                flag_to_int(event.is_paid),
                event.price,
                event.registration_link.as_str(),
                event.status.as_str(),
                id,
            ])?;

        if outcome.rows_affected == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get(&self, id: i64) -> RepoResult<Option<Event>> {
        let record = self
            .store
            .prepare(format!("{EVENT_SELECT_SQL} WHERE id = ?1;"))
            .get_one(params![id])?;
        record.as_ref().map(parse_event_record).transpose()
    }

    fn list_all(&self) -> RepoResult<Vec<Event>> {
        let records = self
            .store
            .prepare(format!("{EVENT_SELECT_SQL} ORDER BY date DESC;"))
            .get_all([])?;
        records.iter().map(parse_event_record).collect()
    }

    fn list_by_status(&self, status: EventStatus) -> RepoResult<Vec<Event>> {
        // Concluded events read newest-first; upcoming/ongoing soonest-first.
        let order = match status {
            EventStatus::Recent => "DESC",
            EventStatus::Upcoming | EventStatus::Ongoing => "ASC",
        };
        let records = self
            .store
            .prepare(format!(
                "{EVENT_SELECT_SQL} WHERE status = ?1 ORDER BY date {order};"
            ))
            .get_all(params![status.as_str()])?;
        records.iter().map(parse_event_record).collect()
    }

    fn set_status(&self, id: i64, status: EventStatus) -> RepoResult<()> {
        let outcome = self
            .store
            .prepare("UPDATE events SET status = ?1 WHERE id = ?2;")
            .run(params![status.as_str(), id])?;
        if outcome.rows_affected == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete(&self, id: i64) -> RepoResult<RemovedEventFiles> {
        let Some(event) = self.get(id)? else {
            return Err(RepoError::NotFound(id));
        };

        let gallery = self
            .gallery(id)?
            .into_iter()
            .map(|image| image.image_path)
            .collect();

        self.store
            .prepare("DELETE FROM event_gallery WHERE event_id = ?1;")
            .run(params![id])?;
        self.store
            .prepare("DELETE FROM events WHERE id = ?1;")
            .run(params![id])?;

        Ok(RemovedEventFiles {
            cover_image: (!event.cover_image.is_empty()).then_some(event.cover_image),
            gallery,
        })
    }

    fn add_gallery_image(&self, event_id: i64, image_path: &str) -> RepoResult<i64> {
        let outcome = self
            .store
            .prepare("INSERT INTO event_gallery (event_id, image_path) VALUES (?1, ?2);")
            .run(params![event_id, image_path])?;
        Ok(outcome.inserted_id)
    }

    fn gallery(&self, event_id: i64) -> RepoResult<Vec<GalleryImage>> {
        let records = self
            .store
            .prepare(
                "SELECT id, event_id, image_path, created_at
                 FROM event_gallery WHERE event_id = ?1;",
            )
            .get_all(params![event_id])?;
        records.iter().map(parse_gallery_record).collect()
    }

    fn delete_gallery_image(&self, image_id: i64) -> RepoResult<String> {
        let record = self
            .store
            .prepare("SELECT image_path FROM event_gallery WHERE id = ?1;")
            .get_one(params![image_id])?;
        let Some(record) = record else {
            return Err(RepoError::NotFound(image_id));
        };
        let image_path = text_field(&record, "image_path")?;

        self.store
            .prepare("DELETE FROM event_gallery WHERE id = ?1;")
            .run(params![image_id])?;
        Ok(image_path)
    }
}

fn parse_event_record(record: &Record) -> RepoResult<Event> {
    let status_text = text_field(record, "status")?;
    let status = EventStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in events.status"))
    })?;

    Ok(Event {
        id: int_field(record, "id")?,
        name: text_field(record, "name")?,
        date: date_field(record, "date")?,
        end_date: opt_date_field(record, "end_date")?,
        venue: text_field(record, "venue")?,
        description: text_field(record, "description")?,
        cover_image: text_field(record, "cover_image")?,
        registration_open: flag_field(record, "registration_open")?,
        is_paid: flag_field(record, "is_paid")?,
        price: real_field(record, "price")?,
        registration_link: text_field(record, "registration_link")?,
        status,
        created_at: text_field(record, "created_at")?,
    })
}

fn parse_gallery_record(record: &Record) -> RepoResult<GalleryImage> {
    Ok(GalleryImage {
        id: int_field(record, "id")?,
        event_id: int_field(record, "event_id")?,
        image_path: text_field(record, "image_path")?,
        created_at: text_field(record, "created_at")?,
    })
}
