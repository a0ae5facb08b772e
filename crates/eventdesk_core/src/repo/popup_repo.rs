//! Popup repository.
//!
//! # Invariants
//! - At most one popup row has `active = 1` at any time. Every write path
//!   that activates a popup deactivates all others as part of the same
//!   logical operation; the schema does not enforce this.

use super::{flag_field, flag_to_int, int_field, text_field, RepoError, RepoResult};
use crate::db::store::Record;
use crate::db::SnapshotStore;
use crate::model::content::{NewPopup, Popup};
use rusqlite::params;

const POPUP_SELECT_SQL: &str = "SELECT
    id, image, event_name, description, layout, button_text, button_link,
    active, created_at
FROM popup";

/// Repository interface for popup CRUD and activation.
pub trait PopupRepository {
    fn create(&self, popup: &NewPopup) -> RepoResult<i64>;
    fn update(&self, id: i64, popup: &NewPopup) -> RepoResult<()>;
    /// Deletes a popup, returning its image path (if any) for file cleanup.
    fn delete(&self, id: i64) -> RepoResult<Option<String>>;
    fn list_all(&self) -> RepoResult<Vec<Popup>>;
    /// Returns the single active popup, if one exists.
    fn active(&self) -> RepoResult<Option<Popup>>;
    /// Flips a popup's active flag, returning the new state. Activating
    /// deactivates every other popup first.
    fn toggle_active(&self, id: i64) -> RepoResult<bool>;
}

/// Snapshot-store-backed popup repository.
pub struct StorePopupRepository<'store> {
    store: &'store SnapshotStore,
}

impl<'store> StorePopupRepository<'store> {
    pub fn new(store: &'store SnapshotStore) -> Self {
        Self { store }
    }

    fn deactivate_all(&self) -> RepoResult<()> {
        self.store
            .prepare("UPDATE popup SET active = 0;")
            .run([])?;
        Ok(())
    }
}

impl PopupRepository for StorePopupRepository<'_> {
    fn create(&self, popup: &NewPopup) -> RepoResult<i64> {
        if popup.active {
            self.deactivate_all()?;
        }
        let outcome = self
            .store
            .prepare(
                "INSERT INTO popup (image, event_name, description, layout, button_text, button_link, active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            )
            .run(params![
                popup.image.as_str(),
                popup.event_name.as_str(),
                popup.description.as_str(),
                popup.layout.as_str(),
                popup.button_text.as_str(),
                popup.button_link.as_str(),
                flag_to_int(popup.active),
            ])?;
        Ok(outcome.inserted_id)
    }

    fn update(&self, id: i64, popup: &NewPopup) -> RepoResult<()> {
        if popup.active {
            self.deactivate_all()?;
        }
        let outcome = self
            .store
            .prepare(
                "UPDATE popup
                 SET image = ?1, event_name = ?2, description = ?3, layout = ?4,
                     button_text = ?5, button_link = ?6, active = ?7
                 WHERE id = ?8;",
            )
            .run(params![
                popup.image.as_str(),
                popup.event_name.as_str(),
                popup.description.as_str(),
                popup.layout.as_str(),
                popup.button_text.as_str(),
                popup.button_link.as_str(),
                flag_to_int(popup.active),
                id,
            ])?;
        if outcome.rows_affected == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete(&self, id: i64) -> RepoResult<Option<String>> {
        let record = self
            .store
            .prepare("SELECT image FROM popup WHERE id = ?1;")
            .get_one(params![id])?;
        let Some(record) = record else {
            return Err(RepoError::NotFound(id));
        };
        let image = text_field(&record, "image")?;

        self.store
            .prepare("DELETE FROM popup WHERE id = ?1;")
            .run(params![id])?;
        Ok((!image.is_empty()).then_some(image))
    }

    fn list_all(&self) -> RepoResult<Vec<Popup>> {
        let records = self
            .store
            .prepare(format!("{POPUP_SELECT_SQL} ORDER BY created_at DESC;"))
            .get_all([])?;
        records.iter().map(parse_popup_record).collect()
    }

    fn active(&self) -> RepoResult<Option<Popup>> {
        let record = self
            .store
            .prepare(format!(
                "{POPUP_SELECT_SQL} WHERE active = 1 ORDER BY created_at DESC LIMIT 1;"
            ))
            .get_one([])?;
        record.as_ref().map(parse_popup_record).transpose()
    }

    fn toggle_active(&self, id: i64) -> RepoResult<bool> {
        let record = self
            .store
            .prepare("SELECT active FROM popup WHERE id = ?1;")
            .get_one(params![id])?;
        let Some(record) = record else {
            return Err(RepoError::NotFound(id));
        };
        let activate = !flag_field(&record, "active")?;

        if activate {
            self.deactivate_all()?;
        }
        self.store
            .prepare("UPDATE popup SET active = ?1 WHERE id = ?2;")
            .run(params![flag_to_int(activate), id])?;
        Ok(activate)
    }
}

fn parse_popup_record(record: &Record) -> RepoResult<Popup> {
    Ok(Popup {
        id: int_field(record, "id")?,
        image: text_field(record, "image")?,
        event_name: text_field(record, "event_name")?,
        description: text_field(record, "description")?,
        layout: text_field(record, "layout")?,
        button_text: text_field(record, "button_text")?,
        button_link: text_field(record, "button_link")?,
        active: flag_field(record, "active")?,
        created_at: text_field(record, "created_at")?,
    })
}
