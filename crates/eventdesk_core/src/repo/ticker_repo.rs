//! News ticker repository.

use super::{flag_field, flag_to_int, int_field, text_field, RepoError, RepoResult};
use crate::db::store::Record;
use crate::db::SnapshotStore;
use crate::model::content::{NewTickerItem, TickerItem};
use rusqlite::params;

const TICKER_SELECT_SQL: &str =
    "SELECT id, text, link, active, sort_order, created_at FROM news_ticker";

/// Repository interface for ticker CRUD operations.
pub trait TickerRepository {
    fn create(&self, item: &NewTickerItem) -> RepoResult<i64>;
    fn update(&self, id: i64, item: &NewTickerItem) -> RepoResult<()>;
    fn delete(&self, id: i64) -> RepoResult<()>;
    fn list_all(&self) -> RepoResult<Vec<TickerItem>>;
    fn list_active(&self) -> RepoResult<Vec<TickerItem>>;
}

/// Snapshot-store-backed ticker repository.
pub struct StoreTickerRepository<'store> {
    store: &'store SnapshotStore,
}

impl<'store> StoreTickerRepository<'store> {
    pub fn new(store: &'store SnapshotStore) -> Self {
        Self { store }
    }
}

impl TickerRepository for StoreTickerRepository<'_> {
    fn create(&self, item: &NewTickerItem) -> RepoResult<i64> {
        let outcome = self
            .store
            .prepare(
                "INSERT INTO news_ticker (text, link, active, sort_order)
                 VALUES (?1, ?2, ?3, ?4);",
            )
            .run(params![
                item.text.as_str(),
                item.link.as_str(),
                flag_to_int(item.active),
                item.sort_order,
            ])?;
        Ok(outcome.inserted_id)
    }

    fn update(&self, id: i64, item: &NewTickerItem) -> RepoResult<()> {
        let outcome = self
            .store
            .prepare(
                "UPDATE news_ticker
                 SET text = ?1, link = ?2, active = ?3, sort_order = ?4
                 WHERE id = ?5;",
            )
            .run(params![
                item.text.as_str(),
                item.link.as_str(),
                flag_to_int(item.active),
                item.sort_order,
                id,
            ])?;
        if outcome.rows_affected == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete(&self, id: i64) -> RepoResult<()> {
        let outcome = self
            .store
            .prepare("DELETE FROM news_ticker WHERE id = ?1;")
            .run(params![id])?;
        if outcome.rows_affected == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_all(&self) -> RepoResult<Vec<TickerItem>> {
        let records = self
            .store
            .prepare(format!("{TICKER_SELECT_SQL} ORDER BY sort_order ASC;"))
            .get_all([])?;
        records.iter().map(parse_ticker_record).collect()
    }

    fn list_active(&self) -> RepoResult<Vec<TickerItem>> {
        let records = self
            .store
            .prepare(format!(
                "{TICKER_SELECT_SQL} WHERE active = 1 ORDER BY sort_order ASC;"
            ))
            .get_all([])?;
        records.iter().map(parse_ticker_record).collect()
    }
}

fn parse_ticker_record(record: &Record) -> RepoResult<TickerItem> {
    Ok(TickerItem {
        id: int_field(record, "id")?,
        text: text_field(record, "text")?,
        link: text_field(record, "link")?,
        active: flag_field(record, "active")?,
        sort_order: int_field(record, "sort_order")?,
        created_at: text_field(record, "created_at")?,
    })
}
