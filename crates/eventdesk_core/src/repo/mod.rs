//! Repository contracts and snapshot-store implementations.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the persisted entity tables.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths enforce entity invariants (single active popup, gallery
//!   rows scoped to their owning event) before or as part of mutation.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::store::Record;
use crate::db::DbError;
use chrono::NaiveDate;
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod credential_repo;
pub mod event_repo;
pub mod popup_repo;
pub mod ticker_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(i64),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "row not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn flag_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_field(record: &Record, column: &str) -> RepoResult<i64> {
    match record.get(column) {
        Some(Value::Integer(value)) => Ok(*value),
        other => Err(invalid_field(column, other)),
    }
}

pub(crate) fn real_field(record: &Record, column: &str) -> RepoResult<f64> {
    match record.get(column) {
        Some(Value::Real(value)) => Ok(*value),
        Some(Value::Integer(value)) => Ok(*value as f64),
        other => Err(invalid_field(column, other)),
    }
}

pub(crate) fn text_field(record: &Record, column: &str) -> RepoResult<String> {
    match record.get(column) {
        Some(Value::Text(value)) => Ok(value.clone()),
        other => Err(invalid_field(column, other)),
    }
}

pub(crate) fn flag_field(record: &Record, column: &str) -> RepoResult<bool> {
    match record.get(column) {
        Some(Value::Integer(0)) => Ok(false),
        Some(Value::Integer(1)) => Ok(true),
        other => Err(invalid_field(column, other)),
    }
}

pub(crate) fn date_field(record: &Record, column: &str) -> RepoResult<NaiveDate> {
    let text = text_field(record, column)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date value `{text}` in column `{column}`"))
    })
}

pub(crate) fn opt_date_field(record: &Record, column: &str) -> RepoResult<Option<NaiveDate>> {
    match record.get(column) {
        Some(Value::Null) | None => Ok(None),
        Some(Value::Text(text)) => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                RepoError::InvalidData(format!("invalid date value `{text}` in column `{column}`"))
            }),
        other => Err(invalid_field(column, other)),
    }
}

fn invalid_field(column: &str, value: Option<&Value>) -> RepoError {
    RepoError::InvalidData(format!("invalid value {value:?} in column `{column}`"))
}
