//! Snapshot-backed SQLite storage entry points.
//!
//! # Responsibility
//! - Own the in-memory SQLite engine and its on-disk snapshot file.
//! - Apply schema DDL and seed defaults on first run.
//!
//! # Invariants
//! - Every successful mutating execution is flushed to the snapshot file
//!   before the call returns.
//! - A corrupt snapshot file aborts `SnapshotStore::open`; it is never
//!   silently replaced with an empty database.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod schema;
pub mod store;

pub use store::{Record, RunOutcome, SnapshotStore, Statement};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    SnapshotLoad {
        path: PathBuf,
        source: rusqlite::Error,
    },
    SnapshotWrite {
        path: PathBuf,
        message: String,
    },
    PasswordHash(bcrypt::BcryptError),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SnapshotLoad { path, source } => {
                write!(f, "failed to load snapshot `{}`: {source}", path.display())
            }
            Self::SnapshotWrite { path, message } => {
                write!(f, "failed to write snapshot `{}`: {message}", path.display())
            }
            Self::PasswordHash(err) => {
                write!(f, "failed to hash credential password: {err}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SnapshotLoad { source, .. } => Some(source),
            Self::SnapshotWrite { .. } => None,
            Self::PasswordHash(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<bcrypt::BcryptError> for DbError {
    fn from(value: bcrypt::BcryptError) -> Self {
        Self::PasswordHash(value)
    }
}
