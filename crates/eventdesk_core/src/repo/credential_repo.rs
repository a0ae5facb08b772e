//! Admin credential repository.
//!
//! Stores bcrypt hashes only; verification lives in the credential service.

use super::{int_field, text_field, RepoError, RepoResult};
use crate::db::store::Record;
use crate::db::SnapshotStore;
use crate::model::content::Credential;
use rusqlite::params;

const CREDENTIAL_SELECT_SQL: &str = "SELECT id, username, password, created_at FROM admin";

/// Repository interface for credential lookup and password rotation.
pub trait CredentialRepository {
    fn find_by_username(&self, username: &str) -> RepoResult<Option<Credential>>;
    fn find_by_id(&self, id: i64) -> RepoResult<Option<Credential>>;
    fn update_password_hash(&self, id: i64, password_hash: &str) -> RepoResult<()>;
}

/// Snapshot-store-backed credential repository.
pub struct StoreCredentialRepository<'store> {
    store: &'store SnapshotStore,
}

impl<'store> StoreCredentialRepository<'store> {
    pub fn new(store: &'store SnapshotStore) -> Self {
        Self { store }
    }
}

impl CredentialRepository for StoreCredentialRepository<'_> {
    fn find_by_username(&self, username: &str) -> RepoResult<Option<Credential>> {
        let record = self
            .store
            .prepare(format!("{CREDENTIAL_SELECT_SQL} WHERE username = ?1;"))
            .get_one(params![username])?;
        record.as_ref().map(parse_credential_record).transpose()
    }

    fn find_by_id(&self, id: i64) -> RepoResult<Option<Credential>> {
        let record = self
            .store
            .prepare(format!("{CREDENTIAL_SELECT_SQL} WHERE id = ?1;"))
            .get_one(params![id])?;
        record.as_ref().map(parse_credential_record).transpose()
    }

    fn update_password_hash(&self, id: i64, password_hash: &str) -> RepoResult<()> {
        let outcome = self
            .store
            .prepare("UPDATE admin SET password = ?1 WHERE id = ?2;")
            .run(params![password_hash, id])?;
        if outcome.rows_affected == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_credential_record(record: &Record) -> RepoResult<Credential> {
    Ok(Credential {
        id: int_field(record, "id")?,
        username: text_field(record, "username")?,
        password_hash: text_field(record, "password")?,
        created_at: text_field(record, "created_at")?,
    })
}
