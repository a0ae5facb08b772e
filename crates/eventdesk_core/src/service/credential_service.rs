//! Credential verification and password rotation.
//!
//! # Responsibility
//! - Verify login attempts against the stored bcrypt hash.
//! - Rotate a credential's password after re-verifying the current one.
//!
//! # Invariants
//! - Plain passwords never reach the repository layer; only hashes do.
//! - A failed login does not reveal whether the username or the password
//!   was wrong.

use crate::model::content::Credential;
use crate::repo::credential_repo::CredentialRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum CredentialError {
    Repo(RepoError),
    Hash(bcrypt::BcryptError),
    CurrentPasswordMismatch,
    UnknownCredential(i64),
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Hash(err) => write!(f, "failed to hash password: {err}"),
            Self::CurrentPasswordMismatch => write!(f, "current password does not match"),
            Self::UnknownCredential(id) => write!(f, "credential not found: {id}"),
        }
    }
}

impl Error for CredentialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Hash(err) => Some(err),
            Self::CurrentPasswordMismatch => None,
            Self::UnknownCredential(_) => None,
        }
    }
}

impl From<RepoError> for CredentialError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service for credential checks.
pub struct CredentialService<R: CredentialRepository> {
    repo: R,
}

impl<R: CredentialRepository> CredentialService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Verifies a login attempt.
    ///
    /// Returns the credential on success and `None` for an unknown username
    /// or a wrong password alike.
    pub fn verify_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Credential>, CredentialError> {
        let Some(credential) = self.repo.find_by_username(username)? else {
            return Ok(None);
        };
        if !verify_password(password, &credential.password_hash) {
            return Ok(None);
        }
        Ok(Some(credential))
    }

    /// Replaces a credential's password after verifying the current one.
    pub fn change_password(
        &self,
        id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), CredentialError> {
        let credential = self
            .repo
            .find_by_id(id)?
            .ok_or(CredentialError::UnknownCredential(id))?;
        if !verify_password(current_password, &credential.password_hash) {
            return Err(CredentialError::CurrentPasswordMismatch);
        }

        let password_hash =
            bcrypt::hash(new_password, bcrypt::DEFAULT_COST).map_err(CredentialError::Hash)?;
        self.repo.update_password_hash(id, &password_hash)?;
        info!(
            "event=password_change module=service status=ok credential_id={}",
            id
        );
        Ok(())
    }
}

fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
