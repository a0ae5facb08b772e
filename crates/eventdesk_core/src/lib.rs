//! Core storage and lifecycle logic for the Eventdesk content backend.
//! This crate is the single source of truth for business invariants;
//! HTTP routing, uploads and session handling live in collaborators that
//! link against it.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::schema::DEFAULT_ADMIN_PASSWORD;
pub use db::store::{Record, RunOutcome, SnapshotStore, Statement};
pub use db::{DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::content::{
    Credential, GalleryImage, NewPopup, NewTickerItem, Popup, TickerItem,
};
pub use model::event::{next_status, Event, EventStatus, NewEvent};
pub use repo::credential_repo::{CredentialRepository, StoreCredentialRepository};
pub use repo::event_repo::{EventRepository, RemovedEventFiles, StoreEventRepository};
pub use repo::popup_repo::{PopupRepository, StorePopupRepository};
pub use repo::ticker_repo::{StoreTickerRepository, TickerRepository};
pub use repo::{RepoError, RepoResult};
pub use service::credential_service::{CredentialError, CredentialService};
pub use service::lifecycle::{EventLifecycle, LifecycleTimer, DEFAULT_REFRESH_INTERVAL};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
