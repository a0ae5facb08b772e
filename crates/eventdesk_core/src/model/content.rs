//! Ticker, gallery, popup and credential models.

use serde::{Deserialize, Serialize};

/// One news ticker entry, ordered by `sort_order` for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerItem {
    pub id: i64,
    pub text: String,
    pub link: String,
    pub active: bool,
    pub sort_order: i64,
    pub created_at: String,
}

/// Caller-settable ticker fields, used for both create and full update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTickerItem {
    pub text: String,
    pub link: String,
    pub active: bool,
    pub sort_order: i64,
}

impl NewTickerItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: String::new(),
            active: true,
            sort_order: 0,
        }
    }
}

/// One gallery image owned by an event.
///
/// Rows never outlive their owning event; image files on disk are the
/// caller's responsibility and their paths are reported back on deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: i64,
    pub event_id: i64,
    pub image_path: String,
    pub created_at: String,
}

/// Site popup. At most one row is active at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Popup {
    pub id: i64,
    pub image: String,
    pub event_name: String,
    pub description: String,
    pub layout: String,
    pub button_text: String,
    pub button_link: String,
    pub active: bool,
    pub created_at: String,
}

/// Caller-settable popup fields, used for both create and full update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPopup {
    pub image: String,
    pub event_name: String,
    pub description: String,
    pub layout: String,
    pub button_text: String,
    pub button_link: String,
    pub active: bool,
}

impl NewPopup {
    pub fn new(event_name: impl Into<String>) -> Self {
        Self {
            image: String::new(),
            event_name: event_name.into(),
            description: String::new(),
            layout: "center".to_string(),
            button_text: "Learn More".to_string(),
            button_link: String::new(),
            active: false,
        }
    }
}

/// Stored admin credential. `password_hash` is a bcrypt hash, never the
/// plain password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}
