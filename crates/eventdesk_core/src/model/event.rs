//! Event domain model and calendar lifecycle rules.
//!
//! # Responsibility
//! - Define the event record and its derived status enum.
//! - Encode the status transition rules as one pure function.
//!
//! # Invariants
//! - Status is derived from calendar dates; the only free assignment is the
//!   admin override carried through create/update/set_status.
//! - An event whose end date has passed is `Recent` regardless of any other
//!   rule.
//! - Date-based expiry never moves `Upcoming` to `Recent`; that demotion is
//!   reserved for explicit admin action.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Derived calendar status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Scheduled for a future date (or kept visible by an admin).
    Upcoming,
    /// Running today.
    Ongoing,
    /// Concluded.
    Recent,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Recent => "recent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "upcoming" => Some(Self::Upcoming),
            "ongoing" => Some(Self::Ongoing),
            "recent" => Some(Self::Recent),
            _ => None,
        }
    }
}

/// Computes the status an event should hold on `today`.
///
/// Rules are evaluated in fixed priority order; the first match wins:
/// 1. End date set and strictly before today -> `Recent`.
/// 2. Start before today, end unset or before today, currently `Ongoing`
///    -> `Recent`. `Upcoming` events are exempt from date-based expiry.
/// 3. Start is today, end unset or on/after today, currently `Upcoming`
///    -> `Ongoing`.
/// 4. Start strictly after today, end unset or after today, currently
///    `Ongoing` or `Recent` (a previously auto-advanced event whose date
///    moved) -> restored to `Upcoming`.
///
/// Anything else keeps its current status.
pub fn next_status(
    current: EventStatus,
    start: NaiveDate,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> EventStatus {
    if end.is_some_and(|end| end < today) && current != EventStatus::Recent {
        return EventStatus::Recent;
    }
    if start < today && end.is_none_or(|end| end < today) && current == EventStatus::Ongoing {
        return EventStatus::Recent;
    }
    if start == today && end.is_none_or(|end| end >= today) && current == EventStatus::Upcoming {
        return EventStatus::Ongoing;
    }
    if start > today
        && end.is_none_or(|end| end > today)
        && matches!(current, EventStatus::Ongoing | EventStatus::Recent)
    {
        return EventStatus::Upcoming;
    }
    current
}

/// Persisted event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    /// Start date, day granularity.
    pub date: NaiveDate,
    /// Optional end date for multi-day events. Should not precede `date`.
    pub end_date: Option<NaiveDate>,
    pub venue: String,
    pub description: String,
    /// Path to the cover image; empty when none was uploaded.
    pub cover_image: String,
    pub registration_open: bool,
    pub is_paid: bool,
    pub price: f64,
    pub registration_link: String,
    pub status: EventStatus,
    /// Engine-assigned creation timestamp, as stored.
    pub created_at: String,
}

/// Caller-settable event fields, used for both create and full update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub venue: String,
    pub description: String,
    pub cover_image: String,
    pub registration_open: bool,
    pub is_paid: bool,
    pub price: f64,
    pub registration_link: String,
    /// Admin status override; defaults to `Upcoming`.
    pub status: EventStatus,
}

impl NewEvent {
    /// Creates an event payload with the given name and start date and
    /// empty/false/zero defaults everywhere else.
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
            end_date: None,
            venue: String::new(),
            description: String::new(),
            cover_image: String::new(),
            registration_open: false,
            is_paid: false,
            price: 0.0,
            registration_link: String::new(),
            status: EventStatus::Upcoming,
        }
    }
}
