//! Common data types used throughout the application

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::AgendaError;

/// Opaque identifier of an event owner (the chat user the event belongs to).
pub type OwnerId = i64;

/// Store-assigned event identifier, immutable once created.
pub type EventId = i64;

/// Lifecycle status of an event.
///
/// `Active` events are eligible for reminder selection. `Reminded` is set
/// exactly once by the scheduler and is never reset. `Done` is an independent
/// user action; a done event is excluded from reminder selection regardless
/// of whether it was ever reminded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Active,
    Reminded,
    Done,
}

impl EventStatus {
    /// Storage representation, part of the persisted schema contract.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Reminded => "reminded",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = AgendaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "reminded" => Ok(Self::Reminded),
            "done" => Ok(Self::Done),
            other => Err(AgendaError::Validation(format!("unknown event status: {other}"))),
        }
    }
}

/// Closed set of event tags.
///
/// Untagged events are modeled as `Option::<EventTag>::None` and persist as
/// an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventTag {
    Work,
    Study,
    Personal,
    Health,
}

impl EventTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Study => "study",
            Self::Personal => "personal",
            Self::Health => "health",
        }
    }

    /// Parse the storage representation, where `''` means untagged.
    pub fn from_storage(value: &str) -> Result<Option<Self>, AgendaError> {
        if value.is_empty() {
            return Ok(None);
        }
        value.parse().map(Some)
    }

    /// Storage representation of an optional tag.
    pub fn to_storage(tag: Option<Self>) -> &'static str {
        tag.map_or("", Self::as_str)
    }
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventTag {
    type Err = AgendaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "work" => Ok(Self::Work),
            "study" => Ok(Self::Study),
            "personal" => Ok(Self::Personal),
            "health" => Ok(Self::Health),
            other => Err(AgendaError::Validation(format!("unknown event tag: {other}"))),
        }
    }
}

/// A single-instant, owner-scoped calendar entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub owner_id: OwnerId,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub tag: Option<EventTag>,
    pub status: EventStatus,
}

impl Event {
    /// The instant the event occurs at, in the server-wide local zone.
    pub fn occurs_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// Parameters for creating a new event. The store assigns the id and sets
/// `status = active`.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub owner_id: OwnerId,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub tag: Option<EventTag>,
}

/// Per-owner notification settings, created lazily on first write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub notifications_enabled: bool,
    pub remind_lead_minutes: i64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            remind_lead_minutes: crate::constants::DEFAULT_REMIND_LEAD_MINUTES,
        }
    }
}

/// One row of the due-reminder selection: an active event inside its owner's
/// lead-time window. `lead_minutes` is carried along so the dispatcher can
/// render the notification without a second settings read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueReminder {
    pub owner_id: OwnerId,
    pub event_id: EventId,
    pub title: String,
    pub lead_minutes: i64,
}

/// Events of a single day, used by the week listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub events: Vec<Event>,
}
