//! Validation helpers for user-supplied event fields.
//!
//! The chat command layer hands over raw text; these helpers turn it into
//! typed values or a `Validation` error that is surfaced to the user as a
//! rejected command.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::constants::{
    EVENT_DATE_FORMAT, EVENT_TIME_FORMAT, MAX_REMIND_LEAD_MINUTES, MIN_REMIND_LEAD_MINUTES,
};
use crate::errors::{AgendaError, Result};

/// Validate and normalize an event title. Leading/trailing whitespace is
/// stripped; an empty result is rejected.
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AgendaError::Validation("event title must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

/// Parse an event date in the persisted `YYYY-MM-DD` shape.
pub fn parse_event_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, EVENT_DATE_FORMAT)
        .map_err(|_| AgendaError::Validation(format!("malformed event date: {value}")))
}

/// Parse an event time in the persisted `HH:MM` shape (no seconds).
pub fn parse_event_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, EVENT_TIME_FORMAT)
        .map_err(|_| AgendaError::Validation(format!("malformed event time: {value}")))
}

/// Reject event instants that are strictly in the past at creation time.
///
/// Creation-time check only; events are never re-validated later (there is
/// no edit, only delete and recreate).
pub fn ensure_not_past(occurs_at: NaiveDateTime, now: NaiveDateTime) -> Result<()> {
    if occurs_at < now {
        return Err(AgendaError::Validation(format!(
            "event instant {occurs_at} is in the past"
        )));
    }
    Ok(())
}

/// Validate a reminder lead time against the allowed `[1, 1440]` range.
pub fn validate_lead_minutes(minutes: i64) -> Result<i64> {
    if !(MIN_REMIND_LEAD_MINUTES..=MAX_REMIND_LEAD_MINUTES).contains(&minutes) {
        return Err(AgendaError::Validation(format!(
            "reminder lead must be between {MIN_REMIND_LEAD_MINUTES} and \
             {MAX_REMIND_LEAD_MINUTES} minutes, got {minutes}"
        )));
    }
    Ok(minutes)
}
