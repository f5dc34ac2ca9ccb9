//! Port interfaces for the event store
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use agenda_domain::{
    DueReminder, Event, EventId, EventStatus, NewEvent, OwnerId, Result, UserSettings,
};

/// Trait for persisting owner-scoped events.
///
/// Every operation that targets an existing row is keyed by
/// `(event id, owner id)`: an event is never visible to or mutable by any
/// other owner. Ownership misses are reported as `Ok(false)`, not errors.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert a new event with `status = active` and return its id.
    ///
    /// Fails with a `Validation` error when the title is empty. The
    /// not-in-the-past check is the caller's responsibility.
    async fn create_event(&self, event: NewEvent) -> Result<EventId>;

    /// Events of one owner on one day, ordered ascending by time-of-day.
    async fn list_events_for_date(&self, owner: OwnerId, date: NaiveDate) -> Result<Vec<Event>>;

    /// All events of one owner, ordered by (date, time) ascending.
    async fn list_all_events(&self, owner: OwnerId) -> Result<Vec<Event>>;

    /// Remove an event. Returns true iff a row matching both id and owner
    /// existed and was removed.
    async fn delete_event(&self, id: EventId, owner: OwnerId) -> Result<bool>;

    /// Update an event's status with the same ownership semantics as delete.
    async fn set_status(&self, id: EventId, owner: OwnerId, status: EventStatus) -> Result<bool>;

    /// Select active events whose `(date, time)` falls within
    /// ±`window_minutes` of `now + lead` for their owner, skipping owners
    /// with notifications disabled. Owners without a settings row get the
    /// documented defaults (enabled, lead 60).
    async fn find_due_reminders(
        &self,
        now: NaiveDateTime,
        window_minutes: i64,
    ) -> Result<Vec<DueReminder>>;

    /// Mark a batch of one owner's events `reminded` in a single
    /// transaction, excluding them from all future reminder selections.
    async fn mark_reminded(&self, owner: OwnerId, event_ids: &[EventId]) -> Result<()>;
}

/// Trait for per-owner settings, upserted lazily.
///
/// Reads before any write return the documented defaults without creating a
/// row; writes create-or-update atomically keyed by owner id.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn settings(&self, owner: OwnerId) -> Result<UserSettings>;

    async fn set_notifications_enabled(&self, owner: OwnerId, enabled: bool) -> Result<()>;

    async fn set_remind_lead_minutes(&self, owner: OwnerId, minutes: i64) -> Result<()>;
}
