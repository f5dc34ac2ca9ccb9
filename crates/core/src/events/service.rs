//! Event service - the facade the chat command layer calls.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::error;

use agenda_domain::validation::{ensure_not_past, validate_lead_minutes, validate_title};
use agenda_domain::{
    DaySchedule, Event, EventId, EventStatus, EventTag, NewEvent, OwnerId, Result, UserSettings,
};

use super::ports::{EventRepository, SettingsRepository};
use crate::clock::Clock;

/// Command-layer facade over the event store.
///
/// Validation lives here so that every inbound command is checked once,
/// before anything touches storage. Failed reads degrade to empty results
/// with the failure logged; failed writes surface a structured error.
pub struct EventService {
    events: Arc<dyn EventRepository>,
    settings: Arc<dyn SettingsRepository>,
    clock: Arc<dyn Clock>,
}

impl EventService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        settings: Arc<dyn SettingsRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { events, settings, clock }
    }

    /// Register a new event for `owner`.
    ///
    /// Rejects empty titles and instants strictly in the past at creation
    /// time. The stored event starts out `active`.
    pub async fn create_event(
        &self,
        owner: OwnerId,
        title: &str,
        date: NaiveDate,
        time: NaiveTime,
        tag: Option<EventTag>,
    ) -> Result<EventId> {
        let title = validate_title(title)?;
        ensure_not_past(date.and_time(time), self.clock.now())?;

        self.events
            .create_event(NewEvent { owner_id: owner, title, date, time, tag })
            .await
    }

    /// Events of one day, ordered by time. A storage failure is logged and
    /// reported as "no events" rather than crashing the command handler.
    pub async fn events_on(&self, owner: OwnerId, date: NaiveDate) -> Vec<Event> {
        match self.events.list_events_for_date(owner, date).await {
            Ok(events) => events,
            Err(err) => {
                error!(owner, %date, error = %err, "failed to list events for date");
                Vec::new()
            }
        }
    }

    /// Seven-day listing starting at `start`, skipping empty days.
    pub async fn events_for_week(&self, owner: OwnerId, start: NaiveDate) -> Vec<DaySchedule> {
        let mut days = Vec::new();
        for offset in 0..7 {
            let date = start + Duration::days(offset);
            let events = self.events_on(owner, date).await;
            if !events.is_empty() {
                days.push(DaySchedule { date, events });
            }
        }
        days
    }

    /// Every event of one owner, ordered by (date, time).
    pub async fn all_events(&self, owner: OwnerId) -> Vec<Event> {
        match self.events.list_all_events(owner).await {
            Ok(events) => events,
            Err(err) => {
                error!(owner, error = %err, "failed to list events");
                Vec::new()
            }
        }
    }

    /// Delete an event. `Ok(false)` means no row matched both id and owner;
    /// the command layer turns that into a "no such event" message.
    pub async fn delete_event(&self, id: EventId, owner: OwnerId) -> Result<bool> {
        self.events.delete_event(id, owner).await
    }

    /// Mark an event done. Independent of the reminded axis: a reminded
    /// event can still be completed, and a done event is never reminded.
    pub async fn complete_event(&self, id: EventId, owner: OwnerId) -> Result<bool> {
        self.events.set_status(id, owner, EventStatus::Done).await
    }

    /// Current settings for `owner`, falling back to the documented
    /// defaults when storage misbehaves.
    pub async fn settings(&self, owner: OwnerId) -> UserSettings {
        match self.settings.settings(owner).await {
            Ok(settings) => settings,
            Err(err) => {
                error!(owner, error = %err, "failed to read user settings");
                UserSettings::default()
            }
        }
    }

    pub async fn set_notifications_enabled(&self, owner: OwnerId, enabled: bool) -> Result<()> {
        self.settings.set_notifications_enabled(owner, enabled).await
    }

    pub async fn set_remind_lead_minutes(&self, owner: OwnerId, minutes: i64) -> Result<()> {
        let minutes = validate_lead_minutes(minutes)?;
        self.settings.set_remind_lead_minutes(owner, minutes).await
    }
}
