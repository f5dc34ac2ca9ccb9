//! SQLite-backed implementation of the `EventRepository` port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Row};
use tokio::task;
use tracing::debug;

use agenda_core::events::ports::EventRepository;
use agenda_domain::constants::{
    DEFAULT_REMIND_LEAD_MINUTES, EVENT_DATE_FORMAT, EVENT_TIME_FORMAT,
};
use agenda_domain::validation::validate_title;
use agenda_domain::{
    AgendaError, DueReminder, Event, EventId, EventStatus, EventTag, NewEvent, OwnerId,
    Result as DomainResult,
};

use super::manager::DbManager;
use crate::errors::InfraError;

const EVENT_COLUMNS: &str = "id, owner_id, title, date, time, tag, status";

/// SQLite implementation of `EventRepository`.
pub struct SqliteEventRepository {
    db: Arc<DbManager>,
}

impl SqliteEventRepository {
    /// Create a new repository instance.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn create_event(&self, event: NewEvent) -> DomainResult<EventId> {
        let title = validate_title(&event.title)?;
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<EventId> {
            let conn = db.get_connection()?;

            conn.execute(
                "INSERT INTO events (owner_id, title, date, time, tag, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'active')",
                params![
                    event.owner_id,
                    title,
                    event.date.format(EVENT_DATE_FORMAT).to_string(),
                    event.time.format(EVENT_TIME_FORMAT).to_string(),
                    EventTag::to_storage(event.tag),
                ],
            )
            .map_err(InfraError::from)?;

            let id = conn.last_insert_rowid();
            debug!(owner = event.owner_id, id, "inserted event");
            Ok(id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_events_for_date(
        &self,
        owner: OwnerId,
        date: NaiveDate,
    ) -> DomainResult<Vec<Event>> {
        let db = Arc::clone(&self.db);
        let date = date.format(EVENT_DATE_FORMAT).to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<Event>> {
            let conn = db.get_connection()?;

            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events
                     WHERE owner_id = ?1 AND date = ?2
                     ORDER BY time ASC"
                ))
                .map_err(InfraError::from)?;

            let events = stmt
                .query_map(params![owner, date], map_event_row)
                .map_err(InfraError::from)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(InfraError::from)?;

            Ok(events)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_all_events(&self, owner: OwnerId) -> DomainResult<Vec<Event>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<Event>> {
            let conn = db.get_connection()?;

            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events
                     WHERE owner_id = ?1
                     ORDER BY date ASC, time ASC"
                ))
                .map_err(InfraError::from)?;

            let events = stmt
                .query_map(params![owner], map_event_row)
                .map_err(InfraError::from)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(InfraError::from)?;

            Ok(events)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_event(&self, id: EventId, owner: OwnerId) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;

            let removed = conn
                .execute(
                    "DELETE FROM events WHERE id = ?1 AND owner_id = ?2",
                    params![id, owner],
                )
                .map_err(InfraError::from)?;

            Ok(removed > 0)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_status(
        &self,
        id: EventId,
        owner: OwnerId,
        status: EventStatus,
    ) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;

            let updated = conn
                .execute(
                    "UPDATE events SET status = ?1 WHERE id = ?2 AND owner_id = ?3",
                    params![status.as_str(), id, owner],
                )
                .map_err(InfraError::from)?;

            Ok(updated > 0)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_due_reminders(
        &self,
        now: NaiveDateTime,
        window_minutes: i64,
    ) -> DomainResult<Vec<DueReminder>> {
        let db = Arc::clone(&self.db);
        // Minute precision, matching the stored date/time shape.
        let now = now.format("%Y-%m-%d %H:%M").to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<DueReminder>> {
            let conn = db.get_connection()?;

            // One set-based pass over all owners. An event is due when the
            // minutes from `now` to its instant land within ±window of the
            // owner's lead. Owners without a settings row fall back to the
            // documented defaults; the status gate keeps an event from
            // matching on two consecutive ticks even though adjacent windows
            // overlap at the boundary.
            let mut stmt = conn
                .prepare(
                    "SELECT e.owner_id, e.id, e.title,
                            COALESCE(s.remind_lead_minutes, ?3) AS lead
                     FROM events e
                     LEFT JOIN user_settings s ON s.owner_id = e.owner_id
                     WHERE e.status = 'active'
                       AND COALESCE(s.notifications_enabled, 1) = 1
                       AND ABS((julianday(e.date || ' ' || e.time) - julianday(?1)) * 1440.0
                               - COALESCE(s.remind_lead_minutes, ?3)) <= ?2 + 0.0001
                     ORDER BY e.owner_id ASC, e.id ASC",
                )
                .map_err(InfraError::from)?;

            let reminders = stmt
                .query_map(
                    params![now, window_minutes as f64, DEFAULT_REMIND_LEAD_MINUTES],
                    |row| {
                        Ok(DueReminder {
                            owner_id: row.get(0)?,
                            event_id: row.get(1)?,
                            title: row.get(2)?,
                            lead_minutes: row.get(3)?,
                        })
                    },
                )
                .map_err(InfraError::from)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(InfraError::from)?;

            debug!(now = %now, count = reminders.len(), "selected due reminders");
            Ok(reminders)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn mark_reminded(&self, owner: OwnerId, event_ids: &[EventId]) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let event_ids = event_ids.to_vec();

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;

            let tx = conn.transaction().map_err(InfraError::from)?;
            {
                let mut stmt = tx
                    .prepare(
                        "UPDATE events SET status = 'reminded'
                         WHERE id = ?1 AND owner_id = ?2",
                    )
                    .map_err(InfraError::from)?;
                for id in &event_ids {
                    stmt.execute(params![id, owner]).map_err(InfraError::from)?;
                }
            }
            tx.commit().map_err(InfraError::from)?;

            debug!(owner, count = event_ids.len(), "marked events reminded");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

/// Map a row to an `Event`, converting the persisted text shapes back into
/// typed values.
fn map_event_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let date: String = row.get(3)?;
    let time: String = row.get(4)?;
    let tag: String = row.get(5)?;
    let status: String = row.get(6)?;

    Ok(Event {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        date: NaiveDate::parse_from_str(&date, EVENT_DATE_FORMAT)
            .map_err(|err| conversion_error(3, err))?,
        time: chrono::NaiveTime::parse_from_str(&time, EVENT_TIME_FORMAT)
            .map_err(|err| conversion_error(4, err))?,
        tag: EventTag::from_storage(&tag).map_err(|err| conversion_error(5, err))?,
        status: status.parse().map_err(|err: AgendaError| conversion_error(6, err))?,
    })
}

fn conversion_error(
    index: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

fn map_join_error(err: task::JoinError) -> AgendaError {
    AgendaError::Internal(format!("task join error: {err}"))
}
