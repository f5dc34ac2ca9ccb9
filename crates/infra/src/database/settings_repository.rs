//! SQLite-backed implementation of the `SettingsRepository` port.
//!
//! Settings rows are created lazily: reads fall back to the documented
//! defaults without writing anything, writes upsert atomically on the owner
//! id.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::params;
use tokio::task;
use tracing::debug;

use agenda_core::events::ports::SettingsRepository;
use agenda_domain::{AgendaError, OwnerId, Result as DomainResult, UserSettings};

use super::manager::DbManager;
use crate::errors::InfraError;

/// SQLite implementation of `SettingsRepository`.
pub struct SqliteSettingsRepository {
    db: Arc<DbManager>,
}

impl SqliteSettingsRepository {
    /// Create a new repository instance.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn settings(&self, owner: OwnerId) -> DomainResult<UserSettings> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<UserSettings> {
            let conn = db.get_connection()?;

            let result = conn.query_row(
                "SELECT notifications_enabled, remind_lead_minutes
                 FROM user_settings WHERE owner_id = ?1",
                params![owner],
                |row| {
                    Ok(UserSettings {
                        notifications_enabled: row.get::<_, i64>(0)? != 0,
                        remind_lead_minutes: row.get(1)?,
                    })
                },
            );

            match result {
                Ok(settings) => Ok(settings),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(UserSettings::default()),
                Err(err) => Err(InfraError::from(err).into()),
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_notifications_enabled(&self, owner: OwnerId, enabled: bool) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;

            conn.execute(
                "INSERT INTO user_settings (owner_id, notifications_enabled)
                 VALUES (?1, ?2)
                 ON CONFLICT(owner_id) DO UPDATE SET
                    notifications_enabled = excluded.notifications_enabled",
                params![owner, i64::from(enabled)],
            )
            .map_err(InfraError::from)?;

            debug!(owner, enabled, "updated notifications_enabled");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_remind_lead_minutes(&self, owner: OwnerId, minutes: i64) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;

            conn.execute(
                "INSERT INTO user_settings (owner_id, remind_lead_minutes)
                 VALUES (?1, ?2)
                 ON CONFLICT(owner_id) DO UPDATE SET
                    remind_lead_minutes = excluded.remind_lead_minutes",
                params![owner, minutes],
            )
            .map_err(InfraError::from)?;

            debug!(owner, minutes, "updated remind_lead_minutes");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_join_error(err: task::JoinError) -> AgendaError {
    AgendaError::Internal(format!("task join error: {err}"))
}
