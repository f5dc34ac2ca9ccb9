//! Shared fixtures for infra integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tempfile::TempDir;

use agenda_core::{Clock, Notifier};
use agenda_domain::{AgendaError, OwnerId, Result};
use agenda_infra::database::DbManager;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run. Migrations are applied eagerly.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Clock whose reading is set explicitly by the test, so ticks can be
/// replayed minute by minute.
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn starting_at(now: NaiveDateTime) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().expect("clock mutex poisoned") = now;
    }

    pub fn advance_minutes(&self, minutes: i64) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now += chrono::Duration::minutes(minutes);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

/// Notifier that records every dispatch and can be told to fail for
/// specific owners.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(OwnerId, String)>>,
    pub fail_for: Vec<OwnerId>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, owner: OwnerId, text: &str) -> Result<()> {
        if self.fail_for.contains(&owner) {
            return Err(AgendaError::Dispatch(format!("owner {owner} unreachable")));
        }
        self.sent.lock().expect("sent mutex poisoned").push((owner, text.to_string()));
        Ok(())
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

pub fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").expect("valid test time")
}

pub fn at(d: &str, t: &str) -> NaiveDateTime {
    date(d).and_time(time(t))
}
