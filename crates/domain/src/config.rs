//! Configuration structures for the application.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DB_PATH, DEFAULT_DB_POOL_SIZE, DEFAULT_REMINDER_JOB_TIMEOUT_SECONDS,
    DEFAULT_REMINDER_TICK_SECONDS, DEFAULT_REMINDER_WINDOW_MINUTES,
};
use crate::errors::{AgendaError, Result};

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub reminders: ReminderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self { database: DatabaseConfig::default(), reminders: ReminderConfig::default() }
    }
}

impl Config {
    /// Validate the configuration as a whole.
    pub fn validate(&self) -> Result<()> {
        self.database.validate()?;
        self.reminders.validate()
    }
}

/// SQLite database configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the database file.
    pub path: String,
    /// Connection pool size.
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.into(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(AgendaError::Config("database path must not be empty".into()));
        }
        if self.pool_size == 0 {
            return Err(AgendaError::Config("database pool size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Reminder scheduling configuration.
///
/// `tick_seconds` and `window_minutes` are a correctness-critical pair: the
/// match window centered on `now + lead` must cover at least one tick period,
/// otherwise a reminder target can fall between two consecutive ticks and be
/// skipped forever. The status gate (`active` → `reminded`) prevents the
/// opposite failure mode of double-matching across ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Whether the background reminder job runs at all.
    pub enabled: bool,
    /// Tick period of the recurring reminder job, in seconds.
    pub tick_seconds: u64,
    /// Half-width of the match window around `now + lead`, in minutes.
    pub window_minutes: i64,
    /// Timeout applied to a single tick execution, in seconds.
    pub job_timeout_seconds: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_seconds: DEFAULT_REMINDER_TICK_SECONDS,
            window_minutes: DEFAULT_REMINDER_WINDOW_MINUTES,
            job_timeout_seconds: DEFAULT_REMINDER_JOB_TIMEOUT_SECONDS,
        }
    }
}

impl ReminderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_seconds == 0 {
            return Err(AgendaError::Config("reminder tick must be at least 1 second".into()));
        }
        if self.window_minutes < 1 {
            return Err(AgendaError::Config(
                "reminder window must be at least 1 minute".into(),
            ));
        }
        let window_seconds = self.window_minutes.unsigned_abs().saturating_mul(60);
        if window_seconds < self.tick_seconds {
            return Err(AgendaError::Config(format!(
                "reminder window ({}m) must cover at least one tick period ({}s)",
                self.window_minutes, self.tick_seconds
            )));
        }
        Ok(())
    }
}
