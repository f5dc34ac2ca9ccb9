//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Persisted date/time formats. These are part of the storage contract: the
// `events` table stores `date` and `time` as text in exactly these shapes.
pub const EVENT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const EVENT_TIME_FORMAT: &str = "%H:%M";

// Reminder lead time (minutes before an event at which its owner is notified)
pub const DEFAULT_REMIND_LEAD_MINUTES: i64 = 60;
pub const MIN_REMIND_LEAD_MINUTES: i64 = 1;
pub const MAX_REMIND_LEAD_MINUTES: i64 = 1440;

// Reminder tick configuration. The tick period and the match window are a
// jointly-sized pair: the window must cover at least one tick period or a
// reminder target can fall between two ticks.
pub const DEFAULT_REMINDER_TICK_SECONDS: u64 = 60;
pub const DEFAULT_REMINDER_WINDOW_MINUTES: i64 = 1;
pub const DEFAULT_REMINDER_JOB_TIMEOUT_SECONDS: u64 = 30;

// Database defaults
pub const DEFAULT_DB_PATH: &str = "events.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;
