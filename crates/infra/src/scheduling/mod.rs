//! Scheduling infrastructure for the recurring reminder job.
//!
//! The scheduler follows explicit lifecycle rules: start/stop are the only
//! ways in and out, spawned tasks are joined, cancellation is token-based,
//! and every async operation is wrapped in a timeout.

pub mod error;
pub mod reminder_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use reminder_scheduler::{ReminderScheduler, ReminderSchedulerConfig};
