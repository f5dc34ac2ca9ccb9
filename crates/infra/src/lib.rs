//! # Agenda Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite-backed event and settings repositories
//! - Versioned schema migrations
//! - The recurring reminder scheduler
//! - Configuration loading and the system clock
//!
//! ## Architecture
//! - Implements traits defined in `agenda-core`
//! - Depends on `agenda-domain` and `agenda-core`
//! - Contains all "impure" code (I/O, time, background jobs)

pub mod config;
pub mod database;
pub mod errors;
pub mod scheduling;
pub mod time;

// Re-export commonly used items
pub use database::{DbManager, SqliteEventRepository, SqliteSettingsRepository};
pub use errors::InfraError;
pub use scheduling::{ReminderScheduler, ReminderSchedulerConfig, SchedulerError};
pub use time::SystemClock;
