//! # Agenda Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for storage, messaging, and time
//! - Use cases and services (`EventService`, `ReminderService`)
//!
//! ## Architecture Principles
//! - Only depends on `agenda-domain`
//! - No database or transport code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod clock;
pub mod events;
pub mod reminders;

// Re-export specific items to avoid ambiguity
pub use clock::Clock;
pub use events::ports::{EventRepository, SettingsRepository};
pub use events::EventService;
pub use reminders::ports::Notifier;
pub use reminders::{ReminderService, TickReport};
