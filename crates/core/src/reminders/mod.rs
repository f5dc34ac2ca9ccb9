//! Reminder engine ports and the per-tick service.

pub mod ports;
pub mod service;

pub use service::{ReminderService, TickReport};
