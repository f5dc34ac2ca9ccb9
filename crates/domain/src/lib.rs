//! # Agenda Domain
//!
//! Business domain types and models for Agenda.
//!
//! This crate contains:
//! - Domain data types (Event, UserSettings, DueReminder)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants and validation helpers
//!
//! ## Architecture
//! - No dependencies on other Agenda crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
