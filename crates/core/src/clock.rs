//! Clock port shared by the command facade and the reminder engine.

use chrono::NaiveDateTime;

/// Source of "now", injectable for testability.
///
/// All date/time comparisons in this system happen in one fixed server-wide
/// local zone, so the clock hands out naive timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}
