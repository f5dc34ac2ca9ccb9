//! System clock implementation.

use agenda_core::Clock;
use chrono::{Local, NaiveDateTime};

/// Wall-clock time source backed by the local timezone.
///
/// Event dates and times are stored without timezone information, so the
/// scheduler compares them against local naive time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_monotonic_enough_for_scheduling() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
