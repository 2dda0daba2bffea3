//! Time source for record timestamps.
//!
//! Services never call `Utc::now()` directly so that ordering-sensitive
//! behavior (newest-first lists, activity feeds) can be pinned in tests.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock that advances by `step` after every reading.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Cell<DateTime<Utc>>,
    step: Duration,
}

impl ManualClock {
    /// Clock frozen at `start`.
    pub fn fixed(start: DateTime<Utc>) -> Self {
        Self::stepping(start, Duration::zero())
    }

    /// Clock that starts at `start` and moves forward by `step` per reading.
    pub fn stepping(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            current: Cell::new(start),
            step,
        }
    }

    /// Moves the clock forward without taking a reading.
    pub fn advance(&self, by: Duration) {
        self.current.set(self.current.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.current.get();
        self.current.set(now + self.step);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn stepping_clock_advances_per_reading() {
        let start = Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap();
        let clock = ManualClock::stepping(start, Duration::seconds(1));

        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start + Duration::seconds(1));
        clock.advance(Duration::minutes(1));
        assert_eq!(clock.now(), start + Duration::seconds(62));
    }
}
