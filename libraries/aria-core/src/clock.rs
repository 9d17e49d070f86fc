//! Injectable wall clock
//!
//! Everything time-dependent (reload retries, stats timestamps, cache
//! staleness) reads time through [`Clock`] so it can be driven by hand in
//! tests.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::Duration;

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock
///
/// Time only moves when [`ManualClock::advance`] or [`ManualClock::set`] is called.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let delta = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
        if let Ok(mut now) = self.now.lock() {
            *now += delta;
        }
    }

    /// Jump to an absolute instant
    pub fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = instant;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::default())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
            .lock()
            .map(|now| *now)
            .unwrap_or(DateTime::<Utc>::default())
    }
}

/// Whether `delay` has fully elapsed between `since` and `now`
pub fn has_elapsed(since: DateTime<Utc>, now: DateTime<Utc>, delay: Duration) -> bool {
    (now - since).to_std().is_ok_and(|elapsed| elapsed >= delay)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_moves_when_told() {
        let clock = ManualClock::default();
        let start = clock.now();

        assert_eq!(clock.now(), start);

        clock.advance(Duration::from_millis(250));
        assert_eq!((clock.now() - start).num_milliseconds(), 250);
    }

    #[test]
    fn elapsed_is_inclusive() {
        let clock = ManualClock::default();
        let start = clock.now();

        clock.advance(Duration::from_millis(99));
        assert!(!has_elapsed(start, clock.now(), Duration::from_millis(100)));

        clock.advance(Duration::from_millis(1));
        assert!(has_elapsed(start, clock.now(), Duration::from_millis(100)));
    }

    #[test]
    fn elapsed_false_when_clock_goes_backwards() {
        let clock = ManualClock::default();
        clock.advance(Duration::from_secs(10));
        let later = clock.now();

        clock.set(DateTime::<Utc>::default());
        assert!(!has_elapsed(later, clock.now(), Duration::ZERO));
    }
}
