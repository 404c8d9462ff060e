//! Settable clock for deterministic callers and tests.

use super::{DayFormatter, PlatformTimeProvider, Timestamp, ZoneSource};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Clock whose "now" only moves when told to.
///
/// Days are formatted in a pinned zone so results do not depend on the host.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
    formatter: DayFormatter,
}

impl ManualClock {
    /// Clock frozen at `millis`, formatting days in UTC.
    pub fn new(millis: Timestamp) -> Self {
        Self::with_zone(millis, ZoneSource::utc())
    }

    pub fn with_zone(millis: Timestamp, zone: ZoneSource) -> Self {
        Self {
            millis: AtomicI64::new(millis),
            formatter: DayFormatter::new(zone),
        }
    }

    pub fn set_millis(&self, millis: Timestamp) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    /// Moves the clock forward, saturating at `i64::MAX`.
    pub fn advance(&self, by: Duration) {
        let delta = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        // The closure never returns `None`, so the update always lands.
        self.millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(delta))
            })
            .ok();
    }
}

impl PlatformTimeProvider for ManualClock {
    fn now_millis(&self) -> Timestamp {
        self.millis.load(Ordering::SeqCst)
    }

    fn day_formatter(&self) -> &DayFormatter {
        &self.formatter
    }
}

#[cfg(test)]
mod tests {
    use super::ManualClock;
    use crate::time::PlatformTimeProvider;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn advance_moves_now_and_saturates() {
        let clock = ManualClock::new(1_000);
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now_millis(), 1_250);

        clock.set_millis(i64::MAX - 1);
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now_millis(), i64::MAX);
    }

    #[test]
    fn advance_by_huge_duration_lands_at_max() {
        let clock = ManualClock::new(-5);
        clock.advance(Duration::MAX);
        assert_eq!(clock.now_millis(), i64::MAX);
        clock.advance(Duration::from_millis(1));
        assert_eq!(clock.now_millis(), i64::MAX);
    }

    #[test]
    fn concurrent_advances_are_not_lost() {
        let clock = Arc::new(ManualClock::new(0));
        let workers = (0..4)
            .map(|_| {
                let clock = Arc::clone(&clock);
                thread::spawn(move || {
                    for _ in 0..100 {
                        clock.advance(Duration::from_millis(1));
                    }
                })
            })
            .collect::<Vec<_>>();
        for worker in workers {
            worker.join().expect("worker should finish");
        }
        assert_eq!(clock.now_millis(), 400);
    }
}
