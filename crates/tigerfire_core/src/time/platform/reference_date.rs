//! Adapter reading the interval since the 2001-01-01 reference date.
//!
//! Apple hosts expose "now" relative to 2001-01-01T00:00:00Z. This adapter
//! takes one `SystemTime` reading, measures it against that reference and
//! shifts it back onto the UNIX epoch with a fixed offset.

use super::signed_millis_since;
use crate::time::{DayFormatter, PlatformTimeProvider, Timestamp, ZoneSource};
use log::{debug, trace};
use once_cell::sync::OnceCell;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Milliseconds between the UNIX epoch and 2001-01-01T00:00:00Z.
pub const REFERENCE_DATE_OFFSET_MILLIS: i64 = 978_307_200_000;

/// Reference-date clock, the native shape on Apple hosts.
#[derive(Debug, Default)]
pub struct ReferenceDateClock {
    zone: ZoneSource,
    formatter: OnceCell<DayFormatter>,
}

impl ReferenceDateClock {
    pub const NAME: &'static str = "reference_date";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(zone: ZoneSource) -> Self {
        Self {
            zone,
            formatter: OnceCell::new(),
        }
    }

    pub fn zone(&self) -> ZoneSource {
        self.zone
    }

    /// Milliseconds elapsed from the reference date to `at`.
    pub fn interval_since_reference_date(at: SystemTime) -> Timestamp {
        signed_millis_since(at, reference_date())
    }
}

fn reference_date() -> SystemTime {
    UNIX_EPOCH + Duration::from_millis(REFERENCE_DATE_OFFSET_MILLIS as u64)
}

impl PlatformTimeProvider for ReferenceDateClock {
    fn now_millis(&self) -> Timestamp {
        let interval = Self::interval_since_reference_date(SystemTime::now());
        let millis = interval.saturating_add(REFERENCE_DATE_OFFSET_MILLIS);
        trace!(
            "event=clock_read module=time clock={} interval_ms={} millis={}",
            Self::NAME,
            interval,
            millis
        );
        millis
    }

    fn day_formatter(&self) -> &DayFormatter {
        self.formatter.get_or_init(|| {
            debug!(
                "event=formatter_init module=time clock={} zone={:?}",
                Self::NAME,
                self.zone
            );
            DayFormatter::new(self.zone)
        })
    }
}
