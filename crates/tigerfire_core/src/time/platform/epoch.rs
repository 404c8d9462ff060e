//! Adapter reading the global clock as a duration since the UNIX epoch.

use super::signed_millis_since;
use crate::time::{DayFormatter, PlatformTimeProvider, Timestamp, ZoneSource};
use log::{debug, trace};
use once_cell::sync::OnceCell;
use std::time::{SystemTime, UNIX_EPOCH};

/// Global epoch clock, the native shape on Android/JVM-style hosts.
#[derive(Debug, Default)]
pub struct EpochClock {
    zone: ZoneSource,
    formatter: OnceCell<DayFormatter>,
}

impl EpochClock {
    pub const NAME: &'static str = "epoch";

    /// Clock formatting days in the host local zone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock formatting days in a pinned zone.
    pub fn with_zone(zone: ZoneSource) -> Self {
        Self {
            zone,
            formatter: OnceCell::new(),
        }
    }

    pub fn zone(&self) -> ZoneSource {
        self.zone
    }
}

impl PlatformTimeProvider for EpochClock {
    fn now_millis(&self) -> Timestamp {
        let millis = signed_millis_since(SystemTime::now(), UNIX_EPOCH);
        trace!("event=clock_read module=time clock={} millis={}", Self::NAME, millis);
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
