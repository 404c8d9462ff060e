//! Day formatter shared by every platform adapter.
//!
//! # Responsibility
//! - Map one epoch-millisecond instant to a `DateString` in a timezone context.
//! - Absorb formatter failures into the unavailable value.
//!
//! # Invariants
//! - Formatting never panics and never returns an error.
//! - Both zone sources use the same Gregorian calendar rules.

use super::date_string::DateString;
use super::Timestamp;
use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use log::warn;

/// Timezone context used to pick the calendar day of an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneSource {
    /// Host default timezone, resolved per instant (DST aware).
    #[default]
    Local,
    /// Pinned UTC offset.
    Fixed(FixedOffset),
}

impl ZoneSource {
    /// Pinned zone `minutes` east of UTC.
    ///
    /// Returns `None` when the offset is outside +/- 24 hours.
    pub fn fixed_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::Fixed)
    }

    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }
}

/// Formats instants as `YYYY-MM-DD` day keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayFormatter {
    zone: ZoneSource,
}

impl DayFormatter {
    pub fn new(zone: ZoneSource) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> ZoneSource {
        self.zone
    }

    /// Formats `millis`, or returns `None` when no day can be produced.
    ///
    /// Fails for instants outside chrono's range and for days outside
    /// four-digit years.
    pub fn try_format(&self, millis: Timestamp) -> Option<DateString> {
        let instant = DateTime::<Utc>::from_timestamp_millis(millis)?;
        let day = match self.zone {
            ZoneSource::Local => instant.with_timezone(&Local).date_naive(),
            ZoneSource::Fixed(offset) => instant.with_timezone(&offset).date_naive(),
        };
        DateString::from_naive_date(day)
    }

    /// Formats `millis`, falling back to `DateString::unavailable()`.
    pub fn format(&self, millis: Timestamp) -> DateString {
        match self.try_format(millis) {
            Some(day) => day,
            None => {
                warn!(
                    "event=day_format module=time status=error error_code=formatter_unavailable millis={}",
                    millis
                );
                DateString::unavailable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DayFormatter, ZoneSource};
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    fn millis_at(offset_minutes: i32, y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        let offset = FixedOffset::east_opt(offset_minutes * 60).expect("valid offset");
        offset
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(y, m, d)
                    .expect("valid date")
                    .and_hms_opt(h, min, 0)
                    .expect("valid time"),
            )
            .single()
            .expect("fixed offsets are unambiguous")
            .timestamp_millis()
    }

    #[test]
    fn formats_local_morning_as_same_day() {
        let zone = ZoneSource::fixed_minutes(8 * 60).expect("offset");
        let formatter = DayFormatter::new(zone);
        let ts = millis_at(8 * 60, 2024, 3, 5, 10, 0);
        assert_eq!(formatter.format(ts).as_str(), "2024-03-05");
    }

    #[test]
    fn zone_decides_calendar_day() {
        // 2024-03-05T01:30:00+08:00 is still March 4th in UTC.
        let ts = millis_at(8 * 60, 2024, 3, 5, 1, 30);
        let east = DayFormatter::new(ZoneSource::fixed_minutes(8 * 60).expect("offset"));
        let utc = DayFormatter::new(ZoneSource::utc());
        assert_eq!(east.format(ts).as_str(), "2024-03-05");
        assert_eq!(utc.format(ts).as_str(), "2024-03-04");
    }

    #[test]
    fn epoch_zero_formats_in_utc() {
        let formatter = DayFormatter::new(ZoneSource::utc());
        assert_eq!(formatter.format(0).as_str(), "1970-01-01");
        assert_eq!(formatter.format(-1).as_str(), "1969-12-31");
    }

    #[test]
    fn out_of_range_instants_fall_back_to_empty() {
        let formatter = DayFormatter::new(ZoneSource::utc());
        assert!(formatter.format(i64::MAX).is_unavailable());
        assert!(formatter.format(i64::MIN).is_unavailable());
        // Year 10000 is representable by chrono but not in four digits.
        let year_10000 = millis_at(0, 10_000, 1, 1, 0, 0);
        assert_eq!(formatter.try_format(year_10000), None);
    }

    #[test]
    fn local_zone_always_yields_pattern() {
        let formatter = DayFormatter::default();
        let day = formatter.format(1_709_632_800_000);
        assert_eq!(day.as_str().len(), 10);
    }

    #[test]
    fn rejects_offsets_beyond_a_day() {
        assert!(ZoneSource::fixed_minutes(24 * 60).is_none());
        assert!(ZoneSource::fixed_minutes(-(24 * 60)).is_none());
        assert!(ZoneSource::fixed_minutes(23 * 60 + 59).is_some());
    }
}
