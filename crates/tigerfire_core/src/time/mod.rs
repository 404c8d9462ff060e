//! Platform time capability.
//!
//! # Responsibility
//! - Define one capability for reading "now" as epoch millis and as a day key.
//! - Provide per-platform adapters selected at build time, plus a manual fake.
//!
//! # Invariants
//! - `today_date_string()` formats exactly one `now_millis()` reading, so both
//!   representations always describe the same instant.
//! - No operation blocks, locks, performs I/O or returns an error.
//! - Diagnostics go through the `log` facade and are inert unless a host
//!   installs a logger.

mod date_string;
mod formatter;
mod manual;
pub mod platform;

pub use date_string::{DateString, DateStringError};
pub use formatter::{DayFormatter, ZoneSource};
pub use manual::ManualClock;
pub use platform::{EpochClock, PlatformClock, ReferenceDateClock, PLATFORM_CLOCK_NAME};

use std::sync::Arc;

/// Milliseconds since 1970-01-01T00:00:00Z.
pub type Timestamp = i64;

/// Uniform "current moment" capability implemented by every platform adapter.
pub trait PlatformTimeProvider: Send + Sync {
    /// Current wall-clock time in epoch milliseconds.
    fn now_millis(&self) -> Timestamp;

    /// Formatter used to derive day keys for this provider.
    fn day_formatter(&self) -> &DayFormatter;

    /// Current calendar day as `YYYY-MM-DD`, or empty when unavailable.
    fn today_date_string(&self) -> DateString {
        self.date_string_at(self.now_millis())
    }

    /// Day key for an arbitrary instant in this provider's zone.
    fn date_string_at(&self, millis: Timestamp) -> DateString {
        self.day_formatter().format(millis)
    }
}

impl<T: PlatformTimeProvider + ?Sized> PlatformTimeProvider for &T {
    fn now_millis(&self) -> Timestamp {
        (**self).now_millis()
    }

    fn day_formatter(&self) -> &DayFormatter {
        (**self).day_formatter()
    }
}

impl<T: PlatformTimeProvider + ?Sized> PlatformTimeProvider for Arc<T> {
    fn now_millis(&self) -> Timestamp {
        (**self).now_millis()
    }

    fn day_formatter(&self) -> &DayFormatter {
        (**self).day_formatter()
    }
}

impl<T: PlatformTimeProvider + ?Sized> PlatformTimeProvider for Box<T> {
    fn now_millis(&self) -> Timestamp {
        (**self).now_millis()
    }

    fn day_formatter(&self) -> &DayFormatter {
        (**self).day_formatter()
    }
}
