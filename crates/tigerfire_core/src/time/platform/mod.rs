//! Per-platform adapters for `PlatformTimeProvider`.
//!
//! Every adapter compiles on every target so each one stays testable, but a
//! build only names one of them through `PlatformClock`.

mod epoch;
mod reference_date;

pub use epoch::EpochClock;
pub use reference_date::{ReferenceDateClock, REFERENCE_DATE_OFFSET_MILLIS};

use super::Timestamp;
use std::time::SystemTime;

/// Native adapter for Apple targets.
#[cfg(target_vendor = "apple")]
pub type PlatformClock = ReferenceDateClock;

/// Native adapter for every non-Apple target.
#[cfg(not(target_vendor = "apple"))]
pub type PlatformClock = EpochClock;

/// Stable name of the adapter behind `PlatformClock`.
#[cfg(target_vendor = "apple")]
pub const PLATFORM_CLOCK_NAME: &str = ReferenceDateClock::NAME;

/// Stable name of the adapter behind `PlatformClock`.
#[cfg(not(target_vendor = "apple"))]
pub const PLATFORM_CLOCK_NAME: &str = EpochClock::NAME;

/// Signed millisecond distance from `origin` to `at`.
///
/// Instants before `origin` come back negative; magnitudes beyond `i64`
/// saturate.
fn signed_millis_since(at: SystemTime, origin: SystemTime) -> Timestamp {
    match at.duration_since(origin) {
        Ok(ahead) => i64::try_from(ahead.as_millis()).unwrap_or(i64::MAX),
        Err(behind) => i64::try_from(behind.duration().as_millis())
            .map(|millis| -millis)
            .unwrap_or(i64::MIN),
    }
}
