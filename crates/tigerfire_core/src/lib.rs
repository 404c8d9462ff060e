//! Core logic for TigerFire.
//! Owns the platform time capability and the usage ledger built on it.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod time;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::settings::{ParentSettings, SettingsValidationError};
pub use model::usage::{
    DailyUsage, TimeLimitStatus, UsageReport, UsageTrend, UsageTrendDirection, WeeklyStats,
};
pub use repo::usage_repo::{RepoError, RepoResult, SqliteUsageRepository, UsageRepository};
pub use service::usage_service::{evaluate_time_limit, UsageService};
pub use time::{
    DateString, DateStringError, DayFormatter, EpochClock, ManualClock, PlatformClock,
    PlatformTimeProvider, ReferenceDateClock, Timestamp, ZoneSource, PLATFORM_CLOCK_NAME,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
