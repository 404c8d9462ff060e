//! FFI use-case API for the mobile host.
//!
//! # Responsibility
//! - Expose the platform time capability and usage ledger to the host UI.
//! - Resolve process-level configuration (DB path, zone override) once.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Time queries never fail; ledger calls report failure in envelopes.

use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;
use tigerfire_core::db::open_db;
use tigerfire_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    DailyUsage, PlatformClock, PlatformTimeProvider, RepoResult, SqliteUsageRepository,
    UsageService, ZoneSource, PLATFORM_CLOCK_NAME,
};

const USAGE_DB_FILE_NAME: &str = "tigerfire_usage.sqlite3";
const DB_PATH_ENV: &str = "TIGERFIRE_DB_PATH";
const UTC_OFFSET_ENV: &str = "TIGERFIRE_UTC_OFFSET_MINUTES";
const RECENT_DAYS_DEFAULT: u32 = 7;
const RECENT_DAYS_MAX: u32 = 31;

static USAGE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static HOST_CLOCK: OnceLock<PlatformClock> = OnceLock::new();

/// Minimal health-check API for bridge smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - Safe to repeat with the same `level + log_dir`.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Current wall-clock time in epoch milliseconds.
///
/// # FFI contract
/// - Sync, non-blocking, callable from any thread.
/// - Never fails.
#[flutter_rust_bridge::frb(sync)]
pub fn now_millis() -> i64 {
    host_clock().now_millis()
}

/// Today's date as `YYYY-MM-DD`, or empty when the formatter has no result.
///
/// # FFI contract
/// - Sync, non-blocking, callable from any thread.
/// - Never fails.
#[flutter_rust_bridge::frb(sync)]
pub fn today_date_string() -> String {
    host_clock().today_date_string().into_string()
}

/// Name of the adapter compiled into this build.
#[flutter_rust_bridge::frb(sync)]
pub fn platform_clock_name() -> String {
    PLATFORM_CLOCK_NAME.to_owned()
}

/// One day of recorded usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyUsageItem {
    /// `YYYY-MM-DD` day key.
    pub date: String,
    pub duration_ms: i64,
}

/// Result envelope for ledger writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageActionResponse {
    pub ok: bool,
    /// Day the usage was booked under, when successful.
    pub date: Option<String>,
    pub message: String,
}

/// Session limit evaluation envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLimitResponse {
    pub ok: bool,
    pub has_reached_limit: bool,
    pub should_show_reminder: bool,
    pub remaining_ms: i64,
    pub can_extend: bool,
    pub message: String,
}

/// Adds `duration_ms` to today's usage.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; failures come back with `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn record_usage(duration_ms: i64) -> UsageActionResponse {
    match with_usage_service(|service| service.record_usage(duration_ms)) {
        Ok(date) => UsageActionResponse {
            ok: true,
            date: Some(date.into_string()),
            message: "Usage recorded.".to_string(),
        },
        Err(err) => UsageActionResponse {
            ok: false,
            date: None,
            message: format!("record_usage failed: {err}"),
        },
    }
}

/// Milliseconds recorded today; `0` when nothing is recorded or on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn today_usage_ms() -> i64 {
    with_usage_service(|service| service.today_usage()).unwrap_or_else(|err| {
        warn!("event=ffi_today_usage module=ffi status=error error={}", err);
        0
    })
}

/// Most recent days with usage, oldest first.
///
/// `days` defaults to 7 and is capped at 31.
#[flutter_rust_bridge::frb(sync)]
pub fn recent_daily_usage(days: Option<u32>) -> Vec<DailyUsageItem> {
    let days = normalize_recent_days(days);
    match with_usage_service(|service| service.daily_usage_list(days)) {
        Ok(usage) => usage.into_iter().map(to_daily_usage_item).collect(),
        Err(err) => {
            warn!("event=ffi_recent_usage module=ffi status=error error={}", err);
            Vec::new()
        }
    }
}

/// Evaluates the session limit for `elapsed_ms` of play.
#[flutter_rust_bridge::frb(sync)]
pub fn check_time_limit(elapsed_ms: i64) -> TimeLimitResponse {
    match with_usage_service(|service| service.check_time_limit(elapsed_ms)) {
        Ok(status) => TimeLimitResponse {
            ok: true,
            has_reached_limit: status.has_reached_limit,
            should_show_reminder: status.should_show_reminder,
            remaining_ms: status.remaining_ms,
            can_extend: status.can_extend,
            message: status.remaining_text(),
        },
        // Unlimited on failure so a broken ledger never locks the child out.
        Err(err) => TimeLimitResponse {
            ok: false,
            has_reached_limit: false,
            should_show_reminder: false,
            remaining_ms: i64::MAX,
            can_extend: false,
            message: format!("check_time_limit failed: {err}"),
        },
    }
}

fn host_clock() -> &'static PlatformClock {
    HOST_CLOCK.get_or_init(|| match resolve_zone_override() {
        Some(zone) => PlatformClock::with_zone(zone),
        None => PlatformClock::new(),
    })
}

fn resolve_zone_override() -> Option<ZoneSource> {
    let raw = std::env::var(UTC_OFFSET_ENV).ok()?;
    let zone = parse_zone_override(&raw);
    if zone.is_none() {
        warn!(
            "event=ffi_config module=ffi status=error key={} value={} fallback=local",
            UTC_OFFSET_ENV, raw
        );
    }
    zone
}

/// Whole minutes east of UTC; surrounding whitespace is ignored.
fn parse_zone_override(raw: &str) -> Option<ZoneSource> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .and_then(ZoneSource::fixed_minutes)
}

fn resolve_usage_db_path() -> PathBuf {
    USAGE_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(USAGE_DB_FILE_NAME)
        })
        .clone()
}

fn normalize_recent_days(days: Option<u32>) -> u32 {
    match days {
        None | Some(0) => RECENT_DAYS_DEFAULT,
        Some(value) => value.min(RECENT_DAYS_MAX),
    }
}

fn with_usage_service<T>(
    f: impl FnOnce(&UsageService<SqliteUsageRepository<'_>, &'static PlatformClock>) -> RepoResult<T>,
) -> Result<T, String> {
    let conn = open_db(resolve_usage_db_path())
        .map_err(|err| format!("usage DB open failed: {err}"))?;
    let service = UsageService::new(SqliteUsageRepository::new(&conn), host_clock());
    f(&service).map_err(|err| err.to_string())
}

fn to_daily_usage_item(usage: DailyUsage) -> DailyUsageItem {
    DailyUsageItem {
        date: usage.date.into_string(),
        duration_ms: usage.duration_ms,
    }
}
