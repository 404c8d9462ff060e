//! Usage ledger and session limit use cases.
//!
//! # Responsibility
//! - Record play time under the clock's current day key.
//! - Answer "how much today / this week" and "is the session over" questions.
//!
//! # Invariants
//! - The clock is injected; the service never reads ambient time on its own.
//! - Each use case reads the clock at most once, so day key and timestamp agree.

use crate::model::settings::ParentSettings;
use crate::model::usage::{DailyUsage, TimeLimitStatus, UsageReport, UsageTrend, WeeklyStats};
use crate::repo::usage_repo::{RepoError, RepoResult, UsageRepository};
use crate::time::{DateString, PlatformTimeProvider};
use log::{debug, info};

const WEEK_DAYS: i64 = 7;
/// Recorded days considered by `usage_trend`.
const TREND_WINDOW_DAYS: u32 = 7;
/// Bounds applied by `update_time_limit`.
pub const TIME_LIMIT_MIN_MINUTES: u32 = 5;
pub const TIME_LIMIT_MAX_MINUTES: u32 = 120;

/// Use-case service over a usage repository and a time provider.
pub struct UsageService<R: UsageRepository, C: PlatformTimeProvider> {
    repo: R,
    clock: C,
}

impl<R: UsageRepository, C: PlatformTimeProvider> UsageService<R, C> {
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Adds `duration_ms` to today's usage and returns the day it landed on.
    ///
    /// # Errors
    /// - `InvalidDuration` for negative input.
    /// - `UsageOverflow` when today's row or the lifetime total would overflow.
    /// - `DateUnavailable` when the clock cannot produce a day key.
    pub fn record_usage(&self, duration_ms: i64) -> RepoResult<DateString> {
        let now = self.clock.now_millis();
        let today = self.clock.date_string_at(now);
        self.repo.add_usage(&today, duration_ms, now)?;
        info!(
            "event=usage_record module=service status=ok date={} duration_ms={}",
            today, duration_ms
        );
        Ok(today)
    }

    pub fn today_usage(&self) -> RepoResult<i64> {
        self.repo.usage_for_date(&self.today()?)
    }

    pub fn has_used_today(&self) -> RepoResult<bool> {
        Ok(self.today_usage()? > 0)
    }

    /// Up to `days` most recent days with usage, oldest first.
    pub fn daily_usage_list(&self, days: u32) -> RepoResult<Vec<DailyUsage>> {
        let mut recent = self.repo.recent_usage(days)?;
        recent.reverse();
        Ok(recent)
    }

    /// The seven days ending today, oldest first, zero-filled.
    pub fn last_7_days(&self) -> RepoResult<Vec<DailyUsage>> {
        let today = self.today()?;
        let first = today.shift_days(1 - WEEK_DAYS);
        if first.is_unavailable() {
            return Err(RepoError::DateUnavailable);
        }
        let recorded = self.repo.usage_between(&first, &today)?;

        let window = (0..WEEK_DAYS)
            .map(|offset| {
                let date = first.shift_days(offset);
                let duration_ms = recorded
                    .iter()
                    .find(|usage| usage.date == date)
                    .map_or(0, |usage| usage.duration_ms);
                DailyUsage { date, duration_ms }
            })
            .collect();
        Ok(window)
    }

    /// Totals over `last_7_days`; the average counts active days only.
    pub fn weekly_stats(&self) -> RepoResult<WeeklyStats> {
        let last_7_days = self.last_7_days()?;
        let total_ms = last_7_days
            .iter()
            .fold(0_i64, |acc, usage| acc.saturating_add(usage.duration_ms));
        let active_days = last_7_days
            .iter()
            .filter(|usage| usage.duration_ms > 0)
            .count() as u32;
        let daily_average_ms = if active_days == 0 {
            0
        } else {
            total_ms / i64::from(active_days)
        };
        Ok(WeeklyStats {
            total_ms,
            daily_average_ms,
            last_7_days,
            active_days,
        })
    }

    /// Largest single-day usage ever recorded, or `0` for an empty ledger.
    pub fn max_daily_usage(&self) -> RepoResult<i64> {
        self.repo.max_daily_usage()
    }

    /// Trend over the last recorded days (gaps are skipped, not zero-filled).
    ///
    /// Compares the mean of the whole window against the mean of its earlier
    /// part (the newest `len / 2` days dropped). Fewer than two recorded days
    /// is always stable.
    pub fn usage_trend(&self) -> RepoResult<UsageTrend> {
        let window = self.daily_usage_list(TREND_WINDOW_DAYS)?;
        if window.len() < 2 {
            return Ok(UsageTrend::stable());
        }
        let durations: Vec<i64> = window.iter().map(|usage| usage.duration_ms).collect();
        let recent_average = mean_ms(&durations);
        let previous_average = mean_ms(&durations[..durations.len() - durations.len() / 2]);
        let change_percent = if previous_average > 0.0 {
            (recent_average - previous_average) / previous_average * 100.0
        } else {
            0.0
        };
        let trend = UsageTrend::from_change_percent(change_percent);
        debug!(
            "event=usage_trend module=service status=ok days={} direction={:?} change_percent={:.1}",
            durations.len(),
            trend.direction,
            trend.change_percent
        );
        Ok(trend)
    }

    pub fn usage_report(&self) -> RepoResult<UsageReport> {
        Ok(UsageReport {
            total_play_ms: self.repo.total_play_ms()?,
        })
    }

    pub fn clear_usage_stats(&self) -> RepoResult<()> {
        self.repo.clear_usage()?;
        info!("event=usage_clear module=service status=ok");
        Ok(())
    }

    pub fn settings(&self) -> RepoResult<ParentSettings> {
        self.repo.load_settings()
    }

    /// Evaluates the session limit for `elapsed_ms` of play.
    pub fn check_time_limit(&self, elapsed_ms: i64) -> RepoResult<TimeLimitStatus> {
        let settings = self.repo.load_settings()?;
        let status = evaluate_time_limit(&settings, elapsed_ms);
        debug!(
            "event=time_limit_check module=service elapsed_ms={} remaining_ms={} reached={}",
            elapsed_ms, status.remaining_ms, status.has_reached_limit
        );
        Ok(status)
    }

    /// Lengthens the session limit by `additional_minutes`.
    pub fn extend_time(&self, additional_minutes: u32) -> RepoResult<ParentSettings> {
        let current = self.repo.load_settings()?;
        let updated = ParentSettings {
            session_duration_minutes: current
                .session_duration_minutes
                .saturating_add(additional_minutes),
            ..current
        };
        self.save(&updated)?;
        Ok(updated)
    }

    /// Sets the session limit, clamped to `5..=120` minutes.
    ///
    /// A saved reminder that would no longer fire before the end of the
    /// shorter session is lowered to `session - 1` minutes.
    pub fn update_time_limit(&self, minutes: u32) -> RepoResult<ParentSettings> {
        let current = self.repo.load_settings()?;
        let session_duration_minutes =
            minutes.clamp(TIME_LIMIT_MIN_MINUTES, TIME_LIMIT_MAX_MINUTES);
        let updated = ParentSettings {
            session_duration_minutes,
            reminder_minutes_before: current
                .reminder_minutes_before
                .min(session_duration_minutes - 1),
        };
        self.save(&updated)?;
        Ok(updated)
    }

    /// Persists fully caller-built settings.
    pub fn update_settings(&self, settings: &ParentSettings) -> RepoResult<()> {
        self.save(settings)
    }

    fn save(&self, settings: &ParentSettings) -> RepoResult<()> {
        self.repo.save_settings(settings, self.clock.now_millis())?;
        info!(
            "event=settings_update module=service status=ok session_minutes={} reminder_minutes={}",
            settings.session_duration_minutes, settings.reminder_minutes_before
        );
        Ok(())
    }

    fn today(&self) -> RepoResult<DateString> {
        let today = self.clock.today_date_string();
        if today.is_unavailable() {
            return Err(RepoError::DateUnavailable);
        }
        Ok(today)
    }
}

fn mean_ms(values: &[i64]) -> f64 {
    let sum: f64 = values.iter().map(|&value| value as f64).sum();
    sum / values.len() as f64
}

/// Pure session limit evaluation.
///
/// - Limit reached when `elapsed >= session`.
/// - Reminder shown while `0 < remaining <= reminder`.
/// - Extension offered only once the limit is reached.
pub fn evaluate_time_limit(settings: &ParentSettings, elapsed_ms: i64) -> TimeLimitStatus {
    let session_ms = settings.session_duration_millis();
    let remaining_ms = session_ms.saturating_sub(elapsed_ms).max(0);
    let has_reached_limit = elapsed_ms >= session_ms;
    TimeLimitStatus {
        has_reached_limit,
        should_show_reminder: !has_reached_limit
            && remaining_ms > 0
            && remaining_ms <= settings.reminder_millis(),
        remaining_ms,
        can_extend: has_reached_limit,
    }
}
