//! Usage ledger read models.

use crate::time::DateString;
use serde::{Deserialize, Serialize};

const MILLIS_PER_MINUTE: i64 = 60 * 1000;

/// Accumulated play time for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub date: DateString,
    pub duration_ms: i64,
}

impl DailyUsage {
    pub fn duration_minutes(&self) -> i64 {
        self.duration_ms / MILLIS_PER_MINUTE
    }
}

/// Aggregate over the seven days ending today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub total_ms: i64,
    /// Average over days with recorded usage only.
    pub daily_average_ms: i64,
    /// Oldest first, zero-filled, always seven entries.
    pub last_7_days: Vec<DailyUsage>,
    pub active_days: u32,
}

/// Lifetime play time totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageReport {
    pub total_play_ms: i64,
}

impl UsageReport {
    pub fn total_minutes(&self) -> i64 {
        self.total_play_ms / MILLIS_PER_MINUTE
    }

    pub fn total_hours(&self) -> i64 {
        self.total_minutes() / 60
    }

    /// Compact `"{h}h {m}m"` / `"{m}m"` rendering.
    pub fn formatted_total(&self) -> String {
        let hours = self.total_hours();
        let minutes = self.total_minutes() % 60;
        if hours > 0 {
            format!("{hours}h {minutes}m")
        } else {
            format!("{minutes}m")
        }
    }
}

/// Direction of recent usage relative to the earlier part of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsageTrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Usage trend over the most recent recorded days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageTrend {
    pub direction: UsageTrendDirection,
    /// Signed change; `0.0` when there is no baseline.
    pub change_percent: f64,
}

impl UsageTrend {
    /// Changes within this many percent either way count as stable.
    pub const STABLE_BAND_PERCENT: f64 = 10.0;

    pub fn stable() -> Self {
        Self {
            direction: UsageTrendDirection::Stable,
            change_percent: 0.0,
        }
    }

    pub fn from_change_percent(change_percent: f64) -> Self {
        let direction = if change_percent > Self::STABLE_BAND_PERCENT {
            UsageTrendDirection::Increasing
        } else if change_percent < -Self::STABLE_BAND_PERCENT {
            UsageTrendDirection::Decreasing
        } else {
            UsageTrendDirection::Stable
        };
        Self {
            direction,
            change_percent,
        }
    }

    /// Short summary such as `"up 25%"`, `"down 40%"` or `"stable"`.
    pub fn description(&self) -> String {
        let whole = self.change_percent.abs().trunc();
        match self.direction {
            UsageTrendDirection::Increasing => format!("up {whole}%"),
            UsageTrendDirection::Decreasing => format!("down {whole}%"),
            UsageTrendDirection::Stable => "stable".to_string(),
        }
    }
}

/// Session limit evaluation for an elapsed play time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLimitStatus {
    pub has_reached_limit: bool,
    pub should_show_reminder: bool,
    /// Clamped at zero once the limit is reached.
    pub remaining_ms: i64,
    pub can_extend: bool,
}

impl TimeLimitStatus {
    pub fn remaining_minutes(&self) -> i64 {
        self.remaining_ms / MILLIS_PER_MINUTE
    }

    /// `"{m}:{ss}"` countdown text.
    pub fn remaining_text(&self) -> String {
        let seconds = self.remaining_ms / 1000;
        format!("{}:{:02}", seconds / 60, seconds % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::{TimeLimitStatus, UsageReport, UsageTrend, UsageTrendDirection};

    #[test]
    fn report_formats_hours_and_minutes() {
        let report = UsageReport {
            total_play_ms: (2 * 60 + 5) * 60 * 1000,
        };
        assert_eq!(report.total_hours(), 2);
        assert_eq!(report.formatted_total(), "2h 5m");
        assert_eq!(UsageReport { total_play_ms: 59_999 }.formatted_total(), "0m");
    }

    #[test]
    fn remaining_text_pads_seconds() {
        let status = TimeLimitStatus {
            has_reached_limit: false,
            should_show_reminder: true,
            remaining_ms: 65_400,
            can_extend: false,
        };
        assert_eq!(status.remaining_minutes(), 1);
        assert_eq!(status.remaining_text(), "1:05");
    }

    #[test]
    fn trend_band_edges_stay_stable() {
        assert_eq!(
            UsageTrend::from_change_percent(10.0).direction,
            UsageTrendDirection::Stable
        );
        assert_eq!(
            UsageTrend::from_change_percent(-10.0).direction,
            UsageTrendDirection::Stable
        );
        assert_eq!(
            UsageTrend::from_change_percent(10.5).direction,
            UsageTrendDirection::Increasing
        );
        assert_eq!(UsageTrend::from_change_percent(-42.9).description(), "down 42%");
        assert_eq!(UsageTrend::stable().description(), "stable");
    }
}
