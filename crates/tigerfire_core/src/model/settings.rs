//! Parent-controlled session settings.
//!
//! # Invariants
//! - `session_duration_minutes > 0`.
//! - `reminder_minutes_before < session_duration_minutes`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MILLIS_PER_MINUTE: i64 = 60 * 1000;

/// Session length limit and pre-limit reminder window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentSettings {
    pub session_duration_minutes: u32,
    pub reminder_minutes_before: u32,
}

impl ParentSettings {
    pub const DEFAULT_SESSION_DURATION_MINUTES: u32 = 15;
    pub const DEFAULT_REMINDER_MINUTES: u32 = 2;
    /// Durations offered as one-tap presets.
    pub const AVAILABLE_DURATIONS: [u32; 4] = [5, 10, 15, 30];

    /// Returns a copy using one of `AVAILABLE_DURATIONS`.
    pub fn with_preset_duration(self, minutes: u32) -> Result<Self, SettingsValidationError> {
        if !Self::AVAILABLE_DURATIONS.contains(&minutes) {
            return Err(SettingsValidationError::UnsupportedPreset(minutes));
        }
        let updated = Self {
            session_duration_minutes: minutes,
            ..self
        };
        updated.validate()?;
        Ok(updated)
    }

    pub fn validate(&self) -> Result<(), SettingsValidationError> {
        if self.session_duration_minutes == 0 {
            return Err(SettingsValidationError::ZeroSessionDuration);
        }
        if self.reminder_minutes_before >= self.session_duration_minutes {
            return Err(SettingsValidationError::ReminderNotBeforeEnd {
                reminder_minutes: self.reminder_minutes_before,
                session_minutes: self.session_duration_minutes,
            });
        }
        Ok(())
    }

    pub fn session_duration_millis(&self) -> i64 {
        i64::from(self.session_duration_minutes) * MILLIS_PER_MINUTE
    }

    pub fn reminder_millis(&self) -> i64 {
        i64::from(self.reminder_minutes_before) * MILLIS_PER_MINUTE
    }
}

impl Default for ParentSettings {
    fn default() -> Self {
        Self {
            session_duration_minutes: Self::DEFAULT_SESSION_DURATION_MINUTES,
            reminder_minutes_before: Self::DEFAULT_REMINDER_MINUTES,
        }
    }
}

/// Settings validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsValidationError {
    ZeroSessionDuration,
    ReminderNotBeforeEnd {
        reminder_minutes: u32,
        session_minutes: u32,
    },
    UnsupportedPreset(u32),
}

impl Display for SettingsValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroSessionDuration => write!(f, "session duration must be > 0 minutes"),
            Self::ReminderNotBeforeEnd {
                reminder_minutes,
                session_minutes,
            } => write!(
                f,
                "reminder ({reminder_minutes} min) must be shorter than session ({session_minutes} min)"
            ),
            Self::UnsupportedPreset(minutes) => write!(
                f,
                "duration preset {minutes} min is unsupported; expected one of {:?}",
                ParentSettings::AVAILABLE_DURATIONS
            ),
        }
    }
}

impl Error for SettingsValidationError {}

#[cfg(test)]
mod tests {
    use super::{ParentSettings, SettingsValidationError};

    #[test]
    fn defaults_are_valid() {
        let settings = ParentSettings::default();
        assert_eq!(settings.session_duration_minutes, 15);
        assert_eq!(settings.reminder_minutes_before, 2);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.session_duration_millis(), 900_000);
        assert_eq!(settings.reminder_millis(), 120_000);
    }

    #[test]
    fn preset_must_be_listed() {
        let settings = ParentSettings::default();
        assert_eq!(
            settings.with_preset_duration(30).expect("preset").session_duration_minutes,
            30
        );
        assert_eq!(
            settings.with_preset_duration(20).unwrap_err(),
            SettingsValidationError::UnsupportedPreset(20)
        );
    }

    #[test]
    fn reminder_must_end_before_session() {
        let settings = ParentSettings {
            session_duration_minutes: 5,
            reminder_minutes_before: 5,
        };
        assert_eq!(
            settings.validate().unwrap_err(),
            SettingsValidationError::ReminderNotBeforeEnd {
                reminder_minutes: 5,
                session_minutes: 5,
            }
        );
    }
}
