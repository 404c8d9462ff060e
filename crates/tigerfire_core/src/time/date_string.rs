//! Calendar date string value type.
//!
//! # Responsibility
//! - Carry the `YYYY-MM-DD` day key shared by the time layer and the usage ledger.
//! - Keep construction on validated paths only.
//!
//! # Invariants
//! - A non-empty value is exactly 10 ASCII chars matching `^\d{4}-\d{2}-\d{2}$`
//!   and names a real Gregorian date.
//! - The empty value means "formatter unavailable" and never parses back.
//! - Lexical ordering equals chronological ordering for non-empty values.

use chrono::{Datelike, Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATE_STRING_LEN: usize = 10;
const MAX_FOUR_DIGIT_YEAR: i32 = 9999;

static DATE_STRING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date string regex"));

/// Calendar day rendered as `YYYY-MM-DD` in some timezone context.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DateString(String);

/// Date string parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateStringError {
    /// Input does not have the `YYYY-MM-DD` shape.
    Malformed(String),
    /// Shape is right but the day does not exist (e.g. `2023-02-29`).
    InvalidCalendarDate(String),
}

impl Display for DateStringError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => {
                write!(f, "date string must match YYYY-MM-DD, got `{value}`")
            }
            Self::InvalidCalendarDate(value) => {
                write!(f, "date string is not a real calendar day: `{value}`")
            }
        }
    }
}

impl Error for DateStringError {}

impl DateString {
    /// The fallback value returned when no formatter result is available.
    pub fn unavailable() -> Self {
        Self(String::new())
    }

    /// Builds a date string from a calendar date.
    ///
    /// Returns `None` for years that do not fit in four digits.
    pub fn from_naive_date(date: NaiveDate) -> Option<Self> {
        let year = date.year();
        if !(0..=MAX_FOUR_DIGIT_YEAR).contains(&year) {
            return None;
        }
        Some(Self(format!(
            "{year:04}-{:02}-{:02}",
            date.month(),
            date.day()
        )))
    }

    /// Builds a date string from year/month/day components.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).and_then(Self::from_naive_date)
    }

    /// Parses and validates a `YYYY-MM-DD` value.
    ///
    /// # Errors
    /// - `Malformed` when the shape is wrong (including the empty string).
    /// - `InvalidCalendarDate` when the day does not exist.
    pub fn parse(value: &str) -> Result<Self, DateStringError> {
        if value.len() != DATE_STRING_LEN || !DATE_STRING_RE.is_match(value) {
            return Err(DateStringError::Malformed(value.to_string()));
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| DateStringError::InvalidCalendarDate(value.to_string()))?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether this is the formatter-unavailable fallback.
    pub fn is_unavailable(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the calendar date, or `None` for the unavailable value.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, "%Y-%m-%d").ok()
    }

    /// Returns the date `days` calendar days away (negative goes back).
    ///
    /// The unavailable value, and results outside four-digit years, yield
    /// the unavailable value.
    pub fn shift_days(&self, days: i64) -> Self {
        let Some(date) = self.to_naive_date() else {
            return Self::unavailable();
        };
        let magnitude = Days::new(days.unsigned_abs());
        let shifted = if days >= 0 {
            date.checked_add_days(magnitude)
        } else {
            date.checked_sub_days(magnitude)
        };
        shifted
            .and_then(Self::from_naive_date)
            .unwrap_or_else(Self::unavailable)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for DateString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DateString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for DateString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DateString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(Self::unavailable());
        }
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
