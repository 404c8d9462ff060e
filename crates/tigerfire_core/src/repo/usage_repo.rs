//! Usage ledger repository.
//!
//! # Invariants
//! - `daily_usage` is keyed by non-empty `DateString` values.
//! - Recording a duration bumps the day row and the lifetime total in one
//!   transaction.
//! - Missing settings read back as `ParentSettings::default()`.

use crate::db::DbError;
use crate::model::settings::{ParentSettings, SettingsValidationError};
use crate::model::usage::DailyUsage;
use crate::time::{DateString, Timestamp};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Ledger persistence and validation errors.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Validation(SettingsValidationError),
    /// Durations must be zero or positive.
    InvalidDuration(i64),
    /// Adding the duration would overflow the day or lifetime counter.
    UsageOverflow(i64),
    /// The day key was the formatter-unavailable fallback.
    DateUnavailable,
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidDuration(value) => {
                write!(f, "usage duration must be >= 0 ms, got {value}")
            }
            Self::UsageOverflow(value) => {
                write!(f, "adding {value} ms would overflow recorded usage")
            }
            Self::DateUnavailable => write!(f, "current date is unavailable"),
            Self::InvalidData(message) => write!(f, "invalid persisted usage data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidDuration(_)
            | Self::UsageOverflow(_)
            | Self::DateUnavailable
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SettingsValidationError> for RepoError {
    fn from(value: SettingsValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Data access for daily usage, lifetime totals and parent settings.
pub trait UsageRepository {
    /// Adds `duration_ms` to `date` and to the lifetime total.
    fn add_usage(&self, date: &DateString, duration_ms: i64, recorded_at: Timestamp)
        -> RepoResult<()>;
    /// Recorded milliseconds for `date`, `0` when nothing was recorded.
    fn usage_for_date(&self, date: &DateString) -> RepoResult<i64>;
    /// Up to `limit` most recent days with usage, newest first.
    fn recent_usage(&self, limit: u32) -> RepoResult<Vec<DailyUsage>>;
    /// Days with usage in `[from, to]`, oldest first.
    fn usage_between(&self, from: &DateString, to: &DateString) -> RepoResult<Vec<DailyUsage>>;
    /// Largest recorded day, `0` when no day is recorded.
    fn max_daily_usage(&self) -> RepoResult<i64>;
    fn total_play_ms(&self) -> RepoResult<i64>;
    /// Drops every daily row; the lifetime total is kept.
    fn clear_usage(&self) -> RepoResult<()>;
    fn load_settings(&self) -> RepoResult<ParentSettings>;
    fn save_settings(&self, settings: &ParentSettings, updated_at: Timestamp) -> RepoResult<()>;
}

/// SQLite-backed usage repository.
pub struct SqliteUsageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUsageRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UsageRepository for SqliteUsageRepository<'_> {
    fn add_usage(
        &self,
        date: &DateString,
        duration_ms: i64,
        recorded_at: Timestamp,
    ) -> RepoResult<()> {
        ensure_day_key(date)?;
        if duration_ms < 0 {
            return Err(RepoError::InvalidDuration(duration_ms));
        }

        // SQLite silently promotes overflowing integer sums to REAL, so the
        // new values are computed here and written back as absolutes.
        let tx = self.conn.unchecked_transaction()?;
        let day_ms = tx
            .query_row(
                "SELECT duration_ms FROM daily_usage WHERE usage_date = ?1;",
                params![date.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .unwrap_or(0);
        let total_ms = tx
            .query_row(
                "SELECT total_play_ms FROM play_totals WHERE id = 1;",
                [],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .unwrap_or(0);
        let (Some(next_day_ms), Some(next_total_ms)) = (
            day_ms.checked_add(duration_ms),
            total_ms.checked_add(duration_ms),
        ) else {
            return Err(RepoError::UsageOverflow(duration_ms));
        };

        tx.execute(
            "INSERT INTO daily_usage (usage_date, duration_ms, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(usage_date) DO UPDATE SET
                duration_ms = excluded.duration_ms,
                updated_at = excluded.updated_at;",
            params![date.as_str(), next_day_ms, recorded_at],
        )?;
        tx.execute(
            "INSERT INTO play_totals (id, total_play_ms) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET total_play_ms = excluded.total_play_ms;",
            params![next_total_ms],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn usage_for_date(&self, date: &DateString) -> RepoResult<i64> {
        ensure_day_key(date)?;
        let duration = self
            .conn
            .query_row(
                "SELECT duration_ms FROM daily_usage WHERE usage_date = ?1;",
                params![date.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(duration.unwrap_or(0))
    }

    fn recent_usage(&self, limit: u32) -> RepoResult<Vec<DailyUsage>> {
        let mut stmt = self.conn.prepare(
            "SELECT usage_date, duration_ms
             FROM daily_usage
             ORDER BY usage_date DESC
             LIMIT ?1;",
        )?;
        let mut rows = stmt.query(params![i64::from(limit)])?;
        collect_usage_rows(&mut rows)
    }

    fn usage_between(&self, from: &DateString, to: &DateString) -> RepoResult<Vec<DailyUsage>> {
        ensure_day_key(from)?;
        ensure_day_key(to)?;
        let mut stmt = self.conn.prepare(
            "SELECT usage_date, duration_ms
             FROM daily_usage
             WHERE usage_date BETWEEN ?1 AND ?2
             ORDER BY usage_date ASC;",
        )?;
        let mut rows = stmt.query(params![from.as_str(), to.as_str()])?;
        collect_usage_rows(&mut rows)
    }

    fn max_daily_usage(&self) -> RepoResult<i64> {
        let max = self.conn.query_row(
            "SELECT COALESCE(MAX(duration_ms), 0) FROM daily_usage;",
            [],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(max)
    }

    fn total_play_ms(&self) -> RepoResult<i64> {
        let total = self
            .conn
            .query_row(
                "SELECT total_play_ms FROM play_totals WHERE id = 1;",
                [],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(total.unwrap_or(0))
    }

    fn clear_usage(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM daily_usage;", [])?;
        Ok(())
    }

    fn load_settings(&self) -> RepoResult<ParentSettings> {
        let stored = self
            .conn
            .query_row(
                "SELECT session_duration_minutes, reminder_minutes_before
                 FROM parent_settings
                 WHERE id = 1;",
                [],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        let Some((session, reminder)) = stored else {
            return Ok(ParentSettings::default());
        };
        let settings = ParentSettings {
            session_duration_minutes: minutes_from_db(session, "session_duration_minutes")?,
            reminder_minutes_before: minutes_from_db(reminder, "reminder_minutes_before")?,
        };
        settings
            .validate()
            .map_err(|err| RepoError::InvalidData(err.to_string()))?;
        Ok(settings)
    }

    fn save_settings(&self, settings: &ParentSettings, updated_at: Timestamp) -> RepoResult<()> {
        settings.validate()?;
        self.conn.execute(
            "INSERT INTO parent_settings (
                id,
                session_duration_minutes,
                reminder_minutes_before,
                updated_at
             ) VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                session_duration_minutes = excluded.session_duration_minutes,
                reminder_minutes_before = excluded.reminder_minutes_before,
                updated_at = excluded.updated_at;",
            params![
                settings.session_duration_minutes,
                settings.reminder_minutes_before,
                updated_at
            ],
        )?;
        Ok(())
    }
}

fn ensure_day_key(date: &DateString) -> RepoResult<()> {
    if date.is_unavailable() {
        return Err(RepoError::DateUnavailable);
    }
    Ok(())
}

fn collect_usage_rows(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<DailyUsage>> {
    let mut usage = Vec::new();
    while let Some(row) = rows.next()? {
        usage.push(parse_usage_row(row)?);
    }
    Ok(usage)
}

fn parse_usage_row(row: &Row<'_>) -> RepoResult<DailyUsage> {
    let raw_date: String = row.get(0)?;
    let date = DateString::parse(&raw_date)
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(DailyUsage {
        date,
        duration_ms: row.get(1)?,
    })
}

fn minutes_from_db(value: i64, column: &str) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("{column} out of range: {value}")))
}

#[cfg(test)]
mod tests {
    use super::{RepoError, SqliteUsageRepository, UsageRepository};
    use crate::db::open_db_in_memory;
    use crate::time::DateString;

    fn day(value: &str) -> DateString {
        DateString::parse(value).expect("valid day key")
    }

    #[test]
    fn add_usage_accumulates_per_day_and_in_total() {
        let conn = open_db_in_memory().expect("open db");
        let repo = SqliteUsageRepository::new(&conn);

        repo.add_usage(&day("2024-03-05"), 60_000, 1).expect("first add");
        repo.add_usage(&day("2024-03-05"), 30_000, 2).expect("second add");
        repo.add_usage(&day("2024-03-06"), 10_000, 3).expect("next day");

        assert_eq!(repo.usage_for_date(&day("2024-03-05")).expect("read"), 90_000);
        assert_eq!(repo.usage_for_date(&day("2024-03-07")).expect("read"), 0);
        assert_eq!(repo.total_play_ms().expect("total"), 100_000);
    }

    #[test]
    fn rejects_unavailable_day_and_negative_duration() {
        let conn = open_db_in_memory().expect("open db");
        let repo = SqliteUsageRepository::new(&conn);

        let err = repo
            .add_usage(&DateString::unavailable(), 1, 0)
            .expect_err("empty day must fail");
        assert!(matches!(err, RepoError::DateUnavailable));

        let err = repo
            .add_usage(&day("2024-03-05"), -1, 0)
            .expect_err("negative duration must fail");
        assert!(matches!(err, RepoError::InvalidDuration(-1)));
        assert_eq!(repo.total_play_ms().expect("total"), 0);
    }

    #[test]
    fn overflowing_add_is_rejected_and_leaves_rows_readable() {
        let conn = open_db_in_memory().expect("open db");
        let repo = SqliteUsageRepository::new(&conn);
        repo.add_usage(&day("2024-03-05"), i64::MAX, 1).expect("max fits");

        let err = repo
            .add_usage(&day("2024-03-05"), 1, 2)
            .expect_err("day overflow must fail");
        assert!(matches!(err, RepoError::UsageOverflow(1)));

        // A fresh day still overflows the lifetime total.
        let err = repo
            .add_usage(&day("2024-03-06"), 1, 3)
            .expect_err("total overflow must fail");
        assert!(matches!(err, RepoError::UsageOverflow(1)));

        assert_eq!(repo.usage_for_date(&day("2024-03-05")).expect("read"), i64::MAX);
        assert_eq!(repo.usage_for_date(&day("2024-03-06")).expect("read"), 0);
        assert_eq!(repo.total_play_ms().expect("total"), i64::MAX);
    }

    #[test]
    fn clear_usage_keeps_lifetime_total() {
        let conn = open_db_in_memory().expect("open db");
        let repo = SqliteUsageRepository::new(&conn);
        repo.add_usage(&day("2024-03-05"), 5_000, 0).expect("add");

        repo.clear_usage().expect("clear");
        assert!(repo.recent_usage(7).expect("recent").is_empty());
        assert_eq!(repo.total_play_ms().expect("total"), 5_000);
    }

    #[test]
    fn rejects_malformed_persisted_day() {
        let conn = open_db_in_memory().expect("open db");
        conn.execute(
            "INSERT INTO daily_usage (usage_date, duration_ms, updated_at)
             VALUES ('2024-13-01', 1, 0);",
            [],
        )
        .expect("raw insert");
        let repo = SqliteUsageRepository::new(&conn);

        let err = repo.recent_usage(7).expect_err("bad row must fail");
        assert!(matches!(err, RepoError::InvalidData(_)));
    }
}
