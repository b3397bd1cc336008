/// Day normalization and completion-date validation
///
/// Every date comparison in the engine goes through `normalize_to_day`:
/// instants are converted to UTC and truncated to a calendar day before
/// anything else looks at them. Raw timestamps are never compared.

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use thiserror::Error;

use crate::domain::{Day, DomainError};

/// Why a day cannot receive a completion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Cannot record a completion for {day}: it is after today ({today})")]
    FutureDate { day: Day, today: Day },

    #[error("Cannot record a completion for {day}: the habit starts on {start}")]
    BeforeHabitStart { day: Day, start: Day },
}

/// Truncate an instant to its UTC calendar day
pub fn normalize_to_day<Tz: TimeZone>(instant: &DateTime<Tz>) -> Day {
    instant.with_timezone(&Utc).date_naive()
}

/// Check that `day` may hold a completion for a habit starting on `habit_start`
///
/// Future days are checked first, so a habit that starts tomorrow reports
/// `FutureDate` for tomorrow rather than `BeforeHabitStart` for today.
pub fn validate_completion_date(day: Day, habit_start: Day, today: Day) -> Result<Day, DateError> {
    if day > today {
        return Err(DateError::FutureDate { day, today });
    }
    if day < habit_start {
        return Err(DateError::BeforeHabitStart {
            day,
            start: habit_start,
        });
    }
    Ok(day)
}

/// Years a stored day may fall in
///
/// Days are stored as `YYYY-MM-DD` text, which only sorts chronologically for
/// four-digit years.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1900..=9999;

/// Reject days outside `SUPPORTED_YEARS`
pub fn check_supported(day: Day) -> Result<Day, DomainError> {
    if SUPPORTED_YEARS.contains(&day.year()) {
        Ok(day)
    } else {
        Err(DomainError::InvalidDate(format!(
            "{} is outside the supported years {}..={}",
            day,
            SUPPORTED_YEARS.start(),
            SUPPORTED_YEARS.end()
        )))
    }
}

/// Parse a client-supplied day
///
/// Accepts either a bare `YYYY-MM-DD` date or an RFC 3339 instant, which is
/// normalized to its UTC day.
pub fn parse_day(input: &str) -> Result<Day, DomainError> {
    let trimmed = input.trim();
    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return check_supported(day);
    }
    let day = DateTime::parse_from_rfc3339(trimmed)
        .map(|instant| normalize_to_day(&instant))
        .map_err(|_| {
            DomainError::InvalidDate(format!(
                "'{}' is neither YYYY-MM-DD nor an RFC 3339 timestamp",
                input
            ))
        })?;
    check_supported(day)
}

/// Source of the current time
///
/// Injected into the engine so that streaks and validation never read the
/// system clock directly.
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Current UTC day
    fn today(&self) -> Day {
        normalize_to_day(&self.now())
    }
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a chosen instant, for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    unix_seconds: AtomicI64,
}

impl FixedClock {
    /// Pin the clock to an instant
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            unix_seconds: AtomicI64::new(instant.timestamp()),
        }
    }

    /// Pin the clock to noon UTC on `day`
    pub fn on(day: Day) -> Self {
        let noon = day.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc();
        Self::at(noon)
    }

    /// Move the clock forward (or backward, for negative values) by whole days
    pub fn advance_days(&self, days: i64) {
        self.unix_seconds
            .fetch_add(Duration::days(days).num_seconds(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let seconds = self.unix_seconds.load(Ordering::SeqCst);
        DateTime::from_timestamp(seconds, 0).unwrap_or_default()
    }
}

/// A shared clock, so a test can keep a handle to the clock it gave away
impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
