/// Calendar windows used by the time series
///
/// Windows are generated from calendar boundaries walking backward from
/// today, so every window exists even when nothing was completed in it.
/// Weeks start on Monday.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::domain::Day;

/// An inclusive range of days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: Day,
    pub end: Day,
}

impl Window {
    pub fn contains(&self, day: Day) -> bool {
        self.start <= day && day <= self.end
    }

    /// Number of days in `days` that fall inside the window
    pub fn count_in<I: IntoIterator<Item = Day>>(&self, days: I) -> usize {
        days.into_iter().filter(|d| self.contains(*d)).count()
    }
}

/// One window of a series with its completion count
#[derive(Debug, Clone, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub start: Day,
    pub end: Day,
    pub completions: usize,
}

/// Monday of the week containing `day`
pub fn week_start(day: Day) -> Day {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// The week containing `day`
pub fn week_of(day: Day) -> Window {
    let start = week_start(day);
    Window {
        start,
        end: start + Duration::days(6),
    }
}

/// The last `count` weeks, current week included, oldest first
pub fn last_weeks(today: Day, count: usize) -> Vec<Window> {
    let current = week_start(today);
    (0..count as i64)
        .rev()
        .map(|back| {
            let start = current - Duration::weeks(back);
            Window {
                start,
                end: start + Duration::days(6),
            }
        })
        .collect()
}

/// The last `count` calendar months, current month included, oldest first
pub fn last_months(today: Day, count: usize) -> Vec<Window> {
    let mut windows = Vec::with_capacity(count);
    let mut year = today.year();
    let mut month = today.month();

    for _ in 0..count {
        if let Some(window) = month_window(year, month) {
            windows.push(window);
        }
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }

    windows.reverse();
    windows
}

fn month_window(year: i32, month: u32) -> Option<Window> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(Window {
        start,
        end: next.pred_opt()?,
    })
}

/// Completion counts per week, labelled by the ISO week
pub fn weekly_series<I>(days: I, today: Day, weeks: usize) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = Day> + Clone,
{
    last_weeks(today, weeks)
        .into_iter()
        .map(|w| {
            let iso = w.start.iso_week();
            SeriesPoint {
                label: format!("{}-W{:02}", iso.year(), iso.week()),
                start: w.start,
                end: w.end,
                completions: w.count_in(days.clone()),
            }
        })
        .collect()
}

/// Completion counts per calendar month, labelled `YYYY-MM`
pub fn monthly_series<I>(days: I, today: Day, months: usize) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = Day> + Clone,
{
    last_months(today, months)
        .into_iter()
        .map(|w| SeriesPoint {
            label: w.start.format("%Y-%m").to_string(),
            start: w.start,
            end: w.end,
            completions: w.count_in(days.clone()),
        })
        .collect()
}
