/// Weekday and month-of-year patterns
///
/// The pattern is the mode of the completed days. Ties go to the earlier
/// bucket in canonical order (Monday..Sunday, January..December).

use chrono::{Datelike, Weekday};
use serde::Serialize;

use crate::domain::Day;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayPattern {
    pub weekday: String,
    pub completions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthPattern {
    pub month: String,
    pub completions: usize,
}

/// Completions per weekday, Monday first
fn weekday_counts<I: IntoIterator<Item = Day>>(days: I) -> [usize; 7] {
    let mut counts = [0; 7];
    for day in days {
        counts[day.weekday().num_days_from_monday() as usize] += 1;
    }
    counts
}

/// Completions per month, January first
fn month_counts<I: IntoIterator<Item = Day>>(days: I) -> [usize; 12] {
    let mut counts = [0; 12];
    for day in days {
        counts[day.month0() as usize] += 1;
    }
    counts
}

/// Most frequent weekday, or `None` when there is nothing to rank
pub fn best_weekday<I: IntoIterator<Item = Day>>(days: I) -> Option<WeekdayPattern> {
    let counts = weekday_counts(days);
    let index = mode_index(&counts)?;
    Some(WeekdayPattern {
        weekday: weekday_name(WEEKDAYS[index]).to_string(),
        completions: counts[index],
    })
}

/// Most frequent month of the year, or `None` when there is nothing to rank
pub fn best_month<I: IntoIterator<Item = Day>>(days: I) -> Option<MonthPattern> {
    let counts = month_counts(days);
    let index = mode_index(&counts)?;
    Some(MonthPattern {
        month: MONTHS[index].to_string(),
        completions: counts[index],
    })
}

/// First index holding the maximum count; `None` when all counts are zero
fn mode_index(counts: &[usize]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        match best {
            Some(current) if counts[current] >= count => {}
            _ => best = Some(index),
        }
    }
    best
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
