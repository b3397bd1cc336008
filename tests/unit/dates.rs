/// Date validation and clocks
use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use habit_streak_engine::*;

fn day(s: &str) -> Day {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_tomorrow_always_future() {
    let today = day("2024-05-31");
    let tomorrow = day("2024-06-01");

    // Even for a habit that only starts tomorrow
    for start in [day("2020-01-01"), today, tomorrow] {
        assert!(matches!(
            validate_completion_date(tomorrow, start, today),
            Err(DateError::FutureDate { .. })
        ));
    }
}

#[test]
fn test_start_boundary() {
    let start = day("2024-01-01");
    let today = day("2024-01-10");

    assert!(matches!(
        validate_completion_date(day("2023-12-31"), start, today),
        Err(DateError::BeforeHabitStart { .. })
    ));
    assert_eq!(validate_completion_date(start, start, today), Ok(start));
}

#[test]
fn test_late_evening_instant_lands_on_utc_day() {
    let instant = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap();
    assert_eq!(normalize_to_day(&instant), day("2024-03-10"));
    assert_eq!(parse_day("2024-03-10T23:59:59+00:00").unwrap(), day("2024-03-10"));
}

#[test]
fn test_shared_clock_follows_advances() {
    let clock = Arc::new(FixedClock::on(day("2024-12-31")));
    let shared: Box<dyn Clock> = Box::new(clock.clone());

    clock.advance_days(1);
    assert_eq!(shared.today(), day("2025-01-01"));
}

#[test]
fn test_system_clock_is_utc_today() {
    let today = SystemClock.today();
    let expected = Utc::now().date_naive();
    // Allow for a midnight rollover between the two reads
    assert!(today == expected || today.succ_opt() == Some(expected));
}
