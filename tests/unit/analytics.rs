/// Statistics over in-memory histories
use chrono::{Duration, NaiveDate, Utc};
use habit_streak_engine::analytics::{perfect_weeks, windows, AnalyticsEngine, InsightKind};
use habit_streak_engine::*;

fn day(s: &str) -> Day {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn habit(start: Day, freq: u32, today: Day) -> Habit {
    Habit::new(UserId::new("u"), NewHabit::named("Stretch", freq).starting(start), today, Utc::now()).unwrap()
}

fn completions(habit: &Habit, days: impl IntoIterator<Item = Day>) -> Vec<HabitCompletion> {
    days.into_iter()
        .map(|d| HabitCompletion::completed_on(habit.id.clone(), d, 1, None, Utc::now()).unwrap())
        .collect()
}

#[test]
fn test_success_rate_stays_in_bounds() {
    let today = day("2024-06-30");
    let engine = AnalyticsEngine::new();

    for age in [0i64, 1, 3, 7, 30, 400] {
        for freq in [1u32, 3, 7, 21] {
            let start = today - Duration::days(age);
            let h = habit(start, freq, today);
            for done in [0i64, 1, age / 2, age] {
                let days = (0..done).map(|i| today - Duration::days(i));
                let stats = engine.habit_statistics(&h, &completions(&h, days), today);
                assert!(
                    (0.0..=100.0).contains(&stats.success_rate),
                    "age {} freq {} done {} -> {}",
                    age,
                    freq,
                    done,
                    stats.success_rate
                );
                assert!(!stats.success_rate.is_nan());
            }
        }
    }
}

#[test]
fn test_patterns_and_series() {
    let today = day("2024-03-20");
    let h = habit(day("2024-01-01"), 3, today);
    // Every Monday since the start, plus two Fridays
    let mut days: Vec<Day> = (0..12).map(|w| day("2024-01-01") + Duration::weeks(w)).collect();
    days.extend([day("2024-03-01"), day("2024-03-08")]);

    let stats = AnalyticsEngine::new().habit_statistics(&h, &completions(&h, days), today);

    assert_eq!(stats.best_weekday.as_ref().unwrap().weekday, "Monday");
    assert_eq!(stats.best_weekday.as_ref().unwrap().completions, 12);
    assert_eq!(stats.best_month.as_ref().unwrap().month, "January");
    assert_eq!(stats.weekly_series.len(), 12);
    assert_eq!(stats.monthly_series.len(), 6);
    assert_eq!(stats.monthly_series.last().unwrap().label, "2024-03");
    assert_eq!(stats.total_completions, 14);
    let series_total: usize = stats.monthly_series.iter().map(|p| p.completions).sum();
    assert_eq!(series_total, 14);
}

#[test]
fn test_completions_outside_history_window_ignored() {
    let today = day("2024-01-10");
    let h = habit(day("2024-01-05"), 7, today);
    // A stray record before the start and one after today
    let stats = AnalyticsEngine::new().habit_statistics(
        &h,
        &completions(&h, [day("2024-01-01"), day("2024-01-06"), day("2024-01-20")]),
        today,
    );

    assert_eq!(stats.total_completions, 1);
}

#[test]
fn test_weekly_target_insight() {
    let today = day("2024-01-10"); // Wednesday
    let h = habit(day("2024-01-01"), 2, today);
    let stats = AnalyticsEngine::new().habit_statistics(&h, &completions(&h, [day("2024-01-08"), day("2024-01-09")]), today);

    let weekly = stats
        .insights
        .iter()
        .find(|i| i.kind == InsightKind::WeeklyTarget)
        .unwrap();
    assert!(weekly.message.contains("met"));
    assert_eq!(stats.completions_this_week, 2);
}

#[test]
fn test_perfect_weeks_over_last_eight() {
    let today = day("2024-03-03"); // Sunday
    let h = habit(day("2023-01-01"), 1, today);
    // One completion in each of the last 8 weeks, and one long before
    let days: Vec<Day> = (0..8)
        .map(|w| today - Duration::weeks(w))
        .chain([day("2023-06-01")])
        .collect();
    let index = CompletionIndex::from_days(days);

    assert_eq!(perfect_weeks(&[(&h, index)], today, 8), 8);
}

#[test]
fn test_windows_include_current_period() {
    let today = day("2024-03-20");
    let weeks = windows::last_weeks(today, 8);
    assert!(weeks.last().unwrap().contains(today));
    let months = windows::last_months(today, 6);
    assert!(months.last().unwrap().contains(today));
    assert_eq!(months.first().unwrap().start, day("2023-10-01"));
}
