/// Streak calculation properties
use chrono::{Duration, NaiveDate, Utc};
use habit_streak_engine::*;

fn day(s: &str) -> Day {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_run_of_k_days_gives_streak_k() {
    let start = day("2023-01-01");
    let end = day("2024-06-15");

    for k in 1..=40 {
        let days = (0..k).map(|i| end - Duration::days(i));
        let index = CompletionIndex::from_days(days);
        // Nothing recorded at end - k
        assert_eq!(streak_ending_at(&index, end, start), k as u32, "k = {}", k);
    }
}

#[test]
fn test_incomplete_record_breaks_like_missing_one() {
    let habit_id = HabitId::new();
    let now = Utc::now();
    let mut records: Vec<HabitCompletion> = ["2024-01-01", "2024-01-02", "2024-01-03"]
        .iter()
        .map(|d| HabitCompletion::completed_on(habit_id.clone(), day(d), 1, None, now).unwrap())
        .collect();
    records[1].mark_incomplete(now);

    let index = CompletionIndex::from_records(&records);
    assert_eq!(streak_ending_at(&index, day("2024-01-03"), day("2024-01-01")), 1);
    assert_eq!(index.days().count(), 2);
}

#[test]
fn test_scan_never_passes_habit_start() {
    let index = CompletionIndex::from_days([day("2024-01-01"), day("2024-01-02"), day("2024-01-03")]);
    assert_eq!(streak_ending_at(&index, day("2024-01-03"), day("2024-01-02")), 2);
}

#[test]
fn test_current_streak_reference_clamped_to_today() {
    let index = CompletionIndex::from_days([day("2024-01-08"), day("2024-01-09")]);
    let today = day("2024-01-09");

    assert_eq!(current_streak(&index, day("2024-02-01"), today, day("2024-01-01")), 2);
    // A past uncompleted reference day has no grace
    assert_eq!(current_streak(&index, day("2024-01-07"), today, day("2024-01-01")), 0);
}

#[test]
fn test_grace_for_unfinished_today() {
    let index = CompletionIndex::from_days([day("2024-01-08"), day("2024-01-09")]);
    assert_eq!(current_streak(&index, day("2024-01-10"), day("2024-01-10"), day("2024-01-01")), 2);
}

#[test]
fn test_streak_messages_scale() {
    assert!(streak_message(0).starts_with("Ready"));
    assert!(streak_message(7).contains("7 days"));
    assert!(streak_message(365).starts_with("Legendary"));
}
