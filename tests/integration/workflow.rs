/// Toggle, streak and statistics workflows through the engine
use habit_streak_engine::*;

use crate::common::{day, engine_on, habit_starting};

#[test]
fn test_three_day_streak_then_break() {
    let (engine, _clock) = engine_on("2024-01-03");
    let user = UserId::new("alice");
    let habit = habit_starting(&engine, &user, "Meditate", 3, "2024-01-01");

    for d in ["2024-01-01", "2024-01-02", "2024-01-03"] {
        assert!(engine.toggle_completion(&habit.id, day(d), &user).unwrap().completed());
    }
    assert_eq!(engine.get_current_streak(&habit.id, &user).unwrap(), 3);

    let outcome = engine.toggle_completion(&habit.id, day("2024-01-02"), &user).unwrap();
    assert!(!outcome.completed());
    assert_eq!(engine.get_current_streak(&habit.id, &user).unwrap(), 1);
}

#[test]
fn test_double_toggle_is_identity() {
    let (engine, _clock) = engine_on("2024-01-20");
    let user = UserId::new("alice");
    let habit = habit_starting(&engine, &user, "Read", 7, "2024-01-01");
    for d in ["2024-01-10", "2024-01-11", "2024-01-12"] {
        engine.toggle_completion(&habit.id, day(d), &user).unwrap();
    }

    for d in ["2024-01-09", "2024-01-11", "2024-01-13"] {
        let before = engine.get_completions(&habit.id, &user, Some(day(d)), Some(day(d))).unwrap();
        engine.toggle_completion(&habit.id, day(d), &user).unwrap();
        engine.toggle_completion(&habit.id, day(d), &user).unwrap();
        let after = engine.get_completions(&habit.id, &user, Some(day(d)), Some(day(d))).unwrap();

        match state(&before) {
            Some(previous) => assert_eq!(state(&after), Some(previous)),
            // No record before: two toggles leave an incomplete record behind
            None => assert_eq!(state(&after), Some((false, 0))),
        }
    }
}

fn state(records: &[HabitCompletion]) -> Option<(bool, u32)> {
    records.first().map(|r| (r.completed, r.streak_count))
}

#[test]
fn test_future_and_pre_start_days_rejected() {
    let (engine, clock) = engine_on("2024-02-01");
    let user = UserId::new("alice");
    let habit = habit_starting(&engine, &user, "Run", 3, "2024-01-15");

    let tomorrow = clock.today().succ_opt().unwrap();
    let future = engine.toggle_completion(&habit.id, tomorrow, &user).unwrap_err();
    assert_eq!(future.kind(), "future_date");
    assert!(future.is_validation());

    let early = engine.toggle_completion(&habit.id, day("2024-01-14"), &user).unwrap_err();
    assert_eq!(early.kind(), "before_habit_start");

    assert!(engine.toggle_completion(&habit.id, day("2024-01-15"), &user).is_ok());
    assert_eq!(engine.get_completions(&habit.id, &user, None, None).unwrap().len(), 1);

    // Once the clock moves on, yesterday's future day becomes valid
    clock.advance_days(1);
    assert!(engine.toggle_completion(&habit.id, tomorrow, &user).is_ok());
}

#[test]
fn test_recompletion_recomputes_from_history() {
    let (engine, _clock) = engine_on("2024-01-10");
    let user = UserId::new("alice");
    let habit = habit_starting(&engine, &user, "Write", 7, "2024-01-01");

    // Complete 01-05 alone, then back-fill 01-03 and 01-04
    engine.toggle_completion(&habit.id, day("2024-01-05"), &user).unwrap();
    engine.toggle_completion(&habit.id, day("2024-01-03"), &user).unwrap();
    engine.toggle_completion(&habit.id, day("2024-01-04"), &user).unwrap();

    // The 01-05 snapshot is stale until that day is toggled again
    let stale = engine.get_completions(&habit.id, &user, Some(day("2024-01-05")), None).unwrap();
    assert_eq!(stale[0].streak_count, 1);

    engine.toggle_completion(&habit.id, day("2024-01-05"), &user).unwrap();
    let outcome = engine.toggle_completion(&habit.id, day("2024-01-05"), &user).unwrap();
    assert_eq!(outcome.streak_count, 3);
}

#[test]
fn test_completions_are_ordered_and_scoped() {
    let (engine, _clock) = engine_on("2024-01-10");
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");
    let habit = habit_starting(&engine, &alice, "Walk", 7, "2024-01-01");

    for d in ["2024-01-07", "2024-01-02", "2024-01-05"] {
        engine.toggle_completion(&habit.id, day(d), &alice).unwrap();
    }

    let days: Vec<Day> = engine
        .get_completions(&habit.id, &alice, None, None)
        .unwrap()
        .iter()
        .map(|r| r.completion_date)
        .collect();
    assert_eq!(days, vec![day("2024-01-02"), day("2024-01-05"), day("2024-01-07")]);

    let bounded = engine
        .get_completions(&habit.id, &alice, Some(day("2024-01-03")), Some(day("2024-01-06")))
        .unwrap();
    assert_eq!(bounded.len(), 1);

    for result in [
        engine.get_completions(&habit.id, &bob, None, None).map(|_| ()),
        engine.get_current_streak(&habit.id, &bob).map(|_| ()),
        engine.toggle_completion(&habit.id, day("2024-01-08"), &bob).map(|_| ()),
        engine.get_habit_statistics(&habit.id, &bob).map(|_| ()),
    ] {
        assert_eq!(result.unwrap_err().kind(), "not_found");
    }
}

#[test]
fn test_archived_habit_keeps_history() {
    let (engine, _clock) = engine_on("2024-01-10");
    let user = UserId::new("alice");
    let habit = habit_starting(&engine, &user, "Floss", 7, "2024-01-01");
    engine.toggle_completion(&habit.id, day("2024-01-09"), &user).unwrap();

    engine.archive_habit(&habit.id, &user).unwrap();
    assert_eq!(engine.toggle_completion(&habit.id, day("2024-01-10"), &user).unwrap_err().kind(), "habit_archived");
    assert_eq!(engine.get_completions(&habit.id, &user, None, None).unwrap().len(), 1);

    let stats = engine.get_user_statistics(&user).unwrap();
    assert_eq!(stats.active_habits, 0);
    assert_eq!(stats.archived_habits, 1);
    assert_eq!(stats.total_completions, 1);

    engine.restore_habit(&habit.id, &user).unwrap();
    assert!(engine.toggle_completion(&habit.id, day("2024-01-10"), &user).is_ok());
}

#[test]
fn test_habit_statistics_end_to_end() {
    let (engine, _clock) = engine_on("2024-01-15");
    let user = UserId::new("alice");
    let habit = habit_starting(&engine, &user, "Gym", 3, "2024-01-01");

    for d in ["2024-01-01", "2024-01-03", "2024-01-05", "2024-01-08", "2024-01-10", "2024-01-12", "2024-01-15"] {
        engine.toggle_completion(&habit.id, day(d), &user).unwrap();
    }

    let stats = engine.get_habit_statistics(&habit.id, &user).unwrap();
    assert_eq!(stats.total_completions, 7);
    // 14 days at 3 per week: 6 expected
    assert_eq!(stats.success_rate, 100.0);
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.longest_streak, 1);
    assert_eq!(stats.completions_this_week, 1);
    assert_eq!(stats.best_weekday.unwrap().weekday, "Monday");

    let overall = engine.get_user_statistics(&user).unwrap();
    assert_eq!(overall.active_habits, 1);
    assert_eq!(overall.completions_today, 1);
    // Weeks of 01-01 and 01-08 each had three completions
    assert_eq!(overall.perfect_weeks, 2);
}

#[test]
fn test_limit_gate_only_blocks_creation() {
    let store = SqliteStore::open_in_memory().unwrap();
    let engine = HabitEngine::new(
        store,
        Box::new(FixedClock::on(day("2024-01-10"))),
        Box::new(HabitCap::new(1)),
    );
    let user = UserId::new("alice");
    let habit = habit_starting(&engine, &user, "Read", 7, "2024-01-01");

    let refused = engine.create_habit(&user, NewHabit::named("Run", 3)).unwrap_err();
    assert_eq!(refused.kind(), "limit_reached");

    assert!(engine.toggle_completion(&habit.id, day("2024-01-10"), &user).is_ok());
    assert!(engine.toggle_favorite(&habit.id, &user).is_ok());
}
