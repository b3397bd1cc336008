/// Shared fixtures for the integration tests
use std::sync::Arc;

use chrono::NaiveDate;
use habit_streak_engine::*;

pub fn day(s: &str) -> Day {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// An in-memory engine whose clock the test can move
pub fn engine_on(today: &str) -> (HabitEngine, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::on(day(today)));
    let store = SqliteStore::open_in_memory().expect("Failed to open in-memory store");
    let engine = HabitEngine::new(store, Box::new(clock.clone()), Box::new(Unlimited));
    (engine, clock)
}

pub fn habit_starting(engine: &HabitEngine, user: &UserId, name: &str, freq: u32, start: &str) -> Habit {
    engine
        .create_habit(user, NewHabit::named(name, freq).starting(day(start)))
        .expect("Failed to create habit")
}
