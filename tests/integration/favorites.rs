/// Favorites ordering through the engine
use habit_streak_engine::*;

use crate::common::{engine_on, habit_starting};

fn favorite_slots(engine: &HabitEngine, user: &UserId) -> Vec<(String, u32)> {
    engine
        .list_habits(user, false)
        .unwrap()
        .into_iter()
        .filter(|h| h.is_favorite)
        .map(|h| (h.name, h.favorite_order))
        .collect()
}

fn assert_dense(engine: &HabitEngine, user: &UserId) {
    let mut orders: Vec<u32> = favorite_slots(engine, user).into_iter().map(|(_, o)| o).collect();
    orders.sort();
    let expected: Vec<u32> = (1..=orders.len() as u32).collect();
    assert_eq!(orders, expected);
}

#[test]
fn test_reorder_last_to_front() {
    let (engine, _clock) = engine_on("2024-01-10");
    let user = UserId::new("alice");
    let habits: Vec<Habit> = ["A", "B", "C"]
        .iter()
        .map(|name| habit_starting(&engine, &user, name, 7, "2024-01-01"))
        .collect();
    for habit in &habits {
        engine.toggle_favorite(&habit.id, &user).unwrap();
    }

    engine.reorder_favorite(&habits[2].id, &user, 0).unwrap();

    assert_eq!(
        favorite_slots(&engine, &user),
        vec![("C".to_string(), 1), ("A".to_string(), 2), ("B".to_string(), 3)]
    );
}

#[test]
fn test_mixed_sequence_stays_dense() {
    let (engine, _clock) = engine_on("2024-01-10");
    let user = UserId::new("alice");
    let habits: Vec<Habit> = (0..6)
        .map(|i| habit_starting(&engine, &user, &format!("H{}", i), 7, "2024-01-01"))
        .collect();

    // (habit index, reorder target or None for a toggle)
    let steps: [(usize, Option<i64>); 14] = [
        (0, None),
        (1, None),
        (2, None),
        (3, None),
        (1, None),
        (3, Some(0)),
        (4, None),
        (0, Some(10)),
        (2, None),
        (5, None),
        (5, Some(1)),
        (1, None),
        (4, Some(-3)),
        (3, None),
    ];

    for (index, target) in steps {
        let habit = &habits[index];
        match target {
            None => {
                engine.toggle_favorite(&habit.id, &user).unwrap();
            }
            Some(position) => {
                engine.reorder_favorite(&habit.id, &user, position).unwrap();
            }
        }
        assert_dense(&engine, &user);
    }
}

#[test]
fn test_archiving_a_favorite_closes_the_gap() {
    let (engine, _clock) = engine_on("2024-01-10");
    let user = UserId::new("alice");
    let a = habit_starting(&engine, &user, "A", 7, "2024-01-01");
    let b = habit_starting(&engine, &user, "B", 7, "2024-01-01");
    let c = habit_starting(&engine, &user, "C", 7, "2024-01-01");
    for habit in [&a, &b, &c] {
        engine.toggle_favorite(&habit.id, &user).unwrap();
    }

    engine.archive_habit(&b.id, &user).unwrap();
    assert_eq!(
        favorite_slots(&engine, &user),
        vec![("A".to_string(), 1), ("C".to_string(), 2)]
    );

    // Restored habits come back without a favorite slot
    let restored = engine.restore_habit(&b.id, &user).unwrap();
    assert!(!restored.is_favorite);
    assert_dense(&engine, &user);
}

#[test]
fn test_favorites_listed_first() {
    let (engine, _clock) = engine_on("2024-01-10");
    let user = UserId::new("alice");
    let first = habit_starting(&engine, &user, "First", 7, "2024-01-01");
    let second = habit_starting(&engine, &user, "Second", 7, "2024-01-01");
    engine.toggle_favorite(&second.id, &user).unwrap();

    let names: Vec<String> = engine.list_habits(&user, false).unwrap().into_iter().map(|h| h.name).collect();
    assert_eq!(names, vec!["Second".to_string(), "First".to_string()]);
    assert!(engine.get_habit(&first.id, &user).is_ok());
}

#[test]
fn test_reorder_of_non_favorite_refused() {
    let (engine, _clock) = engine_on("2024-01-10");
    let user = UserId::new("alice");
    let habit = habit_starting(&engine, &user, "A", 7, "2024-01-01");

    let error = engine.reorder_favorite(&habit.id, &user, 0).unwrap_err();
    assert_eq!(error.kind(), "not_favorited");
}
