/// Streak calculation
///
/// A streak is the number of consecutive completed days ending at a given day.
/// Calculation is a greedy backward scan from the anchor day, so its cost is
/// proportional to the streak length, not to the size of the history.

use std::collections::HashSet;

use crate::domain::{Day, HabitCompletion};

/// The completed days of one habit, indexed for day lookups
///
/// Records with `completed = false` are left out: an explicit incomplete
/// record breaks a streak exactly like a missing one.
#[derive(Debug, Clone, Default)]
pub struct CompletionIndex {
    completed: HashSet<Day>,
}

impl CompletionIndex {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a HabitCompletion>,
    {
        Self {
            completed: records
                .into_iter()
                .filter(|r| r.completed)
                .map(|r| r.completion_date)
                .collect(),
        }
    }

    pub fn from_days<I: IntoIterator<Item = Day>>(days: I) -> Self {
        Self {
            completed: days.into_iter().collect(),
        }
    }

    pub fn is_completed(&self, day: Day) -> bool {
        self.completed.contains(&day)
    }

    /// Completed days in no particular order
    pub fn days(&self) -> impl Iterator<Item = Day> + '_ {
        self.completed.iter().copied()
    }
}

/// Count consecutive completed days ending exactly at `end`
///
/// Returns 0 when `end` itself is not completed. Days before `habit_start`
/// are never counted.
pub fn streak_ending_at(index: &CompletionIndex, end: Day, habit_start: Day) -> u32 {
    let mut count = 0;
    let mut day = end;

    while day >= habit_start && index.is_completed(day) {
        count += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }

    count
}

/// Current streak as of `reference`, never looking past `today`
///
/// If the anchor is today and today has not been completed yet, the streak
/// that ended yesterday is still reported as current.
pub fn current_streak(index: &CompletionIndex, reference: Day, today: Day, habit_start: Day) -> u32 {
    let anchor = reference.min(today);

    if anchor == today && !index.is_completed(anchor) {
        return match anchor.pred_opt() {
            Some(yesterday) => streak_ending_at(index, yesterday, habit_start),
            None => 0,
        };
    }

    streak_ending_at(index, anchor, habit_start)
}

/// Highest streak snapshot stored on any record
pub fn longest_recorded_streak<'a, I>(records: I) -> u32
where
    I: IntoIterator<Item = &'a HabitCompletion>,
{
    records
        .into_iter()
        .map(|r| r.streak_count)
        .max()
        .unwrap_or(0)
}

/// Get a motivational message based on a streak length
pub fn streak_message(streak: u32) -> String {
    match streak {
        0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
        1 => "Great start! One day down, keep the momentum going.".to_string(),
        2..=6 => format!("Nice work! {} days in a row. You're building a strong habit.", streak),
        7..=13 => format!("Excellent! {} days strong. You're in the groove now!", streak),
        14..=29 => format!("Amazing! {} days straight. This is becoming second nature.", streak),
        30..=99 => format!("Incredible! {} days of consistency. You're a habit master!", streak),
        _ => format!("Legendary! {} days of unwavering commitment. You're an inspiration!", streak),
    }
}
