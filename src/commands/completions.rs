/// Reading completion history and streaks from the store
///
/// Streak lookups page backward through the history in fixed windows, so a
/// short streak on a habit with years of history only touches the last few
/// weeks of records.

use chrono::Duration;

use crate::commands::owned_habit;
use crate::domain::{streak_ending_at, Clock, CompletionIndex, Day, Habit, HabitCompletion, HabitId, UserId};
use crate::storage::{HabitStore, StorageError};
use crate::EngineError;

/// Days fetched per backward page when scanning a streak
const STREAK_PAGE_DAYS: i64 = 32;

/// Completion records of a habit in ascending day order
///
/// Bounds are inclusive. Archived habits stay readable. An inverted range
/// yields no records.
pub fn get_completions(
    store: &dyn HabitStore,
    habit_id: &HabitId,
    user_id: &UserId,
    from: Option<Day>,
    to: Option<Day>,
) -> Result<Vec<HabitCompletion>, EngineError> {
    let habit = owned_habit(store, habit_id, user_id)?;

    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Ok(Vec::new());
        }
    }

    Ok(store.list_completions(&habit.id, from, to)?)
}

/// Current streak of a habit as of the clock's today
///
/// An uncompleted today does not break the streak; it ends yesterday instead.
pub fn get_current_streak(
    store: &dyn HabitStore,
    clock: &dyn Clock,
    habit_id: &HabitId,
    user_id: &UserId,
) -> Result<u32, EngineError> {
    let habit = owned_habit(store, habit_id, user_id)?;
    let today = clock.today();

    let today_done = store
        .get_completion(&habit.id, today)?
        .is_some_and(|record| record.completed);

    let anchor = if today_done { Some(today) } else { today.pred_opt() };
    match anchor {
        Some(day) => Ok(stored_streak_ending_at(store, &habit, day)?),
        None => Ok(0),
    }
}

/// Consecutive completed days ending exactly at `end`, read page by page
pub(crate) fn stored_streak_ending_at(
    store: &dyn HabitStore,
    habit: &Habit,
    end: Day,
) -> Result<u32, StorageError> {
    let start = habit.start_date();
    let mut count = 0;
    let mut window_end = end;

    while window_end >= start {
        let window_start = window_end
            .checked_sub_signed(Duration::days(STREAK_PAGE_DAYS - 1))
            .map_or(start, |day| day.max(start));
        let records = store.list_completions(&habit.id, Some(window_start), Some(window_end))?;
        let index = CompletionIndex::from_records(&records);

        let run = streak_ending_at(&index, window_end, window_start);
        count += run;

        // The run stopped inside this page, so the streak is complete
        let window_len = (window_end - window_start).num_days() + 1;
        if i64::from(run) < window_len {
            break;
        }
        match window_start.pred_opt() {
            Some(previous) => window_end = previous,
            None => break,
        }
    }

    Ok(count)
}
