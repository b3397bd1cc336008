/// Toggling a habit's completion for one day
///
/// Per (habit, day) the record moves between three states:
///
/// | current              | next                 | streak snapshot                 |
/// |----------------------|----------------------|---------------------------------|
/// | `NoRecord`           | `RecordedComplete`   | streak ending the day before + 1 |
/// | `RecordedIncomplete` | `RecordedComplete`   | recomputed the same way          |
/// | `RecordedComplete`   | `RecordedIncomplete` | 0                                |
///
/// Invalid days are rejected before anything is written. Other days' cached
/// snapshots are left alone; they are refreshed when those days are toggled.

use serde::Serialize;
use tracing::{info, warn};

use crate::commands::completions::stored_streak_ending_at;
use crate::commands::owned_active_habit;
use crate::domain::{
    streak_message, validate_completion_date, Clock, CompletionState, Day, Habit, HabitCompletion, HabitId, UserId,
};
use crate::storage::{HabitStore, StorageError, Transactional};
use crate::EngineError;

/// Result of a successful toggle
#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
    pub habit_id: HabitId,
    pub day: Day,
    pub previous: CompletionState,
    pub state: CompletionState,
    /// Snapshot stored on the record (0 when now incomplete)
    pub streak_count: u32,
    pub message: String,
}

impl ToggleOutcome {
    pub fn completed(&self) -> bool {
        self.state.is_complete()
    }
}

/// Flip the completion state of `habit_id` on `day`
///
/// The whole read-compute-write sequence runs in one write transaction, and
/// record updates are additionally guarded by the record version. A lost
/// race surfaces as `EngineError::Conflict`; callers may retry the whole
/// operation.
pub fn toggle_completion<S: Transactional>(
    store: &S,
    clock: &dyn Clock,
    habit_id: &HabitId,
    day: Day,
    user_id: &UserId,
    note: Option<String>,
) -> Result<ToggleOutcome, EngineError> {
    let today = clock.today();
    let now = clock.now();

    store.atomically(|tx| -> Result<ToggleOutcome, EngineError> {
        let habit = owned_active_habit(tx, habit_id, user_id)?;

        if let Err(e) = validate_completion_date(day, habit.start_date(), today) {
            warn!("Rejected toggle for habit {}: {}", habit.id, e);
            return Err(e.into());
        }

        let existing = tx.get_completion(&habit.id, day)?;
        let previous = CompletionState::of(existing.as_ref());

        let record = match existing {
            None => {
                let streak = streak_through(tx, &habit, day)?;
                let record = HabitCompletion::completed_on(habit.id.clone(), day, streak, note, now)?;
                tx.insert_completion(&record)?;
                record
            }
            Some(mut record) if record.completed => {
                let expected = record.version;
                record.mark_incomplete(now);
                record.version = expected + 1;
                tx.update_completion(&record, expected)?;
                record
            }
            Some(mut record) => {
                let streak = streak_through(tx, &habit, day)?;
                let expected = record.version;
                record.mark_complete(streak, note, now)?;
                record.version = expected + 1;
                tx.update_completion(&record, expected)?;
                record
            }
        };

        let state = record.state();
        info!(
            "Toggled habit {} on {}: {:?} -> {:?} (streak {})",
            habit.id, day, previous, state, record.streak_count
        );

        let message = if state.is_complete() {
            format!("🔥 Marked '{}' done for {}. {}", habit.name, day, streak_message(record.streak_count))
        } else {
            format!("↩️ Marked '{}' not done for {}.", habit.name, day)
        };

        Ok(ToggleOutcome {
            habit_id: habit.id,
            day,
            previous,
            state,
            streak_count: record.streak_count,
            message,
        })
    })
}

/// Streak value for `day` once it is completed: the run ending the day
/// before, plus the day itself
fn streak_through(store: &dyn HabitStore, habit: &Habit, day: Day) -> Result<u32, StorageError> {
    let before = match day.pred_opt() {
        Some(yesterday) if yesterday >= habit.start_date() => stored_streak_ending_at(store, habit, yesterday)?,
        _ => 0,
    };
    Ok(before + 1)
}
