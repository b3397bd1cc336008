/// Mutating and lookup operations on habits and completions
///
/// Each command takes the store it works on plus whatever collaborators it
/// needs (clock, limit gate). Ownership is always checked first so that
/// another user's habit is indistinguishable from a missing one.

pub mod completions;
pub mod favorites;
pub mod habits;
pub mod toggle;

pub use completions::*;
pub use favorites::*;
pub use habits::*;
pub use toggle::*;

use crate::domain::{Habit, HabitId, UserId};
use crate::storage::{HabitStore, StorageError};
use crate::EngineError;

/// Load a habit the caller owns
///
/// Missing and foreign habits both surface as `NotFound`.
pub(crate) fn owned_habit(
    store: &dyn HabitStore,
    habit_id: &HabitId,
    user_id: &UserId,
) -> Result<Habit, EngineError> {
    match store.get_habit(habit_id) {
        Ok(habit) if habit.is_owned_by(user_id) => Ok(habit),
        Ok(_) | Err(StorageError::HabitNotFound { .. }) => {
            tracing::warn!("Habit {} not found for user {}", habit_id, user_id);
            Err(EngineError::NotFound {
                habit_id: habit_id.to_string(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Load a habit the caller owns and that still accepts changes
pub(crate) fn owned_active_habit(
    store: &dyn HabitStore,
    habit_id: &HabitId,
    user_id: &UserId,
) -> Result<Habit, EngineError> {
    let habit = owned_habit(store, habit_id, user_id)?;
    if !habit.is_active() {
        return Err(EngineError::HabitArchived {
            habit_id: habit_id.to_string(),
        });
    }
    Ok(habit)
}
