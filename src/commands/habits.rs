/// Habit lifecycle: create, update, archive, restore and lookups
///
/// Creation is the only operation the limit gate can refuse. Archiving is a
/// soft delete; completion history is kept and stays readable.

use tracing::{info, warn};

use crate::commands::favorites::{favorites_of, renumber};
use crate::commands::owned_habit;
use crate::domain::{Clock, Habit, HabitId, HabitUpdate, NewHabit, UserId};
use crate::gate::LimitGate;
use crate::storage::{HabitStore, Transactional};
use crate::EngineError;

/// Create a habit for `user_id` if the limit gate allows one more
///
/// The active-habit count and the insert happen in one transaction, so two
/// concurrent creations cannot both slip under a cap.
pub fn create_habit<S: Transactional>(
    store: &S,
    clock: &dyn Clock,
    gate: &dyn LimitGate,
    user_id: &UserId,
    new_habit: NewHabit,
) -> Result<Habit, EngineError> {
    let habit = Habit::new(user_id.clone(), new_habit, clock.today(), clock.now())?;

    store.atomically(|tx| -> Result<Habit, EngineError> {
        let active = tx.list_habits(user_id, false)?.len();
        if !gate.can_create_habit(user_id, active) {
            warn!("Habit limit reached for user {} ({} active)", user_id, active);
            return Err(EngineError::LimitReached {
                user_id: user_id.to_string(),
            });
        }

        tx.create_habit(&habit)?;
        info!("Created habit '{}' ({}) for user {}", habit.name, habit.id, user_id);
        Ok(habit)
    })
}

/// Change a habit's configuration; the start date is never touched
pub fn update_habit<S: Transactional>(
    store: &S,
    habit_id: &HabitId,
    user_id: &UserId,
    update: HabitUpdate,
) -> Result<Habit, EngineError> {
    store.atomically(|tx| -> Result<Habit, EngineError> {
        let mut habit = owned_habit(tx, habit_id, user_id)?;
        habit.apply_update(update)?;
        tx.update_habit(&habit)?;
        info!("Updated habit {}", habit.id);
        Ok(habit)
    })
}

/// Archive a habit, dropping it from the favorites
///
/// Archiving an already archived habit changes nothing.
pub fn archive_habit<S: Transactional>(
    store: &S,
    habit_id: &HabitId,
    user_id: &UserId,
) -> Result<Habit, EngineError> {
    store.atomically(|tx| -> Result<Habit, EngineError> {
        let mut habit = owned_habit(tx, habit_id, user_id)?;
        if !habit.is_active() {
            return Ok(habit);
        }

        let was_favorite = habit.is_favorite;
        habit.archive();
        tx.update_habit(&habit)?;

        if was_favorite {
            let mut favorites = favorites_of(tx, user_id)?;
            renumber(tx, &mut favorites)?;
        }

        info!("Archived habit {}", habit.id);
        Ok(habit)
    })
}

/// Bring an archived habit back to the active set
///
/// Restoring is not subject to the limit gate.
pub fn restore_habit<S: Transactional>(
    store: &S,
    habit_id: &HabitId,
    user_id: &UserId,
) -> Result<Habit, EngineError> {
    store.atomically(|tx| -> Result<Habit, EngineError> {
        let mut habit = owned_habit(tx, habit_id, user_id)?;
        if habit.is_active() {
            return Ok(habit);
        }

        habit.restore();
        tx.update_habit(&habit)?;
        info!("Restored habit {}", habit.id);
        Ok(habit)
    })
}

/// The user's habits, favorites first in slot order, then by creation
pub fn list_habits(
    store: &dyn HabitStore,
    user_id: &UserId,
    include_archived: bool,
) -> Result<Vec<Habit>, EngineError> {
    Ok(store.list_habits(user_id, include_archived)?)
}

pub fn get_habit(store: &dyn HabitStore, habit_id: &HabitId, user_id: &UserId) -> Result<Habit, EngineError> {
    owned_habit(store, habit_id, user_id)
}
