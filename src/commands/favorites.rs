/// Favorites: an ordered, user-curated subset of active habits
///
/// Favorite positions are kept dense (1..N) after every change. Reordering
/// relabels the whole list in one transaction so readers never observe two
/// habits sharing a slot.

use serde::Serialize;
use tracing::info;

use crate::commands::{owned_active_habit, owned_habit};
use crate::domain::{Habit, HabitId, UserId};
use crate::storage::{HabitStore, StorageError, Transactional};
use crate::EngineError;

/// State of the caller's favorites after a change
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteOutcome {
    pub habit_id: HabitId,
    pub is_favorite: bool,
    /// 1-based slot of the habit; 0 when it is not a favorite
    pub favorite_order: u32,
    /// All favorites in slot order
    pub ordering: Vec<HabitId>,
}

/// Add a habit to the end of the favorites, or remove it
pub fn toggle_favorite<S: Transactional>(
    store: &S,
    habit_id: &HabitId,
    user_id: &UserId,
) -> Result<FavoriteOutcome, EngineError> {
    store.atomically(|tx| -> Result<FavoriteOutcome, EngineError> {
        let habit = owned_active_habit(tx, habit_id, user_id)?;
        let mut favorites = favorites_of(tx, user_id)?;

        if habit.is_favorite {
            favorites.retain(|h| h.id != habit.id);
            let mut removed = habit;
            removed.is_favorite = false;
            removed.favorite_order = 0;
            tx.update_habit(&removed)?;
            info!("Removed habit {} from favorites", removed.id);
        } else {
            let mut added = habit;
            added.is_favorite = true;
            // Placeholder slot so renumbering always writes the new favorite
            added.favorite_order = 0;
            info!("Added habit {} to favorites", added.id);
            favorites.push(added);
        }

        renumber(tx, &mut favorites)?;
        Ok(outcome_for(habit_id, &favorites))
    })
}

/// Move a favorite to `new_position` (0-based) among the other favorites
///
/// Positions past either end are clamped. The relative order of the other
/// favorites is preserved.
pub fn reorder_favorite<S: Transactional>(
    store: &S,
    habit_id: &HabitId,
    user_id: &UserId,
    new_position: i64,
) -> Result<FavoriteOutcome, EngineError> {
    store.atomically(|tx| -> Result<FavoriteOutcome, EngineError> {
        let habit = owned_habit(tx, habit_id, user_id)?;
        if !habit.is_favorite {
            return Err(EngineError::NotFavorited {
                habit_id: habit_id.to_string(),
            });
        }

        let mut favorites = favorites_of(tx, user_id)?;
        let from = favorites.iter().position(|h| h.id == habit.id);
        let moved = match from {
            Some(index) => favorites.remove(index),
            None => habit,
        };

        let slot = clamp_position(new_position, favorites.len());
        favorites.insert(slot, moved);
        renumber(tx, &mut favorites)?;

        info!("Moved favorite {} to position {}", habit_id, slot + 1);
        Ok(outcome_for(habit_id, &favorites))
    })
}

/// Rewrite `favorite_order` as 1..N in list order
///
/// Only habits whose slot actually changes are written back.
pub(crate) fn renumber(store: &dyn HabitStore, favorites: &mut [Habit]) -> Result<(), StorageError> {
    for (index, habit) in favorites.iter_mut().enumerate() {
        let slot = index as u32 + 1;
        if habit.favorite_order != slot {
            habit.favorite_order = slot;
            store.update_habit(habit)?;
        }
    }
    Ok(())
}

/// The user's active favorites in slot order
pub(crate) fn favorites_of(store: &dyn HabitStore, user_id: &UserId) -> Result<Vec<Habit>, StorageError> {
    let mut favorites: Vec<Habit> = store
        .list_habits(user_id, false)?
        .into_iter()
        .filter(|h| h.is_favorite)
        .collect();
    // list_habits already sorts by slot; repeat it so callers don't depend on that
    favorites.sort_by_key(|h| h.favorite_order);
    Ok(favorites)
}

fn clamp_position(position: i64, len: usize) -> usize {
    if position <= 0 {
        0
    } else {
        (position as u64).min(len as u64) as usize
    }
}

fn outcome_for(habit_id: &HabitId, favorites: &[Habit]) -> FavoriteOutcome {
    let slot = favorites.iter().position(|h| &h.id == habit_id);
    FavoriteOutcome {
        habit_id: habit_id.clone(),
        is_favorite: slot.is_some(),
        favorite_order: slot.map(|i| i as u32 + 1).unwrap_or(0),
        ordering: favorites.iter().map(|h| h.id.clone()).collect(),
    }
}
