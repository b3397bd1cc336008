/// HabitCompletion entity for tracking per-day completion state
///
/// This module defines the HabitCompletion struct that records whether a habit
/// was performed on one calendar day, together with the streak value as of
/// that day.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CompletionId, Day, DomainError, HabitId};

/// Maximum note length in characters
pub const MAX_NOTE_LEN: usize = 500;

/// The record of one habit on one day
///
/// There is at most one record per (habit, day). Records are created on the
/// first toggle and then mutated in place; they are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitCompletion {
    /// Unique identifier for this record
    pub id: CompletionId,
    /// Which habit this record is for
    pub habit_id: HabitId,
    /// Which day this record is for
    pub completion_date: Day,
    /// Whether the habit counts as done on this day
    pub completed: bool,
    /// User's notes about this day
    pub note: Option<String>,
    /// Consecutive-day streak as of this day, cached at the last completion;
    /// always 0 while `completed` is false
    pub streak_count: u32,
    /// Bumped on every write, used for compare-and-swap updates
    pub version: u64,
    /// When the record was first created
    pub created_at: DateTime<Utc>,
    /// When the record was last toggled
    pub updated_at: DateTime<Utc>,
}

/// Completion state of a (habit, day) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    NoRecord,
    RecordedIncomplete,
    RecordedComplete,
}

impl CompletionState {
    pub fn of(record: Option<&HabitCompletion>) -> Self {
        match record {
            None => CompletionState::NoRecord,
            Some(r) if r.completed => CompletionState::RecordedComplete,
            Some(_) => CompletionState::RecordedIncomplete,
        }
    }

    pub fn is_complete(self) -> bool {
        self == CompletionState::RecordedComplete
    }
}

impl HabitCompletion {
    /// Create the first record for a day, already completed
    pub fn completed_on(
        habit_id: HabitId,
        completion_date: Day,
        streak_count: u32,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Self::validate_note(&note)?;

        Ok(Self {
            id: CompletionId::new(),
            habit_id,
            completion_date,
            completed: true,
            note,
            streak_count,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Create a record from existing data (used when loading from database)
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: CompletionId,
        habit_id: HabitId,
        completion_date: Day,
        completed: bool,
        note: Option<String>,
        streak_count: u32,
        version: u64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            habit_id,
            completion_date,
            completed,
            note,
            streak_count,
            version,
            created_at,
            updated_at,
        }
    }

    pub fn state(&self) -> CompletionState {
        CompletionState::of(Some(self))
    }

    /// Flip to completed with a freshly computed streak
    ///
    /// A supplied note replaces the stored one; `None` keeps it.
    pub fn mark_complete(
        &mut self,
        streak_count: u32,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        Self::validate_note(&note)?;
        self.completed = true;
        self.streak_count = streak_count;
        if note.is_some() {
            self.note = note;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Flip to incomplete; the cached streak is reset
    pub fn mark_incomplete(&mut self, now: DateTime<Utc>) {
        self.completed = false;
        self.streak_count = 0;
        self.updated_at = now;
    }

    /// Check if this record has a non-blank note
    pub fn has_note(&self) -> bool {
        self.note.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// Validate the optional note field
    fn validate_note(note: &Option<String>) -> Result<(), DomainError> {
        if let Some(text) = note {
            if text.chars().count() > MAX_NOTE_LEN {
                return Err(DomainError::InvalidValue {
                    message: format!("Notes cannot be longer than {} characters", MAX_NOTE_LEN),
                });
            }
        }
        Ok(())
    }
}
