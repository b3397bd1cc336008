/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing and retrieving habits and their per-day
/// completion records. It enforces uniqueness only; business rules live in
/// the command layer.

pub mod migrations;
pub mod sqlite;

// Re-export the main storage types
pub use sqlite::*;

use rusqlite::ErrorCode;
use thiserror::Error;

use crate::domain::{Day, Habit, HabitCompletion, HabitId, UserId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Concurrent modification detected: {0}")]
    Conflict(String),

    #[error("Invalid stored row: {0}")]
    InvalidRow(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

impl From<rusqlite::Error> for StorageError {
    /// Busy and locked databases mean another writer got there first
    fn from(error: rusqlite::Error) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(failure, _)
                if matches!(failure.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) =>
            {
                StorageError::Conflict(error.to_string())
            }
            _ => StorageError::Query(error),
        }
    }
}

/// Trait defining the storage interface for habits and completions
///
/// This trait allows us to potentially swap out SQLite for other databases
/// in the future while keeping the same interface. It is object safe so a
/// transaction can hand out `&dyn HabitStore`.
pub trait HabitStore {
    /// Create a new habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID, whatever its lifecycle
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Update an existing habit's mutable fields
    ///
    /// Owner, start date and creation time are never rewritten.
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// List a user's habits, favorites first by their order, then by creation
    fn list_habits(&self, owner_id: &UserId, include_archived: bool) -> Result<Vec<Habit>, StorageError>;

    /// Get the record for one habit on one day, if any
    fn get_completion(&self, habit_id: &HabitId, day: Day) -> Result<Option<HabitCompletion>, StorageError>;

    /// Insert a new record; fails with `Conflict` if the day already has one
    fn insert_completion(&self, completion: &HabitCompletion) -> Result<(), StorageError>;

    /// Overwrite a record if its stored version still equals `expected_version`
    ///
    /// The caller is responsible for bumping `completion.version`.
    fn update_completion(&self, completion: &HabitCompletion, expected_version: u64) -> Result<(), StorageError>;

    /// Records of one habit in ascending day order, optionally bounded (inclusive)
    fn list_completions(
        &self,
        habit_id: &HabitId,
        from: Option<Day>,
        to: Option<Day>,
    ) -> Result<Vec<HabitCompletion>, StorageError>;
}

/// A store that can run several operations as one atomic unit
pub trait Transactional: HabitStore {
    /// Run `f` inside a write transaction
    ///
    /// Commits when `f` returns `Ok`, rolls back otherwise. Writers are
    /// serialized for the duration of the closure.
    fn atomically<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn HabitStore) -> Result<T, E>,
        E: From<StorageError>;
}
