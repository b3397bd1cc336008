/// Public library interface for the habit streak engine
///
/// This module exports the engine facade, its error taxonomy and the public
/// types that front-ends (the JSON-RPC server, tests, other applications)
/// work with.

use std::path::PathBuf;
use thiserror::Error;

// Internal modules
pub mod analytics;
mod commands;
pub mod domain;
pub mod gate;
pub mod rpc;
pub mod storage;

// Re-export public modules and types
pub use analytics::{AnalyticsEngine, HabitStatistics, Insight, InsightKind, UserStatistics};
pub use commands::{FavoriteOutcome, ToggleOutcome};
pub use domain::*;
pub use gate::{HabitCap, LimitGate, Unlimited};
pub use storage::{HabitStore, SqliteStore, StorageError, Transactional};

/// Errors reported by engine operations
///
/// Validation-style errors (`Date`, `NotFavorited`, `HabitArchived`,
/// `Domain`, `NotFound`, `LimitReached`) never leave partial writes behind.
/// `Conflict` means a concurrent writer won; retrying the whole operation is
/// safe. `Persistence` is a storage failure and is not retried.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Date(#[from] DateError),

    #[error("Habit {habit_id} is not a favorite")]
    NotFavorited { habit_id: String },

    #[error("Habit {habit_id} is archived")]
    HabitArchived { habit_id: String },

    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    #[error("Habit not found: {habit_id}")]
    NotFound { habit_id: String },

    #[error("Habit limit reached for user {user_id}")]
    LimitReached { user_id: String },

    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Persistence(#[source] StorageError),
}

impl From<StorageError> for EngineError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::HabitNotFound { habit_id } => EngineError::NotFound { habit_id },
            StorageError::Conflict(message) => EngineError::Conflict(message),
            other => EngineError::Persistence(other),
        }
    }
}

impl EngineError {
    /// Caller errors: bad input, missing or foreign habit, refused by the gate
    pub fn is_validation(&self) -> bool {
        !matches!(self, EngineError::Conflict(_) | EngineError::Persistence(_))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Conflict(_))
    }

    /// Stable machine-readable name of the error
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Date(DateError::FutureDate { .. }) => "future_date",
            EngineError::Date(DateError::BeforeHabitStart { .. }) => "before_habit_start",
            EngineError::NotFavorited { .. } => "not_favorited",
            EngineError::HabitArchived { .. } => "habit_archived",
            EngineError::Domain(_) => "invalid_input",
            EngineError::NotFound { .. } => "not_found",
            EngineError::LimitReached { .. } => "limit_reached",
            EngineError::Conflict(_) => "conflict",
            EngineError::Persistence(_) => "persistence",
        }
    }
}

/// Errors that can occur while running the server front-end
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] StorageError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Habit completion and streak engine
///
/// Owns the store and the injected collaborators: a clock for "today" and a
/// gate deciding whether a user may create another habit. Every operation
/// takes the calling user's id and treats habits owned by someone else as
/// missing.
pub struct HabitEngine<S: Transactional = SqliteStore> {
    store: S,
    clock: Box<dyn Clock>,
    gate: Box<dyn LimitGate>,
    analytics: AnalyticsEngine,
}

impl HabitEngine<SqliteStore> {
    /// Open (or create) a database with the system clock and no habit limit
    pub fn open(db_path: PathBuf) -> Result<Self, StorageError> {
        tracing::info!("Opening habit database at {:?}", db_path);
        let store = SqliteStore::new(db_path)?;
        Ok(Self::new(store, Box::new(SystemClock), Box::new(Unlimited)))
    }
}

impl<S: Transactional> HabitEngine<S> {
    pub fn new(store: S, clock: Box<dyn Clock>, gate: Box<dyn LimitGate>) -> Self {
        Self {
            store,
            clock,
            gate,
            analytics: AnalyticsEngine::new(),
        }
    }

    /// Get a reference to the store (useful for testing)
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn today(&self) -> Day {
        self.clock.today()
    }

    // Habit lifecycle

    pub fn create_habit(&self, user_id: &UserId, new_habit: NewHabit) -> Result<Habit, EngineError> {
        commands::create_habit(&self.store, self.clock(), self.gate.as_ref(), user_id, new_habit)
    }

    pub fn update_habit(&self, habit_id: &HabitId, user_id: &UserId, update: HabitUpdate) -> Result<Habit, EngineError> {
        commands::update_habit(&self.store, habit_id, user_id, update)
    }

    pub fn archive_habit(&self, habit_id: &HabitId, user_id: &UserId) -> Result<Habit, EngineError> {
        commands::archive_habit(&self.store, habit_id, user_id)
    }

    pub fn restore_habit(&self, habit_id: &HabitId, user_id: &UserId) -> Result<Habit, EngineError> {
        commands::restore_habit(&self.store, habit_id, user_id)
    }

    pub fn list_habits(&self, user_id: &UserId, include_archived: bool) -> Result<Vec<Habit>, EngineError> {
        commands::list_habits(&self.store, user_id, include_archived)
    }

    pub fn get_habit(&self, habit_id: &HabitId, user_id: &UserId) -> Result<Habit, EngineError> {
        commands::get_habit(&self.store, habit_id, user_id)
    }

    // Completions and streaks

    /// Flip the completion state of a habit on `day`
    pub fn toggle_completion(&self, habit_id: &HabitId, day: Day, user_id: &UserId) -> Result<ToggleOutcome, EngineError> {
        commands::toggle_completion(&self.store, self.clock(), habit_id, day, user_id, None)
    }

    /// Like `toggle_completion`, attaching `note` when the day becomes completed
    pub fn toggle_completion_with_note(
        &self,
        habit_id: &HabitId,
        day: Day,
        user_id: &UserId,
        note: Option<String>,
    ) -> Result<ToggleOutcome, EngineError> {
        commands::toggle_completion(&self.store, self.clock(), habit_id, day, user_id, note)
    }

    pub fn get_completions(
        &self,
        habit_id: &HabitId,
        user_id: &UserId,
        from: Option<Day>,
        to: Option<Day>,
    ) -> Result<Vec<HabitCompletion>, EngineError> {
        commands::get_completions(&self.store, habit_id, user_id, from, to)
    }

    pub fn get_current_streak(&self, habit_id: &HabitId, user_id: &UserId) -> Result<u32, EngineError> {
        commands::get_current_streak(&self.store, self.clock(), habit_id, user_id)
    }

    // Favorites

    pub fn toggle_favorite(&self, habit_id: &HabitId, user_id: &UserId) -> Result<FavoriteOutcome, EngineError> {
        commands::toggle_favorite(&self.store, habit_id, user_id)
    }

    /// Move a favorite to the 0-based `new_position`
    pub fn reorder_favorite(
        &self,
        habit_id: &HabitId,
        user_id: &UserId,
        new_position: i64,
    ) -> Result<FavoriteOutcome, EngineError> {
        commands::reorder_favorite(&self.store, habit_id, user_id, new_position)
    }

    // Statistics

    pub fn get_habit_statistics(&self, habit_id: &HabitId, user_id: &UserId) -> Result<HabitStatistics, EngineError> {
        let habit = commands::get_habit(&self.store, habit_id, user_id)?;
        let completions = self.store.list_completions(&habit.id, None, None)?;
        Ok(self.analytics.habit_statistics(&habit, &completions, self.today()))
    }

    pub fn get_user_statistics(&self, user_id: &UserId) -> Result<UserStatistics, EngineError> {
        let habits = self.store.list_habits(user_id, true)?;
        let mut history = Vec::with_capacity(habits.len());
        for habit in habits {
            let completions = self.store.list_completions(&habit.id, None, None)?;
            history.push((habit, completions));
        }
        Ok(self.analytics.user_statistics(&history, self.today()))
    }
}
