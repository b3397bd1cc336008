/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit data. It handles all SQL queries and data conversion.
/// The connection sits behind a mutex; `atomically` runs a closure inside an
/// `IMMEDIATE` transaction so read-compute-write sequences are serialized.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior};

use crate::domain::{Day, Habit, HabitCompletion, CompletionId, HabitId, Lifecycle, UserId};
use crate::storage::{migrations, HabitStore, StorageError, Transactional};

const HABIT_COLUMNS: &str = "id, owner_id, name, description, category, weekly_frequency, \
     target_count, color, icon, start_date, end_date, lifecycle, is_favorite, favorite_order, created_at";

const COMPLETION_COLUMNS: &str =
    "id, habit_id, completion_date, completed, note, streak_count, version, created_at, updated_at";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStore trait.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| StorageError::Connection(format!("Failed to enable WAL: {}", e)))?;

        let store = Self::prepare(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;

        tracing::debug!("Opened in-memory SQLite database");
        Self::prepare(conn)
    }

    fn prepare(conn: Connection) -> Result<Self, StorageError> {
        // Enable foreign key constraints
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        // Other processes may hold the write lock briefly
        conn.busy_timeout(Duration::from_secs(2))
            .map_err(|e| StorageError::Connection(format!("Failed to set busy timeout: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let conn = self.lock()?;
        f(&conn)
    }
}

/// A store view bound to an open transaction
struct SqliteTx<'a> {
    conn: &'a Connection,
}

impl Transactional for SqliteStore {
    fn atomically<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn HabitStore) -> Result<T, E>,
        E: From<StorageError>,
    {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::from)?;

        // Dropping `tx` without committing rolls back
        let value = f(&SqliteTx { conn: &*tx })?;

        tx.commit().map_err(StorageError::from)?;
        Ok(value)
    }
}

impl HabitStore for SqliteStore {
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.with_conn(|conn| create_habit(conn, habit))
    }

    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        self.with_conn(|conn| get_habit(conn, habit_id))
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.with_conn(|conn| update_habit(conn, habit))
    }

    fn list_habits(&self, owner_id: &UserId, include_archived: bool) -> Result<Vec<Habit>, StorageError> {
        self.with_conn(|conn| list_habits(conn, owner_id, include_archived))
    }

    fn get_completion(&self, habit_id: &HabitId, day: Day) -> Result<Option<HabitCompletion>, StorageError> {
        self.with_conn(|conn| get_completion(conn, habit_id, day))
    }

    fn insert_completion(&self, completion: &HabitCompletion) -> Result<(), StorageError> {
        self.with_conn(|conn| insert_completion(conn, completion))
    }

    fn update_completion(&self, completion: &HabitCompletion, expected_version: u64) -> Result<(), StorageError> {
        self.with_conn(|conn| update_completion(conn, completion, expected_version))
    }

    fn list_completions(
        &self,
        habit_id: &HabitId,
        from: Option<Day>,
        to: Option<Day>,
    ) -> Result<Vec<HabitCompletion>, StorageError> {
        self.with_conn(|conn| list_completions(conn, habit_id, from, to))
    }
}

impl HabitStore for SqliteTx<'_> {
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        create_habit(self.conn, habit)
    }

    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        get_habit(self.conn, habit_id)
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        update_habit(self.conn, habit)
    }

    fn list_habits(&self, owner_id: &UserId, include_archived: bool) -> Result<Vec<Habit>, StorageError> {
        list_habits(self.conn, owner_id, include_archived)
    }

    fn get_completion(&self, habit_id: &HabitId, day: Day) -> Result<Option<HabitCompletion>, StorageError> {
        get_completion(self.conn, habit_id, day)
    }

    fn insert_completion(&self, completion: &HabitCompletion) -> Result<(), StorageError> {
        insert_completion(self.conn, completion)
    }

    fn update_completion(&self, completion: &HabitCompletion, expected_version: u64) -> Result<(), StorageError> {
        update_completion(self.conn, completion, expected_version)
    }

    fn list_completions(
        &self,
        habit_id: &HabitId,
        from: Option<Day>,
        to: Option<Day>,
    ) -> Result<Vec<HabitCompletion>, StorageError> {
        list_completions(self.conn, habit_id, from, to)
    }
}

// Queries shared by the plain and the transactional store

fn create_habit(conn: &Connection, habit: &Habit) -> Result<(), StorageError> {
    conn.execute(
        &format!(
            "INSERT INTO habits ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            HABIT_COLUMNS
        ),
        params![
            habit.id.to_string(),
            habit.owner_id.as_str(),
            habit.name,
            habit.description,
            habit.category,
            habit.weekly_frequency,
            habit.target_count,
            habit.color,
            habit.icon,
            habit.start_date(),
            habit.end_date,
            habit.lifecycle.as_str(),
            habit.is_favorite,
            habit.favorite_order,
            habit.created_at,
        ],
    )?;

    tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
    Ok(())
}

fn get_habit(conn: &Connection, habit_id: &HabitId) -> Result<Habit, StorageError> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS))?;

    stmt.query_row(params![habit_id.to_string()], habit_from_row)
        .optional()?
        .ok_or_else(|| StorageError::HabitNotFound {
            habit_id: habit_id.to_string(),
        })
}

fn update_habit(conn: &Connection, habit: &Habit) -> Result<(), StorageError> {
    let rows_affected = conn.execute(
        "UPDATE habits SET
            name = ?2,
            description = ?3,
            category = ?4,
            weekly_frequency = ?5,
            target_count = ?6,
            color = ?7,
            icon = ?8,
            end_date = ?9,
            lifecycle = ?10,
            is_favorite = ?11,
            favorite_order = ?12
         WHERE id = ?1",
        params![
            habit.id.to_string(),
            habit.name,
            habit.description,
            habit.category,
            habit.weekly_frequency,
            habit.target_count,
            habit.color,
            habit.icon,
            habit.end_date,
            habit.lifecycle.as_str(),
            habit.is_favorite,
            habit.favorite_order,
        ],
    )?;

    if rows_affected == 0 {
        return Err(StorageError::HabitNotFound {
            habit_id: habit.id.to_string(),
        });
    }

    tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
    Ok(())
}

fn list_habits(conn: &Connection, owner_id: &UserId, include_archived: bool) -> Result<Vec<Habit>, StorageError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM habits
         WHERE owner_id = ?1 AND (?2 OR lifecycle = 'active')
         ORDER BY is_favorite DESC, favorite_order ASC, created_at ASC, rowid ASC",
        HABIT_COLUMNS
    ))?;

    let habits = stmt
        .query_map(params![owner_id.as_str(), include_archived], habit_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(habits)
}

fn get_completion(conn: &Connection, habit_id: &HabitId, day: Day) -> Result<Option<HabitCompletion>, StorageError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM habit_completions WHERE habit_id = ?1 AND completion_date = ?2",
        COMPLETION_COLUMNS
    ))?;

    let completion = stmt
        .query_row(params![habit_id.to_string(), day], completion_from_row)
        .optional()?;

    Ok(completion)
}

fn insert_completion(conn: &Connection, completion: &HabitCompletion) -> Result<(), StorageError> {
    let result = conn.execute(
        &format!(
            "INSERT INTO habit_completions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            COMPLETION_COLUMNS
        ),
        params![
            completion.id.to_string(),
            completion.habit_id.to_string(),
            completion.completion_date,
            completion.completed,
            completion.note,
            completion.streak_count,
            completion.version as i64,
            completion.created_at,
            completion.updated_at,
        ],
    );

    match result {
        Ok(_) => {
            tracing::debug!(
                "Created completion {} for habit {} on {}",
                completion.id,
                completion.habit_id,
                completion.completion_date
            );
            Ok(())
        }
        Err(rusqlite::Error::SqliteFailure(failure, _)) if failure.code == ErrorCode::ConstraintViolation => {
            Err(StorageError::Conflict(format!(
                "habit {} already has a record for {}",
                completion.habit_id, completion.completion_date
            )))
        }
        Err(e) => Err(e.into()),
    }
}

fn update_completion(
    conn: &Connection,
    completion: &HabitCompletion,
    expected_version: u64,
) -> Result<(), StorageError> {
    let rows_affected = conn.execute(
        "UPDATE habit_completions SET
            completed = ?2,
            note = ?3,
            streak_count = ?4,
            version = ?5,
            updated_at = ?6
         WHERE id = ?1 AND version = ?7",
        params![
            completion.id.to_string(),
            completion.completed,
            completion.note,
            completion.streak_count,
            completion.version as i64,
            completion.updated_at,
            expected_version as i64,
        ],
    )?;

    if rows_affected == 0 {
        return Err(StorageError::Conflict(format!(
            "completion {} changed since version {}",
            completion.id, expected_version
        )));
    }

    tracing::debug!(
        "Updated completion {} (v{}) completed={} streak={}",
        completion.id,
        completion.version,
        completion.completed,
        completion.streak_count
    );
    Ok(())
}

fn list_completions(
    conn: &Connection,
    habit_id: &HabitId,
    from: Option<Day>,
    to: Option<Day>,
) -> Result<Vec<HabitCompletion>, StorageError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM habit_completions
         WHERE habit_id = ?1
           AND (?2 IS NULL OR completion_date >= ?2)
           AND (?3 IS NULL OR completion_date <= ?3)
         ORDER BY completion_date ASC",
        COMPLETION_COLUMNS
    ))?;

    let completions = stmt
        .query_map(params![habit_id.to_string(), from, to], completion_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(completions)
}

// Row conversion

fn invalid_column(index: usize, what: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(index, what.to_string(), Type::Text)
}

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let id_str: String = row.get(0)?;
    let id = HabitId::from_string(&id_str).map_err(|_| invalid_column(0, "Invalid UUID"))?;

    let lifecycle_str: String = row.get(11)?;
    let lifecycle = Lifecycle::parse(&lifecycle_str).ok_or_else(|| invalid_column(11, "Invalid lifecycle"))?;

    Ok(Habit::from_existing(
        id,
        UserId::new(row.get::<_, String>(1)?),
        row.get(2)?,  // name
        row.get(3)?,  // description
        row.get(4)?,  // category
        row.get(5)?,  // weekly_frequency
        row.get(6)?,  // target_count
        row.get(7)?,  // color
        row.get(8)?,  // icon
        row.get(9)?,  // start_date
        row.get(10)?, // end_date
        lifecycle,
        row.get(12)?, // is_favorite
        row.get(13)?, // favorite_order
        row.get(14)?, // created_at
    ))
}

fn completion_from_row(row: &Row<'_>) -> rusqlite::Result<HabitCompletion> {
    let id_str: String = row.get(0)?;
    let id = CompletionId::from_string(&id_str).map_err(|_| invalid_column(0, "Invalid UUID"))?;

    let habit_id_str: String = row.get(1)?;
    let habit_id = HabitId::from_string(&habit_id_str).map_err(|_| invalid_column(1, "Invalid UUID"))?;

    let version: i64 = row.get(6)?;

    Ok(HabitCompletion::from_existing(
        id,
        habit_id,
        row.get(2)?, // completion_date
        row.get(3)?, // completed
        row.get(4)?, // note
        row.get(5)?, // streak_count
        version.max(0) as u64,
        row.get(7)?, // created_at
        row.get(8)?, // updated_at
    ))
}
