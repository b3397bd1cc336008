/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents a recurring
/// activity a user wants to track, along with creation and update payloads
/// and their validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{check_supported, Day, DomainError, HabitId, Lifecycle, UserId};

/// A habit represents something the user wants to do regularly
///
/// Each habit belongs to exactly one user and carries a weekly frequency
/// target. The start date is fixed at creation: completions may never
/// precede it, and nothing in the engine mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// User who owns this habit
    pub owner_id: UserId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Free-text category chosen by the user
    pub category: Option<String>,
    /// How many times per week the habit should be performed
    pub weekly_frequency: u32,
    /// Optional count per occurrence (e.g., 20 for "20 push-ups")
    pub target_count: Option<u32>,
    /// Display color
    pub color: Option<String>,
    /// Display icon
    pub icon: Option<String>,
    /// First day the habit can be completed
    start_date: Day,
    /// Optional last day of the habit
    pub end_date: Option<Day>,
    /// Active or archived
    pub lifecycle: Lifecycle,
    /// Whether the habit is pinned to the user's favorites
    pub is_favorite: bool,
    /// 1-based position among favorites; 0 when not a favorite
    pub favorite_order: u32,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
}

/// Fields a user supplies when creating a habit
///
/// Identity, ownership and the creation timestamp are stamped by the engine,
/// never taken from the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub weekly_frequency: u32,
    #[serde(default)]
    pub target_count: Option<u32>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Defaults to the creation day
    #[serde(default)]
    pub start_date: Option<Day>,
    #[serde(default)]
    pub end_date: Option<Day>,
}

impl NewHabit {
    /// Minimal habit definition: a name and a weekly target
    pub fn named(name: impl Into<String>, weekly_frequency: u32) -> Self {
        Self {
            name: name.into(),
            weekly_frequency,
            ..Self::default()
        }
    }

    pub fn starting(mut self, start_date: Day) -> Self {
        self.start_date = Some(start_date);
        self
    }
}

/// Partial update of a habit's configuration
///
/// The outer `Option` means "leave unchanged"; for nullable fields the inner
/// `Option` clears or sets the value. The start date is deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub weekly_frequency: Option<u32>,
    pub target_count: Option<Option<u32>>,
    pub color: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub end_date: Option<Option<Day>>,
}

impl Habit {
    /// Create a new, active habit owned by `owner_id`
    ///
    /// `today` and `now` come from the engine's clock. Returns an error if any
    /// field fails validation.
    pub fn new(
        owner_id: UserId,
        new_habit: NewHabit,
        today: Day,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let start_date = check_supported(new_habit.start_date.unwrap_or(today))?;
        if start_date > today {
            return Err(DomainError::InvalidDate(format!(
                "Start date {} cannot be after today ({})",
                start_date, today
            )));
        }

        Self::validate_name(&new_habit.name)?;
        Self::validate_text("Description", &new_habit.description, 500)?;
        Self::validate_text("Category", &new_habit.category, 50)?;
        Self::validate_text("Color", &new_habit.color, 32)?;
        Self::validate_text("Icon", &new_habit.icon, 32)?;
        Self::validate_frequency(new_habit.weekly_frequency)?;
        Self::validate_target_count(&new_habit.target_count)?;
        Self::validate_end_date(start_date, &new_habit.end_date)?;

        Ok(Self {
            id: HabitId::new(),
            owner_id,
            name: new_habit.name.trim().to_string(),
            description: new_habit.description,
            category: new_habit.category,
            weekly_frequency: new_habit.weekly_frequency,
            target_count: new_habit.target_count,
            color: new_habit.color,
            icon: new_habit.icon,
            start_date,
            end_date: new_habit.end_date,
            lifecycle: Lifecycle::Active,
            is_favorite: false,
            favorite_order: 0,
            created_at: now,
        })
    }

    /// Create a habit from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated and is mainly used
    /// by the storage layer when loading habits from the database.
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        owner_id: UserId,
        name: String,
        description: Option<String>,
        category: Option<String>,
        weekly_frequency: u32,
        target_count: Option<u32>,
        color: Option<String>,
        icon: Option<String>,
        start_date: Day,
        end_date: Option<Day>,
        lifecycle: Lifecycle,
        is_favorite: bool,
        favorite_order: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            name,
            description,
            category,
            weekly_frequency,
            target_count,
            color,
            icon,
            start_date,
            end_date,
            lifecycle,
            is_favorite,
            favorite_order,
            created_at,
        }
    }

    /// First day this habit accepts completions
    pub fn start_date(&self) -> Day {
        self.start_date
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }

    /// Apply a partial update with validation
    ///
    /// All new values are validated before any of them is applied, so a
    /// failed update leaves the habit untouched.
    pub fn apply_update(&mut self, update: HabitUpdate) -> Result<(), DomainError> {
        if let Some(ref name) = update.name {
            Self::validate_name(name)?;
        }
        if let Some(ref description) = update.description {
            Self::validate_text("Description", description, 500)?;
        }
        if let Some(ref category) = update.category {
            Self::validate_text("Category", category, 50)?;
        }
        if let Some(ref color) = update.color {
            Self::validate_text("Color", color, 32)?;
        }
        if let Some(ref icon) = update.icon {
            Self::validate_text("Icon", icon, 32)?;
        }
        if let Some(frequency) = update.weekly_frequency {
            Self::validate_frequency(frequency)?;
        }
        if let Some(ref target) = update.target_count {
            Self::validate_target_count(target)?;
        }
        if let Some(ref end_date) = update.end_date {
            Self::validate_end_date(self.start_date, end_date)?;
        }

        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(icon) = update.icon {
            self.icon = icon;
        }
        if let Some(frequency) = update.weekly_frequency {
            self.weekly_frequency = frequency;
        }
        if let Some(target) = update.target_count {
            self.target_count = target;
        }
        if let Some(end_date) = update.end_date {
            self.end_date = end_date;
        }

        Ok(())
    }

    /// Soft-delete: the habit leaves the active set and the favorites list
    pub fn archive(&mut self) {
        self.lifecycle = Lifecycle::Archived;
        self.is_favorite = false;
        self.favorite_order = 0;
    }

    /// Bring an archived habit back; it does not regain its favorite slot
    pub fn restore(&mut self) {
        self.lifecycle = Lifecycle::Active;
    }

    // Validation helper methods

    /// Validate habit name according to business rules
    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string(),
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_text(field: &str, value: &Option<String>, max: usize) -> Result<(), DomainError> {
        if let Some(text) = value {
            if text.chars().count() > max {
                return Err(DomainError::Validation {
                    message: format!("{} cannot be longer than {} characters", field, max),
                });
            }
        }
        Ok(())
    }

    /// Weekly targets above 7 are unusual but allowed (several times a day)
    fn validate_frequency(weekly_frequency: u32) -> Result<(), DomainError> {
        if weekly_frequency == 0 {
            return Err(DomainError::InvalidFrequency(
                "Weekly frequency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_target_count(target_count: &Option<u32>) -> Result<(), DomainError> {
        match target_count {
            Some(0) => Err(DomainError::InvalidValue {
                message: "Target count must be greater than 0".to_string(),
            }),
            Some(value) if *value > 10000 => Err(DomainError::InvalidValue {
                message: "Target count cannot exceed 10000".to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn validate_end_date(start_date: Day, end_date: &Option<Day>) -> Result<(), DomainError> {
        match end_date {
            Some(end) if *end < start_date => Err(DomainError::InvalidDate(format!(
                "End date {} is before the start date {}",
                end, start_date
            ))),
            Some(end) => check_supported(*end).map(|_| ()),
            None => Ok(()),
        }
    }
}
