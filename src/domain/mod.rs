/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, HabitCompletion), day
/// normalization and validation, and streak calculation. These types carry
/// no storage concerns.

pub mod completion;
pub mod dates;
pub mod habit;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use completion::*;
pub use dates::{
    check_supported, normalize_to_day, parse_day, validate_completion_date, Clock, DateError, FixedClock, SystemClock,
    SUPPORTED_YEARS,
};
pub use habit::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}
