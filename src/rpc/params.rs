/// Method parameters accepted by the JSON-RPC front-end
///
/// Every request names the calling user. Dates arrive as strings, either
/// `YYYY-MM-DD` or RFC 3339, and are normalized with `parse_day`.

use serde::{Deserialize, Deserializer};

use crate::domain::{parse_day, Day, DomainError, HabitId, HabitUpdate, NewHabit, UserId};

/// Parameters that only identify the caller
#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub user_id: String,
    #[serde(default)]
    pub include_archived: bool,
}

/// Parameters that identify the caller and one habit
#[derive(Debug, Deserialize)]
pub struct HabitParams {
    pub user_id: String,
    pub habit_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateParams {
    pub user_id: String,
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
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Absent fields are left unchanged; `null` clears a nullable field
#[derive(Debug, Deserialize)]
pub struct UpdateParams {
    pub user_id: String,
    pub habit_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
    #[serde(default)]
    pub weekly_frequency: Option<u32>,
    #[serde(default, deserialize_with = "present")]
    pub target_count: Option<Option<u32>>,
    #[serde(default, deserialize_with = "present")]
    pub color: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub icon: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub end_date: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleParams {
    pub user_id: String,
    pub habit_id: String,
    /// Defaults to today
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionRangeParams {
    pub user_id: String,
    pub habit_id: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderParams {
    pub user_id: String,
    pub habit_id: String,
    pub new_position: i64,
}

/// Wraps a field that was present in the payload, even as `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A habit id the client sent
///
/// Malformed ids cannot name an existing habit, so they are reported the
/// same way as unknown ones.
pub fn habit_id(raw: &str) -> Option<HabitId> {
    HabitId::from_string(raw).ok()
}

pub fn user_id(raw: &str) -> UserId {
    UserId::new(raw)
}

pub fn optional_day(raw: Option<&str>) -> Result<Option<Day>, DomainError> {
    raw.map(parse_day).transpose()
}

impl CreateParams {
    pub fn into_new_habit(self) -> Result<(UserId, NewHabit), DomainError> {
        let start_date = optional_day(self.start_date.as_deref())?;
        let end_date = optional_day(self.end_date.as_deref())?;
        let new_habit = NewHabit {
            name: self.name,
            description: self.description,
            category: self.category,
            weekly_frequency: self.weekly_frequency,
            target_count: self.target_count,
            color: self.color,
            icon: self.icon,
            start_date,
            end_date,
        };
        Ok((user_id(&self.user_id), new_habit))
    }
}

impl UpdateParams {
    pub fn to_update(&self) -> Result<HabitUpdate, DomainError> {
        let end_date = match &self.end_date {
            None => None,
            Some(value) => Some(optional_day(value.as_deref())?),
        };
        Ok(HabitUpdate {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            weekly_frequency: self.weekly_frequency,
            target_count: self.target_count,
            color: self.color.clone(),
            icon: self.icon.clone(),
            end_date,
        })
    }
}
