/// Habit-creation limits
///
/// Subscription tiers live outside this crate. The engine only asks the gate
/// whether a user may create one more habit; toggling completions on existing
/// habits is never limited.

use crate::domain::UserId;

/// Answers "can this user create one more habit?"
pub trait LimitGate: Send + Sync {
    /// `active_habits` is the number of active habits the user owns right now
    fn can_create_habit(&self, user_id: &UserId, active_habits: usize) -> bool;
}

/// No limit at all
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

impl LimitGate for Unlimited {
    fn can_create_habit(&self, _user_id: &UserId, _active_habits: usize) -> bool {
        true
    }
}

/// The same fixed cap on active habits for every user
#[derive(Debug, Clone, Copy)]
pub struct HabitCap {
    pub max_active_habits: usize,
}

impl HabitCap {
    pub fn new(max_active_habits: usize) -> Self {
        Self { max_active_habits }
    }
}

impl LimitGate for HabitCap {
    fn can_create_habit(&self, _user_id: &UserId, active_habits: usize) -> bool {
        active_habits < self.max_active_habits
    }
}
