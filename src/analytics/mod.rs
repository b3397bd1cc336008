/// Analytics engine for statistics and insights
///
/// This module derives per-habit and per-user statistics from completion
/// history: success rate, streaks, weekday and month patterns, rolling
/// weekly/monthly series, perfect weeks and rule-based insights. Everything
/// here is a pure function of its inputs and today's date.

pub mod insights;
pub mod patterns;
pub mod windows;

pub use insights::{Insight, InsightKind};
pub use patterns::{MonthPattern, WeekdayPattern};
pub use windows::{SeriesPoint, Window};

use serde::Serialize;

use crate::domain::{current_streak, longest_recorded_streak, CompletionIndex, Day, Habit, HabitCompletion, HabitId};
use insights::{HabitSignals, UserSignals};

/// Weeks in the weekly series
pub const WEEKLY_SERIES_WEEKS: usize = 12;
/// Months in the monthly series
pub const MONTHLY_SERIES_MONTHS: usize = 6;
/// Weeks scanned for perfect weeks
pub const PERFECT_WEEK_SCAN: usize = 8;

/// Detailed statistics for one habit
#[derive(Debug, Clone, Serialize)]
pub struct HabitStatistics {
    pub habit_id: HabitId,
    pub name: String,
    pub weekly_frequency: u32,
    pub total_completions: usize,
    /// Percentage in `[0, 100]`
    pub success_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub completions_this_week: usize,
    pub best_weekday: Option<WeekdayPattern>,
    pub best_month: Option<MonthPattern>,
    pub weekly_series: Vec<SeriesPoint>,
    pub monthly_series: Vec<SeriesPoint>,
    pub insights: Vec<Insight>,
}

/// Short per-habit line inside the user statistics
#[derive(Debug, Clone, Serialize)]
pub struct HabitSummary {
    pub habit_id: HabitId,
    pub name: String,
    pub current_streak: u32,
    pub success_rate: f64,
}

/// Statistics across all of a user's habits
#[derive(Debug, Clone, Serialize)]
pub struct UserStatistics {
    pub active_habits: usize,
    pub archived_habits: usize,
    pub total_completions: usize,
    pub completions_today: usize,
    /// Mean success rate of the active habits
    pub success_rate: f64,
    pub best_current_streak: u32,
    pub longest_streak: u32,
    pub perfect_weeks: u32,
    pub best_weekday: Option<WeekdayPattern>,
    pub habits: Vec<HabitSummary>,
    pub insights: Vec<Insight>,
}

/// Analytics engine for processing habit data
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self
    }

    /// Statistics for one habit given its full completion history
    pub fn habit_statistics(&self, habit: &Habit, completions: &[HabitCompletion], today: Day) -> HabitStatistics {
        let index = CompletionIndex::from_records(completions);
        let done: Vec<Day> = completed_days(habit, &index, today);

        let current = current_streak(&index, today, today, habit.start_date());
        let longest = longest_recorded_streak(completions).max(current);
        let this_week = windows::week_of(today).count_in(done.iter().copied());
        let success_rate = self.success_rate(habit, done.len(), today);
        let best_weekday = patterns::best_weekday(done.iter().copied());

        let insights = insights::habit_insights(&HabitSignals {
            name: &habit.name,
            total_completions: done.len(),
            success_rate,
            current_streak: current,
            completions_this_week: this_week,
            weekly_frequency: habit.weekly_frequency,
            best_weekday: best_weekday.as_ref().map(|p| p.weekday.as_str()),
        });

        HabitStatistics {
            habit_id: habit.id.clone(),
            name: habit.name.clone(),
            weekly_frequency: habit.weekly_frequency,
            total_completions: done.len(),
            success_rate,
            current_streak: current,
            longest_streak: longest,
            completions_this_week: this_week,
            best_month: patterns::best_month(done.iter().copied()),
            best_weekday,
            weekly_series: windows::weekly_series(done.iter().copied(), today, WEEKLY_SERIES_WEEKS),
            monthly_series: windows::monthly_series(done.iter().copied(), today, MONTHLY_SERIES_MONTHS),
            insights,
        }
    }

    /// Statistics across every habit of a user, archived ones included
    ///
    /// Rates, streaks and perfect weeks only consider active habits; totals
    /// count the history of archived habits too.
    pub fn user_statistics(&self, habits: &[(Habit, Vec<HabitCompletion>)], today: Day) -> UserStatistics {
        let mut summaries = Vec::new();
        let mut active = Vec::new();
        let mut all_days = Vec::new();
        let mut longest = 0;

        for (habit, completions) in habits {
            let index = CompletionIndex::from_records(completions);
            let done = completed_days(habit, &index, today);
            all_days.extend(done.iter().copied());

            if !habit.is_active() {
                continue;
            }

            let current = current_streak(&index, today, today, habit.start_date());
            longest = longest.max(longest_recorded_streak(completions).max(current));
            summaries.push(HabitSummary {
                habit_id: habit.id.clone(),
                name: habit.name.clone(),
                current_streak: current,
                success_rate: self.success_rate(habit, done.len(), today),
            });
            active.push((habit, index));
        }

        let success_rate = if summaries.is_empty() {
            0.0
        } else {
            summaries.iter().map(|s| s.success_rate).sum::<f64>() / summaries.len() as f64
        };
        let best_current_streak = summaries.iter().map(|s| s.current_streak).max().unwrap_or(0);
        let perfect_weeks = perfect_weeks(&active, today, PERFECT_WEEK_SCAN);

        let insights = insights::user_insights(&UserSignals {
            active_habits: summaries.len(),
            total_completions: all_days.len(),
            success_rate,
            best_current_streak,
            perfect_weeks,
            weeks_scanned: PERFECT_WEEK_SCAN as u32,
        });

        UserStatistics {
            active_habits: summaries.len(),
            archived_habits: habits.len() - summaries.len(),
            total_completions: all_days.len(),
            completions_today: all_days.iter().filter(|d| **d == today).count(),
            success_rate,
            best_current_streak,
            longest_streak: longest,
            perfect_weeks,
            best_weekday: patterns::best_weekday(all_days.iter().copied()),
            habits: summaries,
            insights,
        }
    }

    /// Completions achieved as a percentage of those expected since the start
    ///
    /// Always within `[0, 100]`; 0 for habits started today or with nothing
    /// expected yet.
    pub fn success_rate(&self, habit: &Habit, completions: usize, today: Day) -> f64 {
        let days_since_start = (today - habit.start_date()).num_days();
        if days_since_start <= 0 {
            return 0.0;
        }

        let expected = days_since_start as f64 / 7.0 * f64::from(habit.weekly_frequency);
        if expected <= 0.0 {
            return 0.0;
        }

        (completions as f64 / expected * 100.0).clamp(0.0, 100.0)
    }
}

/// Completed days within `[start, today]`, ascending
fn completed_days(habit: &Habit, index: &CompletionIndex, today: Day) -> Vec<Day> {
    let mut days: Vec<Day> = index
        .days()
        .filter(|d| *d >= habit.start_date() && *d <= today)
        .collect();
    days.sort();
    days
}

/// Weeks among the last `weeks` in which every participating habit met its
/// weekly frequency
///
/// A habit participates in a week once it has started by the week's last
/// day. Weeks nobody participates in are not perfect.
pub fn perfect_weeks(habits: &[(&Habit, CompletionIndex)], today: Day, weeks: usize) -> u32 {
    windows::last_weeks(today, weeks)
        .into_iter()
        .filter(|week| {
            let mut participants = habits.iter().filter(|(h, _)| h.start_date() <= week.end).peekable();
            participants.peek().is_some()
                && participants.all(|(habit, index)| week.count_in(index.days()) >= habit.weekly_frequency as usize)
        })
        .count() as u32
}
