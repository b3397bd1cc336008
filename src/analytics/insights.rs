/// Rule-based insights
///
/// A fixed rule table over already computed numbers. Rules are evaluated in
/// priority order and each contributes at most one message, so the same
/// inputs always give the same list.

use serde::Serialize;

/// Which rule produced an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    GettingStarted,
    SuccessRate,
    Streak,
    WeeklyTarget,
    BestDay,
    PerfectWeeks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
}

impl Insight {
    fn new(kind: InsightKind, message: String) -> Self {
        Self { kind, message }
    }
}

/// Numbers a single habit's insights are derived from
#[derive(Debug, Clone)]
pub struct HabitSignals<'a> {
    pub name: &'a str,
    pub total_completions: usize,
    pub success_rate: f64,
    pub current_streak: u32,
    pub completions_this_week: usize,
    pub weekly_frequency: u32,
    pub best_weekday: Option<&'a str>,
}

/// Insights for one habit, highest priority first
pub fn habit_insights(signals: &HabitSignals<'_>) -> Vec<Insight> {
    let mut insights = Vec::new();

    if signals.total_completions == 0 {
        insights.push(Insight::new(
            InsightKind::GettingStarted,
            format!("No completions for '{}' yet. Today is a good day to start!", signals.name),
        ));
    }

    insights.push(Insight::new(InsightKind::SuccessRate, rate_band(signals.success_rate)));

    if signals.current_streak >= 7 {
        insights.push(Insight::new(
            InsightKind::Streak,
            format!("🔥 {} days in a row. Keep the streak alive!", signals.current_streak),
        ));
    }

    let done = signals.completions_this_week;
    let target = signals.weekly_frequency as usize;
    let weekly = if done >= target {
        format!("🎯 Weekly target met: {} of {} this week.", done, target)
    } else {
        format!(
            "{} more to reach this week's target of {} ({} done so far).",
            target - done,
            target,
            done
        )
    };
    insights.push(Insight::new(InsightKind::WeeklyTarget, weekly));

    if let Some(weekday) = signals.best_weekday {
        insights.push(Insight::new(
            InsightKind::BestDay,
            format!("You are most consistent on {}s.", weekday),
        ));
    }

    insights
}

/// Numbers a user's overall insights are derived from
#[derive(Debug, Clone)]
pub struct UserSignals {
    pub active_habits: usize,
    pub total_completions: usize,
    pub success_rate: f64,
    pub best_current_streak: u32,
    pub perfect_weeks: u32,
    pub weeks_scanned: u32,
}

/// Insights across all of a user's habits, highest priority first
pub fn user_insights(signals: &UserSignals) -> Vec<Insight> {
    if signals.active_habits == 0 {
        return vec![Insight::new(
            InsightKind::GettingStarted,
            "Start by creating your first habit to track!".to_string(),
        )];
    }

    let mut insights = Vec::new();

    if signals.total_completions == 0 {
        insights.push(Insight::new(
            InsightKind::GettingStarted,
            "Great job creating habits! Now start logging your progress.".to_string(),
        ));
    }

    insights.push(Insight::new(InsightKind::SuccessRate, rate_band(signals.success_rate)));

    if signals.best_current_streak >= 7 {
        insights.push(Insight::new(
            InsightKind::Streak,
            format!("🔥 Your best running streak is {} days.", signals.best_current_streak),
        ));
    }

    if signals.perfect_weeks > 0 {
        insights.push(Insight::new(
            InsightKind::PerfectWeeks,
            format!(
                "⭐ {} perfect week(s) in the last {}: every habit hit its target.",
                signals.perfect_weeks, signals.weeks_scanned
            ),
        ));
    }

    insights
}

fn rate_band(rate: f64) -> String {
    if rate >= 80.0 {
        format!("🌟 Excellent consistency: {:.0}% success rate.", rate)
    } else if rate >= 60.0 {
        format!("👍 Good progress: {:.0}% success rate.", rate)
    } else if rate >= 40.0 {
        format!("📈 {:.0}% success rate. A little more regularity will pay off.", rate)
    } else {
        format!("🌱 {:.0}% success rate. Try a smaller weekly target to build momentum.", rate)
    }
}
