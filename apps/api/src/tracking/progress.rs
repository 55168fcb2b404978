//! Deadline and progress arithmetic over project rows.
//!
//! Every function here is pure: "now" is passed in by the caller so results are
//! reproducible. Day counts are ceilings of the millisecond difference divided
//! by one day, so a deadline later today is 1 day away and a deadline that
//! passed a moment ago is 0.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::project::{ProjectRow, ProjectStatus};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Projects due within this many days (or already overdue) raise deadline alerts.
pub const DEADLINE_WINDOW_DAYS: i64 = 7;

/// Status-based adjustments applied to raw elapsed-time progress.
///
/// These are display heuristics, not measurements of work done.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionPolicy {
    /// Percentage points added for IN_PROGRESS projects.
    pub in_progress_bonus: f64,
    /// Multiplier applied to PAUSED projects.
    pub paused_factor: f64,
    /// Ceiling for PLANNING projects.
    pub planning_cap: f64,
}

impl Default for CompletionPolicy {
    fn default() -> Self {
        Self {
            in_progress_bonus: 25.0,
            paused_factor: 0.5,
            planning_cap: 20.0,
        }
    }
}

impl CompletionPolicy {
    pub fn completion_rate(&self, status: Option<ProjectStatus>, progress: f64) -> f64 {
        match status {
            Some(ProjectStatus::Completed) => 100.0,
            Some(ProjectStatus::InProgress) => (progress + self.in_progress_bonus).min(100.0),
            Some(ProjectStatus::Paused) => progress * self.paused_factor,
            Some(ProjectStatus::Planning) => progress.min(self.planning_cap),
            None => progress,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn classify(is_overdue: bool, days_until_deadline: i64) -> Self {
        if is_overdue {
            Urgency::Critical
        } else if days_until_deadline <= 1 {
            Urgency::High
        } else if days_until_deadline <= 3 {
            Urgency::Medium
        } else {
            Urgency::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProgress {
    pub project_id: Uuid,
    pub title: String,
    pub status: String,
    pub progress: f64,
    pub time_remaining: i64,
    pub is_overdue: bool,
    pub days_until_deadline: i64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineNotification {
    pub project_id: Uuid,
    pub title: String,
    pub days_until_deadline: i64,
    pub is_overdue: bool,
    pub urgency: Urgency,
}

/// Whole days from `from` to `to`, rounded up.
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let millis = (to - from).num_milliseconds() as f64;
    // -0.0 casts to 0
    (millis / MILLIS_PER_DAY).ceil() as i64
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Elapsed-time progress percentage in `[0, 100]`.
///
/// Projects whose deadline is on or before their start date are treated as
/// one day long instead of dividing by zero or a negative duration.
pub fn elapsed_progress(project: &ProjectRow, now: DateTime<Utc>) -> f64 {
    let total_duration = days_between(project.start_date, project.target_end_date).max(1);
    let elapsed_days = days_between(project.start_date, now);
    (elapsed_days as f64 / total_duration as f64 * 100.0).clamp(0.0, 100.0)
}

pub fn project_progress(
    project: &ProjectRow,
    now: DateTime<Utc>,
    policy: &CompletionPolicy,
) -> ProjectProgress {
    let remaining_days = days_between(now, project.target_end_date);
    let progress = elapsed_progress(project, now);
    let completion_rate = policy.completion_rate(project.status(), progress);

    ProjectProgress {
        project_id: project.id,
        title: project.title.clone(),
        status: project.status.clone(),
        progress: round2(progress),
        time_remaining: remaining_days.max(0),
        is_overdue: remaining_days < 0,
        days_until_deadline: remaining_days,
        completion_rate: round2(completion_rate),
    }
}

/// Deadline alert for a project, or `None` when it is completed or its
/// deadline is further out than [`DEADLINE_WINDOW_DAYS`].
pub fn deadline_notification(
    project: &ProjectRow,
    now: DateTime<Utc>,
) -> Option<DeadlineNotification> {
    if project.is_completed() {
        return None;
    }
    let days_until_deadline = days_between(now, project.target_end_date);
    if days_until_deadline > DEADLINE_WINDOW_DAYS {
        return None;
    }
    let is_overdue = days_until_deadline < 0;
    Some(DeadlineNotification {
        project_id: project.id,
        title: project.title.clone(),
        days_until_deadline,
        is_overdue,
        urgency: Urgency::classify(is_overdue, days_until_deadline),
    })
}

/// Deadline alerts for `projects`, most urgent (lowest day count) first.
pub fn deadline_notifications(
    projects: &[ProjectRow],
    now: DateTime<Utc>,
) -> Vec<DeadlineNotification> {
    let mut alerts: Vec<DeadlineNotification> = projects
        .iter()
        .filter_map(|p| deadline_notification(p, now))
        .collect();
    alerts.sort_by_key(|a| a.days_until_deadline);
    alerts
}
