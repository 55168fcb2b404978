use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    Paused,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Planning,
        ProjectStatus::InProgress,
        ProjectStatus::Paused,
        ProjectStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "PLANNING",
            ProjectStatus::InProgress => "IN_PROGRESS",
            ProjectStatus::Paused => "PAUSED",
            ProjectStatus::Completed => "COMPLETED",
        }
    }

    /// Parses the stored status column. Unrecognised values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PLANNING" => Some(ProjectStatus::Planning),
            "IN_PROGRESS" => Some(ProjectStatus::InProgress),
            "PAUSED" => Some(ProjectStatus::Paused),
            "COMPLETED" => Some(ProjectStatus::Completed),
            _ => None,
        }
    }

    /// Statuses the deadline sweep moves to `Paused` once overdue.
    pub fn is_sweepable(&self) -> bool {
        matches!(self, ProjectStatus::Planning | ProjectStatus::InProgress)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub target_end_date: DateTime<Utc>,
    pub actual_end_date: Option<DateTime<Utc>>,
}

impl ProjectRow {
    pub fn status(&self) -> Option<ProjectStatus> {
        ProjectStatus::parse(&self.status)
    }

    pub fn is_completed(&self) -> bool {
        self.status() == Some(ProjectStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_column_text() {
        for status in ProjectStatus::ALL {
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_unknown_status_is_none() {
        assert_eq!(ProjectStatus::parse("ARCHIVED"), None);
        assert_eq!(ProjectStatus::parse("in_progress"), None);
    }

    #[test]
    fn test_only_active_statuses_are_sweepable() {
        assert!(ProjectStatus::Planning.is_sweepable());
        assert!(ProjectStatus::InProgress.is_sweepable());
        assert!(!ProjectStatus::Paused.is_sweepable());
        assert!(!ProjectStatus::Completed.is_sweepable());
    }
}
