use std::sync::Arc;

use anyhow::Result;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::models::project::ProjectStatus;
use crate::store::ProjectStore;
use crate::tracking::progress::{
    days_between, deadline_notifications, project_progress, round2, CompletionPolicy,
    DeadlineNotification, ProjectProgress, DEADLINE_WINDOW_DAYS,
};

/// Parallel series for charting, one entry per project ordered by deadline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectTimeline {
    pub labels: Vec<String>,
    pub progress: Vec<f64>,
    /// `YYYY-MM-DD`
    pub deadlines: Vec<String>,
    pub overdue: Vec<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProgressStats {
    pub total_projects: usize,
    pub completed_projects: usize,
    pub in_progress_projects: usize,
    pub overdue_projects: usize,
    pub average_progress: f64,
    pub upcoming_deadlines: usize,
}

/// Progress, deadline and overdue computations over a user's projects.
pub struct TimeTrackingService {
    projects: Arc<dyn ProjectStore>,
    clock: Arc<dyn Clock>,
    policy: CompletionPolicy,
}

impl TimeTrackingService {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        clock: Arc<dyn Clock>,
        policy: CompletionPolicy,
    ) -> Self {
        Self {
            projects,
            clock,
            policy,
        }
    }

    /// Progress for a single project; `None` if it does not exist.
    pub async fn calculate_project_progress(
        &self,
        project_id: Uuid,
    ) -> Result<Option<ProjectProgress>> {
        let Some(project) = self.projects.find_project(project_id).await? else {
            return Ok(None);
        };
        Ok(Some(project_progress(&project, self.clock.now(), &self.policy)))
    }

    /// Like [`Self::calculate_project_progress`] but also `None` when the
    /// project belongs to someone else.
    pub async fn project_progress_for_user(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Result<Option<ProjectProgress>> {
        let Some(project) = self.projects.find_project(project_id).await? else {
            return Ok(None);
        };
        if project.user_id != user_id {
            return Ok(None);
        }
        Ok(Some(project_progress(&project, self.clock.now(), &self.policy)))
    }

    pub async fn get_all_projects_progress(&self, user_id: Uuid) -> Result<Vec<ProjectProgress>> {
        let projects = self.projects.list_projects_for_user(user_id).await?;

        let results = try_join_all(
            projects
                .iter()
                .map(|p| self.calculate_project_progress(p.id)),
        )
        .await?;

        Ok(results.into_iter().flatten().collect())
    }

    pub async fn get_deadline_notifications(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<DeadlineNotification>> {
        let projects = self.projects.list_projects_for_user(user_id).await?;
        Ok(deadline_notifications(&projects, self.clock.now()))
    }

    pub async fn get_project_timeline(&self, user_id: Uuid) -> Result<ProjectTimeline> {
        let projects = self.projects.list_projects_for_user(user_id).await?;
        let now = self.clock.now();

        let mut timeline = ProjectTimeline::default();
        for project in &projects {
            let progress = project_progress(project, now, &self.policy);
            timeline.labels.push(progress.title);
            timeline.progress.push(progress.progress);
            timeline
                .deadlines
                .push(project.target_end_date.format("%Y-%m-%d").to_string());
            timeline.overdue.push(progress.is_overdue);
        }
        Ok(timeline)
    }

    pub async fn get_user_progress_stats(&self, user_id: Uuid) -> Result<UserProgressStats> {
        let projects = self.projects.list_projects_for_user(user_id).await?;
        let now = self.clock.now();
        // Every figure comes from the one snapshot above.
        let progress: Vec<ProjectProgress> = projects
            .iter()
            .map(|p| project_progress(p, now, &self.policy))
            .collect();

        let count_status = |status: ProjectStatus| {
            projects
                .iter()
                .filter(|p| p.status() == Some(status))
                .count()
        };

        let average_progress = if progress.is_empty() {
            0.0
        } else {
            round2(progress.iter().map(|p| p.completion_rate).sum::<f64>() / progress.len() as f64)
        };

        let upcoming_deadlines = projects
            .iter()
            .filter(|p| {
                let days = days_between(now, p.target_end_date);
                days > 0 && days <= DEADLINE_WINDOW_DAYS
            })
            .count();

        Ok(UserProgressStats {
            total_projects: projects.len(),
            completed_projects: count_status(ProjectStatus::Completed),
            in_progress_projects: count_status(ProjectStatus::InProgress),
            overdue_projects: progress.iter().filter(|p| p.is_overdue).count(),
            average_progress,
            upcoming_deadlines,
        })
    }

    /// Deadline sweep: pauses every active project past its deadline.
    /// Idempotent; returns how many projects changed on this run.
    pub async fn update_project_status_by_deadline(&self) -> Result<u64> {
        let updated = self.projects.pause_overdue_projects(self.clock.now()).await?;
        if updated > 0 {
            info!("Deadline sweep paused {updated} overdue project(s)");
        } else {
            debug!("Deadline sweep found no overdue projects");
        }
        Ok(updated)
    }
}
