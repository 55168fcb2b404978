//! In-process store used by the test suite. Mirrors the semantics of the
//! Postgres queries in `postgres.rs`, including bulk update/delete counts.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::clock::{Clock, FixedClock, SystemClock};
use crate::models::notification::{NewNotification, NotificationRow};
use crate::models::project::{ProjectRow, ProjectStatus};
use crate::store::{NotificationStore, ProjectStore};

pub struct MemoryStore {
    projects: RwLock<Vec<ProjectRow>>,
    notifications: RwLock<Vec<NotificationRow>>,
    /// Stamps `created_at`, standing in for the column's `DEFAULT NOW()`.
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// A store whose inserts are stamped with `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self::with_clock(Arc::new(FixedClock(now)))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            projects: RwLock::default(),
            notifications: RwLock::default(),
            clock,
        }
    }

    pub async fn insert_project(&self, project: ProjectRow) {
        self.projects.write().await.push(project);
    }

    pub async fn project(&self, project_id: Uuid) -> Option<ProjectRow> {
        self.projects
            .read()
            .await
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
    }

    /// Inserts a fully formed row, bypassing `insert_notification`, so tests
    /// can control `created_at` and `read`.
    pub async fn insert_notification_row(&self, row: NotificationRow) {
        self.notifications.write().await.push(row);
    }

    pub async fn notification_ids(&self) -> Vec<Uuid> {
        self.notifications.read().await.iter().map(|n| n.id).collect()
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn find_project(&self, project_id: Uuid) -> Result<Option<ProjectRow>> {
        Ok(self.project(project_id).await)
    }

    async fn list_projects_for_user(&self, user_id: Uuid) -> Result<Vec<ProjectRow>> {
        let mut projects: Vec<ProjectRow> = self
            .projects
            .read()
            .await
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| {
            a.target_end_date
                .cmp(&b.target_end_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(projects)
    }

    async fn pause_overdue_projects(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut updated = 0;
        for project in self.projects.write().await.iter_mut() {
            let sweepable = project.status().is_some_and(|s| s.is_sweepable());
            if sweepable && project.target_end_date < now {
                project.status = ProjectStatus::Paused.as_str().to_string();
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&self, new: NewNotification) -> Result<Option<NotificationRow>> {
        let mut rows = self.notifications.write().await;
        if let Some(key) = &new.dedup_key {
            let exists = rows
                .iter()
                .any(|r| r.user_id == new.user_id && r.dedup_key.as_ref() == Some(key));
            if exists {
                return Ok(None);
            }
        }

        let row = NotificationRow {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            notification_type: new.notification_type.as_str().to_string(),
            title: new.title,
            message: new.message,
            priority: new.priority.as_str().to_string(),
            read: false,
            metadata: Some(new.metadata),
            dedup_key: new.dedup_key,
            created_at: self.clock.now(),
        };
        rows.push(row.clone());
        Ok(Some(row))
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NotificationRow>> {
        let rows = self.notifications.read().await;
        // Insertion order breaks ties between rows created in the same instant.
        let mut matching: Vec<(usize, &NotificationRow)> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.user_id == user_id && (!unread_only || !r.read))
            .collect();
        matching.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));

        Ok(matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn count_notifications(&self, user_id: Uuid, unread_only: bool) -> Result<i64> {
        Ok(self
            .notifications
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id && (!unread_only || !r.read))
            .count() as i64)
    }

    async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> Result<u64> {
        let mut updated = 0;
        for row in self.notifications.write().await.iter_mut() {
            if row.id == notification_id && row.user_id == user_id {
                row.read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let mut updated = 0;
        for row in self.notifications.write().await.iter_mut() {
            if row.user_id == user_id && !row.read {
                row.read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete_notification(&self, notification_id: Uuid, user_id: Uuid) -> Result<u64> {
        let mut rows = self.notifications.write().await;
        let before = rows.len();
        rows.retain(|r| !(r.id == notification_id && r.user_id == user_id));
        Ok((before - rows.len()) as u64)
    }

    async fn delete_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut rows = self.notifications.write().await;
        let before = rows.len();
        rows.retain(|r| !(r.read && r.created_at < cutoff));
        Ok((before - rows.len()) as u64)
    }
}
