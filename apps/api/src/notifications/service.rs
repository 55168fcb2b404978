use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::models::notification::{encode_metadata, Metadata, NewNotification, Notification};
use crate::notifications::templates::{render, TemplateKey};
use crate::store::NotificationStore;
use crate::tracking::service::TimeTrackingService;

/// Read notifications older than this are removed by the cleanup sweep.
pub const NOTIFICATION_RETENTION_DAYS: i64 = 30;

/// Default page size for [`NotificationService::get_user_notifications`].
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Number of rows folded by [`NotificationService::get_notification_stats`].
const STATS_SAMPLE_SIZE: i64 = 1000;

/// Progress notifications fire on exact multiples of this percentage.
const PROGRESS_STEP: f64 = 25.0;

#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    pub unread_only: bool,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            unread_only: false,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStats {
    pub total: usize,
    pub unread: usize,
    pub by_priority: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
}

/// Template-driven notification creation and the per-user inbox.
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    time_tracking: Arc<TimeTrackingService>,
    clock: Arc<dyn Clock>,
    /// Attach a per-project, per-day idempotency key to deadline notifications.
    dedup_deadlines: bool,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        time_tracking: Arc<TimeTrackingService>,
        clock: Arc<dyn Clock>,
        dedup_deadlines: bool,
    ) -> Self {
        Self {
            store,
            time_tracking,
            clock,
            dedup_deadlines,
        }
    }

    pub async fn create_notification(
        &self,
        user_id: Uuid,
        key: TemplateKey,
        metadata: Metadata,
    ) -> Result<Notification> {
        self.insert_from_template(user_id, key, metadata, None)
            .await?
            .context("notification insert without a dedup key returned no row")
    }

    /// Returns `None` when `dedup_key` was already used for this user.
    async fn insert_from_template(
        &self,
        user_id: Uuid,
        key: TemplateKey,
        metadata: Metadata,
        dedup_key: Option<String>,
    ) -> Result<Option<Notification>> {
        let template = key.template();
        let new = NewNotification {
            user_id,
            notification_type: template.notification_type,
            title: render(template.title, &metadata),
            message: render(template.message, &metadata),
            priority: template.priority,
            metadata: encode_metadata(&metadata),
            dedup_key,
        };

        let row = self.store.insert_notification(new).await?;
        match &row {
            Some(r) => debug!(
                "Created {} notification {} for user {user_id} (dedup key: {:?})",
                key.as_str(),
                r.id,
                r.dedup_key
            ),
            None => debug!("Skipped duplicate {} notification for user {user_id}", key.as_str()),
        }
        Ok(row.map(Notification::from))
    }

    /// Newest first.
    pub async fn get_user_notifications(
        &self,
        user_id: Uuid,
        options: ListOptions,
    ) -> Result<Vec<Notification>> {
        let rows = self
            .store
            .list_notifications(user_id, options.unread_only, options.limit, options.offset)
            .await?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }

    /// Number of rows updated; zero when the notification is missing or
    /// owned by another user.
    pub async fn mark_as_read(&self, notification_id: Uuid, user_id: Uuid) -> Result<u64> {
        self.store.mark_read(notification_id, user_id).await
    }

    pub async fn mark_all_as_read(&self, user_id: Uuid) -> Result<u64> {
        self.store.mark_all_read(user_id).await
    }

    pub async fn delete_notification(&self, notification_id: Uuid, user_id: Uuid) -> Result<u64> {
        self.store
            .delete_notification(notification_id, user_id)
            .await
    }

    pub async fn get_notification_count(&self, user_id: Uuid, unread_only: bool) -> Result<i64> {
        self.store.count_notifications(user_id, unread_only).await
    }

    /// Creates one notification per deadline alert for `user_id`.
    ///
    /// Without dedup every call creates a fresh batch. With dedup a project
    /// produces at most one deadline notification per calendar day.
    pub async fn process_deadline_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let alerts = self.time_tracking.get_deadline_notifications(user_id).await?;
        let bucket = self.clock.now().format("%Y-%m-%d").to_string();

        let mut created = Vec::with_capacity(alerts.len());
        for alert in alerts {
            let (key, days) = if alert.is_overdue {
                (TemplateKey::DeadlineOverdue, alert.days_until_deadline.abs())
            } else {
                (TemplateKey::DeadlineApproaching, alert.days_until_deadline)
            };

            let mut metadata = Metadata::new();
            metadata.insert("projectId".into(), json!(alert.project_id));
            metadata.insert("projectTitle".into(), json!(alert.title));
            metadata.insert("days".into(), json!(days));

            let dedup_key = self
                .dedup_deadlines
                .then(|| format!("deadline:{}:{bucket}", alert.project_id));

            if let Some(n) = self
                .insert_from_template(user_id, key, metadata, dedup_key)
                .await?
            {
                created.push(n);
            }
        }

        info!(
            "Processed deadline notifications for user {user_id}: {} created",
            created.len()
        );
        Ok(created)
    }

    pub async fn create_milestone_notification(
        &self,
        user_id: Uuid,
        project_title: &str,
        milestone: &str,
    ) -> Result<Notification> {
        let mut metadata = Metadata::new();
        metadata.insert("projectTitle".into(), json!(project_title));
        metadata.insert("milestone".into(), json!(milestone));
        self.create_notification(user_id, TemplateKey::MilestoneReached, metadata)
            .await
    }

    pub async fn create_project_completion_notification(
        &self,
        user_id: Uuid,
        project_title: &str,
    ) -> Result<Notification> {
        let mut metadata = Metadata::new();
        metadata.insert("projectTitle".into(), json!(project_title));
        self.create_notification(user_id, TemplateKey::ProjectCompleted, metadata)
            .await
    }

    /// Notifies only at 25 / 50 / 75 / 100 / ... percent; anything else is
    /// ignored and yields `None`.
    pub async fn create_progress_notification(
        &self,
        user_id: Uuid,
        project_title: &str,
        progress: f64,
    ) -> Result<Option<Notification>> {
        if !is_progress_milestone(progress) {
            debug!("Progress {progress}% for \"{project_title}\" is not a milestone");
            return Ok(None);
        }

        let mut metadata = Metadata::new();
        metadata.insert("projectTitle".into(), json!(project_title));
        metadata.insert("progress".into(), percent_value(progress));
        let notification = self
            .create_notification(user_id, TemplateKey::ProgressUpdate, metadata)
            .await?;
        Ok(Some(notification))
    }

    /// Deletes read notifications older than [`NOTIFICATION_RETENTION_DAYS`].
    /// Unread notifications are kept regardless of age.
    pub async fn cleanup_old_notifications(&self) -> Result<u64> {
        let cutoff = self.clock.now() - Duration::days(NOTIFICATION_RETENTION_DAYS);
        let deleted = self.store.delete_read_before(cutoff).await?;
        if deleted > 0 {
            info!("Notification cleanup removed {deleted} read notification(s)");
        } else {
            debug!("Notification cleanup: nothing to remove");
        }
        Ok(deleted)
    }

    pub async fn get_notification_stats(&self, user_id: Uuid) -> Result<NotificationStats> {
        let rows = self
            .store
            .list_notifications(user_id, false, STATS_SAMPLE_SIZE, 0)
            .await?;

        let mut stats = NotificationStats {
            total: rows.len(),
            ..Default::default()
        };
        for row in &rows {
            if !row.read {
                stats.unread += 1;
            }
            *stats.by_priority.entry(row.priority.clone()).or_default() += 1;
            *stats
                .by_type
                .entry(row.notification_type.clone())
                .or_default() += 1;
        }
        Ok(stats)
    }
}

pub fn is_progress_milestone(progress: f64) -> bool {
    progress >= PROGRESS_STEP && progress % PROGRESS_STEP == 0.0
}

/// Whole percentages render as integers ("50", not "50.0").
fn percent_value(progress: f64) -> Value {
    if progress.fract() == 0.0 && progress.abs() < i64::MAX as f64 {
        json!(progress as i64)
    } else {
        json!(progress)
    }
}
