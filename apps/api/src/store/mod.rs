//! Storage seams for the time-tracking and notification services.
//!
//! Services hold `Arc<dyn ProjectStore>` / `Arc<dyn NotificationStore>` so the
//! backend is chosen once at startup. `PgStore` is the production backend.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::notification::{NewNotification, NotificationRow};
use crate::models::project::ProjectRow;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn find_project(&self, project_id: Uuid) -> Result<Option<ProjectRow>>;

    /// All of a user's projects ordered by `target_end_date` ascending.
    async fn list_projects_for_user(&self, user_id: Uuid) -> Result<Vec<ProjectRow>>;

    /// Moves every PLANNING / IN_PROGRESS project whose deadline is before
    /// `now` to PAUSED. Returns the number of projects changed.
    async fn pause_overdue_projects(&self, now: DateTime<Utc>) -> Result<u64>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Inserts a notification. Returns `None` when a row with the same
    /// `(user_id, dedup_key)` already exists.
    async fn insert_notification(&self, new: NewNotification) -> Result<Option<NotificationRow>>;

    /// Newest first.
    async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NotificationRow>>;

    async fn count_notifications(&self, user_id: Uuid, unread_only: bool) -> Result<i64>;

    async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> Result<u64>;

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64>;

    async fn delete_notification(&self, notification_id: Uuid, user_id: Uuid) -> Result<u64>;

    /// Deletes read notifications created before `cutoff`.
    async fn delete_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
