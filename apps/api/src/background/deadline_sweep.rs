//! Periodic deadline sweep and notification retention.
//!
//! On every tick the job pauses overdue projects and then deletes read
//! notifications past the retention window. A failed tick is logged and the
//! loop carries on.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::notifications::service::NotificationService;
use crate::tracking::service::TimeTrackingService;

/// Counts from a single sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    pub paused_projects: u64,
    pub deleted_notifications: u64,
}

/// Runs one sweep. Each half is attempted even if the other fails.
pub async fn run_once(
    time_tracking: &TimeTrackingService,
    notifications: &NotificationService,
) -> SweepOutcome {
    let mut outcome = SweepOutcome::default();

    match time_tracking.update_project_status_by_deadline().await {
        Ok(paused) => outcome.paused_projects = paused,
        Err(e) => tracing::error!(error = %e, "Deadline sweep: status update failed"),
    }

    match notifications.cleanup_old_notifications().await {
        Ok(deleted) => outcome.deleted_notifications = deleted,
        Err(e) => tracing::error!(error = %e, "Deadline sweep: notification cleanup failed"),
    }

    outcome
}

/// Run the sweep loop every `interval` until `cancel` is triggered.
pub async fn run(
    time_tracking: Arc<TimeTrackingService>,
    notifications: Arc<NotificationService>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Deadline sweep job started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Deadline sweep job stopping");
                break;
            }
            _ = ticker.tick() => {
                let outcome = run_once(&time_tracking, &notifications).await;
                tracing::debug!(
                    paused = outcome.paused_projects,
                    deleted = outcome.deleted_notifications,
                    "Deadline sweep tick complete"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, FixedClock};
    use crate::models::notification::NotificationRow;
    use crate::models::project::ProjectStatus;
    use crate::store::memory::MemoryStore;
    use crate::tracking::progress::tests::{at, project};
    use crate::tracking::progress::CompletionPolicy;
    use uuid::Uuid;

    fn services(store: Arc<MemoryStore>) -> (Arc<TimeTrackingService>, Arc<NotificationService>) {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(at(2024, 3, 1)));
        let tracking = Arc::new(TimeTrackingService::new(
            store.clone(),
            clock.clone(),
            CompletionPolicy::default(),
        ));
        let notifications = Arc::new(NotificationService::new(
            store,
            tracking.clone(),
            clock,
            false,
        ));
        (tracking, notifications)
    }

    #[tokio::test]
    async fn test_run_once_pauses_and_cleans() {
        let store = Arc::new(MemoryStore::at(at(2024, 3, 1)));
        store
            .insert_project(project(
                ProjectStatus::InProgress,
                at(2024, 1, 1),
                at(2024, 2, 1),
            ))
            .await;
        store
            .insert_notification_row(NotificationRow {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                notification_type: "system".into(),
                title: "t".into(),
                message: "m".into(),
                priority: "medium".into(),
                read: true,
                metadata: None,
                dedup_key: None,
                created_at: at(2024, 1, 1),
            })
            .await;
        let (tracking, notifications) = services(store);

        let outcome = run_once(&tracking, &notifications).await;
        assert_eq!(
            outcome,
            SweepOutcome {
                paused_projects: 1,
                deleted_notifications: 1,
            }
        );
        assert_eq!(run_once(&tracking, &notifications).await, SweepOutcome::default());
    }

    #[tokio::test]
    async fn test_loop_stops_on_cancel() {
        let store = Arc::new(MemoryStore::at(at(2024, 3, 1)));
        let (tracking, notifications) = services(store);
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run(
            tracking,
            notifications,
            Duration::from_millis(10),
            cancel.clone(),
        ));
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweep loop did not stop")
            .unwrap();
    }
}
