use std::sync::Arc;

use crate::config::Config;
use crate::notifications::service::NotificationService;
use crate::tracking::service::TimeTrackingService;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Services are built once in `main` and shared behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub time_tracking: Arc<TimeTrackingService>,
    pub notifications: Arc<NotificationService>,
}
