pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::notifications::handlers as notifications;
use crate::state::AppState;
use crate::tracking::handlers as tracking;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api/v1/time-tracking", time_tracking_routes())
        .nest("/api/v1/notifications", notification_routes())
        .with_state(state)
}

fn time_tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/projects/progress", get(tracking::handle_all_projects_progress))
        .route(
            "/projects/:project_id/progress",
            get(tracking::handle_project_progress),
        )
        .route("/deadlines", get(tracking::handle_deadlines))
        .route("/timeline", get(tracking::handle_timeline))
        .route("/stats", get(tracking::handle_stats))
        .route("/update-statuses", post(tracking::handle_update_statuses))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::handle_list))
        .route("/count", get(notifications::handle_count))
        .route("/stats", get(notifications::handle_stats))
        .route("/read-all", put(notifications::handle_mark_all_read))
        .route("/:id/read", put(notifications::handle_mark_read))
        .route("/:id", delete(notifications::handle_delete))
        .route(
            "/process-deadlines",
            post(notifications::handle_process_deadlines),
        )
        .route("/milestone", post(notifications::handle_milestone))
        .route("/completion", post(notifications::handle_completion))
        .route("/progress", post(notifications::handle_progress))
}
