//! Axum route handlers for the Time Tracking API.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::tracking::progress::{DeadlineNotification, ProjectProgress};
use crate::tracking::service::{ProjectTimeline, UserProgressStats};

#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub updated: u64,
}

/// GET /api/v1/time-tracking/projects/:projectId/progress
pub async fn handle_project_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    project_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<ProjectProgress>>, AppError> {
    let Path(project_id) = project_id?;

    let progress = state
        .time_tracking
        .project_progress_for_user(auth.user_id, project_id)
        .await?
        .ok_or_else(|| AppError::ProjectNotFound("Project not found".to_string()))?;

    Ok(Json(ApiResponse::ok(progress)))
}

/// GET /api/v1/time-tracking/projects/progress
pub async fn handle_all_projects_progress(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProjectProgress>>>, AppError> {
    let progress = state
        .time_tracking
        .get_all_projects_progress(auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(progress)))
}

/// GET /api/v1/time-tracking/deadlines
pub async fn handle_deadlines(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DeadlineNotification>>>, AppError> {
    let deadlines = state
        .time_tracking
        .get_deadline_notifications(auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(deadlines)))
}

/// GET /api/v1/time-tracking/timeline
pub async fn handle_timeline(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProjectTimeline>>, AppError> {
    let timeline = state.time_tracking.get_project_timeline(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(timeline)))
}

/// GET /api/v1/time-tracking/stats
pub async fn handle_stats(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserProgressStats>>, AppError> {
    let stats = state
        .time_tracking
        .get_user_progress_stats(auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// POST /api/v1/time-tracking/update-statuses
///
/// Runs the deadline sweep across all users. Requires an authenticated
/// caller like every other route here.
pub async fn handle_update_statuses(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StatusUpdateResponse>>, AppError> {
    let updated = state
        .time_tracking
        .update_project_status_by_deadline()
        .await?;
    Ok(Json(ApiResponse::ok(StatusUpdateResponse { updated })))
}
