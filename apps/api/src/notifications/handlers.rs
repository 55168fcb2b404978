//! Axum route handlers for the Notifications API.
//!
//! All endpoints act on the authenticated caller's notifications only.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::notification::Notification;
use crate::notifications::service::{ListOptions, NotificationStats, DEFAULT_PAGE_SIZE};
use crate::response::ApiResponse;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub unread_only: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountQuery {
    pub unread_only: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRequest {
    pub project_title: Option<String>,
    pub milestone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub project_title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    pub project_title: Option<String>,
    pub progress: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub updated: u64,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

#[derive(Debug, Serialize)]
pub struct ProgressActionResponse {
    pub created: bool,
    pub notification: Option<Notification>,
}

fn required_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/notifications?unreadOnly=&limit=&offset=
pub async fn handle_list(
    auth: AuthUser,
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Notification>>>, AppError> {
    let Query(query) = query?;
    let options = ListOptions {
        unread_only: query.unread_only.unwrap_or(false),
        limit: query.limit.map(i64::from).unwrap_or(DEFAULT_PAGE_SIZE),
        offset: query.offset.map(i64::from).unwrap_or(0),
    };

    let notifications = state
        .notifications
        .get_user_notifications(auth.user_id, options)
        .await?;
    Ok(Json(ApiResponse::ok(notifications)))
}

/// GET /api/v1/notifications/count?unreadOnly=
pub async fn handle_count(
    auth: AuthUser,
    State(state): State<AppState>,
    query: Result<Query<CountQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<CountResponse>>, AppError> {
    let Query(query) = query?;
    let count = state
        .notifications
        .get_notification_count(auth.user_id, query.unread_only.unwrap_or(false))
        .await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// PUT /api/v1/notifications/:id/read
///
/// A notification that is missing or belongs to someone else reports
/// `updated: 0` rather than an error.
pub async fn handle_mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<UpdatedResponse>>, AppError> {
    let Path(id) = id?;
    let updated = state.notifications.mark_as_read(id, auth.user_id).await?;
    Ok(Json(ApiResponse::ok(UpdatedResponse { updated })))
}

/// PUT /api/v1/notifications/read-all
pub async fn handle_mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UpdatedResponse>>, AppError> {
    let updated = state.notifications.mark_all_as_read(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(UpdatedResponse { updated })))
}

/// DELETE /api/v1/notifications/:id
pub async fn handle_delete(
    auth: AuthUser,
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<DeletedResponse>>, AppError> {
    let Path(id) = id?;
    let deleted = state
        .notifications
        .delete_notification(id, auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(DeletedResponse { deleted })))
}

/// GET /api/v1/notifications/stats
pub async fn handle_stats(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<NotificationStats>>, AppError> {
    let stats = state
        .notifications
        .get_notification_stats(auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// POST /api/v1/notifications/process-deadlines
pub async fn handle_process_deadlines(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Notification>>>, AppError> {
    let created = state
        .notifications
        .process_deadline_notifications(auth.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(created)))
}

/// POST /api/v1/notifications/milestone
pub async fn handle_milestone(
    auth: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<MilestoneRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Notification>>, AppError> {
    let Json(body) = body?;
    let project_title = required_text(body.project_title, "projectTitle")?;
    let milestone = required_text(body.milestone, "milestone")?;

    let notification = state
        .notifications
        .create_milestone_notification(auth.user_id, &project_title, &milestone)
        .await?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// POST /api/v1/notifications/completion
pub async fn handle_completion(
    auth: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<CompletionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Notification>>, AppError> {
    let Json(body) = body?;
    let project_title = required_text(body.project_title, "projectTitle")?;

    let notification = state
        .notifications
        .create_project_completion_notification(auth.user_id, &project_title)
        .await?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// POST /api/v1/notifications/progress
///
/// Only exact multiples of 25% create a notification; other values succeed
/// with `created: false`.
pub async fn handle_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<ProgressRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ProgressActionResponse>>, AppError> {
    let Json(body) = body?;
    let project_title = required_text(body.project_title, "projectTitle")?;
    let progress = body
        .progress
        .ok_or_else(|| AppError::Validation("progress is required".to_string()))?;

    let notification = state
        .notifications
        .create_progress_notification(auth.user_id, &project_title, progress)
        .await?;
    Ok(Json(ApiResponse::ok(ProgressActionResponse {
        created: notification.is_some(),
        notification,
    })))
}
