use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

/// Substitution values attached to a notification.
pub type Metadata = Map<String, Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Deadline,
    Milestone,
    Completion,
    Progress,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Deadline => "deadline",
            NotificationType::Milestone => "milestone",
            NotificationType::Completion => "completion",
            NotificationType::Progress => "progress",
            NotificationType::System => "system",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

/// A stored notification exactly as it sits in the `notifications` table.
/// `metadata` is the JSON text of the template substitution values.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub priority: String,
    pub read: bool,
    pub metadata: Option<String>,
    pub dedup_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new notification row.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub metadata: String,
    /// Rows sharing `(user_id, dedup_key)` are inserted at most once.
    pub dedup_key: Option<String>,
}

/// Notification as returned over the API, with metadata decoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub priority: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub metadata: Metadata,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        let metadata = decode_metadata(row.id, row.metadata.as_deref());
        Notification {
            id: row.id,
            user_id: row.user_id,
            notification_type: row.notification_type,
            title: row.title,
            message: row.message,
            priority: row.priority,
            read: row.read,
            created_at: row.created_at,
            metadata,
        }
    }
}

pub fn encode_metadata(metadata: &Metadata) -> String {
    Value::Object(metadata.clone()).to_string()
}

/// Decodes the stored metadata column. Missing or unreadable payloads become
/// an empty map so one bad row cannot break a whole listing.
pub fn decode_metadata(id: Uuid, raw: Option<&str>) -> Metadata {
    let Some(raw) = raw else {
        return Metadata::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!("Notification {id} metadata is not a JSON object: {other}");
            Metadata::new()
        }
        Err(e) => {
            warn!("Notification {id} has unreadable metadata: {e}");
            Metadata::new()
        }
    }
}
