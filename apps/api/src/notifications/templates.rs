//! Notification templates.
//!
//! Each [`TemplateKey`] maps to a fixed type, priority and a pair of
//! `{placeholder}` strings. [`render`] fills placeholders from metadata and
//! leaves tokens with no matching key untouched.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::notification::{Metadata, NotificationType, Priority};

#[derive(Debug, Error)]
#[error("Unknown notification template: {0}")]
pub struct UnknownTemplate(pub String);

/// Closed set of templates. Internal callers pass a variant, so lookup cannot
/// fail; `UnknownTemplate` only arises when parsing a key from text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKey {
    DeadlineApproaching,
    DeadlineOverdue,
    MilestoneReached,
    ProjectCompleted,
    ProgressUpdate,
    SystemMaintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub notification_type: NotificationType,
    pub title: &'static str,
    pub message: &'static str,
    pub priority: Priority,
}

impl TemplateKey {
    pub const ALL: [TemplateKey; 6] = [
        TemplateKey::DeadlineApproaching,
        TemplateKey::DeadlineOverdue,
        TemplateKey::MilestoneReached,
        TemplateKey::ProjectCompleted,
        TemplateKey::ProgressUpdate,
        TemplateKey::SystemMaintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKey::DeadlineApproaching => "deadline_approaching",
            TemplateKey::DeadlineOverdue => "deadline_overdue",
            TemplateKey::MilestoneReached => "milestone_reached",
            TemplateKey::ProjectCompleted => "project_completed",
            TemplateKey::ProgressUpdate => "progress_update",
            TemplateKey::SystemMaintenance => "system_maintenance",
        }
    }

    pub fn template(&self) -> Template {
        match self {
            TemplateKey::DeadlineApproaching => Template {
                notification_type: NotificationType::Deadline,
                title: "Deadline Approaching",
                message: "Project \"{projectTitle}\" is due in {days} day(s)",
                priority: Priority::High,
            },
            TemplateKey::DeadlineOverdue => Template {
                notification_type: NotificationType::Deadline,
                title: "Project Overdue",
                message: "Project \"{projectTitle}\" is {days} day(s) overdue",
                priority: Priority::Urgent,
            },
            TemplateKey::MilestoneReached => Template {
                notification_type: NotificationType::Milestone,
                title: "Milestone Reached",
                message: "Congratulations! You reached \"{milestone}\" in \"{projectTitle}\"",
                priority: Priority::Medium,
            },
            TemplateKey::ProjectCompleted => Template {
                notification_type: NotificationType::Completion,
                title: "Project Completed",
                message: "Great work! \"{projectTitle}\" is complete",
                priority: Priority::Medium,
            },
            TemplateKey::ProgressUpdate => Template {
                notification_type: NotificationType::Progress,
                title: "Progress Update",
                message: "\"{projectTitle}\" is now {progress}% complete",
                priority: Priority::Low,
            },
            TemplateKey::SystemMaintenance => Template {
                notification_type: NotificationType::System,
                title: "Scheduled Maintenance",
                message: "Maintenance is scheduled for {date} from {startTime} to {endTime}",
                priority: Priority::Medium,
            },
        }
    }
}

impl FromStr for TemplateKey {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

/// Replaces every `{key}` in `text` with the matching metadata value.
///
/// Strings are inserted without quotes, other values as JSON text.
/// Unknown keys and unbalanced braces are copied through verbatim.
pub fn render(text: &str, metadata: &Metadata) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = &after[..close];
        match metadata.get(key) {
            Some(value) if !key.contains('{') => out.push_str(&display_value(value)),
            _ => {
                // keep the brace and rescan from the next character so a
                // nested `{` still gets a chance to match
                out.push('{');
                rest = after;
                continue;
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => panic!("metadata must be an object"),
        }
    }

    #[test]
    fn test_every_key_parses_back() {
        for key in TemplateKey::ALL {
            assert_eq!(key.as_str().parse::<TemplateKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let err = "weekly_digest".parse::<TemplateKey>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown notification template: weekly_digest");
    }

    #[test]
    fn test_key_serde_uses_snake_case() {
        let key: TemplateKey = serde_json::from_str("\"deadline_overdue\"").unwrap();
        assert_eq!(key, TemplateKey::DeadlineOverdue);
    }

    #[test]
    fn test_render_substitutes_strings_and_numbers() {
        let m = meta(json!({"projectTitle": "Portfolio", "days": 3}));
        let t = TemplateKey::DeadlineApproaching.template();
        assert_eq!(render(t.message, &m), "Project \"Portfolio\" is due in 3 day(s)");
    }

    #[test]
    fn test_render_leaves_missing_placeholders() {
        let m = meta(json!({"projectTitle": "Portfolio"}));
        assert_eq!(
            render("{projectTitle} due in {days}", &m),
            "Portfolio due in {days}"
        );
    }

    #[test]
    fn test_render_repeated_and_adjacent_tokens() {
        let m = meta(json!({"a": "x", "b": 2}));
        assert_eq!(render("{a}{b}{a}", &m), "x2x");
    }

    #[test]
    fn test_render_unbalanced_braces() {
        let m = meta(json!({"a": "x"}));
        assert_eq!(render("{a} and {", &m), "x and {");
        assert_eq!(render("}{a}", &m), "}x");
        assert_eq!(render("{{a}}", &m), "{x}");
    }

    #[test]
    fn test_render_does_not_expand_substituted_values() {
        let m = meta(json!({"a": "{b}", "b": "nope"}));
        assert_eq!(render("{a}", &m), "{b}");
    }

    #[test]
    fn test_render_non_string_values_as_json() {
        let m = meta(json!({"flag": true, "none": null, "ratio": 0.5}));
        assert_eq!(render("{flag} {none} {ratio}", &m), "true null 0.5");
    }

    #[test]
    fn test_deadline_templates_share_type() {
        assert_eq!(
            TemplateKey::DeadlineApproaching.template().notification_type,
            NotificationType::Deadline
        );
        assert_eq!(
            TemplateKey::DeadlineOverdue.template().priority,
            Priority::Urgent
        );
    }
}
