//! Task records as delivered by the workspace server.
//!
//! Every optional field carries `#[serde(default)]` so that a record missing
//! fields still deserialises and degrades to safe defaults instead of
//! aborting the whole collection fetch.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::{Priority, Status};

/// A user reference attached to tasks, notes and projects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignee {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

/// A checklist entry under a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subtask {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// A work item owned by the server. The client never mutates one locally;
/// changes are requested through the API and the next fetch is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assignees: Vec<Assignee>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub is_pinned: bool,
    /// Explicit completion percentage. When present it overrides the
    /// subtask-derived value for display.
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields accepted by the task create/update endpoints. `None` fields are
/// omitted from the request body so partial updates stay partial.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_record_deserialises_with_defaults() {
        // Only the id is present; everything else falls back.
        let task: Task = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.assignees.is_empty());
        assert!(task.due_date.is_none());
        assert!(!task.is_pinned);
        assert!(task.progress.is_none());
    }

    #[test]
    fn payload_omits_unset_fields() {
        let payload = TaskPayload {
            title: Some("Ship release".into()),
            priority: Some(Priority::High),
            ..TaskPayload::default()
        };
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["title"], "Ship release");
        assert_eq!(body["priority"], "high");
        assert!(body.get("status").is_none());
        assert!(body.get("due_date").is_none());
    }
}
