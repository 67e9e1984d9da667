//! Project records and the paginated admin-list envelope.
//!
//! Projects aggregate tasks, notes, attachments and members, but all of that
//! is server-owned; the client only renders the counts and percentages it is
//! handed. The admin project list is paginated server-side, so its search
//! and sort parameters round-trip as query strings rather than being applied
//! locally (the local pipeline still runs on top of the loaded page).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::ProjectStatus;
use crate::task::Assignee;

/// A project as delivered by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub creator: Option<Assignee>,
    #[serde(default)]
    pub users: Vec<Assignee>,
    #[serde(default)]
    pub tasks_count: u64,
    #[serde(default)]
    pub users_count: u64,
    /// Server-computed completion percentage; never derived client-side.
    #[serde(default)]
    pub progress_percentage: u8,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One page of the admin project list.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectPage {
    #[serde(default)]
    pub data: Vec<Project>,
    #[serde(default = "one")]
    pub current_page: u32,
    #[serde(default = "one")]
    pub last_page: u32,
    #[serde(default)]
    pub total: u64,
}

fn one() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_envelope_defaults_when_metadata_is_missing() {
        let page: ProjectPage = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.last_page, 1);
        assert_eq!(page.total, 0);
    }
}
