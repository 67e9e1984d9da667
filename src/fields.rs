//! Enumerations and field types shared across the client.
//!
//! These mirror the server's wire values exactly: task status and priority
//! use kebab-case, project status and sort parameters use snake_case.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Review,
    Completed,
}

impl Status {
    /// Next status along the workflow. Completed wraps back to in-progress,
    /// which is the explicit "mark incomplete" transition.
    pub fn advanced(self) -> Status {
        match self {
            Status::Todo => Status::InProgress,
            Status::InProgress => Status::Review,
            Status::Review => Status::Completed,
            Status::Completed => Status::InProgress,
        }
    }
}

/// Priority classification for ranked comparison.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Numeric rank for sorting; higher is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Urgent => 4,
        }
    }
}

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    OnHold,
    Completed,
    Cancelled,
}

/// Theme token for a note's background colour.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoteColor {
    #[default]
    Yellow,
    Blue,
    Green,
    Pink,
    Purple,
    Gray,
}

/// Sort keys for the task view.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    DueDate,
    Priority,
}

/// Sort direction; applies to the primary key only, never to pin precedence.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Server-side sort column for the paginated project list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSortBy {
    #[default]
    CreatedAt,
    Name,
    Status,
    Progress,
}

/// Format a task status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Todo => "To Do",
        Status::InProgress => "In Progress",
        Status::Review => "Review",
        Status::Completed => "Completed",
    }
}

/// Format a priority for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
        Priority::Urgent => "Urgent",
    }
}

/// Format a project status for display.
pub fn format_project_status(s: ProjectStatus) -> &'static str {
    match s {
        ProjectStatus::Active => "Active",
        ProjectStatus::OnHold => "On Hold",
        ProjectStatus::Completed => "Completed",
        ProjectStatus::Cancelled => "Cancelled",
    }
}

/// Format a note colour token for display.
pub fn format_note_color(c: NoteColor) -> &'static str {
    match c {
        NoteColor::Yellow => "yellow",
        NoteColor::Blue => "blue",
        NoteColor::Green => "green",
        NoteColor::Pink => "pink",
        NoteColor::Purple => "purple",
        NoteColor::Gray => "gray",
    }
}

/// Wire name of a task status, as sent in query strings and payloads.
pub fn status_wire(s: Status) -> &'static str {
    match s {
        Status::Todo => "todo",
        Status::InProgress => "in-progress",
        Status::Review => "review",
        Status::Completed => "completed",
    }
}

/// Wire name of a project status.
pub fn project_status_wire(s: ProjectStatus) -> &'static str {
    match s {
        ProjectStatus::Active => "active",
        ProjectStatus::OnHold => "on_hold",
        ProjectStatus::Completed => "completed",
        ProjectStatus::Cancelled => "cancelled",
    }
}

/// Wire name of a project sort column.
pub fn project_sort_wire(s: ProjectSortBy) -> &'static str {
    match s {
        ProjectSortBy::CreatedAt => "created_at",
        ProjectSortBy::Name => "name",
        ProjectSortBy::Status => "status",
        ProjectSortBy::Progress => "progress",
    }
}

/// Wire name of a sort direction.
pub fn direction_wire(d: SortDirection) -> &'static str {
    match d {
        SortDirection::Asc => "asc",
        SortDirection::Desc => "desc",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_advances_along_workflow_and_reopens() {
        assert_eq!(Status::Todo.advanced(), Status::InProgress);
        assert_eq!(Status::InProgress.advanced(), Status::Review);
        assert_eq!(Status::Review.advanced(), Status::Completed);
        // Completed goes back to in-progress, not to todo.
        assert_eq!(Status::Completed.advanced(), Status::InProgress);
    }

    #[test]
    fn priority_ranks_are_ordered() {
        assert!(Priority::Urgent.rank() > Priority::High.rank());
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
    }

    #[test]
    fn wire_names_match_server_values() {
        assert_eq!(status_wire(Status::InProgress), "in-progress");
        assert_eq!(project_status_wire(ProjectStatus::OnHold), "on_hold");
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::to_string(&ProjectStatus::OnHold).unwrap(),
            "\"on_hold\""
        );
    }
}
