//! The derived-view pipeline: search, filters, pinned-first ordering and
//! progress annotation over an in-memory collection.
//!
//! Everything here is a pure function of `(collection, params)`. The source
//! collection is never mutated and every call returns a fresh list, so the
//! caller can recompute on each parameter change without invalidation
//! bookkeeping. Malformed records degrade through the defaults baked into
//! the record types rather than erroring out of the pipeline.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::fields::{Priority, ProjectStatus, SortDirection, SortKey, Status};
use crate::note::Note;
use crate::project::Project;
use crate::task::Task;

/// An equality filter with a neutral sentinel. `All` admits every record,
/// matching the web client's "all" dropdown option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Filter<T> {
    /// Whether the filter admits the given value.
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(v) => v == value,
        }
    }
}

impl<T> From<Option<T>> for Filter<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Filter::Only(v),
            None => Filter::All,
        }
    }
}

/// User-controlled parameters of the task view. Ephemeral page-local state;
/// serializable so the TUI and CLI can share one shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewParams {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: Filter<Status>,
    #[serde(default)]
    pub priority: Filter<Priority>,
    /// Filters on assignee user id; membership test over `task.assignees`.
    #[serde(default)]
    pub assignee: Filter<u64>,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub direction: SortDirection,
}

/// One row of the derived task view: the record plus its display progress.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub task: Task,
    pub progress: u8,
}

/// Case-insensitive substring test used by all three record types.
fn text_matches(needle: &str, haystacks: &[&str]) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    haystacks
        .iter()
        .any(|h| h.to_lowercase().contains(&needle))
}

/// Predicate evaluator: logical AND of the search test and the active
/// equality filters. `All` filters are neutral, not exclusionary.
pub fn matches(task: &Task, params: &ViewParams) -> bool {
    let description = task.description.as_deref().unwrap_or("");
    if !text_matches(params.search.trim(), &[&task.title, description]) {
        return false;
    }
    if !params.status.admits(&task.status) {
        return false;
    }
    if !params.priority.admits(&task.priority) {
        return false;
    }
    if let Filter::Only(user_id) = params.assignee {
        if !task.assignees.iter().any(|a| a.id == user_id) {
            return false;
        }
    }
    true
}

/// Two-tier comparator for the task view.
///
/// Tier 1: pinned records sort before unpinned ones regardless of direction.
/// Tier 2: the configured sort key, with `direction` flipping the comparison
/// between two real values only. Missing due dates always sort last under
/// both directions. Ties return `Equal` so a stable sort preserves the
/// incoming order.
pub fn compare(a: &Task, b: &Task, sort: SortKey, direction: SortDirection) -> Ordering {
    match (a.is_pinned, b.is_pinned) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    match sort {
        SortKey::DueDate => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => apply_direction(x.cmp(&y), direction),
            // The missing-last policy is deliberately outside the
            // direction flip.
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::Priority => {
            // Natural order for priority is descending: urgent first.
            let natural = b.priority.rank().cmp(&a.priority.rank());
            match direction {
                SortDirection::Desc => natural,
                SortDirection::Asc => natural.reverse(),
            }
        }
    }
}

fn apply_direction(ord: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

/// Completion percentage derived from a task's substructure.
///
/// Non-empty subtasks win; otherwise a completed status counts as 100 and
/// everything else as 0.
pub fn derived_progress(task: &Task) -> u8 {
    if !task.subtasks.is_empty() {
        let done = task.subtasks.iter().filter(|s| s.completed).count();
        let ratio = done as f64 / task.subtasks.len() as f64;
        return (ratio * 100.0).round() as u8;
    }
    if task.status == Status::Completed {
        100
    } else {
        0
    }
}

/// Display progress: the explicit server-supplied override when present,
/// otherwise the derived value.
pub fn effective_progress(task: &Task) -> u8 {
    match task.progress {
        Some(p) => p.min(100),
        None => derived_progress(task),
    }
}

/// The view pipeline: filter, stable-sort, annotate. Returns a new list and
/// leaves the input untouched; an empty result is the caller's cue to render
/// its "no results" state.
pub fn derive_view(tasks: &[Task], params: &ViewParams) -> Vec<TaskRow> {
    let mut visible: Vec<&Task> = tasks.iter().filter(|t| matches(t, params)).collect();
    visible.sort_by(|a, b| compare(a, b, params.sort, params.direction));
    visible
        .into_iter()
        .map(|t| TaskRow {
            progress: effective_progress(t),
            task: t.clone(),
        })
        .collect()
}

/// Parameters of the notes view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteParams {
    #[serde(default)]
    pub search: String,
}

/// Note pipeline: search over title and content, pinned notes first, then
/// most recently updated. Missing timestamps sort last.
pub fn derive_note_view(notes: &[Note], params: &NoteParams) -> Vec<Note> {
    let mut visible: Vec<&Note> = notes
        .iter()
        .filter(|n| text_matches(params.search.trim(), &[&n.title, &n.content]))
        .collect();
    visible.sort_by(|a, b| {
        match (a.is_pinned, b.is_pinned) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        match (a.updated_at, b.updated_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    visible.into_iter().cloned().collect()
}

/// Parameters of the project view, applied client-side on top of whatever
/// page the server returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectParams {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: Filter<ProjectStatus>,
}

/// Project pipeline: search over name and description plus the status
/// filter. Server ordering is preserved for the survivors.
pub fn derive_project_view(projects: &[Project], params: &ProjectParams) -> Vec<Project> {
    projects
        .iter()
        .filter(|p| {
            let description = p.description.as_deref().unwrap_or("");
            text_matches(params.search.trim(), &[&p.name, description])
                && params.status.admits(&p.status)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Assignee, Subtask};
    use chrono::NaiveDate;

    fn task(id: u64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: None,
            status: Status::Todo,
            priority: Priority::Medium,
            assignees: Vec::new(),
            due_date: None,
            tags: Vec::new(),
            subtasks: Vec::new(),
            is_pinned: false,
            progress: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn all_filters_are_neutral() {
        let t = task(1, "Alpha");
        let mut params = ViewParams::default();
        assert!(matches(&t, &params));
        params.status = Filter::All;
        params.priority = Filter::All;
        params.assignee = Filter::All;
        assert!(matches(&t, &params));
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let mut t = task(1, "Write the Alpha report");
        let upper = ViewParams {
            search: "ALPHA".into(),
            ..ViewParams::default()
        };
        let lower = ViewParams {
            search: "alpha".into(),
            ..ViewParams::default()
        };
        assert_eq!(matches(&t, &upper), matches(&t, &lower));
        assert!(matches(&t, &upper));

        t.title = "Weekly report".into();
        t.description = Some("covers the alpha milestone".into());
        assert!(matches(&t, &upper));

        t.description = None;
        assert!(!matches(&t, &upper));
    }

    #[test]
    fn status_and_priority_filters_are_equality_tests() {
        let mut t = task(1, "Alpha");
        t.status = Status::Review;
        t.priority = Priority::High;
        let mut params = ViewParams {
            status: Filter::Only(Status::Review),
            priority: Filter::Only(Priority::High),
            ..ViewParams::default()
        };
        assert!(matches(&t, &params));
        params.priority = Filter::Only(Priority::Low);
        assert!(!matches(&t, &params));
    }

    #[test]
    fn assignee_filter_is_a_membership_test() {
        let mut t = task(1, "Alpha");
        t.assignees = vec![
            Assignee {
                id: 3,
                name: "Ada".into(),
                image: None,
                last_seen: None,
            },
            Assignee {
                id: 9,
                name: "Grace".into(),
                image: None,
                last_seen: None,
            },
        ];
        let mut params = ViewParams {
            assignee: Filter::Only(9),
            ..ViewParams::default()
        };
        assert!(matches(&t, &params));
        params.assignee = Filter::Only(4);
        assert!(!matches(&t, &params));
        // Unassigned tasks never match a concrete assignee filter.
        let bare = task(2, "Beta");
        assert!(!matches(&bare, &params));
    }

    #[test]
    fn pinned_sorts_first_under_every_key_and_direction() {
        let mut pinned = task(1, "Pinned");
        pinned.is_pinned = true;
        pinned.priority = Priority::Low;
        pinned.due_date = Some(date("2030-12-31"));
        let mut unpinned = task(2, "Unpinned");
        unpinned.priority = Priority::Urgent;
        unpinned.due_date = Some(date("2020-01-01"));

        for sort in [SortKey::DueDate, SortKey::Priority] {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                assert_eq!(
                    compare(&pinned, &unpinned, sort, direction),
                    Ordering::Less,
                    "pinned must lead for {:?}/{:?}",
                    sort,
                    direction
                );
                assert_eq!(
                    compare(&unpinned, &pinned, sort, direction),
                    Ordering::Greater
                );
            }
        }
    }

    #[test]
    fn priority_desc_orders_urgent_first() {
        let mut tasks = Vec::new();
        for (id, p) in [
            (1, Priority::Medium),
            (2, Priority::Urgent),
            (3, Priority::Low),
            (4, Priority::High),
        ] {
            let mut t = task(id, "t");
            t.priority = p;
            tasks.push(t);
        }
        let params = ViewParams {
            sort: SortKey::Priority,
            direction: SortDirection::Desc,
            ..ViewParams::default()
        };
        let rows = derive_view(&tasks, &params);
        let order: Vec<Priority> = rows.iter().map(|r| r.task.priority).collect();
        assert_eq!(
            order,
            vec![
                Priority::Urgent,
                Priority::High,
                Priority::Medium,
                Priority::Low
            ]
        );

        let asc = ViewParams {
            direction: SortDirection::Asc,
            ..params
        };
        let rows = derive_view(&tasks, &asc);
        assert_eq!(rows[0].task.priority, Priority::Low);
        assert_eq!(rows[3].task.priority, Priority::Urgent);
    }

    #[test]
    fn missing_due_dates_sort_last_in_both_directions() {
        let mut a = task(1, "a");
        a.due_date = Some(date("2024-01-01"));
        let mut b = task(2, "b");
        b.due_date = None;
        let mut c = task(3, "c");
        c.due_date = Some(date("2023-01-01"));
        let tasks = vec![a, b, c];

        let asc = ViewParams {
            sort: SortKey::DueDate,
            direction: SortDirection::Asc,
            ..ViewParams::default()
        };
        let ids: Vec<u64> = derive_view(&tasks, &asc)
            .iter()
            .map(|r| r.task.id)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);

        let desc = ViewParams {
            direction: SortDirection::Desc,
            ..asc
        };
        let ids: Vec<u64> = derive_view(&tasks, &desc)
            .iter()
            .map(|r| r.task.id)
            .collect();
        // Direction flips the real dates but never the missing-last rule.
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn ties_preserve_collection_order() {
        let tasks = vec![task(10, "x"), task(11, "y"), task(12, "z")];
        let params = ViewParams {
            sort: SortKey::Priority,
            ..ViewParams::default()
        };
        let ids: Vec<u64> = derive_view(&tasks, &params)
            .iter()
            .map(|r| r.task.id)
            .collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[test]
    fn progress_derivation_rules() {
        let mut t = task(1, "a");
        t.subtasks = vec![
            Subtask {
                id: 1,
                title: String::new(),
                completed: true,
            },
            Subtask {
                id: 2,
                title: String::new(),
                completed: true,
            },
            Subtask {
                id: 3,
                title: String::new(),
                completed: false,
            },
            Subtask {
                id: 4,
                title: String::new(),
                completed: false,
            },
        ];
        assert_eq!(derived_progress(&t), 50);

        t.subtasks.clear();
        t.status = Status::Completed;
        assert_eq!(derived_progress(&t), 100);

        t.status = Status::Todo;
        assert_eq!(derived_progress(&t), 0);

        // One of three done rounds to the nearest integer.
        t.subtasks = vec![
            Subtask {
                id: 1,
                title: String::new(),
                completed: true,
            },
            Subtask {
                id: 2,
                title: String::new(),
                completed: false,
            },
            Subtask {
                id: 3,
                title: String::new(),
                completed: false,
            },
        ];
        assert_eq!(derived_progress(&t), 33);
    }

    #[test]
    fn explicit_progress_overrides_derivation_for_display() {
        let mut t = task(1, "a");
        t.status = Status::Completed;
        t.progress = Some(40);
        assert_eq!(effective_progress(&t), 40);
        assert_eq!(derived_progress(&t), 100);
        t.progress = None;
        assert_eq!(effective_progress(&t), 100);
    }

    #[test]
    fn derive_view_is_idempotent_and_non_mutating() {
        let mut a = task(1, "Alpha");
        a.due_date = Some(date("2024-06-01"));
        let mut b = task(2, "Beta");
        b.is_pinned = true;
        let tasks = vec![a, b, task(3, "Gamma")];
        let snapshot = tasks.clone();

        let params = ViewParams::default();
        let first = derive_view(&tasks, &params);
        let second = derive_view(&tasks, &params);
        assert_eq!(first, second);
        assert_eq!(tasks, snapshot);
    }

    #[test]
    fn no_matches_yields_an_empty_view() {
        let tasks = vec![task(1, "Alpha"), task(2, "Beta"), task(3, "Gamma")];
        let params = ViewParams {
            search: "zzz-no-such-task".into(),
            ..ViewParams::default()
        };
        assert!(derive_view(&tasks, &params).is_empty());
    }

    #[test]
    fn note_view_sorts_pinned_then_recent() {
        use crate::fields::NoteColor;
        use chrono::{TimeZone, Utc};

        let note = |id: u64, title: &str, pinned: bool, day: u32| Note {
            id,
            title: title.to_string(),
            content: String::new(),
            color: NoteColor::Yellow,
            is_pinned: pinned,
            user: None,
            updated_at: Some(Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()),
        };
        let notes = vec![
            note(1, "older", false, 1),
            note(2, "newest", false, 20),
            note(3, "pinned", true, 5),
        ];
        let view = derive_note_view(&notes, &NoteParams::default());
        let ids: Vec<u64> = view.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        let filtered = derive_note_view(
            &notes,
            &NoteParams {
                search: "NEWEST".into(),
            },
        );
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
    }

    #[test]
    fn project_view_filters_without_reordering() {
        let project = |id: u64, name: &str, status: ProjectStatus| Project {
            id,
            name: name.to_string(),
            description: None,
            status,
            creator: None,
            users: Vec::new(),
            tasks_count: 0,
            users_count: 0,
            progress_percentage: 0,
            created_at: None,
            updated_at: None,
        };
        let projects = vec![
            project(1, "Atlas", ProjectStatus::Active),
            project(2, "Borealis", ProjectStatus::OnHold),
            project(3, "Atlas Mobile", ProjectStatus::Active),
        ];
        let params = ProjectParams {
            search: "atlas".into(),
            status: Filter::Only(ProjectStatus::Active),
        };
        let view = derive_project_view(&projects, &params);
        let ids: Vec<u64> = view.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
