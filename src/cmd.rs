//! Command implementations for the CLI interface.
//!
//! Every listing command fetches its full collection from the server, runs
//! the local view pipeline over it and prints the result; every mutation
//! command dispatches one request and reports the server's answer. Nothing
//! is cached between invocations.

use std::io::{self, Write};

use chrono::{Duration, Local, NaiveDate};
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::api::{Ack, ApiClient, ApiError};
use crate::config::Config;
use crate::fields::*;
use crate::note::{Note, NotePayload};
use crate::project::Project;
use crate::task::TaskPayload;
use crate::tui::run::run_tui;
use crate::view::{
    derive_note_view, derive_project_view, derive_view, Filter, NoteParams, ProjectParams,
    TaskRow, ViewParams,
};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface.
    Ui,

    /// List tasks with search, filters and sorting.
    Tasks {
        /// Case-insensitive search over title and description.
        #[arg(long)]
        search: Option<String>,
        /// Filter by status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Filter by priority.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Filter by assignee user id.
        #[arg(long)]
        assignee: Option<u64>,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = SortKey::DueDate)]
        sort: SortKey,
        /// Sort direction.
        #[arg(long, value_enum, default_value_t = SortDirection::Asc)]
        direction: SortDirection,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Create a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Status: todo | in-progress | review | completed.
        #[arg(long, value_enum, default_value_t = Status::Todo)]
        status: Status,
        /// Priority: low | medium | high | urgent.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        due: Option<String>,
        /// Comma-separated tags. May be repeated.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Assignee user ids. May be repeated.
        #[arg(long = "assignee")]
        assignees: Vec<u64>,
    },

    /// Update fields on a task.
    Update {
        /// Task id to update.
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        due: Option<String>,
        /// Replace tags. May be repeated and comma-separated.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Replace assignees by user id. May be repeated.
        #[arg(long = "assignee")]
        assignees: Vec<u64>,
    },

    /// Request a status transition on a task.
    Status {
        /// Task id.
        id: u64,
        /// Target status: todo | in-progress | review | completed.
        #[arg(value_enum)]
        status: Status,
    },

    /// Mark a task completed.
    Complete {
        /// Task id.
        id: u64,
    },

    /// Reopen a completed task (back to in-progress).
    Reopen {
        /// Task id.
        id: u64,
    },

    /// Toggle a task's pin flag.
    Pin {
        /// Task id.
        id: u64,
    },

    /// Delete a task.
    Delete {
        /// Task id.
        id: u64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// List notes, pinned first then most recently updated.
    Notes {
        /// Case-insensitive search over title and content.
        #[arg(long)]
        search: Option<String>,
    },

    /// Note operations.
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },

    /// List projects (server-side pagination and sorting).
    Projects {
        /// Search, applied server-side and again over the loaded page.
        #[arg(long)]
        search: Option<String>,
        /// Filter by project status.
        #[arg(long, value_enum)]
        status: Option<ProjectStatus>,
        /// Server-side sort column.
        #[arg(long, value_enum, default_value_t = ProjectSortBy::CreatedAt)]
        sort_by: ProjectSortBy,
        /// Server-side sort order.
        #[arg(long, value_enum, default_value_t = SortDirection::Desc)]
        sort_order: SortDirection,
        /// Page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Show or change client configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum NoteAction {
    /// Create a note.
    Add {
        title: String,
        /// Note body.
        #[arg(long, default_value = "")]
        content: String,
        /// Colour token.
        #[arg(long, value_enum, default_value_t = NoteColor::Yellow)]
        color: NoteColor,
    },
    /// Update a note.
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, value_enum)]
        color: Option<NoteColor>,
    },
    /// Toggle a note's pin flag.
    Pin { id: u64 },
    /// Delete a note.
    Delete {
        id: u64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration.
    Show,
    /// Set configuration values.
    Set {
        #[arg(long)]
        api_base: Option<String>,
        #[arg(long)]
        token: Option<String>,
    },
}

/// Parse a due date: ISO format plus a few natural shortcuts.
pub fn parse_due_input(s: &str) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    let today = Local::now().date_naive();
    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        _ => {}
    }
    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Some(today + Duration::days(days));
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return Some(today + Duration::weeks(weeks));
            }
        }
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = d - today;
            if delta.num_days() == 0 {
                "today".into()
            } else if delta.num_days() == 1 {
                "tomorrow".into()
            } else if delta.num_days() > 1 {
                format!("in {}d", delta.num_days())
            } else {
                format!("{}d late", -delta.num_days())
            }
        }
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Comma-joined assignee names, or a placeholder for unassigned tasks.
pub fn format_assignees(assignees: &[crate::task::Assignee]) -> String {
    if assignees.is_empty() {
        "Unassigned".to_string()
    } else {
        assignees
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn print_task_table(rows: &[TaskRow]) {
    println!(
        "{:<6} {:<3} {:<12} {:<7} {:<9} {:<5} {:<18} {}",
        "ID", "Pin", "Status", "Pri", "Due", "Prog", "Assignees", "Title [tags]"
    );
    let today = Local::now().date_naive();
    for row in rows {
        let t = &row.task;
        let tags = if t.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.tags.join(","))
        };
        println!(
            "{:<6} {:<3} {:<12} {:<7} {:<9} {:<5} {:<18} {}{}",
            t.id,
            if t.is_pinned { "*" } else { "" },
            format_status(t.status),
            format_priority(t.priority),
            format_due_relative(t.due_date, today),
            format!("{}%", row.progress),
            truncate(&format_assignees(&t.assignees), 18),
            t.title,
            tags
        );
    }
}

fn print_note_list(notes: &[Note]) {
    println!("{:<6} {:<3} {:<7} {:<24} {}", "ID", "Pin", "Colour", "Title", "Content");
    for n in notes {
        println!(
            "{:<6} {:<3} {:<7} {:<24} {}",
            n.id,
            if n.is_pinned { "*" } else { "" },
            format_note_color(n.color),
            truncate(&n.title, 24),
            truncate(&n.content.replace('\n', " "), 48)
        );
    }
}

fn print_project_table(projects: &[Project]) {
    println!(
        "{:<6} {:<10} {:<6} {:<7} {:<9} {}",
        "ID", "Status", "Tasks", "Members", "Progress", "Name"
    );
    for p in projects {
        println!(
            "{:<6} {:<10} {:<6} {:<7} {:<9} {}",
            p.id,
            format_project_status(p.status),
            p.tasks_count,
            p.users_count,
            format!("{}%", p.progress_percentage),
            p.name
        );
    }
}

/// Print the error and exit; listing and mutation commands share this path.
fn bail(e: ApiError) -> ! {
    eprintln!("Error: {e}");
    std::process::exit(1);
}

/// Report a mutation result: the server's flash message when present,
/// otherwise the given default.
fn finish(result: Result<Ack, ApiError>, default_msg: &str) {
    match result {
        Ok(ack) => println!("{}", ack.message.as_deref().unwrap_or(default_msg)),
        Err(e) => bail(e),
    }
}

/// Ask for confirmation on stdin. Used by delete commands without `--yes`.
fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

/// List tasks through the view pipeline.
pub fn cmd_tasks(
    api: &ApiClient,
    search: Option<String>,
    status: Option<Status>,
    priority: Option<Priority>,
    assignee: Option<u64>,
    sort: SortKey,
    direction: SortDirection,
    limit: Option<usize>,
) {
    let tasks = match api.fetch_tasks() {
        Ok(tasks) => tasks,
        Err(e) => bail(e),
    };
    let params = ViewParams {
        search: search.unwrap_or_default(),
        status: Filter::from(status),
        priority: Filter::from(priority),
        assignee: Filter::from(assignee),
        sort,
        direction,
    };
    let mut rows = derive_view(&tasks, &params);
    if let Some(n) = limit {
        rows.truncate(n);
    }
    if rows.is_empty() {
        println!("No tasks match the current filters.");
    } else {
        print_task_table(&rows);
    }
}

/// Create a task.
pub fn cmd_add(
    api: &ApiClient,
    title: String,
    desc: Option<String>,
    status: Status,
    priority: Priority,
    due: Option<String>,
    tags: Vec<String>,
    assignees: Vec<u64>,
) {
    let due_date = match due {
        Some(raw) => match parse_due_input(&raw) {
            Some(d) => Some(d),
            None => {
                eprintln!("Could not parse due date '{}'", raw);
                std::process::exit(1);
            }
        },
        None => None,
    };
    let payload = TaskPayload {
        title: Some(title),
        description: desc,
        status: Some(status),
        priority: Some(priority),
        due_date,
        tags: Some(split_tags(&tags)),
        assignee_ids: if assignees.is_empty() {
            None
        } else {
            Some(assignees)
        },
    };
    finish(api.create_task(&payload), "Task created");
}

/// Update fields on a task.
pub fn cmd_update(
    api: &ApiClient,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    priority: Option<Priority>,
    due: Option<String>,
    tags: Vec<String>,
    assignees: Vec<u64>,
) {
    let due_date = match due {
        Some(raw) => match parse_due_input(&raw) {
            Some(d) => Some(d),
            None => {
                eprintln!("Could not parse due date '{}'", raw);
                std::process::exit(1);
            }
        },
        None => None,
    };
    let payload = TaskPayload {
        title,
        description: desc,
        status: None,
        priority,
        due_date,
        tags: if tags.is_empty() {
            None
        } else {
            Some(split_tags(&tags))
        },
        assignee_ids: if assignees.is_empty() {
            None
        } else {
            Some(assignees)
        },
    };
    finish(api.update_task(id, &payload), "Task updated");
}

/// Split comma-separated tag arguments, trimming empties.
pub fn split_tags(inputs: &[String]) -> Vec<String> {
    let mut tags = Vec::new();
    for raw in inputs {
        for part in raw.split(',') {
            let tag = part.trim().to_lowercase();
            if !tag.is_empty() {
                tags.push(tag);
            }
        }
    }
    tags.sort();
    tags.dedup();
    tags
}

/// Request a status transition.
pub fn cmd_status(api: &ApiClient, id: u64, status: Status) {
    finish(
        api.set_task_status(id, status),
        &format!("Task {} moved to {}", id, format_status(status)),
    );
}

/// Toggle a task's pin flag.
pub fn cmd_pin(api: &ApiClient, id: u64) {
    finish(api.toggle_task_pin(id), &format!("Toggled pin on task {}", id));
}

/// Delete a task after confirmation.
pub fn cmd_delete(api: &ApiClient, id: u64, yes: bool) {
    if !yes && !confirm(&format!("Delete task {}? This cannot be undone.", id)) {
        println!("Aborted.");
        return;
    }
    finish(api.delete_task(id), &format!("Task {} deleted", id));
}

/// List notes through the note pipeline.
pub fn cmd_notes(api: &ApiClient, search: Option<String>) {
    let notes = match api.fetch_notes() {
        Ok(notes) => notes,
        Err(e) => bail(e),
    };
    let params = NoteParams {
        search: search.unwrap_or_default(),
    };
    let view = derive_note_view(&notes, &params);
    if view.is_empty() {
        println!("No notes match the current filters.");
    } else {
        print_note_list(&view);
    }
}

/// Dispatch a note mutation.
pub fn cmd_note(api: &ApiClient, action: NoteAction) {
    match action {
        NoteAction::Add {
            title,
            content,
            color,
        } => {
            let payload = NotePayload {
                title: Some(title),
                content: Some(content),
                color: Some(color),
            };
            finish(api.create_note(&payload), "Note created");
        }
        NoteAction::Edit {
            id,
            title,
            content,
            color,
        } => {
            let payload = NotePayload {
                title,
                content,
                color,
            };
            finish(api.update_note(id, &payload), "Note updated");
        }
        NoteAction::Pin { id } => {
            finish(api.toggle_note_pin(id), &format!("Toggled pin on note {}", id));
        }
        NoteAction::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete note {}? This cannot be undone.", id)) {
                println!("Aborted.");
                return;
            }
            finish(api.delete_note(id), &format!("Note {} deleted", id));
        }
    }
}

/// List projects: server-side pagination, then the client pipeline over the
/// loaded page.
pub fn cmd_projects(
    api: &ApiClient,
    search: Option<String>,
    status: Option<ProjectStatus>,
    sort_by: ProjectSortBy,
    sort_order: SortDirection,
    page: u32,
) {
    let search = search.unwrap_or_default();
    let page_data = match api.fetch_projects(&search, status, sort_by, sort_order, page) {
        Ok(p) => p,
        Err(e) => bail(e),
    };
    let params = ProjectParams {
        search,
        status: Filter::from(status),
    };
    let view = derive_project_view(&page_data.data, &params);
    if view.is_empty() {
        println!("No projects match the current filters.");
    } else {
        print_project_table(&view);
    }
    println!(
        "Page {}/{} ({} total)",
        page_data.current_page, page_data.last_page, page_data.total
    );
}

/// Show or change client configuration.
pub fn cmd_config(config_path: &std::path::Path, action: ConfigAction) {
    match action {
        ConfigAction::Show => {
            let cfg = Config::load(config_path);
            println!("api_base: {}", cfg.api_base);
            println!(
                "token: {}",
                if cfg.token.is_some() { "(set)" } else { "(unset)" }
            );
        }
        ConfigAction::Set { api_base, token } => {
            let mut cfg = Config::load(config_path);
            if let Some(base) = api_base {
                cfg.api_base = base;
            }
            if let Some(token) = token {
                cfg.token = Some(token);
            }
            if let Err(e) = cfg.save(config_path) {
                eprintln!("Failed to save config: {e}");
                std::process::exit(1);
            }
            println!("Config saved to {}", config_path.display());
        }
    }
}

/// Generate completions for the given shell.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    let mut cmd = crate::cli::Cli::command();
    generate(shell, &mut cmd, "td", &mut io::stdout());
}

/// Launch the interactive UI.
pub fn cmd_ui(api: ApiClient) {
    if let Err(e) = run_tui(api) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_input_accepts_iso_and_shortcuts() {
        let today = Local::now().date_naive();
        assert_eq!(parse_due_input("today"), Some(today));
        assert_eq!(parse_due_input("tomorrow"), Some(today + Duration::days(1)));
        assert_eq!(parse_due_input("in 3d"), Some(today + Duration::days(3)));
        assert_eq!(parse_due_input("in 2w"), Some(today + Duration::weeks(2)));
        assert_eq!(
            parse_due_input("2026-09-01"),
            NaiveDate::from_ymd_opt(2026, 9, 1)
        );
        assert_eq!(parse_due_input("not a date"), None);
    }

    #[test]
    fn due_formatting_is_relative() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        assert_eq!(format_due_relative(Some(today), today), "today");
        assert_eq!(
            format_due_relative(Some(today + Duration::days(1)), today),
            "tomorrow"
        );
        assert_eq!(
            format_due_relative(Some(today + Duration::days(5)), today),
            "in 5d"
        );
        assert_eq!(
            format_due_relative(Some(today - Duration::days(2)), today),
            "2d late"
        );
        assert_eq!(format_due_relative(None, today), "-");
    }

    #[test]
    fn tags_split_and_dedupe() {
        let tags = split_tags(&["Backend, api".to_string(), "api".to_string()]);
        assert_eq!(tags, vec!["api".to_string(), "backend".to_string()]);
    }

    #[test]
    fn unassigned_placeholder() {
        assert_eq!(format_assignees(&[]), "Unassigned");
    }
}
