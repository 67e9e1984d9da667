//! Main application logic for the terminal user interface.
//!
//! The `App` struct holds the collections fetched from the server, the
//! current view parameters and the derived rows. Every keystroke that
//! changes a parameter recomputes the derived view; every mutation goes to
//! the server and is followed by a wholesale refetch of the collection, so
//! local state never drifts from the authoritative one.

use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::api::{Ack, ApiClient, ApiError};
use crate::cmd::{format_assignees, format_due_relative, truncate};
use crate::fields::*;
use crate::note::Note;
use crate::project::Project;
use crate::task::Task;
use crate::tui::colors::{HIGH_ORANGE, LOW_SLATE, MEDIUM_GOLD, PIN_TEAL, URGENT_RED};
use crate::tui::enums::{AppState, ConfirmAction};
use crate::tui::input::InputField;
use crate::view::{
    derive_note_view, derive_project_view, derive_view, Filter, NoteParams, ProjectParams,
    TaskRow, ViewParams,
};

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    api: ApiClient,

    tasks: Vec<Task>,
    notes: Vec<Note>,
    projects: Vec<Project>,

    params: ViewParams,
    note_params: NoteParams,
    project_params: ProjectParams,

    rows: Vec<TaskRow>,
    note_rows: Vec<Note>,
    project_rows: Vec<Project>,

    task_list_state: TableState,
    note_list_state: TableState,
    project_list_state: TableState,

    selected_task: Option<u64>,
    search: InputField,
    search_active: bool,
    status_message: String,
    confirm_action: Option<ConfirmAction>,
}

impl App {
    /// Create the app and perform the initial collection fetches. Fetch
    /// failures leave the collections empty and surface in the status bar.
    pub fn new(api: ApiClient) -> Self {
        let mut app = App {
            state: AppState::TaskList,
            api,
            tasks: Vec::new(),
            notes: Vec::new(),
            projects: Vec::new(),
            params: ViewParams::default(),
            note_params: NoteParams::default(),
            project_params: ProjectParams::default(),
            rows: Vec::new(),
            note_rows: Vec::new(),
            project_rows: Vec::new(),
            task_list_state: TableState::default(),
            note_list_state: TableState::default(),
            project_list_state: TableState::default(),
            selected_task: None,
            search: InputField::new(),
            search_active: false,
            status_message: String::new(),
            confirm_action: None,
        };
        app.reload_all();
        app
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    fn reload_all(&mut self) {
        self.reload_tasks();
        self.reload_notes();
        self.reload_projects();
    }

    fn reload_tasks(&mut self) {
        match self.api.fetch_tasks() {
            Ok(tasks) => {
                self.tasks = tasks;
                self.recompute_tasks();
            }
            Err(e) => self.set_status_message(format!("Failed to load tasks: {e}")),
        }
    }

    fn reload_notes(&mut self) {
        match self.api.fetch_notes() {
            Ok(notes) => {
                self.notes = notes;
                self.recompute_notes();
            }
            Err(e) => self.set_status_message(format!("Failed to load notes: {e}")),
        }
    }

    fn reload_projects(&mut self) {
        match self.api.fetch_projects(
            "",
            None,
            ProjectSortBy::CreatedAt,
            SortDirection::Desc,
            1,
        ) {
            Ok(page) => {
                self.projects = page.data;
                self.recompute_projects();
            }
            Err(e) => self.set_status_message(format!("Failed to load projects: {e}")),
        }
    }

    /// Re-run the task pipeline and restore the selection by id when the
    /// previously selected row survived the new parameters.
    fn recompute_tasks(&mut self) {
        let old_selected_id = self
            .task_list_state
            .selected()
            .and_then(|idx| self.rows.get(idx))
            .map(|row| row.task.id);

        self.params.search = self.search.value.clone();
        self.rows = derive_view(&self.tasks, &self.params);

        let new_index = old_selected_id
            .and_then(|id| self.rows.iter().position(|row| row.task.id == id));
        self.task_list_state.select(match new_index {
            Some(idx) => Some(idx),
            None if self.rows.is_empty() => None,
            None => Some(0),
        });
    }

    fn recompute_notes(&mut self) {
        self.note_params.search = self.search.value.clone();
        self.note_rows = derive_note_view(&self.notes, &self.note_params);
        let len = self.note_rows.len();
        match self.note_list_state.selected() {
            Some(idx) if idx >= len => {
                self.note_list_state
                    .select(if len == 0 { None } else { Some(len - 1) })
            }
            None if len > 0 => self.note_list_state.select(Some(0)),
            _ => {}
        }
    }

    fn recompute_projects(&mut self) {
        self.project_params.search = self.search.value.clone();
        self.project_rows = derive_project_view(&self.projects, &self.project_params);
        let len = self.project_rows.len();
        match self.project_list_state.selected() {
            Some(idx) if idx >= len => {
                self.project_list_state
                    .select(if len == 0 { None } else { Some(len - 1) })
            }
            None if len > 0 => self.project_list_state.select(Some(0)),
            _ => {}
        }
    }

    /// Recompute whichever list the current state shows.
    fn recompute_current(&mut self) {
        match self.state {
            AppState::NoteList => self.recompute_notes(),
            AppState::ProjectList => self.recompute_projects(),
            _ => self.recompute_tasks(),
        }
    }

    fn selected_row(&self) -> Option<&TaskRow> {
        self.task_list_state
            .selected()
            .and_then(|idx| self.rows.get(idx))
    }

    fn selected_task(&self) -> Option<&Task> {
        self.selected_task
            .and_then(|id| self.tasks.iter().find(|t| t.id == id))
    }

    fn selected_note_id(&self) -> Option<u64> {
        self.note_list_state
            .selected()
            .and_then(|idx| self.note_rows.get(idx))
            .map(|n| n.id)
    }

    /// Report a mutation result and refetch the affected collection on
    /// success. The blocking request has already completed by the time this
    /// runs, so there is no in-flight state to track.
    fn finish_task_mutation(&mut self, result: Result<Ack, ApiError>, default_msg: &str) {
        match result {
            Ok(ack) => {
                let msg = ack.message.unwrap_or_else(|| default_msg.to_string());
                self.set_status_message(msg);
                self.reload_tasks();
            }
            Err(e) => self.set_status_message(format!("Error: {e}")),
        }
    }

    fn finish_note_mutation(&mut self, result: Result<Ack, ApiError>, default_msg: &str) {
        match result {
            Ok(ack) => {
                let msg = ack.message.unwrap_or_else(|| default_msg.to_string());
                self.set_status_message(msg);
                self.reload_notes();
            }
            Err(e) => self.set_status_message(format!("Error: {e}")),
        }
    }

    fn advance_selected_status(&mut self) {
        let target = self
            .selected_row()
            .map(|row| (row.task.id, row.task.status.advanced()));
        if let Some((id, next)) = target {
            let result = self.api.set_task_status(id, next);
            self.finish_task_mutation(
                result,
                &format!("Task {} moved to {}", id, format_status(next)),
            );
        }
    }

    fn toggle_selected_pin(&mut self) {
        if let Some(id) = self.selected_row().map(|row| row.task.id) {
            let result = self.api.toggle_task_pin(id);
            self.finish_task_mutation(result, &format!("Toggled pin on task {}", id));
        }
    }

    fn cycle_status_filter(&mut self) {
        self.params.status = match self.params.status {
            Filter::All => Filter::Only(Status::Todo),
            Filter::Only(Status::Todo) => Filter::Only(Status::InProgress),
            Filter::Only(Status::InProgress) => Filter::Only(Status::Review),
            Filter::Only(Status::Review) => Filter::Only(Status::Completed),
            Filter::Only(Status::Completed) => Filter::All,
        };
        self.recompute_tasks();
    }

    fn cycle_priority_filter(&mut self) {
        self.params.priority = match self.params.priority {
            Filter::All => Filter::Only(Priority::Urgent),
            Filter::Only(Priority::Urgent) => Filter::Only(Priority::High),
            Filter::Only(Priority::High) => Filter::Only(Priority::Medium),
            Filter::Only(Priority::Medium) => Filter::Only(Priority::Low),
            Filter::Only(Priority::Low) => Filter::All,
        };
        self.recompute_tasks();
    }

    /// Cycle the assignee filter through every user present in the loaded
    /// collection, then back to all.
    fn cycle_assignee_filter(&mut self) {
        let mut ids: Vec<u64> = self
            .tasks
            .iter()
            .flat_map(|t| t.assignees.iter().map(|a| a.id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        self.params.assignee = match self.params.assignee {
            Filter::All => match ids.first() {
                Some(&first) => Filter::Only(first),
                None => Filter::All,
            },
            Filter::Only(current) => match ids.iter().find(|&&id| id > current) {
                Some(&next) => Filter::Only(next),
                None => Filter::All,
            },
        };
        self.recompute_tasks();
    }

    fn cycle_sort_key(&mut self) {
        self.params.sort = match self.params.sort {
            SortKey::DueDate => SortKey::Priority,
            SortKey::Priority => SortKey::DueDate,
        };
        self.recompute_tasks();
    }

    fn toggle_sort_direction(&mut self) {
        self.params.direction = match self.params.direction {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        };
        self.recompute_tasks();
    }

    fn assignee_filter_label(&self) -> String {
        match self.params.assignee {
            Filter::All => "all".to_string(),
            Filter::Only(id) => self
                .tasks
                .iter()
                .flat_map(|t| t.assignees.iter())
                .find(|a| a.id == id)
                .map(|a| a.name.clone())
                .unwrap_or_else(|| format!("user {}", id)),
        }
    }

    fn params_summary(&self) -> String {
        let status = match self.params.status {
            Filter::All => "all".to_string(),
            Filter::Only(s) => format_status(s).to_lowercase(),
        };
        let priority = match self.params.priority {
            Filter::All => "all".to_string(),
            Filter::Only(p) => format_priority(p).to_lowercase(),
        };
        let sort = match self.params.sort {
            SortKey::DueDate => "due date",
            SortKey::Priority => "priority",
        };
        let direction = match self.params.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        format!(
            "status: {} | priority: {} | assignee: {} | sort: {} {}",
            status,
            priority,
            self.assignee_filter_label(),
            sort,
            direction
        )
    }

    fn move_selection(state: &mut TableState, len: usize, down: bool) {
        if len == 0 {
            state.select(None);
            return;
        }
        match state.selected() {
            Some(idx) if down && idx + 1 < len => state.select(Some(idx + 1)),
            Some(idx) if !down && idx > 0 => state.select(Some(idx - 1)),
            None => state.select(Some(0)),
            _ => {}
        }
    }

    /// Handle keys while the search box is active; shared by all list views.
    fn handle_search_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.search_active = false;
                self.search.clear();
                self.recompute_current();
                self.clear_status_message();
            }
            KeyCode::Enter => {
                self.search_active = false;
                if self.search.is_empty() {
                    self.set_status_message("Search cleared".to_string());
                } else {
                    self.set_status_message(format!("Search applied: '{}'", self.search.value));
                }
            }
            KeyCode::Backspace => {
                self.search.handle_backspace();
                self.recompute_current();
            }
            KeyCode::Left => self.search.move_cursor_left(),
            KeyCode::Right => self.search.move_cursor_right(),
            KeyCode::Char(c) => {
                self.search.handle_char(c);
                self.recompute_current();
            }
            _ => {}
        }
    }

    /// Switch between the task, note and project lists. The search box is
    /// shared, so the new view recomputes against the current text.
    fn switch_view(&mut self) {
        self.state = match self.state {
            AppState::TaskList => AppState::NoteList,
            AppState::NoteList => AppState::ProjectList,
            _ => AppState::TaskList,
        };
        self.recompute_current();
    }

    fn handle_task_list_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> io::Result<bool> {
        if self.search_active {
            self.handle_search_input(key);
            return Ok(false);
        }
        match key {
            KeyCode::Char('q') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Esc => {
                if !self.search.is_empty() {
                    self.search.clear();
                    self.recompute_tasks();
                    self.clear_status_message();
                } else {
                    return Ok(true);
                }
            }
            KeyCode::Tab => self.switch_view(),
            KeyCode::Up => Self::move_selection(&mut self.task_list_state, self.rows.len(), false),
            KeyCode::Down => Self::move_selection(&mut self.task_list_state, self.rows.len(), true),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(id) = self.selected_row().map(|row| row.task.id) {
                    self.selected_task = Some(id);
                    self.state = AppState::TaskDetail;
                }
            }
            KeyCode::Char('s') => self.advance_selected_status(),
            KeyCode::Char('p') => self.toggle_selected_pin(),
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_row().map(|row| row.task.id) {
                    self.confirm_action = Some(ConfirmAction::DeleteTask(id));
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('f') => self.cycle_status_filter(),
            KeyCode::Char('i') => self.cycle_priority_filter(),
            KeyCode::Char('u') => self.cycle_assignee_filter(),
            KeyCode::Char('o') => self.cycle_sort_key(),
            KeyCode::Char('v') => self.toggle_sort_direction(),
            KeyCode::Char('/') => {
                self.search_active = true;
                self.set_status_message(
                    "Search: type to filter title/description, Enter to apply, Esc to cancel"
                        .to_string(),
                );
            }
            KeyCode::Char('r') => {
                self.reload_tasks();
                self.set_status_message("Tasks refreshed".to_string());
            }
            KeyCode::Char('h') => self.state = AppState::Help,
            _ => {}
        }
        Ok(false)
    }

    fn handle_detail_input(&mut self, key: KeyCode) -> io::Result<bool> {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => self.state = AppState::TaskList,
            KeyCode::Char('s') => {
                let target = self
                    .selected_task()
                    .map(|task| (task.id, task.status.advanced()));
                if let Some((id, next)) = target {
                    let result = self.api.set_task_status(id, next);
                    self.finish_task_mutation(
                        result,
                        &format!("Task {} moved to {}", id, format_status(next)),
                    );
                }
            }
            KeyCode::Char('p') => {
                if let Some(id) = self.selected_task().map(|task| task.id) {
                    let result = self.api.toggle_task_pin(id);
                    self.finish_task_mutation(result, &format!("Toggled pin on task {}", id));
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_task().map(|task| task.id) {
                    self.confirm_action = Some(ConfirmAction::DeleteTask(id));
                    self.state = AppState::Confirm;
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_note_list_input(&mut self, key: KeyCode) -> io::Result<bool> {
        if self.search_active {
            self.handle_search_input(key);
            return Ok(false);
        }
        match key {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Esc => {
                if !self.search.is_empty() {
                    self.search.clear();
                    self.recompute_notes();
                } else {
                    return Ok(true);
                }
            }
            KeyCode::Tab => self.switch_view(),
            KeyCode::Up => {
                Self::move_selection(&mut self.note_list_state, self.note_rows.len(), false)
            }
            KeyCode::Down => {
                Self::move_selection(&mut self.note_list_state, self.note_rows.len(), true)
            }
            KeyCode::Char('p') => {
                if let Some(id) = self.selected_note_id() {
                    let result = self.api.toggle_note_pin(id);
                    self.finish_note_mutation(result, &format!("Toggled pin on note {}", id));
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_note_id() {
                    self.confirm_action = Some(ConfirmAction::DeleteNote(id));
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('/') => self.search_active = true,
            KeyCode::Char('r') => {
                self.reload_notes();
                self.set_status_message("Notes refreshed".to_string());
            }
            KeyCode::Char('h') => self.state = AppState::Help,
            _ => {}
        }
        Ok(false)
    }

    fn handle_project_list_input(&mut self, key: KeyCode) -> io::Result<bool> {
        if self.search_active {
            self.handle_search_input(key);
            return Ok(false);
        }
        match key {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Esc => {
                if !self.search.is_empty() {
                    self.search.clear();
                    self.recompute_projects();
                } else {
                    return Ok(true);
                }
            }
            KeyCode::Tab => self.switch_view(),
            KeyCode::Up => Self::move_selection(
                &mut self.project_list_state,
                self.project_rows.len(),
                false,
            ),
            KeyCode::Down => Self::move_selection(
                &mut self.project_list_state,
                self.project_rows.len(),
                true,
            ),
            KeyCode::Char('f') => {
                self.project_params.status = match self.project_params.status {
                    Filter::All => Filter::Only(ProjectStatus::Active),
                    Filter::Only(ProjectStatus::Active) => Filter::Only(ProjectStatus::OnHold),
                    Filter::Only(ProjectStatus::OnHold) => Filter::Only(ProjectStatus::Completed),
                    Filter::Only(ProjectStatus::Completed) => {
                        Filter::Only(ProjectStatus::Cancelled)
                    }
                    Filter::Only(ProjectStatus::Cancelled) => Filter::All,
                };
                self.recompute_projects();
            }
            KeyCode::Char('/') => self.search_active = true,
            KeyCode::Char('r') => {
                self.reload_projects();
                self.set_status_message("Projects refreshed".to_string());
            }
            KeyCode::Char('h') => self.state = AppState::Help,
            _ => {}
        }
        Ok(false)
    }

    fn handle_confirm_input(&mut self, key: KeyCode) -> io::Result<bool> {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.confirm_action.take() {
                    Some(ConfirmAction::DeleteTask(id)) => {
                        self.state = AppState::TaskList;
                        self.selected_task = None;
                        let result = self.api.delete_task(id);
                        self.finish_task_mutation(result, &format!("Task {} deleted", id));
                    }
                    Some(ConfirmAction::DeleteNote(id)) => {
                        self.state = AppState::NoteList;
                        let result = self.api.delete_note(id);
                        self.finish_note_mutation(result, &format!("Note {} deleted", id));
                    }
                    None => self.state = AppState::TaskList,
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = match self.confirm_action.take() {
                    Some(ConfirmAction::DeleteNote(_)) => AppState::NoteList,
                    _ => AppState::TaskList,
                };
                self.set_status_message("Cancelled".to_string());
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_help_input(&mut self, key: KeyCode) -> io::Result<bool> {
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') => {
                self.state = AppState::TaskList;
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(false);
                }
                self.clear_status_message();

                let should_quit = match self.state {
                    AppState::TaskList => self.handle_task_list_input(key.code, key.modifiers)?,
                    AppState::TaskDetail => self.handle_detail_input(key.code)?,
                    AppState::NoteList => self.handle_note_list_input(key.code)?,
                    AppState::ProjectList => self.handle_project_list_input(key.code)?,
                    AppState::Help => self.handle_help_input(key.code)?,
                    AppState::Confirm => self.handle_confirm_input(key.code)?,
                };
                if should_quit {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect, context: &str) {
        let header_text = vec![Line::from(vec![
            Span::styled("TASKDECK", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                context.to_string(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::ITALIC),
            ),
        ])];
        let header_block = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header_block, area);
    }

    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let today = Local::now().date_naive();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let context = format!("Tasks  |  {}", self.params_summary());
        self.render_header(f, chunks[0], &context);

        if self.rows.is_empty() {
            let empty = Paragraph::new("No tasks match the current filters.")
                .block(Block::default().borders(Borders::ALL).title("Tasks (0)"))
                .alignment(Alignment::Center);
            f.render_widget(empty, chunks[1]);
            return;
        }

        let header_cells = ["ID", "Pin", "Status", "Priority", "Due", "Progress", "Title"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(PIN_TEAL).fg(Color::White))
            .height(1);

        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|row| {
                let t = &row.task;
                let tags_str = if t.tags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", t.tags.join(","))
                };
                let priority_color = match t.priority {
                    Priority::Urgent => URGENT_RED,
                    Priority::High => HIGH_ORANGE,
                    Priority::Medium => MEDIUM_GOLD,
                    Priority::Low => LOW_SLATE,
                };
                let mut style = match t.status {
                    Status::Completed => Style::default().fg(Color::DarkGray),
                    Status::InProgress => {
                        Style::default().fg(priority_color).add_modifier(Modifier::BOLD)
                    }
                    _ => Style::default().fg(Color::White),
                };
                if t.is_pinned {
                    style = style.add_modifier(Modifier::BOLD);
                }

                Row::new(vec![
                    Cell::from(t.id.to_string()),
                    Cell::from(if t.is_pinned { "*" } else { "" }),
                    Cell::from(format_status(t.status)),
                    Cell::from(format_priority(t.priority)),
                    Cell::from(format_due_relative(t.due_date, today)),
                    Cell::from(format!("{}%", row.progress)),
                    Cell::from(format!("{}{}", t.title, tags_str)),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(5),  // ID
            Constraint::Length(4),  // Pin
            Constraint::Length(12), // Status
            Constraint::Length(9),  // Priority
            Constraint::Length(10), // Due
            Constraint::Length(9),  // Progress
            Constraint::Min(25),    // Title
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}) - Press 'h' for help",
                self.rows.len(),
                self.tasks.len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[1], &mut self.task_list_state);
    }

    fn render_task_detail(&mut self, f: &mut Frame, area: Rect) {
        let Some(task) = self.selected_task().cloned() else {
            self.state = AppState::TaskList;
            return;
        };
        let today = Local::now().date_naive();
        let progress = crate::view::effective_progress(&task);

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Title: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(task.title.clone()),
            ]),
            Line::from(vec![
                Span::styled("Status: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format_status(task.status)),
                Span::raw("   "),
                Span::styled("Priority: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format_priority(task.priority)),
                Span::raw("   "),
                Span::styled("Pinned: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(if task.is_pinned { "yes" } else { "no" }),
            ]),
            Line::from(vec![
                Span::styled("Due: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format_due_relative(task.due_date, today)),
                Span::raw("   "),
                Span::styled("Progress: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!("{}%", progress)),
            ]),
            Line::from(vec![
                Span::styled("Assignees: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format_assignees(&task.assignees)),
            ]),
        ];
        if !task.tags.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("Tags: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(task.tags.join(", ")),
            ]));
        }
        lines.push(Line::from(""));
        if let Some(ref desc) = task.description {
            lines.push(Line::from(desc.clone()));
            lines.push(Line::from(""));
        }
        if !task.subtasks.is_empty() {
            lines.push(Line::from(Span::styled(
                "Subtasks",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for subtask in &task.subtasks {
                let marker = if subtask.completed { "[x]" } else { "[ ]" };
                lines.push(Line::from(format!("  {} {}", marker, subtask.title)));
            }
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "s: advance status  p: toggle pin  d: delete  Esc: back",
            Style::default().fg(Color::DarkGray),
        )));

        let detail = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Task #{}", task.id)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(detail, area);
    }

    fn render_note_list(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);
        self.render_header(f, chunks[0], "Notes  |  pinned first, then recent");

        if self.note_rows.is_empty() {
            let empty = Paragraph::new("No notes match the current filters.")
                .block(Block::default().borders(Borders::ALL).title("Notes (0)"))
                .alignment(Alignment::Center);
            f.render_widget(empty, chunks[1]);
            return;
        }

        let header_cells = ["ID", "Pin", "Colour", "Title", "Content"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(PIN_TEAL).fg(Color::White))
            .height(1);

        let rows: Vec<Row> = self
            .note_rows
            .iter()
            .map(|n| {
                let style = if n.is_pinned {
                    Style::default().fg(PIN_TEAL).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Row::new(vec![
                    Cell::from(n.id.to_string()),
                    Cell::from(if n.is_pinned { "*" } else { "" }),
                    Cell::from(format_note_color(n.color)),
                    Cell::from(truncate(&n.title, 28)),
                    Cell::from(truncate(&n.content.replace('\n', " "), 60)),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Length(7),
            Constraint::Length(30),
            Constraint::Min(30),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Notes ({}/{})",
                self.note_rows.len(),
                self.notes.len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[1], &mut self.note_list_state);
    }

    fn render_project_list(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);
        let status = match self.project_params.status {
            Filter::All => "all".to_string(),
            Filter::Only(s) => format_project_status(s).to_lowercase(),
        };
        self.render_header(f, chunks[0], &format!("Projects  |  status: {}", status));

        if self.project_rows.is_empty() {
            let empty = Paragraph::new("No projects match the current filters.")
                .block(Block::default().borders(Borders::ALL).title("Projects (0)"))
                .alignment(Alignment::Center);
            f.render_widget(empty, chunks[1]);
            return;
        }

        let header_cells = ["ID", "Status", "Tasks", "Members", "Progress", "Name"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(PIN_TEAL).fg(Color::White))
            .height(1);

        let rows: Vec<Row> = self
            .project_rows
            .iter()
            .map(|p| {
                let style = match p.status {
                    ProjectStatus::Completed | ProjectStatus::Cancelled => {
                        Style::default().fg(Color::DarkGray)
                    }
                    _ => Style::default().fg(Color::White),
                };
                Row::new(vec![
                    Cell::from(p.id.to_string()),
                    Cell::from(format_project_status(p.status)),
                    Cell::from(p.tasks_count.to_string()),
                    Cell::from(p.users_count.to_string()),
                    Cell::from(format!("{}%", p.progress_percentage)),
                    Cell::from(p.name.clone()),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Min(20),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Projects ({}/{})",
                self.project_rows.len(),
                self.projects.len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[1], &mut self.project_list_state);
    }

    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "Keys",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("  Tab          switch between tasks / notes / projects"),
            Line::from("  Up/Down      move selection"),
            Line::from("  Enter        open task detail"),
            Line::from("  /            search (title and description/content)"),
            Line::from("  f            cycle status filter"),
            Line::from("  i            cycle priority filter (tasks)"),
            Line::from("  u            cycle assignee filter (tasks)"),
            Line::from("  o            toggle sort key: due date / priority"),
            Line::from("  v            toggle sort direction"),
            Line::from("  s            advance task status (completed reopens)"),
            Line::from("  p            toggle pin"),
            Line::from("  d            delete (asks for confirmation)"),
            Line::from("  r            refetch from server"),
            Line::from("  q / Esc      back / quit"),
            Line::from(""),
            Line::from("Pinned records always sort first. Mutations are sent to"),
            Line::from("the server and the list is refetched on success."),
        ];
        let help = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: false });
        f.render_widget(help, area);
    }

    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(URGENT_RED));

        let area = centered_rect(50, 20, area);
        f.render_widget(Clear, area);

        let action = self
            .confirm_action
            .map(|a| a.describe())
            .unwrap_or_default();
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(action),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if self.search_active {
            format!(
                "Search: {} (Esc to clear, Enter to confirm)",
                self.search.value
            )
        } else if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if !self.search.is_empty() {
            format!("Filtered by '{}' | Press 'h' for help", self.search.value)
        } else {
            match self.state {
                AppState::TaskList => {
                    format!("Tasks: {} | Press 'h' for help", self.rows.len())
                }
                AppState::TaskDetail => "Task Details".to_string(),
                AppState::NoteList => {
                    format!("Notes: {} | Press 'h' for help", self.note_rows.len())
                }
                AppState::ProjectList => {
                    format!("Projects: {} | Press 'h' for help", self.project_rows.len())
                }
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(PIN_TEAL).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to the view renderers.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
            .split(f.area());

        match self.state {
            AppState::TaskList => self.render_task_list(f, chunks[0]),
            AppState::TaskDetail => self.render_task_detail(f, chunks[0]),
            AppState::NoteList => self.render_note_list(f, chunks[0]),
            AppState::ProjectList => self.render_project_list(f, chunks[0]),
            AppState::Help => self.render_help(f, chunks[0]),
            AppState::Confirm => {
                match self.confirm_action {
                    Some(ConfirmAction::DeleteNote(_)) => self.render_note_list(f, chunks[0]),
                    _ => self.render_task_list(f, chunks[0]),
                }
                self.render_confirm(f, chunks[0]);
            }
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop: render and process input until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Centered sub-rectangle used for modal dialogs, in percent of the parent.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
