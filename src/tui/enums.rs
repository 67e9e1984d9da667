//! Enumerations for TUI state management.

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq)]
pub enum AppState {
    TaskList,
    TaskDetail,
    NoteList,
    ProjectList,
    Help,
    Confirm,
}

/// A destructive action awaiting user confirmation.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ConfirmAction {
    DeleteTask(u64),
    DeleteNote(u64),
}

impl ConfirmAction {
    /// Text shown in the confirmation dialog.
    pub fn describe(&self) -> String {
        match self {
            ConfirmAction::DeleteTask(id) => format!("Delete task #{}", id),
            ConfirmAction::DeleteNote(id) => format!("Delete note #{}", id),
        }
    }
}
