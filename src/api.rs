//! HTTP client for the workspace server: collection fetches plus one method
//! per mutation intent.
//!
//! Every mutation issues exactly one blocking request to a fixed endpoint
//! pattern and returns a `Result` for the caller to match on. There is no
//! retry, no queueing and no local patching of the collection; after a
//! successful mutation the caller re-fetches and the server's next answer
//! wins wholesale.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::fields::{
    direction_wire, project_sort_wire, project_status_wire, status_wire, ProjectSortBy,
    ProjectStatus, SortDirection, Status,
};
use crate::note::{Note, NotePayload};
use crate::project::ProjectPage;
use crate::task::{Task, TaskPayload};

/// Server validation errors, keyed by field name.
pub type ErrorMap = BTreeMap<String, Vec<String>>;

/// Join every validation message verbatim, in field order.
pub fn flatten_errors(errors: &ErrorMap) -> String {
    let mut parts = Vec::new();
    for (field, messages) in errors {
        for message in messages {
            parts.push(format!("{}: {}", field, message));
        }
    }
    parts.join("; ")
}

/// Errors surfaced by the dispatcher. Validation messages pass through
/// verbatim; nothing here is retried automatically.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the payload (HTTP 422) with a field-keyed map.
    #[error("validation failed: {}", flatten_errors(.0))]
    Validation(ErrorMap),

    /// Any other non-success status.
    #[error("server returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never completed (DNS, refused connection, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("failed to parse server response: {0}")]
    Parse(String),
}

/// Error body the server sends with 4xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<ErrorMap>,
}

/// Acknowledgment of a mutation; the optional message is the server's flash
/// payload.
#[derive(Debug, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

/// Blocking client bound to one server and (optionally) one bearer token.
pub struct ApiClient {
    agent: ureq::Agent,
    base: String,
    token: Option<String>,
}

const USER_AGENT: &str = concat!("taskdeck-cli/", env!("CARGO_PKG_VERSION"));

impl ApiClient {
    /// Create a client for the given base URL. A trailing slash on the base
    /// is tolerated.
    pub fn new(base: &str, token: Option<String>) -> Self {
        ApiClient {
            agent: ureq::agent(),
            base: base.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let mut req = self
            .agent
            .request(method, &format!("{}{}", self.base, path))
            .set("Accept", "application/json")
            .set("User-Agent", USER_AGENT);
        if let Some(ref token) = self.token {
            req = req.set("Authorization", &format!("Bearer {}", token));
        }
        req
    }

    fn read_json<T: DeserializeOwned>(
        result: Result<ureq::Response, ureq::Error>,
    ) -> Result<T, ApiError> {
        let resp = triage(result)?;
        resp.into_json().map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Finish a mutation request: tolerate empty bodies and bodies that are
    /// not the ack shape, since only the flash message is optional data.
    fn read_ack(result: Result<ureq::Response, ureq::Error>) -> Result<Ack, ApiError> {
        let resp = triage(result)?;
        let body = resp
            .into_string()
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(Ack::default());
        }
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    /// Fetch the full task collection.
    pub fn fetch_tasks(&self) -> Result<Vec<Task>, ApiError> {
        Self::read_json(self.request("GET", "/api/tasks").call())
    }

    /// Fetch the full note collection.
    pub fn fetch_notes(&self) -> Result<Vec<Note>, ApiError> {
        Self::read_json(self.request("GET", "/api/notes").call())
    }

    /// Fetch one page of the admin project list. Search, status and sort
    /// round-trip as query parameters; filtering of the loaded page beyond
    /// that stays client-side.
    pub fn fetch_projects(
        &self,
        search: &str,
        status: Option<ProjectStatus>,
        sort_by: ProjectSortBy,
        sort_order: SortDirection,
        page: u32,
    ) -> Result<ProjectPage, ApiError> {
        let mut req = self
            .request("GET", "/api/projects")
            .query("sort_by", project_sort_wire(sort_by))
            .query("sort_order", direction_wire(sort_order))
            .query("page", &page.to_string());
        if !search.trim().is_empty() {
            req = req.query("search", search.trim());
        }
        if let Some(s) = status {
            req = req.query("status", project_status_wire(s));
        }
        Self::read_json(req.call())
    }

    /// Create a task.
    pub fn create_task(&self, payload: &TaskPayload) -> Result<Ack, ApiError> {
        Self::read_ack(self.request("POST", "/api/tasks").send_json(payload))
    }

    /// Update fields on a task.
    pub fn update_task(&self, id: u64, payload: &TaskPayload) -> Result<Ack, ApiError> {
        Self::read_ack(
            self.request("PUT", &format!("/api/tasks/{}", id))
                .send_json(payload),
        )
    }

    /// Request a status transition.
    pub fn set_task_status(&self, id: u64, status: Status) -> Result<Ack, ApiError> {
        Self::read_ack(
            self.request("PATCH", &format!("/api/tasks/{}/status", id))
                .send_json(serde_json::json!({ "status": status_wire(status) })),
        )
    }

    /// Toggle the pin flag.
    pub fn toggle_task_pin(&self, id: u64) -> Result<Ack, ApiError> {
        Self::read_ack(
            self.request("PATCH", &format!("/api/tasks/{}/pin", id))
                .call(),
        )
    }

    /// Delete a task. Confirmation is the caller's job.
    pub fn delete_task(&self, id: u64) -> Result<Ack, ApiError> {
        Self::read_ack(self.request("DELETE", &format!("/api/tasks/{}", id)).call())
    }

    /// Create a note.
    pub fn create_note(&self, payload: &NotePayload) -> Result<Ack, ApiError> {
        Self::read_ack(self.request("POST", "/api/notes").send_json(payload))
    }

    /// Update a note.
    pub fn update_note(&self, id: u64, payload: &NotePayload) -> Result<Ack, ApiError> {
        Self::read_ack(
            self.request("PUT", &format!("/api/notes/{}", id))
                .send_json(payload),
        )
    }

    /// Toggle a note's pin flag.
    pub fn toggle_note_pin(&self, id: u64) -> Result<Ack, ApiError> {
        Self::read_ack(
            self.request("PATCH", &format!("/api/notes/{}/pin", id))
                .call(),
        )
    }

    /// Delete a note. Confirmation is the caller's job.
    pub fn delete_note(&self, id: u64) -> Result<Ack, ApiError> {
        Self::read_ack(self.request("DELETE", &format!("/api/notes/{}", id)).call())
    }
}

/// Map a ureq result into the dispatcher's error taxonomy.
fn triage(result: Result<ureq::Response, ureq::Error>) -> Result<ureq::Response, ApiError> {
    match result {
        Ok(resp) => Ok(resp),
        Err(ureq::Error::Status(status, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            Err(classify_status(status, &body))
        }
        Err(e) => Err(ApiError::Transport(e.to_string())),
    }
}

/// Classify a non-success response. 422 bodies with an error map become
/// validation errors; everything else keeps the server's message (or the
/// raw body) for display.
fn classify_status(status: u16, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    if status == 422 {
        if let Some(errors) = parsed.errors {
            return ApiError::Validation(errors);
        }
    }
    let message = parsed
        .message
        .unwrap_or_else(|| body.trim().to_string());
    ApiError::Status { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_flatten_verbatim_and_in_order() {
        let mut errors = ErrorMap::new();
        errors.insert(
            "title".into(),
            vec!["The title field is required.".into()],
        );
        errors.insert(
            "due_date".into(),
            vec![
                "The due date must be a valid date.".into(),
                "The due date must be after today.".into(),
            ],
        );
        let flat = flatten_errors(&errors);
        assert_eq!(
            flat,
            "due_date: The due date must be a valid date.; \
             due_date: The due date must be after today.; \
             title: The title field is required."
        );
        let err = ApiError::Validation(errors);
        assert!(err.to_string().starts_with("validation failed: due_date"));
    }

    #[test]
    fn status_422_with_error_map_becomes_validation() {
        let body = r#"{"message":"The given data was invalid.","errors":{"title":["required"]}}"#;
        match classify_status(422, body) {
            ApiError::Validation(map) => {
                assert_eq!(map["title"], vec!["required".to_string()]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn other_statuses_keep_the_server_message() {
        match classify_status(403, r#"{"message":"Forbidden."}"#) {
            ApiError::Status { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Forbidden.");
            }
            other => panic!("expected status error, got {:?}", other),
        }
        // Non-JSON bodies fall back to the raw text.
        match classify_status(500, "boom") {
            ApiError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn base_url_trailing_slash_is_tolerated() {
        let client = ApiClient::new("https://deck.example.com/", None);
        assert_eq!(client.base, "https://deck.example.com");
    }
}
