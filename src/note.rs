//! Note records: short personal/team notes with a colour token and pinning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::NoteColor;
use crate::task::Assignee;

/// A note as delivered by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub color: NoteColor,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub user: Option<Assignee>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields accepted by the note create/update endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NotePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<NoteColor>,
}
