//! crates/retro_editor_core/src/domain.rs
//!
//! Defines the pure, core data structures for the editor.
//! These structs are independent of any transport, storage or UI layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The file name a fresh document is shown under.
pub const DEFAULT_FILE_NAME: &str = "untitled.txt";

//=========================================================================================
// Document
//=========================================================================================

/// The editable unit. `content` is never absent; an empty string is a cleared document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub file_name: String,
    /// Bumped on every local mutation of `content`.
    pub revision: u64,
}

impl Document {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            file_name: file_name.into(),
            revision: 0,
        }
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats::of(&self.content)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_NAME, String::new())
    }
}

/// Read-out counters shown by the toolbar and status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub lines: usize,
    pub chars: usize,
    pub words: usize,
}

impl DocumentStats {
    pub fn of(text: &str) -> Self {
        Self {
            lines: text.split('\n').count(),
            chars: text.chars().count(),
            words: text.split_whitespace().count(),
        }
    }
}

//=========================================================================================
// Status
//=========================================================================================

/// The single current phase of the session's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorStatus {
    Idle,
    Saving,
    Loading,
    AiThinking,
    Error,
}

impl EditorStatus {
    /// Whether a new status-changing operation may start from this status.
    pub fn accepts_operation(self) -> bool {
        matches!(self, EditorStatus::Idle | EditorStatus::Error)
    }
}

impl fmt::Display for EditorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EditorStatus::Idle => "READY",
            EditorStatus::Saving => "SAVING...",
            EditorStatus::Loading => "LOADING...",
            EditorStatus::AiThinking => "AI THINKING...",
            EditorStatus::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// How a non-empty AI response is applied to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiEditPolicy {
    #[default]
    Replace,
    /// Appends the response after [`AI_APPEND_SEPARATOR`].
    Append,
}

pub const AI_APPEND_SEPARATOR: &str = "\n\n";

//=========================================================================================
// Notifications
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NotificationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// A transient, auto-expiring user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Remote document store
//=========================================================================================

/// A bearer token for the remote store. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Trims the input; returns `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Explicit remote-store configuration held by the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteCredentials {
    pub token: Option<AccessToken>,
    /// Login of the token's owner, known once the token has been verified.
    pub owner: Option<String>,
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub login: String,
}

/// One file inside a remote document, as returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub document_id: String,
    pub file_name: String,
    pub raw_url: String,
    pub description: Option<String>,
}

/// A retrieved remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteContent {
    pub file_name: String,
    pub content: String,
}
