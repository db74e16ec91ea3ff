//! services/editor/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser editor and the service.

use chrono::{DateTime, Utc};
use retro_editor_core::{
    EditorStatus, Notification, NotificationKind, RemoteCredentials, RemoteFile, SessionSnapshot,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

//=========================================================================================
// Requests FROM the Browser
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct ReplaceContentRequest {
    pub content: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SaveFileRequest {
    /// Defaults to the document's current file name.
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct OpenFileRequest {
    pub path: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AiEditRequest {
    pub prompt: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub token: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RemoteDocumentRequest {
    #[serde(default)]
    pub document_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct PublishRequest {
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Names a file from the `/remote/files` listing.
#[derive(Deserialize, ToSchema)]
pub struct OpenRemoteRequest {
    pub document_id: String,
    pub file_name: String,
}

//=========================================================================================
// Responses TO the Browser
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsDto {
    pub lines: usize,
    pub chars: usize,
    pub words: usize,
}

/// Everything the toolbar, status bar and text area display.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct DocumentResponse {
    pub content: String,
    pub file_name: String,
    pub revision: u64,
    /// Machine-readable status (`idle`, `saving`, `loading`, `ai_thinking`, `error`).
    pub status: String,
    /// The label shown in the status bar.
    pub status_label: String,
    pub stats: StatsDto,
}

impl From<SessionSnapshot> for DocumentResponse {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            content: snapshot.content,
            file_name: snapshot.file_name,
            revision: snapshot.revision,
            status: status_code(snapshot.status).to_string(),
            status_label: snapshot.status.to_string(),
            stats: StatsDto {
                lines: snapshot.stats.lines,
                chars: snapshot.stats.chars,
                words: snapshot.stats.words,
            },
        }
    }
}

pub fn status_code(status: EditorStatus) -> &'static str {
    match status {
        EditorStatus::Idle => "idle",
        EditorStatus::Saving => "saving",
        EditorStatus::Loading => "loading",
        EditorStatus::AiThinking => "ai_thinking",
        EditorStatus::Error => "error",
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct AiEditResponse {
    /// False when the service answered with nothing to apply.
    pub applied: bool,
    pub document: DocumentResponse,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct NotificationDto {
    pub id: String,
    /// `success`, `error` or `info`.
    pub kind: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationDto {
    fn from(notification: Notification) -> Self {
        let kind = match notification.kind {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        };
        Self {
            id: notification.id.to_string(),
            kind: kind.to_string(),
            message: notification.message,
            created_at: notification.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileDto {
    pub document_id: String,
    pub file_name: String,
    pub raw_url: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<RemoteFile> for RemoteFileDto {
    fn from(file: RemoteFile) -> Self {
        Self {
            document_id: file.document_id,
            file_name: file.file_name,
            raw_url: file.raw_url,
            description: file.description,
        }
    }
}

/// Remote-store connection state. The token itself is never sent back.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct RemoteStatusResponse {
    pub logged_in: bool,
    pub autosave: bool,
    pub owner: Option<String>,
    pub document_id: Option<String>,
}

impl RemoteStatusResponse {
    pub fn new(credentials: RemoteCredentials, autosave: bool) -> Self {
        Self {
            logged_in: credentials.token.is_some(),
            autosave,
            owner: credentials.owner,
            document_id: credentials.document_id,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct LoginResponse {
    pub login: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct PublishResponse {
    pub document_id: String,
}
