//! services/editor/src/web/rest.rs
//!
//! Contains the Axum handlers for the document, file and AI endpoints and the
//! master definition for the OpenAPI specification.

use crate::web::{
    protocol::{
        AiEditRequest, AiEditResponse, DocumentResponse, LoginRequest, LoginResponse,
        NotificationDto, OpenFileRequest, OpenRemoteRequest, PublishRequest, PublishResponse,
        RemoteDocumentRequest, RemoteFileDto, RemoteStatusResponse, ReplaceContentRequest,
        SaveFileRequest, StatsDto,
    },
    remote,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use retro_editor_core::{AiOutcome, FileHandle, NotificationId, SessionError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_document_handler,
        replace_content_handler,
        clear_handler,
        save_file_handler,
        open_file_handler,
        ai_edit_handler,
        list_notifications_handler,
        dismiss_notification_handler,
        remote::login_handler,
        remote::logout_handler,
        remote::remote_status_handler,
        remote::set_remote_document_handler,
        remote::persist_remote_handler,
        remote::publish_remote_handler,
        remote::fetch_remote_handler,
        remote::list_remote_handler,
        remote::open_remote_handler,
    ),
    components(
        schemas(
            DocumentResponse, StatsDto, ReplaceContentRequest, SaveFileRequest, OpenFileRequest,
            AiEditRequest, AiEditResponse, NotificationDto, LoginRequest, LoginResponse,
            RemoteDocumentRequest, RemoteStatusResponse, PublishRequest, PublishResponse,
            RemoteFileDto, OpenRemoteRequest
        )
    ),
    tags(
        (name = "Retro Editor API", description = "Editor session endpoints for the retro text editor.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Maps a session failure onto an HTTP status and a plain-text body.
pub fn session_error(e: SessionError) -> (StatusCode, String) {
    let status = match e {
        SessionError::Busy(_) => StatusCode::CONFLICT,
        SessionError::EmptyPrompt | SessionError::EmptyDocument => StatusCode::BAD_REQUEST,
        SessionError::NotLoggedIn | SessionError::NoRemoteDocument => {
            StatusCode::PRECONDITION_FAILED
        }
        SessionError::Auth => StatusCode::UNAUTHORIZED,
        SessionError::Transport(_) => StatusCode::BAD_GATEWAY,
        SessionError::Read(_) | SessionError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        warn!("Request failed: {}", e);
    }
    (status, e.to_string())
}

pub(crate) async fn document(app_state: &AppState) -> Json<DocumentResponse> {
    Json(app_state.session.snapshot().await.into())
}

//=========================================================================================
// Document Handlers
//=========================================================================================

/// Current document, status and statistics.
#[utoipa::path(
    get,
    path = "/document",
    responses((status = 200, description = "Current document", body = DocumentResponse))
)]
pub async fn get_document_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    document(&app_state).await
}

/// Replace the document text (keystrokes, paste, programmatic clear).
#[utoipa::path(
    put,
    path = "/document",
    request_body = ReplaceContentRequest,
    responses((status = 200, description = "Content replaced", body = DocumentResponse))
)]
pub async fn replace_content_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<ReplaceContentRequest>,
) -> impl IntoResponse {
    app_state.session.replace_content(req.content).await;
    document(&app_state).await
}

/// Empty the document.
#[utoipa::path(
    post,
    path = "/document/clear",
    responses((status = 200, description = "Document cleared", body = DocumentResponse))
)]
pub async fn clear_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    app_state.session.clear().await;
    document(&app_state).await
}

//=========================================================================================
// File Handlers
//=========================================================================================

/// Save the document as a plain-text file.
#[utoipa::path(
    post,
    path = "/file/save",
    request_body = SaveFileRequest,
    responses(
        (status = 200, description = "File saved", body = DocumentResponse),
        (status = 409, description = "Another operation is in progress"),
        (status = 500, description = "The file could not be written")
    )
)]
pub async fn save_file_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<SaveFileRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let file_name = match req.file_name.filter(|n| !n.trim().is_empty()) {
        Some(name) => name,
        None => app_state.session.snapshot().await.file_name,
    };
    app_state
        .session
        .save_to_file(&file_name)
        .await
        .map_err(session_error)?;
    Ok(document(&app_state).await)
}

/// Open a local file, replacing the document.
#[utoipa::path(
    post,
    path = "/file/open",
    request_body = OpenFileRequest,
    responses(
        (status = 200, description = "File opened", body = DocumentResponse),
        (status = 409, description = "Another operation is in progress"),
        (status = 500, description = "The file could not be read")
    )
)]
pub async fn open_file_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<OpenFileRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let handle = FileHandle(PathBuf::from(req.path));
    app_state
        .session
        .open_from_file(&handle)
        .await
        .map_err(session_error)?;
    Ok(document(&app_state).await)
}

//=========================================================================================
// AI Handler
//=========================================================================================

/// Ask the AI assistant to edit the document.
#[utoipa::path(
    post,
    path = "/ai",
    request_body = AiEditRequest,
    responses(
        (status = 200, description = "Request completed", body = AiEditResponse),
        (status = 400, description = "Empty prompt"),
        (status = 401, description = "The AI service rejected the API key"),
        (status = 409, description = "Another operation is in progress"),
        (status = 502, description = "The AI service could not be reached")
    )
)]
pub async fn ai_edit_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<AiEditRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let outcome = app_state
        .session
        .request_ai_edit(&req.prompt)
        .await
        .map_err(session_error)?;
    let Json(snapshot) = document(&app_state).await;
    Ok(Json(AiEditResponse {
        applied: outcome == AiOutcome::Applied,
        document: snapshot,
    }))
}

//=========================================================================================
// Notification Handlers
//=========================================================================================

/// Live notifications, oldest first.
#[utoipa::path(
    get,
    path = "/notifications",
    responses((status = 200, description = "Live notifications", body = [NotificationDto]))
)]
pub async fn list_notifications_handler(
    State(app_state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let notifications: Vec<NotificationDto> = app_state
        .session
        .notifications()
        .await
        .into_iter()
        .map(NotificationDto::from)
        .collect();
    Json(notifications)
}

/// Dismiss a notification before it expires.
#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 204, description = "Dismissed"),
        (status = 404, description = "Unknown or already expired")
    )
)]
pub async fn dismiss_notification_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    let Ok(id) = id.parse::<NotificationId>() else {
        return StatusCode::NOT_FOUND;
    };
    if app_state.session.dismiss_notification(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
