//! services/editor/src/web/remote.rs
//!
//! Login/logout and remote document store endpoints.

use crate::web::{
    protocol::{
        LoginRequest, LoginResponse, OpenRemoteRequest, PublishRequest, PublishResponse,
        RemoteDocumentRequest, RemoteFileDto, RemoteStatusResponse,
    },
    rest::{document, session_error},
    state::AppState,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

//=========================================================================================
// Credentials
//=========================================================================================

/// Verify a personal access token and keep it for remote calls.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "The token was rejected"),
        (status = 412, description = "The token was empty")
    )
)]
pub async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = app_state
        .session
        .login(&req.token)
        .await
        .map_err(session_error)?;
    Ok(Json(LoginResponse { login: user.login }))
}

/// Forget the token, in memory and on disk.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Logged out"))
)]
pub async fn logout_handler(State(app_state): State<Arc<AppState>>) -> StatusCode {
    app_state.session.logout().await;
    StatusCode::NO_CONTENT
}

/// Whether a token is held, whose it is and which document is targeted.
#[utoipa::path(
    get,
    path = "/remote",
    responses((status = 200, description = "Remote store state", body = RemoteStatusResponse))
)]
pub async fn remote_status_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let credentials = app_state.session.remote_credentials().await;
    Json(RemoteStatusResponse::new(credentials, app_state.config.autosave))
}

/// Choose (or clear) the remote document that saves and loads target.
#[utoipa::path(
    put,
    path = "/remote/document",
    request_body = RemoteDocumentRequest,
    responses((status = 200, description = "Target updated", body = RemoteStatusResponse))
)]
pub async fn set_remote_document_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<RemoteDocumentRequest>,
) -> impl IntoResponse {
    let document_id = req
        .document_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    app_state.session.set_remote_document(document_id).await;
    let credentials = app_state.session.remote_credentials().await;
    Json(RemoteStatusResponse::new(credentials, app_state.config.autosave))
}

//=========================================================================================
// Documents
//=========================================================================================

/// Write the document into the target remote document.
#[utoipa::path(
    post,
    path = "/remote/save",
    responses(
        (status = 200, description = "Saved", body = crate::web::protocol::DocumentResponse),
        (status = 401, description = "The token was rejected"),
        (status = 409, description = "Another operation is in progress"),
        (status = 412, description = "Not logged in or no target document"),
        (status = 502, description = "The remote store could not be reached")
    )
)]
pub async fn persist_remote_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .session
        .persist_remote()
        .await
        .map_err(session_error)?;
    Ok(document(&app_state).await)
}

/// Create a new remote document from the current content.
#[utoipa::path(
    post,
    path = "/remote/publish",
    request_body = PublishRequest,
    responses(
        (status = 201, description = "Created", body = PublishResponse),
        (status = 400, description = "Nothing to save"),
        (status = 401, description = "The token was rejected"),
        (status = 409, description = "Another operation is in progress"),
        (status = 412, description = "Not logged in")
    )
)]
pub async fn publish_remote_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<PublishRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let file_name = req.file_name.filter(|n| !n.trim().is_empty());
    let document_id = app_state
        .session
        .publish_remote(file_name.as_deref())
        .await
        .map_err(session_error)?;
    Ok((StatusCode::CREATED, Json(PublishResponse { document_id })))
}

/// Replace the document with the target remote document.
#[utoipa::path(
    post,
    path = "/remote/load",
    responses(
        (status = 200, description = "Loaded", body = crate::web::protocol::DocumentResponse),
        (status = 401, description = "The token was rejected"),
        (status = 409, description = "Another operation is in progress"),
        (status = 412, description = "Not logged in or no target document"),
        (status = 502, description = "The remote store could not be reached")
    )
)]
pub async fn fetch_remote_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .session
        .fetch_remote()
        .await
        .map_err(session_error)?;
    Ok(document(&app_state).await)
}

/// The logged-in owner's remote text files.
#[utoipa::path(
    get,
    path = "/remote/files",
    responses(
        (status = 200, description = "Remote files", body = [RemoteFileDto]),
        (status = 401, description = "The token was rejected"),
        (status = 412, description = "Not logged in")
    )
)]
pub async fn list_remote_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let files = app_state
        .session
        .list_remote()
        .await
        .map_err(session_error)?;
    let files: Vec<RemoteFileDto> = files.into_iter().map(RemoteFileDto::from).collect();
    Ok(Json(files))
}

/// Replace the document with one of the listed remote files.
#[utoipa::path(
    post,
    path = "/remote/open",
    request_body = OpenRemoteRequest,
    responses(
        (status = 200, description = "Loaded", body = crate::web::protocol::DocumentResponse),
        (status = 401, description = "The token was rejected"),
        (status = 409, description = "Another operation is in progress"),
        (status = 412, description = "Not logged in"),
        (status = 502, description = "Unknown file or the remote store could not be reached")
    )
)]
pub async fn open_remote_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<OpenRemoteRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state
        .session
        .open_remote(req.document_id.trim(), req.file_name.trim())
        .await
        .map_err(session_error)?;
    Ok(document(&app_state).await)
}
