pub mod autosave_task;
pub mod protocol;
pub mod remote;
pub mod rest;
pub mod state;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub use autosave_task::autosave_process;
pub use state::AppState;

/// Builds the full API router over one shared session.
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route(
            "/document",
            get(rest::get_document_handler).put(rest::replace_content_handler),
        )
        .route("/document/clear", post(rest::clear_handler))
        .route("/file/save", post(rest::save_file_handler))
        .route("/file/open", post(rest::open_file_handler))
        .route("/ai", post(rest::ai_edit_handler))
        .route("/notifications", get(rest::list_notifications_handler))
        .route("/notifications/{id}", delete(rest::dismiss_notification_handler))
        .route("/auth/login", post(remote::login_handler))
        .route("/auth/logout", post(remote::logout_handler))
        .route("/remote", get(remote::remote_status_handler))
        .route("/remote/document", put(remote::set_remote_document_handler))
        .route("/remote/save", post(remote::persist_remote_handler))
        .route("/remote/publish", post(remote::publish_remote_handler))
        .route("/remote/load", post(remote::fetch_remote_handler))
        .route("/remote/files", get(remote::list_remote_handler))
        .route("/remote/open", post(remote::open_remote_handler))
        .layer(cors)
        .with_state(app_state)
}
