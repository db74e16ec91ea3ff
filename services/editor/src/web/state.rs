//! services/editor/src/web/state.rs
//!
//! Defines the application state shared by every handler.

use crate::config::Config;
use retro_editor_core::EditorSession;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
///
/// There is exactly one editor session per process; the browser tab is its only user.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<EditorSession>,
    pub config: Arc<Config>,
}
