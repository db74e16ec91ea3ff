//! services/editor/src/web/autosave_task.rs
//!
//! This module contains the background worker that debounces edits and
//! persists the document to the remote store.

use retro_editor_core::{EditorSession, SessionError};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The main asynchronous task for auto-persisting the document.
///
/// Every edit restarts a `delay` timer and only the last edit in a quiet
/// window triggers a write. The revision watch holds a single pending marker,
/// so edits made while a write is in flight collapse into exactly one
/// follow-up write once it completes. Writes run one at a time.
pub async fn autosave_process(
    session: Arc<EditorSession>,
    delay: Duration,
    cancellation_token: CancellationToken,
) {
    info!(?delay, "Auto-persist task started.");
    let mut edits = session.subscribe_edits();
    let mut rearmed = false;

    'outer: loop {
        if !rearmed {
            tokio::select! {
                _ = cancellation_token.cancelled() => break 'outer,
                changed = edits.changed() => {
                    if changed.is_err() {
                        break 'outer;
                    }
                }
            }
        }
        rearmed = false;

        // Restart the quiet window on every further edit.
        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => break 'outer,
                _ = tokio::time::sleep(delay) => break,
                changed = edits.changed() => {
                    if changed.is_err() {
                        break 'outer;
                    }
                }
            }
        }

        match session.auto_persist().await {
            Ok(()) => debug!("Auto-persisted document."),
            Err(SessionError::Busy(status)) => {
                debug!(%status, "Session busy, retrying auto-persist after the delay.");
                rearmed = true;
            }
            Err(SessionError::NotLoggedIn | SessionError::NoRemoteDocument) => {
                debug!("Auto-persist skipped: remote store not configured.");
            }
            Err(e) => warn!("Auto-persist failed: {}", e),
        }
    }

    info!("Auto-persist task stopped.");
}
