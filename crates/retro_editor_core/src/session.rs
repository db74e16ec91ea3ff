//! crates/retro_editor_core/src/session.rs
//!
//! The editor session: document, status and notifications, plus the
//! save/load/AI/remote operations that move the status through its lifecycle.
//!
//! All state sits behind one async mutex that is only held for short critical
//! sections. It is never held across an `.await` on a port, so edits keep
//! flowing while a save, load or AI request is outstanding.

use bytes::Bytes;
use chrono::Duration;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::domain::{
    AccessToken, AiEditPolicy, Document, DocumentStats, EditorStatus, Notification,
    NotificationId, NotificationKind, RemoteCredentials, RemoteFile, RemoteUser,
    AI_APPEND_SEPARATOR, DEFAULT_FILE_NAME,
};
use crate::notifications::{NotificationQueue, DEFAULT_NOTIFICATION_TTL_MS};
use crate::ports::{
    Clock, CompletionService, DocumentStore, FileHandle, FileHost, PortError, TokenStore,
};

//=========================================================================================
// Errors
//=========================================================================================

/// Why a session operation did not complete.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Another operation is in progress ({0})")]
    Busy(EditorStatus),
    #[error("The prompt is empty")]
    EmptyPrompt,
    #[error("The document is empty")]
    EmptyDocument,
    #[error("Not logged in to the remote store")]
    NotLoggedIn,
    #[error("No remote document selected")]
    NoRemoteDocument,
    #[error("Failed to write the document: {0}")]
    Serialization(String),
    #[error("Failed to read the file: {0}")]
    Read(String),
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Authentication failed")]
    Auth,
}

pub type SessionResult<T> = Result<T, SessionError>;

//=========================================================================================
// Construction
//=========================================================================================

/// Every collaborator the session talks to.
#[derive(Clone)]
pub struct SessionPorts {
    pub files: Arc<dyn FileHost>,
    pub completion: Arc<dyn CompletionService>,
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub file_name: String,
    pub initial_content: String,
    pub notification_ttl: Duration,
    pub ai_policy: AiEditPolicy,
    pub remote: RemoteCredentials,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME.to_string(),
            initial_content: String::new(),
            notification_ttl: Duration::milliseconds(DEFAULT_NOTIFICATION_TTL_MS),
            ai_policy: AiEditPolicy::default(),
            remote: RemoteCredentials::default(),
        }
    }
}

/// A point-in-time copy of what the status bar and toolbar display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub content: String,
    pub file_name: String,
    pub revision: u64,
    pub status: EditorStatus,
    pub stats: DocumentStats,
}

/// What a completed AI request did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiOutcome {
    Applied,
    NoContent,
}

/// Who started an operation. Automatic operations stay quiet about
/// preconditions and success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    User,
    Auto,
}

struct SessionState {
    document: Document,
    status: EditorStatus,
    notifications: NotificationQueue,
    remote: RemoteCredentials,
}

pub struct EditorSession {
    state: Mutex<SessionState>,
    ports: SessionPorts,
    ai_policy: AiEditPolicy,
    revisions: watch::Sender<u64>,
}

impl EditorSession {
    pub fn new(ports: SessionPorts, options: SessionOptions) -> Self {
        let document = Document::new(options.file_name, options.initial_content);
        let (revisions, _) = watch::channel(document.revision);
        Self {
            state: Mutex::new(SessionState {
                document,
                status: EditorStatus::Idle,
                notifications: NotificationQueue::new(options.notification_ttl),
                remote: options.remote,
            }),
            ports,
            ai_policy: options.ai_policy,
            revisions,
        }
    }

    //=====================================================================================
    // Read-outs
    //=====================================================================================

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            content: state.document.content.clone(),
            file_name: state.document.file_name.clone(),
            revision: state.document.revision,
            status: state.status,
            stats: state.document.stats(),
        }
    }

    pub async fn content(&self) -> String {
        self.state.lock().await.document.content.clone()
    }

    pub async fn status(&self) -> EditorStatus {
        self.state.lock().await.status
    }

    /// Live notifications, oldest first. Expired ones are dropped on the way.
    pub async fn notifications(&self) -> Vec<Notification> {
        let now = self.ports.clock.now();
        self.state.lock().await.notifications.active(now)
    }

    pub async fn dismiss_notification(&self, id: NotificationId) -> bool {
        self.state.lock().await.notifications.dismiss(id)
    }

    pub async fn remote_credentials(&self) -> RemoteCredentials {
        self.state.lock().await.remote.clone()
    }

    /// A receiver that sees the latest document revision. Multiple edits made
    /// before the receiver looks collapse into a single change.
    pub fn subscribe_edits(&self) -> watch::Receiver<u64> {
        self.revisions.subscribe()
    }

    //=====================================================================================
    // Editing
    //=====================================================================================

    /// Sets the document text. Allowed in any status.
    pub async fn replace_content(&self, text: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.document.content = text.into();
        self.bump_revision(&mut state);
    }

    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.document.content.clear();
        self.bump_revision(&mut state);
        self.notify(&mut state, NotificationKind::Info, "Editor cleared.");
    }

    //=====================================================================================
    // Local files
    //=====================================================================================

    /// Writes the current content as plain UTF-8 text under `file_name`.
    pub async fn save_to_file(&self, file_name: &str) -> SessionResult<()> {
        let content = {
            let mut state = self.state.lock().await;
            self.begin(&mut state, EditorStatus::Saving, Origin::User)?;
            state.document.content.clone()
        };

        info!(file_name, bytes = content.len(), "Saving document to file.");
        let result = self.ports.files.save(file_name, Bytes::from(content)).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(()) => {
                self.succeed(&mut state, "File saved successfully!");
                Ok(())
            }
            Err(e) => Err(self.fail(
                &mut state,
                SessionError::Serialization(e.to_string()),
                "Failed to save file.",
            )),
        }
    }

    /// Replaces content and file name with the picked file, both or neither.
    pub async fn open_from_file(&self, handle: &FileHandle) -> SessionResult<()> {
        {
            let mut state = self.state.lock().await;
            self.begin(&mut state, EditorStatus::Loading, Origin::User)?;
        }

        info!(path = %handle.0.display(), "Opening file.");
        let result = self.ports.files.open(handle).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(opened) => {
                state.document.content = String::from_utf8_lossy(&opened.bytes).into_owned();
                state.document.file_name = opened.name.clone();
                self.bump_revision(&mut state);
                self.succeed(&mut state, format!("Opened {}", opened.name));
                Ok(())
            }
            Err(e) => Err(self.fail(
                &mut state,
                SessionError::Read(e.to_string()),
                "Failed to read file.",
            )),
        }
    }

    //=====================================================================================
    // AI
    //=====================================================================================

    /// Sends the document and `prompt` to the completion service and applies
    /// the answer according to the session's [`AiEditPolicy`].
    pub async fn request_ai_edit(&self, prompt: &str) -> SessionResult<AiOutcome> {
        if prompt.trim().is_empty() {
            debug!("Ignoring AI request with an empty prompt.");
            return Err(SessionError::EmptyPrompt);
        }

        let document = {
            let mut state = self.state.lock().await;
            self.begin(&mut state, EditorStatus::AiThinking, Origin::User)?;
            state.document.content.clone()
        };

        info!(chars = document.len(), "Sending AI edit request.");
        let result = self.ports.completion.complete(&document, prompt).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(text) if text.trim().is_empty() => {
                state.status = EditorStatus::Idle;
                self.notify(&mut state, NotificationKind::Info, "AI returned no content.");
                Ok(AiOutcome::NoContent)
            }
            Ok(text) => {
                match self.ai_policy {
                    AiEditPolicy::Replace => state.document.content = text,
                    AiEditPolicy::Append if state.document.content.is_empty() => {
                        state.document.content = text
                    }
                    AiEditPolicy::Append => {
                        state.document.content.push_str(AI_APPEND_SEPARATOR);
                        state.document.content.push_str(&text);
                    }
                }
                self.bump_revision(&mut state);
                self.succeed(&mut state, "AI request completed.");
                Ok(AiOutcome::Applied)
            }
            Err(PortError::Unauthorized) => Err(self.fail(
                &mut state,
                SessionError::Auth,
                "AI connection failed. Check API key.",
            )),
            Err(e) => Err(self.fail(
                &mut state,
                SessionError::Transport(e.to_string()),
                "AI connection failed. Check API key.",
            )),
        }
    }

    //=====================================================================================
    // Remote store: credentials
    //=====================================================================================

    /// Verifies `raw_token` against the store and keeps it on success.
    pub async fn login(&self, raw_token: &str) -> SessionResult<RemoteUser> {
        let token = {
            let mut state = self.state.lock().await;
            let Some(token) = AccessToken::parse(raw_token) else {
                self.notify(&mut state, NotificationKind::Error, "Login cancelled.");
                return Err(SessionError::NotLoggedIn);
            };
            self.begin(&mut state, EditorStatus::Loading, Origin::User)?;
            token
        };

        let result = self.ports.store.current_user(&token).await;

        let outcome = {
            let mut state = self.state.lock().await;
            match result {
                Ok(user) => {
                    state.remote.token = Some(token.clone());
                    state.remote.owner = Some(user.login.clone());
                    info!(login = %user.login, "Logged in to the remote store.");
                    self.succeed(&mut state, format!("Hello, {}! You are logged in.", user.login));
                    Ok(user)
                }
                Err(e) => {
                    state.remote.token = None;
                    state.remote.owner = None;
                    let err = match e {
                        PortError::Unauthorized => SessionError::Auth,
                        other => SessionError::Transport(other.to_string()),
                    };
                    Err(self.fail(&mut state, err, "Token error, log in again."))
                }
            }
        };

        match &outcome {
            Ok(_) => {
                if let Err(e) = self.ports.tokens.save(&token).await {
                    warn!("Failed to cache access token: {}", e);
                }
            }
            Err(_) => self.forget_cached_token().await,
        }
        outcome
    }

    /// Logs in with the cached token, if there is one.
    pub async fn restore_login(&self) -> SessionResult<Option<RemoteUser>> {
        match self.ports.tokens.load().await {
            Ok(Some(token)) => self.login(token.expose()).await.map(Some),
            Ok(None) => {
                let mut state = self.state.lock().await;
                self.notify(
                    &mut state,
                    NotificationKind::Info,
                    "Log in to save and load your files.",
                );
                Ok(None)
            }
            Err(e) => {
                warn!("Failed to read cached access token: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn logout(&self) {
        {
            let mut state = self.state.lock().await;
            state.remote.token = None;
            state.remote.owner = None;
            self.notify(&mut state, NotificationKind::Info, "Logged out.");
        }
        info!("Logged out of the remote store.");
        self.forget_cached_token().await;
    }

    /// Installs credentials without verifying them.
    pub async fn configure_remote(&self, token: Option<AccessToken>, document_id: Option<String>) {
        let mut state = self.state.lock().await;
        state.remote.token = token;
        state.remote.document_id = document_id;
    }

    pub async fn set_remote_document(&self, document_id: Option<String>) {
        self.state.lock().await.remote.document_id = document_id;
    }

    //=====================================================================================
    // Remote store: documents
    //=====================================================================================

    /// Updates the target remote document with the current content.
    pub async fn persist_remote(&self) -> SessionResult<()> {
        self.persist_remote_from(Origin::User).await
    }

    /// The debounced variant of [`persist_remote`](Self::persist_remote). Missing
    /// credentials and a busy session are reported only through the return value.
    pub async fn auto_persist(&self) -> SessionResult<()> {
        self.persist_remote_from(Origin::Auto).await
    }

    async fn persist_remote_from(&self, origin: Origin) -> SessionResult<()> {
        let (token, document_id, file_name, content) = {
            let mut state = self.state.lock().await;
            let token = self.require_token(&mut state, origin)?;
            let document_id = self.require_document(&mut state, origin)?;
            self.begin(&mut state, EditorStatus::Saving, origin)?;
            (
                token,
                document_id,
                state.document.file_name.clone(),
                state.document.content.clone(),
            )
        };

        info!(%document_id, %file_name, ?origin, "Persisting document to the remote store.");
        let result = self
            .ports
            .store
            .update_document(&token, &document_id, &file_name, &content)
            .await;

        let outcome = {
            let mut state = self.state.lock().await;
            match result {
                Ok(()) => {
                    match origin {
                        Origin::User => self.succeed(
                            &mut state,
                            format!("\"{}\" saved to the remote store.", file_name),
                        ),
                        Origin::Auto => {
                            debug!("Auto-persist complete.");
                            state.status = EditorStatus::Idle;
                        }
                    }
                    Ok(())
                }
                Err(e) => Err(self.fail_remote(&mut state, e, "Failed to save to the remote store.")),
            }
        };
        self.settle_remote(outcome).await
    }

    /// Creates a new remote document from the current content and makes it the target.
    pub async fn publish_remote(&self, file_name: Option<&str>) -> SessionResult<String> {
        let (token, file_name, content) = {
            let mut state = self.state.lock().await;
            let token = self.require_token(&mut state, Origin::User)?;
            if state.document.content.trim().is_empty() {
                self.notify(&mut state, NotificationKind::Info, "Nothing to save.");
                return Err(SessionError::EmptyDocument);
            }
            self.begin(&mut state, EditorStatus::Saving, Origin::User)?;
            let file_name = file_name
                .map(str::to_string)
                .unwrap_or_else(|| state.document.file_name.clone());
            (token, file_name, state.document.content.clone())
        };

        info!(%file_name, "Publishing document to the remote store.");
        let result = self
            .ports
            .store
            .create_document(&token, &file_name, &content)
            .await;

        let outcome = {
            let mut state = self.state.lock().await;
            match result {
                Ok(document_id) => {
                    state.remote.document_id = Some(document_id.clone());
                    state.document.file_name = file_name.clone();
                    self.succeed(
                        &mut state,
                        format!("\"{}\" saved to the remote store.", file_name),
                    );
                    Ok(document_id)
                }
                Err(e) => Err(self.fail_remote(&mut state, e, "Failed to save to the remote store.")),
            }
        };
        self.settle_remote(outcome).await
    }

    /// Replaces the document with the first file of the target remote document.
    pub async fn fetch_remote(&self) -> SessionResult<()> {
        let (token, document_id) = {
            let mut state = self.state.lock().await;
            let token = self.require_token(&mut state, Origin::User)?;
            let document_id = self.require_document(&mut state, Origin::User)?;
            self.begin(&mut state, EditorStatus::Loading, Origin::User)?;
            (token, document_id)
        };

        info!(%document_id, "Fetching document from the remote store.");
        let result = self.ports.store.get_document(&token, &document_id).await;

        let outcome = {
            let mut state = self.state.lock().await;
            match result {
                Ok(remote) => {
                    state.document.content = remote.content;
                    state.document.file_name = remote.file_name.clone();
                    self.succeed(&mut state, format!("\"{}\" loaded.", remote.file_name));
                    Ok(())
                }
                Err(e) => Err(self.fail_remote(&mut state, e, "Failed to load from the remote store.")),
            }
        };
        self.settle_remote(outcome).await
    }

    /// The owner's remote text files.
    pub async fn list_remote(&self) -> SessionResult<Vec<RemoteFile>> {
        let (token, owner) = {
            let mut state = self.state.lock().await;
            let token = self.require_token(&mut state, Origin::User)?;
            let Some(owner) = state.remote.owner.clone() else {
                self.notify(&mut state, NotificationKind::Info, "Log in first.");
                return Err(SessionError::NotLoggedIn);
            };
            self.begin(&mut state, EditorStatus::Loading, Origin::User)?;
            (token, owner)
        };

        let result = self.ports.store.list_documents(&token, &owner).await;

        let outcome = {
            let mut state = self.state.lock().await;
            match result {
                Ok(files) => {
                    let files: Vec<RemoteFile> = files
                        .into_iter()
                        .filter(|f| f.file_name.ends_with(".txt"))
                        .collect();
                    state.status = EditorStatus::Idle;
                    if files.is_empty() {
                        self.notify(
                            &mut state,
                            NotificationKind::Info,
                            "No files saved in the remote store.",
                        );
                    }
                    debug!(count = files.len(), "Listed remote files.");
                    Ok(files)
                }
                Err(e) => Err(self.fail_remote(&mut state, e, "Failed to list remote files.")),
            }
        };
        self.settle_remote(outcome).await
    }

    /// Replaces the document with one file of a remote document and targets
    /// that document. The file is looked up in the store by id and name.
    pub async fn open_remote(&self, document_id: &str, file_name: &str) -> SessionResult<()> {
        let token = {
            let mut state = self.state.lock().await;
            let token = self.require_token(&mut state, Origin::User)?;
            self.begin(&mut state, EditorStatus::Loading, Origin::User)?;
            token
        };

        info!(%document_id, %file_name, "Loading remote file.");
        let result = self
            .ports
            .store
            .get_document_file(&token, document_id, file_name)
            .await;

        let outcome = {
            let mut state = self.state.lock().await;
            match result {
                Ok(remote) => {
                    state.document.content = remote.content;
                    state.document.file_name = remote.file_name.clone();
                    state.remote.document_id = Some(document_id.to_string());
                    self.succeed(&mut state, format!("\"{}\" loaded.", remote.file_name));
                    Ok(())
                }
                Err(e) => Err(self.fail_remote(&mut state, e, "Failed to load from the remote store.")),
            }
        };
        self.settle_remote(outcome).await
    }

    //=====================================================================================
    // Transitions
    //=====================================================================================

    fn begin(
        &self,
        state: &mut SessionState,
        next: EditorStatus,
        origin: Origin,
    ) -> SessionResult<()> {
        if !state.status.accepts_operation() {
            let current = state.status;
            if origin == Origin::User {
                warn!(%current, "Rejecting operation while busy.");
                self.notify(state, NotificationKind::Info, format!("Busy: {}", current));
            }
            return Err(SessionError::Busy(current));
        }
        state.status = next;
        Ok(())
    }

    fn succeed(&self, state: &mut SessionState, message: impl Into<String>) {
        state.status = EditorStatus::Idle;
        self.notify(state, NotificationKind::Success, message);
    }

    fn fail(&self, state: &mut SessionState, err: SessionError, message: &str) -> SessionError {
        error!("{}: {}", message, err);
        state.status = EditorStatus::Error;
        self.notify(state, NotificationKind::Error, message);
        err
    }

    /// An auth failure during a remote call invalidates the stored token.
    fn fail_remote(&self, state: &mut SessionState, err: PortError, message: &str) -> SessionError {
        match err {
            PortError::Unauthorized => {
                state.remote.token = None;
                state.remote.owner = None;
                self.fail(state, SessionError::Auth, &format!("{} Log in again.", message))
            }
            other => self.fail(state, SessionError::Transport(other.to_string()), message),
        }
    }

    async fn settle_remote<T>(&self, outcome: SessionResult<T>) -> SessionResult<T> {
        if matches!(outcome, Err(SessionError::Auth)) {
            self.forget_cached_token().await;
        }
        outcome
    }

    async fn forget_cached_token(&self) {
        if let Err(e) = self.ports.tokens.clear().await {
            warn!("Failed to clear cached access token: {}", e);
        }
    }

    fn require_token(&self, state: &mut SessionState, origin: Origin) -> SessionResult<AccessToken> {
        match state.remote.token.clone() {
            Some(token) => Ok(token),
            None => {
                if origin == Origin::User {
                    self.notify(state, NotificationKind::Info, "Log in first.");
                }
                Err(SessionError::NotLoggedIn)
            }
        }
    }

    fn require_document(&self, state: &mut SessionState, origin: Origin) -> SessionResult<String> {
        match state.remote.document_id.clone() {
            Some(id) => Ok(id),
            None => {
                if origin == Origin::User {
                    self.notify(state, NotificationKind::Info, "No remote document selected.");
                }
                Err(SessionError::NoRemoteDocument)
            }
        }
    }

    fn notify(&self, state: &mut SessionState, kind: NotificationKind, message: impl Into<String>) {
        let now = self.ports.clock.now();
        state.notifications.push(kind, message, now);
    }

    fn bump_revision(&self, state: &mut SessionState) {
        state.document.revision += 1;
        self.revisions.send_replace(state.document.revision);
    }
}
