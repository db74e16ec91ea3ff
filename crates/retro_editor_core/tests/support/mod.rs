//! In-memory stand-ins for every port the session talks to.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use retro_editor_core::{
    AccessToken, Clock, CompletionService, DocumentStore, EditorSession, FileHandle, FileHost,
    OpenedFile, PortError, PortResult, RemoteContent, RemoteFile, RemoteUser, SessionOptions,
    SessionPorts, TokenStore,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

//=========================================================================================
// Clock
//=========================================================================================

pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new() -> Self {
        Self(Mutex::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap()))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

//=========================================================================================
// Files
//=========================================================================================

#[derive(Default)]
pub struct MemoryFiles {
    pub files: Mutex<HashMap<String, Bytes>>,
    pub fail: Mutex<bool>,
}

impl MemoryFiles {
    pub fn put(&self, name: &str, bytes: impl Into<Bytes>) {
        self.files.lock().unwrap().insert(name.to_string(), bytes.into());
    }

    pub fn get(&self, name: &str) -> Option<Bytes> {
        self.files.lock().unwrap().get(name).cloned()
    }

    pub fn fail_next(&self) {
        *self.fail.lock().unwrap() = true;
    }

    fn take_failure(&self) -> bool {
        std::mem::take(&mut *self.fail.lock().unwrap())
    }
}

#[async_trait]
impl FileHost for MemoryFiles {
    async fn save(&self, file_name: &str, bytes: Bytes) -> PortResult<()> {
        if self.take_failure() {
            return Err(PortError::Unexpected("disk full".to_string()));
        }
        self.put(file_name, bytes);
        Ok(())
    }

    async fn open(&self, handle: &FileHandle) -> PortResult<OpenedFile> {
        let name = handle.0.to_string_lossy().into_owned();
        if self.take_failure() {
            return Err(PortError::Unexpected("permission denied".to_string()));
        }
        let bytes = self.get(&name).ok_or_else(|| PortError::NotFound(name.clone()))?;
        Ok(OpenedFile { name, bytes })
    }
}

//=========================================================================================
// Completion
//=========================================================================================

#[derive(Clone)]
pub enum Reply {
    Text(String),
    Unauthorized,
    Down,
}

pub struct StubCompletion {
    reply: Mutex<Reply>,
    gate: Mutex<Option<Arc<Notify>>>,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<(String, String)>>,
}

impl StubCompletion {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply: Mutex::new(reply),
            gate: Mutex::new(None),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    /// Every request waits on the returned `Notify` before answering.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl CompletionService for StubCompletion {
    async fn complete(&self, document: &str, instruction: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((document.to_string(), instruction.to_string()));
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.reply.lock().unwrap().clone() {
            Reply::Text(text) => Ok(text),
            Reply::Unauthorized => Err(PortError::Unauthorized),
            Reply::Down => Err(PortError::Unexpected("connection refused".to_string())),
        }
    }
}

//=========================================================================================
// Document Store
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub document_id: String,
    pub file_name: String,
    pub content: String,
}

#[derive(Default)]
pub struct StubStore {
    pub login: Mutex<Option<String>>,
    pub unauthorized: Mutex<bool>,
    pub updates: Mutex<Vec<Update>>,
    pub created: Mutex<Vec<Update>>,
    pub documents: Mutex<HashMap<String, RemoteContent>>,
    pub listing: Mutex<Vec<RemoteFile>>,
    /// Files keyed by `(document_id, file_name)`.
    pub files: Mutex<HashMap<(String, String), String>>,
}

impl StubStore {
    pub fn with_login(login: &str) -> Self {
        let store = Self::default();
        *store.login.lock().unwrap() = Some(login.to_string());
        store
    }

    pub fn reject_tokens(&self) {
        *self.unauthorized.lock().unwrap() = true;
    }

    fn check(&self) -> PortResult<()> {
        if *self.unauthorized.lock().unwrap() {
            Err(PortError::Unauthorized)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for StubStore {
    async fn current_user(&self, _token: &AccessToken) -> PortResult<RemoteUser> {
        self.check()?;
        let login = self.login.lock().unwrap().clone().ok_or(PortError::Unauthorized)?;
        Ok(RemoteUser { login })
    }

    async fn create_document(
        &self,
        _token: &AccessToken,
        file_name: &str,
        content: &str,
    ) -> PortResult<String> {
        self.check()?;
        let mut created = self.created.lock().unwrap();
        let document_id = format!("gist-{}", created.len() + 1);
        created.push(Update {
            document_id: document_id.clone(),
            file_name: file_name.to_string(),
            content: content.to_string(),
        });
        Ok(document_id)
    }

    async fn update_document(
        &self,
        _token: &AccessToken,
        document_id: &str,
        file_name: &str,
        content: &str,
    ) -> PortResult<()> {
        self.check()?;
        self.updates.lock().unwrap().push(Update {
            document_id: document_id.to_string(),
            file_name: file_name.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }

    async fn list_documents(&self, _token: &AccessToken, _owner: &str) -> PortResult<Vec<RemoteFile>> {
        self.check()?;
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn get_document(&self, _token: &AccessToken, document_id: &str) -> PortResult<RemoteContent> {
        self.check()?;
        self.documents
            .lock()
            .unwrap()
            .get(document_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(document_id.to_string()))
    }

    async fn get_document_file(
        &self,
        _token: &AccessToken,
        document_id: &str,
        file_name: &str,
    ) -> PortResult<RemoteContent> {
        self.check()?;
        let key = (document_id.to_string(), file_name.to_string());
        let content = self
            .files
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("{document_id}/{file_name}")))?;
        Ok(RemoteContent {
            file_name: file_name.to_string(),
            content,
        })
    }
}

//=========================================================================================
// Token Cache
//=========================================================================================

#[derive(Default)]
pub struct MemoryTokens(pub Mutex<Option<AccessToken>>);

#[async_trait]
impl TokenStore for MemoryTokens {
    async fn load(&self) -> PortResult<Option<AccessToken>> {
        Ok(self.0.lock().unwrap().clone())
    }

    async fn save(&self, token: &AccessToken) -> PortResult<()> {
        *self.0.lock().unwrap() = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        *self.0.lock().unwrap() = None;
        Ok(())
    }
}

//=========================================================================================
// Harness
//=========================================================================================

pub struct Harness {
    pub session: Arc<EditorSession>,
    pub files: Arc<MemoryFiles>,
    pub completion: Arc<StubCompletion>,
    pub store: Arc<StubStore>,
    pub tokens: Arc<MemoryTokens>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(SessionOptions::default())
    }

    pub fn with_options(options: SessionOptions) -> Self {
        let files = Arc::new(MemoryFiles::default());
        let completion = Arc::new(StubCompletion::new(Reply::Text(String::new())));
        let store = Arc::new(StubStore::with_login("octocat"));
        let tokens = Arc::new(MemoryTokens::default());
        let clock = Arc::new(ManualClock::new());
        let ports = SessionPorts {
            files: files.clone(),
            completion: completion.clone(),
            store: store.clone(),
            tokens: tokens.clone(),
            clock: clock.clone(),
        };
        Self {
            session: Arc::new(EditorSession::new(ports, options)),
            files,
            completion,
            store,
            tokens,
            clock,
        }
    }
}
