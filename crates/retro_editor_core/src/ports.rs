//! crates/retro_editor_core/src/ports.rs
//!
//! Defines the service contracts (traits) the editor session depends on.
//! These traits form the boundary of the hexagonal architecture, so the session
//! never knows whether it talks to a real filesystem, OpenAI or GitHub, or to a stub.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::domain::{AccessToken, RemoteContent, RemoteFile, RemoteUser};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The one error every port returns. Adapters fold filesystem, HTTP and
/// OpenAI errors into these three cases.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unexpected failure: {0}")]
    Unexpected(String),
    /// The credential was missing, revoked or rejected.
    #[error("Unauthorized")]
    Unauthorized,
}

pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Local Files
//=========================================================================================

/// An opaque handle to a file the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle(pub PathBuf);

/// Raw bytes read from a picked file, plus the name to display.
#[derive(Debug, Clone)]
pub struct OpenedFile {
    pub name: String,
    pub bytes: Bytes,
}

/// The host's save-as and file-picker mechanism.
#[async_trait]
pub trait FileHost: Send + Sync {
    /// Offers `bytes` to the user under `file_name`.
    async fn save(&self, file_name: &str, bytes: Bytes) -> PortResult<()>;

    /// Reads the full contents of a picked file.
    async fn open(&self, handle: &FileHandle) -> PortResult<OpenedFile>;
}

//=========================================================================================
// AI Completion
//=========================================================================================

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Applies `instruction` to `document` and returns the completion text.
    /// An empty string means the service had nothing to return.
    async fn complete(&self, document: &str, instruction: &str) -> PortResult<String>;
}

//=========================================================================================
// Remote Document Store
//=========================================================================================

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Verifies the token and returns the account it belongs to.
    async fn current_user(&self, token: &AccessToken) -> PortResult<RemoteUser>;

    /// Creates a new document holding a single file. Returns the new document id.
    async fn create_document(
        &self,
        token: &AccessToken,
        file_name: &str,
        content: &str,
    ) -> PortResult<String>;

    async fn update_document(
        &self,
        token: &AccessToken,
        document_id: &str,
        file_name: &str,
        content: &str,
    ) -> PortResult<()>;

    async fn list_documents(&self, token: &AccessToken, owner: &str) -> PortResult<Vec<RemoteFile>>;

    /// Retrieves the first file of a document.
    async fn get_document(&self, token: &AccessToken, document_id: &str) -> PortResult<RemoteContent>;

    /// Retrieves one named file of a document. Only the store decides where
    /// the content comes from; callers never supply a URL.
    async fn get_document_file(
        &self,
        token: &AccessToken,
        document_id: &str,
        file_name: &str,
    ) -> PortResult<RemoteContent>;
}

//=========================================================================================
// Token Cache and Clock
//=========================================================================================

/// Persists the access token between runs.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> PortResult<Option<AccessToken>>;
    async fn save(&self, token: &AccessToken) -> PortResult<()>;
    async fn clear(&self) -> PortResult<()>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
