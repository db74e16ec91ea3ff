//! Stub ports for driving the service against a real session.

#![allow(dead_code)]

use async_trait::async_trait;
use retro_editor_core::{
    AccessToken, CompletionService, DocumentStore, PortError, PortResult, RemoteContent,
    RemoteFile, RemoteUser, TokenStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

//=========================================================================================
// Completion
//=========================================================================================

/// Answers every request with `reply`, optionally waiting on a gate first.
pub struct GatedCompletion {
    pub reply: String,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl GatedCompletion {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            gate: Mutex::new(None),
        }
    }

    /// Requests block until the returned gate is notified.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl CompletionService for GatedCompletion {
    async fn complete(&self, _document: &str, _instruction: &str) -> PortResult<String> {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(self.reply.clone())
    }
}

//=========================================================================================
// Remote store
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub document_id: String,
    pub file_name: String,
    pub content: String,
}

/// Accepts the token "good" only and records every update.
///
/// Each update takes `latency` (tokio time), so tests can edit while a write
/// is still in flight.
pub struct RecordingStore {
    pub latency: Duration,
    pub writes: Mutex<Vec<Write>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            writes: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn contents(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .map(|w| w.content.clone())
            .collect()
    }

    fn check(token: &AccessToken) -> PortResult<()> {
        if token.expose() == "good" {
            Ok(())
        } else {
            Err(PortError::Unauthorized)
        }
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn current_user(&self, token: &AccessToken) -> PortResult<RemoteUser> {
        Self::check(token)?;
        Ok(RemoteUser {
            login: "octocat".to_string(),
        })
    }

    async fn create_document(
        &self,
        token: &AccessToken,
        _file_name: &str,
        _content: &str,
    ) -> PortResult<String> {
        Self::check(token)?;
        Ok("created-1".to_string())
    }

    async fn update_document(
        &self,
        token: &AccessToken,
        document_id: &str,
        file_name: &str,
        content: &str,
    ) -> PortResult<()> {
        Self::check(token)?;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.writes.lock().unwrap().push(Write {
            document_id: document_id.to_string(),
            file_name: file_name.to_string(),
            content: content.to_string(),
        });
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_documents(&self, token: &AccessToken, _owner: &str) -> PortResult<Vec<RemoteFile>> {
        Self::check(token)?;
        Ok(vec![
            RemoteFile {
                document_id: "g1".to_string(),
                file_name: "goals.txt".to_string(),
                raw_url: "raw/g1/goals.txt".to_string(),
                description: None,
            },
            RemoteFile {
                document_id: "g2".to_string(),
                file_name: "script.js".to_string(),
                raw_url: "raw/g2/script.js".to_string(),
                description: None,
            },
        ])
    }

    async fn get_document(&self, token: &AccessToken, document_id: &str) -> PortResult<RemoteContent> {
        Self::check(token)?;
        Ok(RemoteContent {
            file_name: format!("{document_id}.txt"),
            content: "remote text".to_string(),
        })
    }

    async fn get_document_file(
        &self,
        token: &AccessToken,
        document_id: &str,
        file_name: &str,
    ) -> PortResult<RemoteContent> {
        Self::check(token)?;
        if !file_name.ends_with(".txt") && !file_name.ends_with(".js") {
            return Err(PortError::NotFound(format!("{document_id}/{file_name}")));
        }
        Ok(RemoteContent {
            file_name: file_name.to_string(),
            content: format!("contents of {document_id}/{file_name}"),
        })
    }
}

//=========================================================================================
// Token cache
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
