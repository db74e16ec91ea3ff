//! services/editor/src/adapters/gist.rs
//!
//! This module contains the adapter for the GitHub Gist REST API.
//! It implements the `DocumentStore` port from the `core` crate.

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use retro_editor_core::domain::{AccessToken, RemoteContent, RemoteFile, RemoteUser};
use retro_editor_core::ports::{DocumentStore, PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

const DOCUMENT_DESCRIPTION: &str = "Retro Editor - saved file";
const USER_AGENT: &str = concat!("retro-editor/", env!("CARGO_PKG_VERSION"));

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A `DocumentStore` backed by gists.
#[derive(Clone)]
pub struct GistAdapter {
    http: Client,
    base_url: String,
}

impl GistAdapter {
    /// Creates a new `GistAdapter` talking to `base_url` (e.g. `https://api.github.com`).
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn authed(&self, builder: RequestBuilder, token: &AccessToken) -> RequestBuilder {
        builder
            .bearer_auth(token.expose())
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(header::USER_AGENT, USER_AGENT)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

//=========================================================================================
// Wire Structs
//=========================================================================================

#[derive(Serialize)]
struct FileBody<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct CreateGistBody<'a> {
    description: &'a str,
    public: bool,
    files: BTreeMap<&'a str, FileBody<'a>>,
}

#[derive(Serialize)]
struct UpdateGistBody<'a> {
    files: BTreeMap<&'a str, FileBody<'a>>,
}

#[derive(Deserialize)]
struct UserRecord {
    login: String,
}

#[derive(Deserialize)]
struct GistFileRecord {
    filename: String,
    #[serde(default)]
    raw_url: Option<String>,
    #[serde(default)]
    content: Option<String>,
    /// Large files come back cut short and must be read from `raw_url`.
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct GistRecord {
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    files: BTreeMap<String, GistFileRecord>,
}

impl GistRecord {
    fn into_remote_files(self) -> Vec<RemoteFile> {
        let GistRecord {
            id,
            description,
            files,
        } = self;
        files
            .into_values()
            .filter_map(|file| {
                let raw_url = file.raw_url?;
                Some(RemoteFile {
                    document_id: id.clone(),
                    file_name: file.filename,
                    raw_url,
                    description: description.clone(),
                })
            })
            .collect()
    }
}

/// Maps non-success statuses onto the port's error vocabulary.
async fn check(response: Response) -> PortResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(%status, "Gist API call failed.");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(PortError::Unauthorized),
        StatusCode::NOT_FOUND => Err(PortError::NotFound(body)),
        _ => Err(PortError::Unexpected(format!("{}: {}", status, body))),
    }
}

impl GistAdapter {
    async fn fetch_gist(&self, token: &AccessToken, document_id: &str) -> PortResult<GistRecord> {
        let response = self
            .authed(self.http.get(self.url(&format!("/gists/{}", document_id))), token)
            .send()
            .await
            .map_err(transport)?;
        check(response).await?.json().await.map_err(transport)
    }

    /// Raw file URLs are public to whoever holds them, so the token is never
    /// attached here.
    async fn fetch_raw(&self, raw_url: &str) -> PortResult<String> {
        let response = self
            .http
            .get(raw_url)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(transport)?;
        check(response).await?.text().await.map_err(transport)
    }

    async fn read_file(&self, file: GistFileRecord) -> PortResult<RemoteContent> {
        let content = match (file.content, file.raw_url) {
            (Some(content), _) if !file.truncated => content,
            (_, Some(raw_url)) => self.fetch_raw(&raw_url).await?,
            (content, None) => content.unwrap_or_default(),
        };
        Ok(RemoteContent {
            file_name: file.filename,
            content,
        })
    }
}

fn transport(e: reqwest::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `DocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for GistAdapter {
    async fn current_user(&self, token: &AccessToken) -> PortResult<RemoteUser> {
        let response = self
            .authed(self.http.get(self.url("/user")), token)
            .send()
            .await
            .map_err(transport)?;
        let user: UserRecord = check(response).await?.json().await.map_err(transport)?;
        Ok(RemoteUser { login: user.login })
    }

    async fn create_document(
        &self,
        token: &AccessToken,
        file_name: &str,
        content: &str,
    ) -> PortResult<String> {
        let body = CreateGistBody {
            description: DOCUMENT_DESCRIPTION,
            public: false,
            files: BTreeMap::from([(file_name, FileBody { content })]),
        };
        let response = self
            .authed(self.http.post(self.url("/gists")), token)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let gist: GistRecord = check(response).await?.json().await.map_err(transport)?;
        debug!(id = %gist.id, "Created gist.");
        Ok(gist.id)
    }

    async fn update_document(
        &self,
        token: &AccessToken,
        document_id: &str,
        file_name: &str,
        content: &str,
    ) -> PortResult<()> {
        let body = UpdateGistBody {
            files: BTreeMap::from([(file_name, FileBody { content })]),
        };
        let response = self
            .authed(self.http.patch(self.url(&format!("/gists/{}", document_id))), token)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }

    async fn list_documents(&self, token: &AccessToken, owner: &str) -> PortResult<Vec<RemoteFile>> {
        let response = self
            .authed(self.http.get(self.url(&format!("/users/{}/gists", owner))), token)
            .send()
            .await
            .map_err(transport)?;
        let gists: Vec<GistRecord> = check(response).await?.json().await.map_err(transport)?;
        Ok(gists
            .into_iter()
            .flat_map(GistRecord::into_remote_files)
            .collect())
    }

    async fn get_document(&self, token: &AccessToken, document_id: &str) -> PortResult<RemoteContent> {
        let gist = self.fetch_gist(token, document_id).await?;
        let file = gist
            .files
            .into_values()
            .next()
            .ok_or_else(|| PortError::NotFound(format!("gist {} has no files", document_id)))?;
        self.read_file(file).await
    }

    async fn get_document_file(
        &self,
        token: &AccessToken,
        document_id: &str,
        file_name: &str,
    ) -> PortResult<RemoteContent> {
        let mut gist = self.fetch_gist(token, document_id).await?;
        let file = gist.files.remove(file_name).ok_or_else(|| {
            PortError::NotFound(format!("gist {} has no file {}", document_id, file_name))
        })?;
        self.read_file(file).await
    }
}
