//! services/editor/src/error.rs
//!
//! Startup failures of the editor service. Request-time failures never reach
//! this type; they are `SessionError`s mapped to HTTP statuses in `web::rest`.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The shared HTTP client for the remote store could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Binding the listener or serving connections failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
