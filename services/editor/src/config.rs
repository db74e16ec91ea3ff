//! services/editor/src/config.rs
//!
//! Defines the service's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use retro_editor_core::domain::{AccessToken, AiEditPolicy, DEFAULT_FILE_NAME};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub ai_model: String,
    pub ai_policy: AiEditPolicy,
    pub gist_api_url: String,
    pub github_token: Option<AccessToken>,
    pub gist_id: Option<String>,
    pub save_dir: PathBuf,
    pub token_cache_path: PathBuf,
    pub default_file_name: String,
    pub notification_ttl: Duration,
    pub autosave: bool,
    pub autosave_delay: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // --- Server Settings ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- AI Settings ---
        let openai_api_key = var("OPENAI_API_KEY");
        let ai_model = var("AI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());
        let ai_policy = match var("AI_EDIT_POLICY").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("replace") => AiEditPolicy::Replace,
            Some("append") => AiEditPolicy::Append,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "AI_EDIT_POLICY".to_string(),
                    format!("'{}' is neither 'replace' nor 'append'", other),
                ))
            }
        };

        // --- Remote Store Settings ---
        let gist_api_url = var("GIST_API_URL")
            .unwrap_or_else(|| "https://api.github.com".to_string())
            .trim_end_matches('/')
            .to_string();
        let github_token = var("GITHUB_TOKEN").and_then(|t| AccessToken::parse(&t));
        let gist_id = var("GIST_ID").map(|id| id.trim().to_string());

        // --- Local Files ---
        let save_dir = var("SAVE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./saved"));
        let token_cache_path = var("TOKEN_CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./.retro-editor-token"));
        let default_file_name =
            var("DEFAULT_FILE_NAME").unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

        // --- Timers ---
        let notification_ttl = Duration::from_millis(parse_or(&var, "NOTIFICATION_TTL_MS", 3000)?);
        let autosave_delay = Duration::from_millis(parse_or(&var, "AUTOSAVE_DELAY_MS", 3000)?);
        let autosave = parse_or(&var, "AUTOSAVE", false)?;
        if autosave && gist_id.is_none() {
            return Err(ConfigError::MissingVar("GIST_ID".to_string()));
        }

        Ok(Self {
            bind_address,
            log_level,
            openai_api_key,
            ai_model,
            ai_policy,
            gist_api_url,
            github_token,
            gist_id,
            save_dir,
            token_cache_path,
            default_file_name,
            notification_ttl,
            autosave,
            autosave_delay,
        })
    }
}

fn parse_or<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
