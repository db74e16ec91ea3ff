//! services/editor/src/bin/editor.rs

use async_openai::{config::OpenAIConfig, Client};
use chrono::Duration as ChronoDuration;
use editor_lib::{
    adapters::{FileTokenStore, GistAdapter, LocalFileAdapter, OpenAiCompletionAdapter},
    config::Config,
    error::ServiceError,
    web::{autosave_process, rest::ApiDoc, router, AppState},
};
use retro_editor_core::{
    EditorSession, RemoteCredentials, SessionOptions, SessionPorts, SystemClock,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting editor service...");

    // --- 2. Initialize Service Adapters ---
    let mut openai_config = OpenAIConfig::new();
    match &config.openai_api_key {
        Some(key) => openai_config = openai_config.with_api_key(key),
        None => warn!("OPENAI_API_KEY is not set; AI requests will fail authentication."),
    }
    let completion = Arc::new(OpenAiCompletionAdapter::new(
        Client::with_config(openai_config),
        config.ai_model.clone(),
    ));

    let http = reqwest::Client::builder().build()?;
    let store = Arc::new(GistAdapter::new(http, config.gist_api_url.clone()));
    let files = Arc::new(LocalFileAdapter::new(config.save_dir.clone()));
    let tokens = Arc::new(FileTokenStore::new(config.token_cache_path.clone()));

    // --- 3. Build the Editor Session ---
    let ttl_ms = i64::try_from(config.notification_ttl.as_millis())
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    let options = SessionOptions {
        file_name: config.default_file_name.clone(),
        notification_ttl: ChronoDuration::milliseconds(ttl_ms),
        ai_policy: config.ai_policy,
        remote: RemoteCredentials {
            token: config.github_token.clone(),
            owner: None,
            document_id: config.gist_id.clone(),
        },
        ..SessionOptions::default()
    };
    let session = Arc::new(EditorSession::new(
        SessionPorts {
            files,
            completion,
            store,
            tokens,
            clock: Arc::new(SystemClock),
        },
        options,
    ));

    match &config.github_token {
        // A configured token is used as-is; only a cached one needs a login round-trip.
        Some(_) => info!("Using GITHUB_TOKEN from the environment."),
        None => {
            if let Err(e) = session.restore_login().await {
                warn!("Could not restore the cached login: {}", e);
            }
        }
    }

    // --- 4. Start the Auto-Persist Worker ---
    let shutdown = CancellationToken::new();
    let autosave = if config.autosave {
        Some(tokio::spawn(autosave_process(
            session.clone(),
            config.autosave_delay,
            shutdown.clone(),
        )))
    } else {
        None
    };

    // --- 5. Build the Router ---
    let app_state = Arc::new(AppState {
        session,
        config: config.clone(),
    });
    let app = router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    let shutdown_signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("Failed to listen for ctrl-c.");
            }
            shutdown_signal.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Some(handle) = autosave {
        if let Err(e) = handle.await {
            warn!("Auto-persist task ended abnormally: {}", e);
        }
    }
    info!("Editor service stopped.");
    Ok(())
}
