//! Application entry point.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Provision the engine connection; failure aborts startup.
//! 4. Build the Whisper transcriber (the model itself loads on first use).
//! 5. Read the logo, create the session store and build the router.
//! 6. Serve until the process is stopped.

use std::sync::Arc;

use anyhow::Context;
use voice_chat::{
    chat::ChatController,
    config::AppConfig,
    engine::{provision, Engine, MessageDispatcher},
    session::SessionStore,
    stt::{Transcriber, WhisperTranscriber},
    web::{build_router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Voice chat starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Engine connection
    let connection = match provision(&config.engine).await {
        Ok(connection) => connection,
        Err(e) => {
            log::error!("Could not provision engine connection: {e}");
            return Err(e.into());
        }
    };
    let engine: Arc<dyn Engine> = Arc::new(connection);

    // 4. Transcriber
    let whisper = WhisperTranscriber::from_config(&config.stt)
        .context("invalid speech-to-text settings")?;
    if whisper.model_path().exists() {
        log::info!("Whisper model: {}", whisper.model_path().display());
    } else {
        log::warn!(
            "Whisper model not found at {}; audio submissions will fail until it is installed",
            whisper.model_path().display()
        );
    }
    let transcriber: Arc<dyn Transcriber> = Arc::new(whisper);

    // 5. Page state
    let logo_path = config.ui.resolved_logo_path();
    let logo = match std::fs::read_to_string(&logo_path) {
        Ok(svg) => Some(svg),
        Err(e) => {
            log::warn!(
                "Could not read logo {} ({e}); rendering without it",
                logo_path.display()
            );
            None
        }
    };

    let controller = ChatController::new(MessageDispatcher::new(engine), transcriber);
    let sessions = SessionStore::from_config(&config.session);
    let state = AppState::new(controller, sessions, config.ui.clone(), logo);
    let app = build_router(state);

    // 6. Serve
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("could not bind {}", config.server.bind_addr))?;
    log::info!("Listening on http://{}", config.server.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
