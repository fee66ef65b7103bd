//! Axum router for the chat page.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::AppState;

/// Largest accepted recorder upload (about ten minutes of 16-bit mono
/// audio at 16 kHz).
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Build the complete router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/chat/text", post(handlers::submit_text))
        .route(
            "/chat/audio",
            post(handlers::submit_audio).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/static/style.css", get(handlers::style_css))
        .route("/static/recorder.js", get(handlers::recorder_js))
        .route("/health", get(handlers::health))
        .with_state(state)
}
