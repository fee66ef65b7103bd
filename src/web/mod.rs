//! Presentation layer: a server-rendered chat page over HTTP.
//!
//! ```text
//! browser ──GET /──────────▶ SessionStore::resolve ──▶ render_page
//! browser ──POST /chat/*───▶ SessionStore::resolve ──▶ ChatController::handle
//!                                                        │
//!                                   303 See Other ◀──────┘ (notice kept in session)
//! ```
//!
//! Sessions are identified by the `voice_chat_session` cookie.

pub mod error;
pub mod handlers;
pub mod render;
pub mod router;

use std::sync::Arc;

use crate::chat::ChatController;
use crate::config::UiConfig;
use crate::session::SessionStore;

pub use error::AppError;
pub use router::build_router;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ChatController>,
    pub sessions: Arc<SessionStore>,
    pub ui: Arc<UiConfig>,
    /// Inline SVG logo, read once at startup.
    pub logo: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        controller: ChatController,
        sessions: SessionStore,
        ui: UiConfig,
        logo: Option<String>,
    ) -> Self {
        Self {
            controller: Arc::new(controller),
            sessions: Arc::new(sessions),
            ui: Arc::new(ui),
            logo: logo.map(Arc::from),
        }
    }
}
