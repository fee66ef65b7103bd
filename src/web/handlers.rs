//! HTTP handlers.
//!
//! Endpoints:
//! - GET  /                    - Render the chat page for the cookie session
//! - POST /chat/text           - Submit a typed message, then redirect to /
//! - POST /chat/audio          - Submit a recorded clip, then redirect to /
//! - GET  /static/style.css    - Stylesheet
//! - GET  /static/recorder.js  - In-browser recorder
//! - GET  /health              - Liveness probe

use axum::extract::{Form, Multipart, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::chat::SessionEvent;
use crate::session::SessionId;

use super::error::AppError;
use super::render::render_page;
use super::AppState;

/// Name of the cookie carrying the [`SessionId`].
pub const SESSION_COOKIE: &str = "voice_chat_session";

const STYLE_CSS: &str = include_str!("assets/style.css");
const RECORDER_JS: &str = include_str!("assets/recorder.js");

/// Body of the text form.
#[derive(Debug, Deserialize)]
pub struct TextForm {
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, session, created) = state.sessions.resolve(session_cookie(&headers));

    let html = {
        let mut session = session.lock().await;
        let notice = session.take_notice();
        render_page(
            &state.ui,
            state.logo.as_deref(),
            &session.transcript,
            notice.as_ref(),
        )
    };

    with_session_cookie(Html(html).into_response(), id, created)
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

pub async fn submit_text(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<TextForm>,
) -> Result<Response, AppError> {
    submit(&state, &headers, SessionEvent::SubmitText(form.message)).await
}

pub async fn submit_audio(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut clip = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("audio") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            clip = Some(bytes.to_vec());
        }
    }

    submit(&state, &headers, SessionEvent::SubmitAudio(clip)).await
}

/// Run one event against the cookie session and redirect back to the page.
async fn submit(
    state: &AppState,
    headers: &HeaderMap,
    event: SessionEvent,
) -> Result<Response, AppError> {
    let (id, session, created) = state.sessions.resolve(session_cookie(headers));

    {
        let mut session = session.lock().await;
        state.controller.handle(&mut session, event).await?;
    }

    Ok(with_session_cookie(
        Redirect::to("/").into_response(),
        id,
        created,
    ))
}

// ---------------------------------------------------------------------------
// Static
// ---------------------------------------------------------------------------

pub async fn style_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

pub async fn recorder_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        RECORDER_JS,
    )
}

pub async fn health() -> &'static str {
    "ok"
}

// ---------------------------------------------------------------------------
// Cookies
// ---------------------------------------------------------------------------

/// Value of the session cookie, if the request carries one.
fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE).then_some(value)
        })
}

fn with_session_cookie(mut response: Response, id: SessionId, created: bool) -> Response {
    if created {
        let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            Err(e) => log::error!("session {id}: invalid cookie header: {e}"),
        }
    }
    response
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
