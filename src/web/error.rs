//! Web error type mapping submission failures to HTTP error pages.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::chat::ChatError;

use super::render::render_error_page;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Handling the submission failed.
    Chat(ChatError),
    /// The request itself was malformed (e.g. a broken multipart body).
    BadRequest(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Chat(ChatError::Engine(_)) => StatusCode::BAD_GATEWAY,
            AppError::Chat(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (title, message) = match &self {
            AppError::Chat(ChatError::Engine(e)) => ("Engine error", e.to_string()),
            AppError::Chat(ChatError::Stt(e)) => ("Transcription error", e.to_string()),
            AppError::Chat(e) => ("Internal error", e.to_string()),
            AppError::BadRequest(msg) => ("Bad request", msg.clone()),
        };

        (status, Html(render_error_page(title, &message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use crate::stt::SttError;

    #[test]
    fn engine_failures_are_bad_gateway() {
        let err = AppError::from(ChatError::Engine(EngineError::Timeout));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn other_failures_are_internal() {
        let stt = AppError::from(ChatError::Stt(SttError::Transcription("boom".into())));
        assert_eq!(stt.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let internal = AppError::from(ChatError::Internal("join".into()));
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_requests_are_bad_request() {
        let err = AppError::BadRequest("bad multipart".into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
