//! Core [`Engine`] trait and its error type.
//!
//! [`Engine`] is the seam between the chat flow and the remote orchestration
//! engine.  Production code holds an `Arc<dyn Engine>` backed by
//! [`EngineConnection`](crate::engine::EngineConnection); tests substitute
//! [`MockEngine`].

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Errors raised while invoking an operation on the remote engine.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// HTTP transport or connection error.
    #[error("engine request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("engine request timed out")]
    Timeout,

    /// The engine answered with a non-success status.
    #[error("engine returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// The response body was not in the expected shape.
    #[error("failed to parse engine response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for EngineError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            EngineError::Timeout
        } else {
            EngineError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Engine trait
// ---------------------------------------------------------------------------

/// A remote service that turns a prompt into a reply.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn Engine>` between request handlers.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Invoke the engine's ask operation with `prompt` and return its reply.
    async fn ask(&self, prompt: &str) -> Result<String, EngineError>;
}

// Compile-time assertion: Box<dyn Engine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Engine>) {}
};

// ---------------------------------------------------------------------------
// MockEngine  (test-only)
// ---------------------------------------------------------------------------

/// Test double answering every prompt with a fixed reply (or error) and
/// recording the prompts it received.
#[cfg(test)]
pub struct MockEngine {
    response: Result<String, EngineError>,
    prompts: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockEngine {
    /// A mock that always answers `Ok(reply)`.
    pub fn ok(reply: impl Into<String>) -> Self {
        Self {
            response: Ok(reply.into()),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A mock that always fails with `error`.
    pub fn err(error: EngineError) -> Self {
        Self {
            response: Err(error),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Engine for MockEngine {
    async fn ask(&self, prompt: &str) -> Result<String, EngineError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.response.clone()
    }
}
