//! Request/response bridge between the chat flow and the [`Engine`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::client::{Engine, EngineError};

/// A reply from the engine together with how long it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub elapsed: Duration,
}

impl Reply {
    /// Status line shown under the transcript after a reply.
    pub fn elapsed_message(&self) -> String {
        format!("Response generated in {} s.", self.elapsed.as_secs())
    }
}

/// Sends prompts to the engine one at a time and times each call.
///
/// Errors from the engine are passed through unchanged; there is no retry.
#[derive(Clone)]
pub struct MessageDispatcher {
    engine: Arc<dyn Engine>,
}

impl MessageDispatcher {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    /// Ask the engine about `prompt`.  Callers guarantee `prompt` is non-empty.
    pub async fn ask(&self, prompt: &str) -> Result<Reply, EngineError> {
        log::debug!("dispatch: prompt ({} chars)", prompt.chars().count());

        let start = Instant::now();
        let text = self.engine.ask(prompt).await?;
        let elapsed = start.elapsed();

        log::info!(
            "dispatch: reply ({} chars) in {:.2} s",
            text.chars().count(),
            elapsed.as_secs_f64()
        );

        Ok(Reply { text, elapsed })
    }
}
