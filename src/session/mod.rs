//! Session bookkeeping for the chat page.
//!
//! * [`Transcript`] / [`ChatTurn`]: the append-only chat log.
//! * [`ChatSession`]: transcript plus the explicit [`SessionPhase`] and the
//!   one-shot [`Notice`] shown after a submission.
//! * [`SessionStore`]: cookie-keyed registry of live sessions with idle
//!   expiry and per-session recording paths.

pub mod state;
pub mod store;
pub mod transcript;

pub use state::{ChatSession, Notice, SessionId, SessionPhase, SharedSession};
pub use store::SessionStore;
pub use transcript::{ChatTurn, Role, Transcript};
