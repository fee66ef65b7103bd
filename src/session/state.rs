//! Per-session state: transcript, handling phase and the one-shot notice.
//!
//! [`SessionPhase`] makes the submission state machine explicit:
//!
//! ```text
//! Idle ──text submit──────────────────────────▶ Dispatching ──reply──▶ Idle
//! Idle ──audio submit──▶ Transcribing ──text──▶ Dispatching ──reply──▶ Idle
//! Idle ──empty submit──▶ Idle (warning)
//! any phase ──error──▶ Idle
//! ```
//!
//! [`ChatSession`] is held behind [`SharedSession`]
//! (`Arc<tokio::sync::Mutex<…>>`); the lock is held for the whole duration
//! of one event, so a session never handles two submissions at once.  The
//! phase is published on a `watch` channel so it can be followed from
//! outside that lock.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use uuid::Uuid;

use super::transcript::Transcript;

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// Random identifier of one browser session, carried in a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Where a session currently is in handling a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No submission pending.
    #[default]
    Idle,
    /// A recording is being converted to text.
    Transcribing,
    /// A prompt is waiting on the remote engine.
    Dispatching,
}

impl SessionPhase {
    /// Busy-indicator text for the phase.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::Transcribing => "Transcribing audio...",
            SessionPhase::Dispatching => "LLM is processing...",
        }
    }
}

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

/// Message shown once, on the page render that follows a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Validation problem with the submission; nothing was appended.
    Warning(String),
    /// Informational status, e.g. the response time.
    Info(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Warning(t) | Notice::Info(t) => t,
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Notice::Warning(_))
    }
}

// ---------------------------------------------------------------------------
// ChatSession
// ---------------------------------------------------------------------------

/// Everything the page needs for one browser session.
#[derive(Debug)]
pub struct ChatSession {
    id: SessionId,
    /// The chat log shown in the transcript panel.
    pub transcript: Transcript,
    phase: watch::Sender<SessionPhase>,
    notice: Option<Notice>,
    recording_path: PathBuf,
}

impl ChatSession {
    pub fn new(id: SessionId, recording_path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            transcript: Transcript::new(),
            phase: watch::Sender::new(SessionPhase::Idle),
            notice: None,
            recording_path: recording_path.into(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    /// Move to `phase`, notifying every subscriber.
    pub fn set_phase(&mut self, phase: SessionPhase) {
        let previous = self.phase.send_replace(phase);
        if previous != phase {
            log::debug!("session {}: {previous:?} -> {phase:?}", self.id);
        }
    }

    /// Follow phase changes without holding the session lock.
    pub fn watch_phase(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    /// Where this session's recorder upload is kept until transcribed.
    pub fn recording_path(&self) -> &Path {
        &self.recording_path
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Take the pending notice, leaving none behind.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

/// Handle to a session shared between the store and request handlers.
pub type SharedSession = Arc<Mutex<ChatSession>>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
