//! Chat controller: drives one submission through transcription and dispatch.
//!
//! [`ChatController::handle`] is the single entry point: the web layer turns
//! every form post into a [`SessionEvent`] and hands it over together with
//! the locked [`ChatSession`].
//!
//! # Event flow
//!
//! ```text
//! SubmitText(text)
//!   ├─ blank           → Warning, nothing appended
//!   └─ otherwise       → Dispatching → append User + Bot → Info(elapsed)
//!
//! SubmitAudio(clip)
//!   ├─ none / empty    → Warning, nothing appended, no transcription
//!   └─ otherwise       → write recording → spawn_blocking(transcribe) [Transcribing]
//!         ├─ blank text → Warning
//!         └─ text       → Dispatching → append User + Bot → Info(elapsed)
//! ```
//!
//! The session phase is back to `Idle` when `handle` returns, whatever the
//! outcome.  Engine and transcription failures are returned to the caller
//! unchanged; nothing is retried.

use std::sync::Arc;

use thiserror::Error;

use crate::engine::{EngineError, MessageDispatcher};
use crate::session::{ChatSession, Notice, SessionPhase};
use crate::stt::{SttError, Transcriber};

/// Warning shown when the text form is submitted empty.
pub const EMPTY_TEXT_WARNING: &str = "Please provide a text input.";
/// Warning shown when the audio form is submitted without a usable recording.
pub const EMPTY_AUDIO_WARNING: &str = "Please provide an audio recording.";

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// A form submission from the page.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The text form was submitted with this content.
    SubmitText(String),
    /// The audio form was submitted; `None` when no recording was attached.
    SubmitAudio(Option<Vec<u8>>),
}

// ---------------------------------------------------------------------------
// ChatError
// ---------------------------------------------------------------------------

/// Failures while handling a submission.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The remote engine call failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Transcription failed.
    #[error(transparent)]
    Stt(#[from] SttError),

    /// The uploaded recording could not be stored.
    #[error("could not store recording: {0}")]
    Recording(std::io::Error),

    /// Internal / unexpected error (e.g. a panicked blocking task).
    #[error("internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// ChatController
// ---------------------------------------------------------------------------

/// Shared by all sessions; holds the injected dispatcher and transcriber.
#[derive(Clone)]
pub struct ChatController {
    dispatcher: MessageDispatcher,
    transcriber: Arc<dyn Transcriber>,
}

impl ChatController {
    pub fn new(dispatcher: MessageDispatcher, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            dispatcher,
            transcriber,
        }
    }

    /// Handle one submission for `session`.
    ///
    /// On success the returned [`Notice`] is also stored on the session so
    /// the next page render shows it.
    pub async fn handle(
        &self,
        session: &mut ChatSession,
        event: SessionEvent,
    ) -> Result<Notice, ChatError> {
        let outcome = match event {
            SessionEvent::SubmitText(text) => self.on_text(session, text).await,
            SessionEvent::SubmitAudio(clip) => self.on_audio(session, clip).await,
        };

        session.set_phase(SessionPhase::Idle);

        match &outcome {
            Ok(notice) => session.set_notice(notice.clone()),
            Err(e) => log::error!("session {}: {e}", session.id()),
        }
        outcome
    }

    async fn on_text(&self, session: &mut ChatSession, text: String) -> Result<Notice, ChatError> {
        if text.trim().is_empty() {
            log::warn!("session {}: empty text submission", session.id());
            return Ok(Notice::Warning(EMPTY_TEXT_WARNING.into()));
        }
        self.exchange(session, text).await
    }

    async fn on_audio(
        &self,
        session: &mut ChatSession,
        clip: Option<Vec<u8>>,
    ) -> Result<Notice, ChatError> {
        let Some(clip) = clip.filter(|c| !c.is_empty()) else {
            log::warn!("session {}: audio submitted without a recording", session.id());
            return Ok(Notice::Warning(EMPTY_AUDIO_WARNING.into()));
        };

        let path = session.recording_path().to_path_buf();
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(ChatError::Recording)?;
        }
        tokio::fs::write(&path, &clip)
            .await
            .map_err(ChatError::Recording)?;

        session.set_phase(SessionPhase::Transcribing);
        log::debug!("session {}: transcribing {} bytes", session.id(), clip.len());

        let transcriber = Arc::clone(&self.transcriber);
        let text = tokio::task::spawn_blocking(move || transcriber.transcribe(&path))
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))??;

        if text.trim().is_empty() {
            log::warn!("session {}: recording produced no text", session.id());
            return Ok(Notice::Warning(EMPTY_AUDIO_WARNING.into()));
        }
        self.exchange(session, text).await
    }

    /// Send `prompt` and, once the reply is in, append both turns.
    async fn exchange(&self, session: &mut ChatSession, prompt: String) -> Result<Notice, ChatError> {
        session.set_phase(SessionPhase::Dispatching);

        let reply = self.dispatcher.ask(&prompt).await?;
        let notice = Notice::Info(reply.elapsed_message());
        session.transcript.append_exchange(prompt, reply.text);

        Ok(notice)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, MockEngine};
    use crate::session::{ChatTurn, SessionId};
    use crate::stt::MockTranscriber;
    use tempfile::{tempdir, TempDir};
    use tokio::sync::watch;

    fn setup(
        engine: MockEngine,
        transcript: &str,
    ) -> (ChatController, Arc<MockEngine>, Arc<MockTranscriber>, ChatSession, TempDir) {
        let engine = Arc::new(engine);
        let stt = Arc::new(MockTranscriber::new(transcript));
        let controller = ChatController::new(
            MessageDispatcher::new(engine.clone()),
            stt.clone(),
        );
        let dir = tempdir().unwrap();
        let session = ChatSession::new(SessionId::generate(), dir.path().join("rec.wav"));
        (controller, engine, stt, session, dir)
    }

    #[tokio::test]
    async fn text_submission_appends_user_then_bot() {
        let (ctl, _, _, mut session, _dir) = setup(MockEngine::ok("hi there"), "");

        let notice = ctl
            .handle(&mut session, SessionEvent::SubmitText("hello".into()))
            .await
            .unwrap();

        assert_eq!(
            session.transcript.turns(),
            &[ChatTurn::user("hello"), ChatTurn::bot("hi there")]
        );
        assert!(!notice.is_warning());
        assert!(notice.text().starts_with("Response generated in "));
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn each_submission_adds_two_turns_in_order() {
        let (ctl, engine, _, mut session, _dir) = setup(MockEngine::ok("ack"), "");

        for (i, msg) in ["first", "second", "third"].iter().enumerate() {
            ctl.handle(&mut session, SessionEvent::SubmitText(msg.to_string()))
                .await
                .unwrap();
            assert_eq!(session.transcript.len(), 2 * (i + 1));
        }

        let users: Vec<&str> = session
            .transcript
            .turns()
            .iter()
            .step_by(2)
            .map(|t| t.content())
            .collect();
        assert_eq!(users, vec!["first", "second", "third"]);
        assert_eq!(engine.prompts(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn empty_text_warns_and_appends_nothing() {
        let (ctl, engine, _, mut session, _dir) = setup(MockEngine::ok("unused"), "");

        for blank in ["", "   ", "\n\t"] {
            let notice = ctl
                .handle(&mut session, SessionEvent::SubmitText(blank.into()))
                .await
                .unwrap();
            assert_eq!(notice, Notice::Warning(EMPTY_TEXT_WARNING.into()));
        }

        assert!(session.transcript.is_empty());
        assert!(engine.prompts().is_empty());
        assert_eq!(
            session.take_notice(),
            Some(Notice::Warning(EMPTY_TEXT_WARNING.into()))
        );
    }

    #[tokio::test]
    async fn missing_audio_skips_transcription_and_dispatch() {
        let (ctl, engine, stt, mut session, _dir) = setup(MockEngine::ok("unused"), "words");

        for clip in [None, Some(Vec::new())] {
            let notice = ctl
                .handle(&mut session, SessionEvent::SubmitAudio(clip))
                .await
                .unwrap();
            assert_eq!(notice, Notice::Warning(EMPTY_AUDIO_WARNING.into()));
        }

        assert_eq!(stt.calls(), 0);
        assert!(engine.prompts().is_empty());
        assert!(session.transcript.is_empty());
    }

    #[tokio::test]
    async fn audio_submission_transcribes_then_dispatches() {
        let (ctl, engine, stt, mut session, _dir) =
            setup(MockEngine::ok("sure"), "what is RAG");

        ctl.handle(&mut session, SessionEvent::SubmitAudio(Some(b"RIFF....".to_vec())))
            .await
            .unwrap();

        assert_eq!(stt.calls(), 1);
        assert_eq!(engine.prompts(), vec!["what is RAG"]);
        assert_eq!(
            session.transcript.turns(),
            &[ChatTurn::user("what is RAG"), ChatTurn::bot("sure")]
        );
        assert!(!session.recording_path().exists());
    }

    type PhaseLog = Arc<std::sync::Mutex<Vec<SessionPhase>>>;

    /// Notes the session phase at the moment it is asked to transcribe.
    struct PhaseNotingTranscriber {
        phase: watch::Receiver<SessionPhase>,
        log: PhaseLog,
    }

    impl Transcriber for PhaseNotingTranscriber {
        fn transcribe(&self, path: &std::path::Path) -> Result<String, SttError> {
            self.log.lock().unwrap().push(*self.phase.borrow());
            std::fs::remove_file(path)?;
            Ok("what is RAG".into())
        }
    }

    /// Notes the session phase at the moment it is asked for a reply.
    struct PhaseNotingEngine {
        phase: watch::Receiver<SessionPhase>,
        log: PhaseLog,
    }

    #[async_trait::async_trait]
    impl Engine for PhaseNotingEngine {
        async fn ask(&self, _prompt: &str) -> Result<String, EngineError> {
            self.log.lock().unwrap().push(*self.phase.borrow());
            Ok("sure".into())
        }
    }

    #[tokio::test]
    async fn audio_submission_passes_through_transcribing_then_dispatching() {
        let dir = tempdir().unwrap();
        let mut session = ChatSession::new(SessionId::generate(), dir.path().join("rec.wav"));
        let log = PhaseLog::default();

        let controller = ChatController::new(
            MessageDispatcher::new(Arc::new(PhaseNotingEngine {
                phase: session.watch_phase(),
                log: log.clone(),
            })),
            Arc::new(PhaseNotingTranscriber {
                phase: session.watch_phase(),
                log: log.clone(),
            }),
        );

        controller
            .handle(&mut session, SessionEvent::SubmitAudio(Some(b"RIFF".to_vec())))
            .await
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![SessionPhase::Transcribing, SessionPhase::Dispatching]
        );
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn text_submission_dispatches_without_transcribing() {
        let dir = tempdir().unwrap();
        let mut session = ChatSession::new(SessionId::generate(), dir.path().join("rec.wav"));
        let log = PhaseLog::default();
        let stt = Arc::new(MockTranscriber::new("unused"));

        let controller = ChatController::new(
            MessageDispatcher::new(Arc::new(PhaseNotingEngine {
                phase: session.watch_phase(),
                log: log.clone(),
            })),
            stt.clone(),
        );

        controller
            .handle(&mut session, SessionEvent::SubmitText("hello".into()))
            .await
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec![SessionPhase::Dispatching]);
        assert_eq!(stt.calls(), 0);
    }

    #[tokio::test]
    async fn silent_recording_warns_without_dispatch() {
        let (ctl, engine, stt, mut session, _dir) = setup(MockEngine::ok("unused"), "  ");

        let notice = ctl
            .handle(&mut session, SessionEvent::SubmitAudio(Some(vec![1, 2, 3])))
            .await
            .unwrap();

        assert_eq!(notice, Notice::Warning(EMPTY_AUDIO_WARNING.into()));
        assert_eq!(stt.calls(), 1);
        assert!(engine.prompts().is_empty());
    }

    #[tokio::test]
    async fn engine_failure_propagates_and_appends_nothing() {
        let (ctl, _, _, mut session, _dir) =
            setup(MockEngine::err(EngineError::Request("refused".into())), "");

        let err = ctl
            .handle(&mut session, SessionEvent::SubmitText("hello".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Engine(EngineError::Request(_))));
        assert!(session.transcript.is_empty());
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.take_notice().is_none());
    }
}
