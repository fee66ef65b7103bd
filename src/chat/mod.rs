//! Submission handling: the explicit Idle → Transcribing → Dispatching state
//! machine behind both page forms.

pub mod controller;

pub use controller::{
    ChatController, ChatError, SessionEvent, EMPTY_AUDIO_WARNING, EMPTY_TEXT_WARNING,
};
