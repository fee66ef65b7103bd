//! STT (Speech-to-Text) adapter.
//!
//! # Architecture
//!
//! ```text
//! recording.wav ──▶ audio::load_for_whisper ──▶ 16 kHz mono f32
//!                                                   │
//!                  ModelPaths ──▶ WhisperContext ───┤ (lazy, optionally cached)
//!                                                   ▼
//!                                         beam search, fixed language,
//!                                         initial prompt ──▶ joined segments
//!                                                   │
//!                                         remove recording ──▶ text
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use voice_chat::config::SttConfig;
//! use voice_chat::stt::{Transcriber, WhisperTranscriber};
//!
//! let stt = WhisperTranscriber::from_config(&SttConfig::default()).unwrap();
//! let text = stt.transcribe(Path::new("/tmp/voice-chat/recorded_audio.wav")).unwrap();
//! println!("{text}");
//! ```

pub mod engine;
pub mod model;
pub mod transcribe;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{SttError, Transcriber, WhisperTranscriber};
pub use model::{is_standard_model, ModelPaths, STANDARD_MODEL_IDS};
pub use transcribe::TranscribeParams;

#[cfg(test)]
pub use engine::MockTranscriber;
