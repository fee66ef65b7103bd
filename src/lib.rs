//! Voice chat front end for a remote retrieval-augmented LLM engine.
//!
//! A browser page keeps a per-session chat transcript.  Prompts arrive either
//! as typed text or as a recorded voice clip transcribed locally with
//! Whisper; each prompt is forwarded to a business service on the remote
//! engine and the reply is appended to the transcript.
//!
//! ```text
//! web ──▶ chat::ChatController ──▶ stt::Transcriber (audio only)
//!                │
//!                └──▶ engine::MessageDispatcher ──▶ engine::EngineConnection
//! ```

pub mod audio;
pub mod chat;
pub mod config;
pub mod engine;
pub mod session;
pub mod stt;
pub mod web;
