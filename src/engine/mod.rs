//! Remote orchestration engine access.
//!
//! # Architecture
//!
//! ```text
//! main ──provision(&EngineConfig)──▶ EngineConnection   (once per process)
//!                                        │ Arc<dyn Engine>
//!                                        ▼
//!                                  MessageDispatcher ──ask(prompt)──▶ Reply { text, elapsed }
//! ```
//!
//! The connection is built once and injected; nothing here is a global.

pub mod client;
pub mod connection;
pub mod dispatcher;

pub use client::{Engine, EngineError};
pub use connection::{provision, ConnectionString, Credential, EngineConnection, ProvisionError};
pub use dispatcher::{MessageDispatcher, Reply};

#[cfg(test)]
pub use client::MockEngine;
