//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Defaults reproduce the values the demo deployment has always used, so an
//! empty or missing `settings.toml` yields a working setup inside the demo
//! container.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the web UI binds to.
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8501".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Settings for the remote orchestration engine connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `host:port/namespace` of the engine.
    pub connection_string: String,
    /// Account used to authenticate.
    pub username: String,
    /// File holding the account secret (first line is used).
    pub secret_path: PathBuf,
    /// Business service created on the engine at startup.
    pub service: String,
    /// Operation invoked on the service for every message.
    pub operation: String,
    /// Request timeout.  `None` keeps the connector default (no timeout).
    pub timeout_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            connection_string: "iris:1972/RAG".into(),
            username: "SuperUser".into(),
            secret_path: PathBuf::from("/run/secrets/iris_pw"),
            service: "Streamlit Service".into(),
            operation: "Ask".into(),
            timeout_secs: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for the Whisper transcription adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Model id; resolved to `ggml-<id>.bin` in the models dir (e.g. `"small"`).
    pub model: String,
    /// Override for the models directory; `None` uses [`AppPaths::models_dir`].
    pub models_dir: Option<PathBuf>,
    /// ISO-639-1 language code passed to Whisper.
    pub language: String,
    /// Beam width for beam-search decoding.
    pub beam_size: i32,
    /// Voice-activity filtering.  The whisper.cpp backend has no built-in VAD
    /// pass, so `true` is rejected at startup.
    pub vad_filter: bool,
    /// Priming text handed to the decoder before the first window.
    pub initial_prompt: String,
    /// Attempt GPU-accelerated inference when available.
    pub use_gpu: bool,
    /// Keep the loaded model in memory between transcriptions.
    pub cache_model: bool,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: "small".into(),
            models_dir: None,
            language: "en".into(),
            beam_size: 5,
            vad_filter: false,
            initial_prompt: "This is a demo from InterSystems with Roche company.".into(),
            use_gpu: false,
            cache_model: true,
        }
    }
}

impl SttConfig {
    /// Directory that holds the GGML files.
    pub fn resolved_models_dir(&self) -> PathBuf {
        self.models_dir
            .clone()
            .unwrap_or_else(|| AppPaths::new().models_dir)
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Page chrome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// `<title>` of the page.
    pub page_title: String,
    /// Emoji used as favicon.
    pub page_icon: String,
    /// Heading rendered in the page header.
    pub heading: String,
    /// SVG logo shown next to the heading; read once at startup.
    pub logo_path: PathBuf,
    /// Avatar shown next to user turns.
    pub user_avatar: String,
    /// Avatar shown next to bot turns.
    pub bot_avatar: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_title: "IRIS Vector Search Demo".into(),
            page_icon: "🤖".into(),
            heading: "💻 IRIS Vector Search Demo".into(),
            logo_path: PathBuf::from("assets/logo.svg"),
            user_avatar: "🧑‍💼".into(),
            bot_avatar: "🤖".into(),
        }
    }
}

impl UiConfig {
    /// Logo location, with relative paths resolved next to the executable
    /// first.  See [`AppPaths::resolve_asset`].
    pub fn resolved_logo_path(&self) -> PathBuf {
        AppPaths::resolve_asset(&self.logo_path, AppPaths::app_dir().as_deref())
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Browser-session bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory for per-session recordings awaiting transcription.
    pub audio_dir: PathBuf,
    /// Sessions idle for longer than this are discarded.
    pub idle_ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            audio_dir: AppPaths::default_audio_dir(),
            idle_ttl_secs: 3_600,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use voice_chat::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// println!("{}", config.server.bind_addr);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener.
    pub server: ServerConfig,
    /// Remote engine connection.
    pub engine: EngineConfig,
    /// Transcription adapter.
    pub stt: SttConfig,
    /// Page chrome.
    pub ui: UiConfig,
    /// Session handling.
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
