//! Where the server keeps its files.
//!
//! * `settings.toml` goes in the per-user config dir reported by `dirs`
//!   (`~/.config/voice-chat` on Linux).
//! * GGML models default to `models/` in the per-user local data dir.
//! * Uploads wait for transcription under the system temp dir.
//! * Bundled assets such as the logo are looked up next to the executable.

use std::path::{Path, PathBuf};

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory for downloaded GGML model files.
    pub models_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "voice-chat";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let models_dir = data_dir.join("models");

        Self {
            config_dir,
            settings_file,
            models_dir,
        }
    }

    /// Directory where uploaded recordings wait for transcription.
    pub fn default_audio_dir() -> PathBuf {
        std::env::temp_dir().join(Self::APP_NAME)
    }

    /// Directory containing the running executable.
    pub fn app_dir() -> Option<PathBuf> {
        let exe = std::env::current_exe().ok()?;
        exe.parent().map(Path::to_path_buf)
    }

    /// Resolve an asset path from the config.
    ///
    /// Absolute paths are returned unchanged.  A relative path is taken
    /// relative to `app_dir` when the file exists there, otherwise relative
    /// to the working directory.
    pub fn resolve_asset(path: &Path, app_dir: Option<&Path>) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match app_dir.map(|dir| dir.join(path)) {
            Some(candidate) if candidate.exists() => candidate,
            _ => path.to_path_buf(),
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
