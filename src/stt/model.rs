//! Whisper model file resolution.
//!
//! The config names a model by id (`"small"`, `"large-v3"`,
//! `"small.en-q5_1"`, …); whisper.cpp ships each as `ggml-<id>.bin`.

use std::path::PathBuf;

/// Ids of the standard multilingual checkpoints published for whisper.cpp
/// (<https://huggingface.co/ggerganov/whisper.cpp>).
pub const STANDARD_MODEL_IDS: &[&str] = &["tiny", "base", "small", "medium", "large-v3"];

/// Resolves the on-disk location of model files.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    models_dir: PathBuf,
}

impl ModelPaths {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    /// Full path of the GGML file for `id`.
    pub fn path_for_id(&self, id: &str) -> PathBuf {
        self.models_dir.join(format!("ggml-{id}.bin"))
    }
}

/// `true` for one of [`STANDARD_MODEL_IDS`]; anything else is a custom or
/// quantised file the operator dropped into the models directory.
pub fn is_standard_model(id: &str) -> bool {
    STANDARD_MODEL_IDS.contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_and_custom_ids_map_to_ggml_files() {
        let mp = ModelPaths::new("/models");
        assert_eq!(mp.path_for_id("small"), PathBuf::from("/models/ggml-small.bin"));
        assert_eq!(
            mp.path_for_id("small.en-q5_1"),
            PathBuf::from("/models/ggml-small.en-q5_1.bin")
        );
    }

    #[test]
    fn recognises_standard_ids() {
        assert!(is_standard_model("small"));
        assert!(is_standard_model("large-v3"));
        assert!(!is_standard_model("small.en-q5_1"));
    }
}
