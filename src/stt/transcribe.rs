//! Transcription parameter types.
//!
//! [`TranscribeParams`] carries every setting of a single Whisper inference
//! run.  The values are fixed for the lifetime of the process; they come
//! from [`SttConfig`] once at startup.

use crate::config::SttConfig;

/// All parameters for a single Whisper transcription run.
///
/// ```
/// use voice_chat::stt::TranscribeParams;
///
/// let params = TranscribeParams {
///     beam_size: 3,
///     ..TranscribeParams::default()
/// };
/// assert_eq!(params.language, "en");
/// ```
#[derive(Debug, Clone)]
pub struct TranscribeParams {
    /// ISO-639-1 language code (e.g. `"en"`), or `"auto"` to let Whisper
    /// detect the language.
    pub language: String,

    /// Beam width for beam-search decoding.
    pub beam_size: i32,

    /// Text the decoder is primed with; biases spelling of domain terms.
    /// Empty means no priming.
    pub initial_prompt: String,

    /// Number of CPU threads handed to Whisper.  Defaults to
    /// [`optimal_threads()`], capped at 8.
    pub n_threads: i32,

    /// Suppress Whisper's progress output to stderr.
    pub suppress_progress: bool,
}

impl Default for TranscribeParams {
    fn default() -> Self {
        Self::from_config(&SttConfig::default())
    }
}

impl TranscribeParams {
    pub fn from_config(config: &SttConfig) -> Self {
        Self {
            language: config.language.clone(),
            beam_size: config.beam_size.max(1),
            initial_prompt: config.initial_prompt.clone(),
            n_threads: optimal_threads(),
            suppress_progress: true,
        }
    }
}

/// Returns the number of CPU threads to use for inference, capped at 8 to
/// avoid diminishing returns on Whisper.
pub(crate) fn optimal_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_stt_config() {
        let p = TranscribeParams::default();
        assert_eq!(p.language, "en");
        assert_eq!(p.beam_size, 5);
        assert!(p.initial_prompt.contains("InterSystems"));
        assert!(p.suppress_progress);
    }

    #[test]
    fn beam_size_is_at_least_one() {
        let cfg = SttConfig {
            beam_size: 0,
            ..SttConfig::default()
        };
        assert_eq!(TranscribeParams::from_config(&cfg).beam_size, 1);
    }

    #[test]
    fn optimal_threads_is_positive_and_at_most_8() {
        let t = optimal_threads();
        assert!((1..=8).contains(&t));
    }
}
