//! Core transcription trait and implementations.
//!
//! # Overview
//!
//! [`Transcriber`] is the interface the chat flow uses.  It is object-safe
//! and `Send + Sync` so it can be held behind an `Arc<dyn Transcriber>`.
//!
//! [`WhisperTranscriber`] is the production implementation built on
//! `whisper_rs`.  It consumes the recording: the file is deleted after a
//! successful run.
//!
//! [`MockTranscriber`] (available under `#[cfg(test)]`) returns a
//! pre-configured transcript without any model file.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::{load_for_whisper, DecodeError};
use crate::config::SttConfig;
use crate::stt::model::{is_standard_model, ModelPaths};
use crate::stt::transcribe::TranscribeParams;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// All errors that can arise from the STT subsystem.
#[derive(Debug, Error)]
pub enum SttError {
    /// The GGML model file was not found at the given path.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// `whisper_rs` failed to initialise a `WhisperContext` or `WhisperState`.
    #[error("Whisper context initialisation failed: {0}")]
    ContextInit(String),

    /// The recording could not be decoded.
    #[error("Could not decode recording: {0}")]
    Decode(#[from] DecodeError),

    /// An error occurred during the inference pass.
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// The configuration asks for something this backend cannot do.
    #[error("Unsupported STT setting: {0}")]
    Unsupported(String),

    /// Reading or removing the recording failed.
    #[error("Recording I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// Turns a recorded audio file into text.
///
/// # Contract
///
/// - A path that does not exist yields `Ok("")`, not an error.
/// - After a successful call the file at `path` is gone.
/// - Calls block; run them on a blocking thread.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, path: &Path) -> Result<String, SttError>;
}

// Compile-time assertion: Box<dyn Transcriber> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Transcriber>) {}
};

// ---------------------------------------------------------------------------
// WhisperTranscriber
// ---------------------------------------------------------------------------

/// Production transcriber backed by whisper.cpp.
///
/// The model is loaded on first use.  With `cache_model` set, the loaded
/// context is kept in a slot guarded by a mutex and shared by every later
/// call; otherwise each call loads the model afresh.
pub struct WhisperTranscriber {
    model_path: PathBuf,
    use_gpu: bool,
    cache_model: bool,
    params: TranscribeParams,
    cached: Mutex<Option<Arc<WhisperContext>>>,
}

impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("model_path", &self.model_path)
            .field("cache_model", &self.cache_model)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl WhisperTranscriber {
    /// Build a transcriber from config.  Does not touch the model file.
    ///
    /// # Errors
    ///
    /// [`SttError::Unsupported`] when `vad_filter` is requested.
    pub fn from_config(config: &SttConfig) -> Result<Self, SttError> {
        if config.vad_filter {
            return Err(SttError::Unsupported(
                "vad_filter = true (whisper.cpp runs without a VAD pass)".into(),
            ));
        }

        let model_path = ModelPaths::new(config.resolved_models_dir()).path_for_id(&config.model);
        if !is_standard_model(&config.model) {
            log::info!("stt: using custom model {:?}", config.model);
        }

        Ok(Self {
            model_path,
            use_gpu: config.use_gpu,
            cache_model: config.cache_model,
            params: TranscribeParams::from_config(config),
            cached: Mutex::new(None),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn load_context(&self) -> Result<WhisperContext, SttError> {
        let path = &self.model_path;
        if !path.exists() {
            return Err(SttError::ModelNotFound(path.display().to_string()));
        }

        let path_str = path.to_str().ok_or_else(|| {
            SttError::ModelNotFound(format!(
                "model path contains non-UTF-8 characters: {}",
                path.display()
            ))
        })?;

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu = self.use_gpu;

        let started = std::time::Instant::now();
        let ctx = WhisperContext::new_with_params(path_str, ctx_params)
            .map_err(|e| SttError::ContextInit(e.to_string()))?;
        log::info!(
            "stt: loaded {} in {} ms",
            path.display(),
            started.elapsed().as_millis()
        );

        Ok(ctx)
    }

    fn context(&self) -> Result<Arc<WhisperContext>, SttError> {
        if !self.cache_model {
            return self.load_context().map(Arc::new);
        }

        let mut slot = self
            .cached
            .lock()
            .map_err(|_| SttError::ContextInit("model cache lock poisoned".into()))?;
        if let Some(ctx) = slot.as_ref() {
            return Ok(Arc::clone(ctx));
        }

        let ctx = Arc::new(self.load_context()?);
        *slot = Some(Arc::clone(&ctx));
        Ok(ctx)
    }

    /// Run inference on 16 kHz mono samples and join segment texts in the
    /// order Whisper emits them.
    fn infer(&self, ctx: &WhisperContext, audio: &[f32]) -> Result<String, SttError> {
        let mut fp = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: self.params.beam_size,
            patience: -1.0,
        });

        let lang: Option<&str> = if self.params.language == "auto" {
            None
        } else {
            Some(self.params.language.as_str())
        };
        fp.set_language(lang);
        fp.set_n_threads(self.params.n_threads);
        if !self.params.initial_prompt.is_empty() {
            fp.set_initial_prompt(&self.params.initial_prompt);
        }
        if self.params.suppress_progress {
            fp.set_print_progress(false);
            fp.set_print_realtime(false);
        }

        let mut state = ctx
            .create_state()
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        state
            .full(fp, audio)
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        let n_segments = state
            .full_n_segments()
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        let segments = (0..n_segments)
            .map(|i| {
                state
                    .full_get_segment_text(i)
                    .map_err(|e| SttError::Transcription(format!("segment {i}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("stt: {n_segments} segments");
        Ok(join_segments(&segments))
    }
}

/// Concatenate segment texts exactly as emitted: no separator, no trimming.
/// Whisper segments carry their own leading space.
fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    segments.iter().map(|s| s.as_ref()).collect()
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, path: &Path) -> Result<String, SttError> {
        if !path.exists() {
            log::warn!(
                "stt: recording {} does not exist, returning empty transcript",
                path.display()
            );
            return Ok(String::new());
        }

        let audio = load_for_whisper(path)?;
        let text = if audio.is_empty() {
            String::new()
        } else {
            let ctx = self.context()?;
            self.infer(&ctx, &audio)?
        };

        std::fs::remove_file(path)?;
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// MockTranscriber  (test-only)
// ---------------------------------------------------------------------------

/// Test double returning a fixed transcript while honouring the file
/// contract of [`Transcriber`].
#[cfg(test)]
pub struct MockTranscriber {
    text: String,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockTranscriber {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl Transcriber for MockTranscriber {
    fn transcribe(&self, path: &Path) -> Result<String, SttError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if !path.exists() {
            return Ok(String::new());
        }
        std::fs::remove_file(path)?;
        Ok(self.text.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> SttConfig {
        SttConfig {
            models_dir: Some(dir.to_path_buf()),
            ..SttConfig::default()
        }
    }

    fn write_silence(path: &Path, samples: usize) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut w = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..samples {
            w.write_sample(0_i16).unwrap();
        }
        w.finalize().unwrap();
    }

    #[test]
    fn model_path_resolves_from_model_id() {
        let dir = tempdir().unwrap();
        let t = WhisperTranscriber::from_config(&config_in(dir.path())).unwrap();
        assert_eq!(t.model_path(), dir.path().join("ggml-small.bin"));
    }

    #[test]
    fn vad_filter_is_rejected() {
        let cfg = SttConfig {
            vad_filter: true,
            ..SttConfig::default()
        };
        assert!(matches!(
            WhisperTranscriber::from_config(&cfg),
            Err(SttError::Unsupported(_))
        ));
    }

    #[test]
    fn missing_recording_yields_empty_text() {
        let dir = tempdir().unwrap();
        let t = WhisperTranscriber::from_config(&config_in(dir.path())).unwrap();

        let text = t.transcribe(&dir.path().join("nope.wav")).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn missing_model_is_reported_and_recording_kept() {
        let dir = tempdir().unwrap();
        let clip = dir.path().join("clip.wav");
        write_silence(&clip, 16_000);

        let t = WhisperTranscriber::from_config(&config_in(dir.path())).unwrap();
        let err = t.transcribe(&clip).unwrap_err();

        assert!(matches!(err, SttError::ModelNotFound(_)));
        assert!(clip.exists());
    }

    #[test]
    fn empty_recording_is_consumed_without_model() {
        let dir = tempdir().unwrap();
        let clip = dir.path().join("clip.wav");
        write_silence(&clip, 0);

        let t = WhisperTranscriber::from_config(&config_in(dir.path())).unwrap();
        assert_eq!(t.transcribe(&clip).unwrap(), "");
        assert!(!clip.exists());
    }

    #[test]
    fn segments_are_joined_verbatim() {
        assert_eq!(
            join_segments(&[" Hello", " world.", " Bye "]),
            " Hello world. Bye "
        );
        assert_eq!(join_segments::<&str>(&[]), "");
    }

    #[test]
    fn upload_with_bogus_sample_rate_is_rejected_without_model() {
        let dir = tempdir().unwrap();
        let clip = dir.path().join("clip.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 1,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut w = hound::WavWriter::create(&clip, spec).unwrap();
        for _ in 0..100_000 {
            w.write_sample(0_i16).unwrap();
        }
        w.finalize().unwrap();

        let t = WhisperTranscriber::from_config(&config_in(dir.path())).unwrap();
        assert!(matches!(
            t.transcribe(&clip),
            Err(SttError::Decode(DecodeError::Unsupported(_)))
        ));
    }

    #[test]
    fn undecodable_recording_is_an_error() {
        let dir = tempdir().unwrap();
        let clip = dir.path().join("clip.wav");
        std::fs::write(&clip, b"webm, not wav").unwrap();

        let t = WhisperTranscriber::from_config(&config_in(dir.path())).unwrap();
        assert!(matches!(t.transcribe(&clip), Err(SttError::Decode(_))));
    }

    #[test]
    fn mock_deletes_recording_after_use() {
        let dir = tempdir().unwrap();
        let clip = dir.path().join("clip.wav");
        std::fs::write(&clip, b"RIFF").unwrap();

        let mock = MockTranscriber::new("hello there");
        assert_eq!(mock.transcribe(&clip).unwrap(), "hello there");
        assert!(!clip.exists());
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn box_dyn_transcriber_compiles() {
        let t: Box<dyn Transcriber> = Box::new(MockTranscriber::new("ok"));
        let _ = t.transcribe(Path::new("/nonexistent.wav"));
    }

    #[test]
    fn stt_error_display_model_not_found() {
        let e = SttError::ModelNotFound("/some/path.bin".into());
        assert!(e.to_string().contains("/some/path.bin"));
    }
}
