//! Recorder uploads → Whisper input.
//!
//! ```text
//! WAV file → hound decode → downmix → resample_for_whisper → 16 kHz mono f32
//! ```

pub mod resample;
pub mod wav;

pub use resample::{downmix, resample_for_whisper, WHISPER_SAMPLE_RATE};
pub use wav::{load_for_whisper, DecodeError};
