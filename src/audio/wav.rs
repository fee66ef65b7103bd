//! WAV decoding for recorder uploads.

use std::path::Path;

use hound::{SampleFormat, WavReader};
use thiserror::Error;

use super::resample::{downmix, resample_for_whisper};

/// Sample rates accepted from an upload header.  Anything outside this range
/// is not a microphone recording, and a tiny rate would blow up the
/// resampler's output buffer.
pub const SUPPORTED_SAMPLE_RATES: std::ops::RangeInclusive<u32> = 8_000..=192_000;

/// Errors that can arise while reading a recording.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file is not a WAV file hound can read.
    #[error("invalid WAV data: {0}")]
    Wav(#[from] hound::Error),

    /// Unsupported sample layout.
    #[error("unsupported WAV format: {0}")]
    Unsupported(String),
}

/// Read a WAV file and return 16 kHz mono `f32` samples in `[-1.0, 1.0]`.
///
/// Integer PCM of 8 to 32 bits and 32-bit float are accepted, with any
/// number of channels and a sample rate within [`SUPPORTED_SAMPLE_RATES`].
pub fn load_for_whisper(path: &Path) -> Result<Vec<f32>, DecodeError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    if !SUPPORTED_SAMPLE_RATES.contains(&spec.sample_rate) {
        return Err(DecodeError::Unsupported(format!(
            "sample rate {} Hz",
            spec.sample_rate
        )));
    }

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<_, _>>()?,
        (SampleFormat::Int, bits @ 8..=32) => {
            let scale = (1_i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
        (format, bits) => {
            return Err(DecodeError::Unsupported(format!("{format:?} {bits}-bit")));
        }
    };

    log::debug!(
        "wav: {} samples, {} ch @ {} Hz",
        interleaved.len(),
        spec.channels,
        spec.sample_rate
    );

    let mono = downmix(&interleaved, spec.channels);
    Ok(resample_for_whisper(&mono, spec.sample_rate))
}
