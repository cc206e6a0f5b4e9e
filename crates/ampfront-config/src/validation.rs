//! Settings validation.
//!
//! Values the runtime cannot work with are errors. Values it will silently
//! clamp (volume, filter cutoffs) come back as warnings so callers can tell
//! the user what will actually happen.

use crate::settings::Settings;
use ampfront_core::{AudioFrame, MAX_CUTOFF_HZ, MAX_VOLUME_SCALE, MIN_CUTOFF_HZ, clamp_cutoff};
use core::fmt;
use thiserror::Error;

/// Lowest accepted sample rate in Hz.
pub const MIN_SAMPLE_RATE: u32 = 1000;

/// Highest accepted sample rate in Hz.
pub const MAX_SAMPLE_RATE: u32 = 384_000;

/// Settings the runtime cannot use.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Sample rate outside [`MIN_SAMPLE_RATE`, `MAX_SAMPLE_RATE`].
    #[error("sample rate {0} Hz out of range [{min}, {max}]", min = MIN_SAMPLE_RATE, max = MAX_SAMPLE_RATE)]
    SampleRate(u32),

    /// Chunk size zero or not a whole number of stereo frames.
    #[error("chunk size {0} must be a non-zero multiple of 4 bytes")]
    ChunkSize(usize),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// A setting that will be clamped at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// Volume outside the 0-9 scale. The multiplier is clamped to [0, 2].
    Volume {
        /// Configured value.
        value: i32,
    },
    /// Filter cutoff outside the supported band.
    Cutoff {
        /// `"lowpass"` or `"highpass"`.
        filter: &'static str,
        /// Configured value.
        value: f32,
        /// Value that will be used.
        clamped: f32,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::Volume { value } => {
                write!(f, "volume {value} outside the 0-{MAX_VOLUME_SCALE} scale")
            }
            ValidationWarning::Cutoff {
                filter,
                value,
                clamped,
            } => write!(
                f,
                "{filter} cutoff {value} Hz outside [{MIN_CUTOFF_HZ}, {MAX_CUTOFF_HZ}], using {clamped} Hz"
            ),
        }
    }
}

/// Checks `settings`, returning the warnings if it is usable.
pub fn validate_settings(settings: &Settings) -> Result<Vec<ValidationWarning>, ValidationError> {
    let mut errors = Vec::new();

    if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&settings.sample_rate) {
        errors.push(ValidationError::SampleRate(settings.sample_rate));
    }

    let chunk = settings.playback.chunk_size;
    if chunk == 0 || chunk % AudioFrame::BYTES != 0 {
        errors.push(ValidationError::ChunkSize(chunk));
    }

    match errors.len() {
        0 => {}
        1 => return Err(errors.remove(0)),
        _ => return Err(ValidationError::Multiple(errors)),
    }

    let mut warnings = Vec::new();

    if !(0..=i32::from(MAX_VOLUME_SCALE)).contains(&settings.volume) {
        warnings.push(ValidationWarning::Volume {
            value: settings.volume,
        });
    }

    for (filter, value) in [
        ("lowpass", settings.filter.lowpass_hz),
        ("highpass", settings.filter.highpass_hz),
    ] {
        let clamped = clamp_cutoff(value);
        if clamped != value {
            warnings.push(ValidationWarning::Cutoff {
                filter,
                value,
                clamped,
            });
        }
    }

    Ok(warnings)
}
