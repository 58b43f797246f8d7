//! Error types for the vocalizer core.
//!
//! A missing pitch is never an error: the estimator reports it as
//! [`PitchEstimate::NoPitch`](crate::pitch::PitchEstimate::NoPitch). These
//! variants cover configuration, file and audio-device failures only.

use thiserror::Error;

/// Errors raised by configuration, decoding and capture.
#[derive(Debug, Error)]
pub enum VocalizerError {
    /// A configuration value is outside its accepted range.
    #[error("Invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Underlying file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A config file could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A WAV file could not be decoded.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// The host has no default input device.
    #[error("No input device available")]
    NoInputDevice,

    /// The device offers no usable sample format.
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Building, starting or querying the capture stream failed.
    #[error("Audio stream error: {0}")]
    Stream(String),
}

/// Result type for vocalizer operations
pub type Result<T> = std::result::Result<T, VocalizerError>;

impl VocalizerError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
