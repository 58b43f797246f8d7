//! # Analysis Configuration Module
//!
//! Tuning constants shared by the estimator, the realtime tracker and the
//! range finder. The defaults suit adult voices; a narrower or higher band
//! can be loaded from a JSON file for other singers (e.g. children).
//!
//! Values are read once per call and never mutated mid-analysis.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VocalizerError};

/// Default YIN absolute threshold.
pub const DEFAULT_YIN_THRESHOLD: f32 = 0.10;
/// Default analysis frame size in samples.
pub const DEFAULT_FRAME_SIZE: usize = 2048;
/// Lowest frequency reported as voiced by default, in Hz.
pub const DEFAULT_MIN_FREQUENCY: f32 = 50.0;
/// Highest frequency reported as voiced by default, in Hz.
pub const DEFAULT_MAX_FREQUENCY: f32 = 2000.0;
/// Range finder hop as a fraction of the frame size.
pub const DEFAULT_HOP_FRACTION: f32 = 0.5;
/// The tracker estimates on one of every `DEFAULT_THROTTLE` ticks.
pub const DEFAULT_THROTTLE: u32 = 8;

/// How the YIN difference function is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceMethod {
    /// Direct O(W²) sum of squared differences.
    #[default]
    Direct,
    /// Autocorrelation through an FFT; same values within float tolerance.
    Fft,
}

/// Configuration for pitch analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// CMND value a lag must fall below to count as periodic.
    pub yin_threshold: f32,
    /// Samples per analysis frame.
    pub frame_size: usize,
    /// Lower bound of the plausible voice band (Hz).
    pub min_frequency: f32,
    /// Upper bound of the plausible voice band (Hz).
    pub max_frequency: f32,
    /// Range finder hop as a fraction of `frame_size`.
    pub hop_fraction: f32,
    /// Run the estimator once every `throttle` tracker ticks.
    pub throttle: u32,
    /// Difference function implementation.
    pub difference: DifferenceMethod,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            yin_threshold: DEFAULT_YIN_THRESHOLD,
            frame_size: DEFAULT_FRAME_SIZE,
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            hop_fraction: DEFAULT_HOP_FRACTION,
            throttle: DEFAULT_THROTTLE,
            difference: DifferenceMethod::Direct,
        }
    }
}

impl AnalysisConfig {
    /// Checks every field against its accepted range.
    pub fn validate(&self) -> Result<()> {
        if !(self.yin_threshold > 0.0 && self.yin_threshold < 1.0) {
            return Err(VocalizerError::invalid(
                "yin_threshold",
                format!("{} is not in (0, 1)", self.yin_threshold),
            ));
        }
        if self.frame_size < 4 {
            return Err(VocalizerError::invalid(
                "frame_size",
                format!("{} is smaller than 4 samples", self.frame_size),
            ));
        }
        if !self.min_frequency.is_finite() || self.min_frequency <= 0.0 {
            return Err(VocalizerError::invalid(
                "min_frequency",
                format!("{} must be a positive frequency", self.min_frequency),
            ));
        }
        if !self.max_frequency.is_finite() || self.max_frequency <= self.min_frequency {
            return Err(VocalizerError::invalid(
                "max_frequency",
                format!(
                    "{} must be above min_frequency ({})",
                    self.max_frequency, self.min_frequency
                ),
            ));
        }
        if !(self.hop_fraction > 0.0 && self.hop_fraction <= 1.0) {
            return Err(VocalizerError::invalid(
                "hop_fraction",
                format!("{} is not in (0, 1]", self.hop_fraction),
            ));
        }
        if self.throttle == 0 {
            return Err(VocalizerError::invalid("throttle", "must be at least 1"));
        }
        Ok(())
    }

    /// Range finder step between consecutive windows, in samples.
    pub fn hop_size(&self) -> usize {
        ((self.frame_size as f32 * self.hop_fraction) as usize).max(1)
    }

    /// Whether `frequency` lies inside the plausible voice band.
    pub fn in_band(&self, frequency: f32) -> bool {
        frequency >= self.min_frequency && frequency <= self.max_frequency
    }

    /// Loads and validates a configuration from a JSON file.
    ///
    /// Fields missing from the file keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut data = String::new();
        file.read_to_string(&mut data)?;
        let config: AnalysisConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json_string.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hop_size(), 1024);
        assert_eq!(config.throttle, 8);
    }

    #[test]
    fn rejects_inverted_band() {
        let config = AnalysisConfig {
            min_frequency: 800.0,
            max_frequency: 400.0,
            ..Default::default()
        };
        match config.validate() {
            Err(VocalizerError::InvalidConfig { field, .. }) => assert_eq!(field, "max_frequency"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_zero_throttle_and_tiny_frames() {
        let zero_throttle = AnalysisConfig {
            throttle: 0,
            ..Default::default()
        };
        assert!(zero_throttle.validate().is_err());

        let tiny = AnalysisConfig {
            frame_size: 3,
            ..Default::default()
        };
        assert!(tiny.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "min_frequency": 180.0, "difference": "fft" }"#).unwrap();
        assert_eq!(config.min_frequency, 180.0);
        assert_eq!(config.max_frequency, DEFAULT_MAX_FREQUENCY);
        assert_eq!(config.difference, DifferenceMethod::Fft);
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join("vocalizer_config_test.json");
        let config = AnalysisConfig {
            yin_threshold: 0.15,
            ..Default::default()
        };
        config.save(&path).unwrap();
        let loaded = AnalysisConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }
}
