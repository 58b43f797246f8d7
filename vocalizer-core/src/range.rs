//! # Vocal Range Module
//!
//! Reduces a finished recording to the lowest and highest pitch sung in it.
//! Windows of `frame_size` samples slide across the recording with a hop of
//! `frame_size * hop_fraction`; every voiced estimate widens the range and
//! unvoiced windows are ignored.

use std::fmt;

use log::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::frame::AudioBuffer;
use crate::pitch::{PitchEstimate, PitchEstimator};
use crate::tuning::{self, NoteObservation};

/// Lowest and highest voiced frequency of a recording.
///
/// A bound is `None` when no window of the recording was voiced.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VocalRange {
    pub low_hz: Option<f32>,
    pub high_hz: Option<f32>,
}

impl VocalRange {
    /// A range with neither bound determined.
    pub fn undetermined() -> Self {
        Self::default()
    }

    pub fn is_determined(&self) -> bool {
        self.low_hz.is_some() && self.high_hz.is_some()
    }

    /// Width of the range in equal-tempered semitones.
    pub fn span_semitones(&self) -> Option<f32> {
        match (self.low_hz, self.high_hz) {
            (Some(low), Some(high)) => {
                Some(tuning::frequency_to_midi(high) - tuning::frequency_to_midi(low))
            }
            _ => None,
        }
    }

    /// Nearest notes to the low and high bounds.
    pub fn notes(&self) -> Option<(NoteObservation, NoteObservation)> {
        let low = NoteObservation::from_frequency(self.low_hz?)?;
        let high = NoteObservation::from_frequency(self.high_hz?)?;
        Some((low, high))
    }
}

impl fmt::Display for VocalRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.notes() {
            Some((low, high)) => write!(
                f,
                "Low: {:.1} Hz ({}) / High: {:.1} Hz ({})",
                low.frequency,
                low.note_label(),
                high.frequency,
                high.note_label()
            ),
            None => write!(f, "no range detected"),
        }
    }
}

/// Running min/max fold over a stream of estimates.
#[derive(Debug, Clone, Default)]
pub struct RangeAccumulator {
    low: Option<f32>,
    high: Option<f32>,
    voiced: usize,
    total: usize,
}

impl RangeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one estimate into the range. `NoPitch` only bumps the count.
    pub fn push(&mut self, estimate: PitchEstimate) {
        self.total += 1;
        if let PitchEstimate::Voiced(frequency) = estimate {
            self.voiced += 1;
            self.low = Some(self.low.map_or(frequency, |low| low.min(frequency)));
            self.high = Some(self.high.map_or(frequency, |high| high.max(frequency)));
        }
    }

    /// Number of voiced estimates seen.
    pub fn voiced_count(&self) -> usize {
        self.voiced
    }

    /// Number of estimates seen.
    pub fn total_count(&self) -> usize {
        self.total
    }

    pub fn finish(self) -> VocalRange {
        VocalRange {
            low_hz: self.low,
            high_hz: self.high,
        }
    }
}

impl Extend<PitchEstimate> for RangeAccumulator {
    fn extend<I: IntoIterator<Item = PitchEstimate>>(&mut self, iter: I) {
        for estimate in iter {
            self.push(estimate);
        }
    }
}

/// Finds the vocal range of a complete recording.
///
/// # Arguments
/// * `recording` - Decoded mono recording
/// * `config` - Frame size, hop fraction and estimator settings
///
/// # Returns
/// * `VocalRange` - Both bounds set, or both `None` if nothing was voiced
pub fn find_range(recording: &AudioBuffer, config: &AnalysisConfig) -> VocalRange {
    if recording.sample_rate == 0 {
        warn!("[RANGE] Recording has no sample rate; skipping analysis");
        return VocalRange::undetermined();
    }

    let frame_size = config.frame_size;
    let hop = config.hop_size();
    let mut estimator = PitchEstimator::new(config.clone());
    let mut accumulator = RangeAccumulator::new();

    accumulator.extend(
        recording
            .windows(frame_size, hop)
            .map(|(_, frame)| estimator.estimate(&frame)),
    );

    debug!(
        "[RANGE] {} of {} windows voiced ({:.2} s recording)",
        accumulator.voiced_count(),
        accumulator.total_count(),
        recording.duration_secs()
    );

    let range = accumulator.finish();
    info!("[RANGE] {}", range);
    range
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn accumulator_ignores_no_pitch() {
        let mut acc = RangeAccumulator::new();
        acc.extend([
            PitchEstimate::NoPitch,
            PitchEstimate::Voiced(300.0),
            PitchEstimate::NoPitch,
            PitchEstimate::Voiced(150.0),
            PitchEstimate::Voiced(600.0),
        ]);
        assert_eq!(acc.voiced_count(), 3);
        assert_eq!(acc.total_count(), 5);
        let range = acc.finish();
        assert_eq!(range.low_hz, Some(150.0));
        assert_eq!(range.high_hz, Some(600.0));
        assert_abs_diff_eq!(range.span_semitones().unwrap(), 24.0, epsilon = 1e-3);
    }

    #[test]
    fn empty_accumulator_is_undetermined() {
        let range = RangeAccumulator::new().finish();
        assert_eq!(range, VocalRange::undetermined());
        assert!(!range.is_determined());
        assert_eq!(range.span_semitones(), None);
        assert_eq!(range.to_string(), "no range detected");
    }

    #[test]
    fn display_names_notes() {
        let range = VocalRange {
            low_hz: Some(220.0),
            high_hz: Some(440.0),
        };
        assert_eq!(range.to_string(), "Low: 220.0 Hz (La3) / High: 440.0 Hz (La4)");
    }

    #[test]
    fn zero_sample_rate_aborts() {
        let buffer = AudioBuffer::new(vec![0.5; 8192], 0);
        assert_eq!(find_range(&buffer, &AnalysisConfig::default()), VocalRange::undetermined());
    }

    #[test]
    fn recording_of_exactly_one_frame_is_undetermined() {
        let samples: Vec<f32> = (0..2048)
            .map(|i| 0.6 * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44100.0).sin())
            .collect();
        let buffer = AudioBuffer::new(samples, 44100);
        assert_eq!(find_range(&buffer, &AnalysisConfig::default()), VocalRange::undetermined());
    }

    #[test]
    fn recording_shorter_than_a_frame() {
        let buffer = AudioBuffer::new(vec![0.2; 1000], 44100);
        assert!(!find_range(&buffer, &AnalysisConfig::default()).is_determined());
    }
}
