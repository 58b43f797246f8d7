//! # Pitch Detection Module
//!
//! Estimates the fundamental frequency of a single monophonic audio frame
//! with the YIN algorithm.
//!
//! ## Steps
//! - Difference function over a half-length window (direct or FFT-backed)
//! - Cumulative mean normalized difference (CMND)
//! - Absolute threshold search, descending to the bottom of the first dip
//! - Parabolic interpolation for sub-sample accuracy
//! - Rejection of frequencies outside the plausible voice band
//!
//! The estimator is total: silence, noise, malformed frames and
//! out-of-band results all come back as [`PitchEstimate::NoPitch`].

use log::{debug, warn};

use crate::config::{AnalysisConfig, DifferenceMethod};
use crate::fft::DifferencePlan;
use crate::frame::AudioFrame;

/// Frames shorter than this never produce a pitch.
pub const MIN_FRAME_LEN: usize = 4;

/// First lag examined by the threshold search.
const FIRST_LAG: usize = 2;

/// Outcome of analysing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PitchEstimate {
    /// No periodic pitch inside the voice band.
    NoPitch,
    /// A fundamental frequency in Hz.
    Voiced(f32),
}

impl PitchEstimate {
    /// The detected frequency, if any.
    pub fn frequency(&self) -> Option<f32> {
        match *self {
            PitchEstimate::Voiced(frequency) => Some(frequency),
            PitchEstimate::NoPitch => None,
        }
    }

    pub fn is_voiced(&self) -> bool {
        matches!(self, PitchEstimate::Voiced(_))
    }
}

/// Estimates the pitch of a single frame.
///
/// Convenience wrapper that allocates fresh scratch space. Callers that
/// analyse many frames should keep a [`PitchEstimator`] instead.
///
/// # Arguments
/// * `frame` - Mono samples and their sample rate
/// * `config` - Threshold, voice band and difference method
///
/// # Returns
/// * `PitchEstimate::Voiced(frequency)` - A periodic pitch inside the band
/// * `PitchEstimate::NoPitch` - Silence, noise, malformed input or out-of-band pitch
pub fn estimate(frame: &AudioFrame<'_>, config: &AnalysisConfig) -> PitchEstimate {
    PitchEstimator::new(config.clone()).estimate(frame)
}

/// A YIN estimator that keeps its working buffers between calls.
///
/// The buffers are overwritten on every call, so results depend only on
/// the frame passed in.
#[derive(Debug)]
pub struct PitchEstimator {
    config: AnalysisConfig,
    yin_buffer: Vec<f32>,
    fft_plan: Option<DifferencePlan>,
}

impl PitchEstimator {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            yin_buffer: Vec::new(),
            fft_plan: None,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Estimates the fundamental frequency of `frame`.
    pub fn estimate(&mut self, frame: &AudioFrame<'_>) -> PitchEstimate {
        if frame.sample_rate == 0 {
            warn!("[PITCH] Rejecting frame with zero sample rate");
            return PitchEstimate::NoPitch;
        }
        if frame.len() < MIN_FRAME_LEN {
            debug!("[PITCH] Frame of {} samples is too short", frame.len());
            return PitchEstimate::NoPitch;
        }
        if frame.samples.iter().any(|s| !s.is_finite()) {
            warn!("[PITCH] Rejecting frame with non-finite samples");
            return PitchEstimate::NoPitch;
        }

        let half = frame.len() / 2;
        self.yin_buffer.clear();
        self.yin_buffer.resize(half, 0.0);

        // --- Step 1: Difference function ---
        match self.config.difference {
            DifferenceMethod::Direct => difference_direct(frame.samples, &mut self.yin_buffer),
            DifferenceMethod::Fft => {
                let plan = match self.fft_plan.take() {
                    Some(plan) if plan.window() == half => plan,
                    _ => DifferencePlan::new(half),
                };
                let plan = self.fft_plan.insert(plan);
                plan.difference(frame.samples, &mut self.yin_buffer);
            }
        }

        // --- Step 2: Cumulative mean normalized difference ---
        cumulative_mean_normalize(&mut self.yin_buffer);

        // --- Step 3: Absolute threshold ---
        let Some(tau) = absolute_threshold(&self.yin_buffer, self.config.yin_threshold) else {
            return PitchEstimate::NoPitch;
        };

        // --- Step 4: Parabolic interpolation ---
        let better_tau = parabolic_interpolation(&self.yin_buffer, tau);
        if better_tau <= 0.0 {
            return PitchEstimate::NoPitch;
        }

        // --- Step 5: Frequency conversion and band check ---
        let frequency = frame.sample_rate as f32 / better_tau;
        if !frequency.is_finite() || !self.config.in_band(frequency) {
            debug!(
                "[PITCH] Discarding {:.1} Hz outside [{}, {}] Hz",
                frequency, self.config.min_frequency, self.config.max_frequency
            );
            return PitchEstimate::NoPitch;
        }

        PitchEstimate::Voiced(frequency)
    }
}

/// Direct sum of squared differences for every lag in `[0, out.len())`.
fn difference_direct(signal: &[f32], out: &mut [f32]) {
    let window = out.len();
    for (tau, value) in out.iter_mut().enumerate() {
        let mut diff = 0.0;
        for i in 0..window {
            let delta = signal[i] - signal[i + tau];
            diff += delta * delta;
        }
        *value = diff;
    }
}

/// Rewrites a difference function in place as its CMND.
///
/// A lag whose running sum is still zero (a flat signal) maps to 1 so it
/// can never pass the threshold.
fn cumulative_mean_normalize(buffer: &mut [f32]) {
    if buffer.is_empty() {
        return;
    }
    buffer[0] = 1.0;
    let mut running_sum = 0.0;
    for tau in 1..buffer.len() {
        running_sum += buffer[tau];
        if running_sum > 0.0 {
            buffer[tau] *= tau as f32 / running_sum;
        } else {
            buffer[tau] = 1.0;
        }
    }
}

/// Finds the bottom of the first dip below `threshold`, scanning from lag 2.
fn absolute_threshold(cmnd: &[f32], threshold: f32) -> Option<usize> {
    let mut tau = FIRST_LAG;
    while tau < cmnd.len() {
        if cmnd[tau] < threshold {
            while tau + 1 < cmnd.len() && cmnd[tau + 1] < cmnd[tau] {
                tau += 1;
            }
            return Some(tau);
        }
        tau += 1;
    }
    None
}

/// Refines an integer lag with the vertex of the parabola through its neighbours.
///
/// Lags on the buffer edges, and flat neighbourhoods, keep the integer value.
fn parabolic_interpolation(cmnd: &[f32], tau: usize) -> f32 {
    if tau == 0 || tau + 1 >= cmnd.len() {
        return tau as f32;
    }

    let s0 = cmnd[tau - 1];
    let s1 = cmnd[tau];
    let s2 = cmnd[tau + 1];

    let denominator = 2.0 * (2.0 * s1 - s2 - s0);
    let shift = (s2 - s0) / denominator;
    if denominator == 0.0 || !shift.is_finite() {
        return tau as f32;
    }
    tau as f32 + shift
}
