//! # Realtime Pitch Tracker
//!
//! Turns a live audio source into note readings for display. The tracker is
//! driven by the caller's refresh loop: every call to [`PitchTracker::tick`]
//! is one display tick, and only one tick in `throttle` pulls a window from
//! the source and runs the estimator.
//!
//! A tick that finds no pitch keeps the previous reading, so one missed
//! frame does not blank the display.

use log::debug;

use crate::config::AnalysisConfig;
use crate::frame::AudioFrame;
use crate::pitch::{PitchEstimate, PitchEstimator};
use crate::tuning::{self, NoteObservation};

/// Pull-based access to live audio.
pub trait FrameSource {
    /// Sample rate of the samples returned by [`FrameSource::latest_window`].
    fn sample_rate(&self) -> u32;

    /// The most recent `len` samples, or `None` if fewer have arrived.
    fn latest_window(&mut self, len: usize) -> Option<Vec<f32>>;
}

/// How the tracker measures deviation.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingMode {
    /// Deviation from whichever note is nearest.
    Auto,
    /// Deviation from a fixed target note.
    Target {
        midi: i32,
        target_frequency: f32,
    },
}

impl TrackingMode {
    /// Targets the note with the given MIDI number.
    pub fn target(midi: i32) -> Self {
        TrackingMode::Target {
            midi,
            target_frequency: tuning::midi_to_frequency(midi as f32),
        }
    }
}

/// What the display shows after a voiced tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerReading {
    /// Solfège name of the nearest note.
    pub note_name: &'static str,
    /// Rounded MIDI note number.
    pub midi: i32,
    /// Detected frequency in Hz.
    pub frequency_hz: f32,
    /// Deviation from the nearest note, in [-50, 50].
    pub cents: i32,
    /// Deviation from the target note when tracking a target.
    pub target_cents: Option<f32>,
}

impl TrackerReading {
    fn from_observation(note: &NoteObservation, mode: &TrackingMode) -> Self {
        let target_cents = match mode {
            TrackingMode::Auto => None,
            TrackingMode::Target {
                target_frequency, ..
            } => Some(tuning::cents_between(note.frequency, *target_frequency)),
        };
        Self {
            note_name: note.name,
            midi: note.midi,
            frequency_hz: note.frequency,
            cents: note.cents,
            target_cents,
        }
    }

    /// Name with octave, e.g. "La4".
    pub fn note_label(&self) -> String {
        format!("{}{}", self.note_name, tuning::octave_of(self.midi))
    }
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerUpdate {
    /// Throttled; the estimator did not run.
    Skipped,
    /// The estimator ran but the reading was kept (no pitch or no audio yet).
    Unchanged,
    /// A new reading was published.
    Updated,
}

/// Tracker state carried between ticks.
#[derive(Debug)]
pub struct PitchTracker {
    estimator: PitchEstimator,
    mode: TrackingMode,
    tick_count: u64,
    last_reading: Option<TrackerReading>,
}

impl PitchTracker {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            estimator: PitchEstimator::new(config),
            mode: TrackingMode::Auto,
            tick_count: 0,
            last_reading: None,
        }
    }

    pub fn with_mode(config: AnalysisConfig, mode: TrackingMode) -> Self {
        Self {
            mode,
            ..Self::new(config)
        }
    }

    pub fn mode(&self) -> &TrackingMode {
        &self.mode
    }

    /// Switches mode. The current reading is kept but its target deviation
    /// is recomputed for the new mode.
    pub fn set_mode(&mut self, mode: TrackingMode) {
        self.mode = mode;
        let frequency = self.last_reading.as_ref().map(|r| r.frequency_hz);
        if let Some(note) = frequency.and_then(NoteObservation::from_frequency) {
            self.last_reading = Some(TrackerReading::from_observation(&note, &self.mode));
        }
    }

    /// The last published reading.
    pub fn reading(&self) -> Option<&TrackerReading> {
        self.last_reading.as_ref()
    }

    /// Number of ticks seen since creation or the last reset.
    pub fn ticks(&self) -> u64 {
        self.tick_count
    }

    /// Forgets the reading and restarts the throttle count.
    pub fn reset(&mut self) {
        self.tick_count = 0;
        self.last_reading = None;
    }

    /// Advances one display tick.
    ///
    /// Every `throttle`-th tick (the 8th, 16th, ... by default) pulls the
    /// latest window from `source` and estimates its pitch.
    pub fn tick<S: FrameSource + ?Sized>(&mut self, source: &mut S) -> TrackerUpdate {
        self.tick_count += 1;
        let throttle = u64::from(self.estimator.config().throttle.max(1));
        if self.tick_count % throttle != 0 {
            return TrackerUpdate::Skipped;
        }

        let frame_size = self.estimator.config().frame_size;
        let Some(window) = source.latest_window(frame_size) else {
            debug!("[TRACKER] Waiting for {} samples of audio", frame_size);
            return TrackerUpdate::Unchanged;
        };

        let frame = AudioFrame::new(&window, source.sample_rate());
        match self.estimator.estimate(&frame) {
            PitchEstimate::Voiced(frequency) => match NoteObservation::from_frequency(frequency) {
                Some(note) => {
                    debug!("[TRACKER] {}", note);
                    self.last_reading = Some(TrackerReading::from_observation(&note, &self.mode));
                    TrackerUpdate::Updated
                }
                None => TrackerUpdate::Unchanged,
            },
            PitchEstimate::NoPitch => TrackerUpdate::Unchanged,
        }
    }
}
