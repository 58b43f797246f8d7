// vocalizer-core/src/lib.rs

//! The core logic for the vocal trainer.
//! This crate is responsible for pitch estimation, note mapping,
//! realtime pitch tracking and vocal range finding. It is completely
//! headless and contains no terminal or GUI code.

pub mod audio;
pub mod config;
pub mod error;
pub mod fft;
pub mod frame;
pub mod pitch;
pub mod range;
pub mod tracker;
pub mod tuning;
pub mod wav;

pub use config::{AnalysisConfig, DifferenceMethod};
pub use error::{Result, VocalizerError};
pub use frame::{AudioBuffer, AudioFrame};
pub use pitch::{estimate, PitchEstimate, PitchEstimator};
pub use range::{find_range, RangeAccumulator, VocalRange};
pub use tracker::{FrameSource, PitchTracker, TrackerReading, TrackerUpdate, TrackingMode};
pub use tuning::NoteObservation;
