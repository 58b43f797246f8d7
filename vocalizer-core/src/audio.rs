//! # Audio Capture Module
//!
//! Live microphone input through CPAL (Cross-Platform Audio Library).
//! Capture runs on CPAL's callback thread and hands mono chunks over a
//! channel; consumers pull from that channel on their own schedule.
//!
//! ## Features
//! - Default input device with the F32 config closest to 44.1 kHz
//! - Multi-channel input averaged down to mono
//! - [`LiveInput`]: a rolling window for the realtime tracker
//! - [`record`]: a bounded-duration take for the range finder

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SupportedStreamConfigRange;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};

use crate::error::{Result, VocalizerError};
use crate::frame::{downmix, AudioBuffer};
use crate::tracker::FrameSource;

/// Preferred capture rate in Hz.
pub const TARGET_SAMPLE_RATE: u32 = 44100;

/// How long [`record`] waits for a chunk before giving up.
const CHUNK_TIMEOUT: Duration = Duration::from_secs(2);

/// A running capture stream. Audio stops when this is dropped.
pub struct CaptureStream {
    stream: cpal::Stream,
    sample_rate: u32,
    device_name: String,
}

impl CaptureStream {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Pauses the stream before it is dropped.
    pub fn stop(self) {
        if let Err(e) = self.stream.pause() {
            warn!("[AUDIO] Error pausing stream: {}", e);
        }
    }
}

/// Starts audio capture from the default input device.
///
/// Every callback's samples are downmixed to mono and sent as one chunk.
/// Chunks are dropped rather than blocking the audio thread if the
/// receiver has gone away.
///
/// # Arguments
/// * `sender` - Channel sender for mono sample chunks
///
/// # Returns
/// * `Ok(stream)` - Running stream handle with its sample rate
/// * `Err(e)` - No device, no usable config, or the stream failed to start
pub fn start_audio_capture(sender: Sender<Vec<f32>>) -> Result<CaptureStream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(VocalizerError::NoInputDevice)?;
    let device_name = device
        .name()
        .unwrap_or_else(|_| "unknown device".to_string());
    info!("[AUDIO] Using audio input device: {}", device_name);

    let configs = device
        .supported_input_configs()
        .map_err(|e| VocalizerError::Stream(e.to_string()))?
        .collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| VocalizerError::UnsupportedFormat("no f32 input format found".into()))?;

    let rate = TARGET_SAMPLE_RATE.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let config = supported_config.with_sample_rate(cpal::SampleRate(rate));
    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    let config: cpal::StreamConfig = config.into();
    info!(
        "[AUDIO] Selected sample rate: {} Hz, {} channel(s)",
        sample_rate, channels
    );

    let err_fn = |err| error!("[AUDIO] An error occurred on the audio stream: {}", err);

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let _ = sender.send(downmix(data, channels));
            },
            err_fn,
            None,
        )
        .map_err(|e| VocalizerError::Stream(e.to_string()))?;

    stream
        .play()
        .map_err(|e| VocalizerError::Stream(e.to_string()))?;

    Ok(CaptureStream {
        stream,
        sample_rate,
        device_name,
    })
}

/// Picks the F32 config whose rate range lies closest to `target_rate`.
///
/// Mono configs win ties over multi-channel ones.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min = c.min_sample_rate().0;
            let max = c.max_sample_rate().0;
            let distance = if (min..=max).contains(&target_rate) {
                0
            } else {
                (min as i64 - target_rate as i64)
                    .abs()
                    .min((max as i64 - target_rate as i64).abs())
            };
            (distance, c.channels())
        })
}

/// The most recent samples of a live stream, up to a fixed capacity.
#[derive(Debug, Clone)]
pub struct SampleHistory {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a chunk, discarding the oldest samples beyond capacity.
    pub fn push(&mut self, chunk: &[f32]) {
        self.samples.extend(chunk.iter().copied());
        let excess = self.samples.len().saturating_sub(self.capacity);
        self.samples.drain(..excess);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// A copy of the newest `len` samples, oldest first.
    pub fn latest(&self, len: usize) -> Option<Vec<f32>> {
        if len > self.samples.len() {
            return None;
        }
        let start = self.samples.len() - len;
        Some(self.samples.range(start..).copied().collect())
    }
}

/// Live microphone input exposed as a pull-based [`FrameSource`].
pub struct LiveInput {
    capture: CaptureStream,
    receiver: Receiver<Vec<f32>>,
    history: SampleHistory,
}

impl LiveInput {
    /// Opens the default input and keeps `2 * frame_size` samples of history.
    pub fn open(frame_size: usize) -> Result<Self> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let capture = start_audio_capture(sender)?;
        Ok(Self {
            capture,
            receiver,
            history: SampleHistory::new(frame_size * 2),
        })
    }

    pub fn device_name(&self) -> &str {
        self.capture.device_name()
    }

    /// Stops capture.
    pub fn close(self) {
        self.capture.stop();
    }
}

impl FrameSource for LiveInput {
    fn sample_rate(&self) -> u32 {
        self.capture.sample_rate()
    }

    fn latest_window(&mut self, len: usize) -> Option<Vec<f32>> {
        for chunk in self.receiver.try_iter() {
            self.history.push(&chunk);
        }
        self.history.latest(len)
    }
}

/// Records `duration` of audio from the default input device.
///
/// Capture is stopped before this returns, so the buffer is complete
/// before any analysis starts.
pub fn record(duration: Duration) -> Result<AudioBuffer> {
    let (sender, receiver) = crossbeam_channel::unbounded();
    let capture = start_audio_capture(sender)?;
    let sample_rate = capture.sample_rate();
    let result = collect_samples(&receiver, sample_rate, duration);
    capture.stop();
    result
}

/// Drains chunks until `duration` worth of samples has arrived.
fn collect_samples(
    receiver: &Receiver<Vec<f32>>,
    sample_rate: u32,
    duration: Duration,
) -> Result<AudioBuffer> {
    let wanted = (duration.as_secs_f64() * sample_rate as f64).round() as usize;
    let mut samples = Vec::with_capacity(wanted);
    let started = Instant::now();

    while samples.len() < wanted {
        match receiver.recv_timeout(CHUNK_TIMEOUT) {
            Ok(chunk) => samples.extend_from_slice(&chunk),
            Err(RecvTimeoutError::Timeout) => {
                return Err(VocalizerError::Stream(format!(
                    "no audio received for {:?}",
                    CHUNK_TIMEOUT
                )));
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(VocalizerError::Stream("audio channel closed".into()));
            }
        }
    }
    samples.truncate(wanted);

    debug!(
        "[AUDIO] Recorded {} samples in {:.2?}",
        samples.len(),
        started.elapsed()
    );
    Ok(AudioBuffer::new(samples, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keeps_newest_samples() {
        let mut history = SampleHistory::new(4);
        history.push(&[1.0, 2.0, 3.0]);
        assert_eq!(history.latest(4), None);
        history.push(&[4.0, 5.0, 6.0]);
        assert_eq!(history.len(), 4);
        assert_eq!(history.latest(4), Some(vec![3.0, 4.0, 5.0, 6.0]));
        assert_eq!(history.latest(2), Some(vec![5.0, 6.0]));
    }

    #[test]
    fn collects_exact_duration() {
        let (sender, receiver) = crossbeam_channel::unbounded();
        for _ in 0..5 {
            sender.send(vec![0.25; 300]).unwrap();
        }
        let buffer = collect_samples(&receiver, 1000, Duration::from_secs(1)).unwrap();
        assert_eq!(buffer.len(), 1000);
        assert_eq!(buffer.sample_rate, 1000);
    }

    #[test]
    fn closed_channel_is_an_error() {
        let (sender, receiver) = crossbeam_channel::unbounded();
        sender.send(vec![0.0; 10]).unwrap();
        drop(sender);
        let result = collect_samples(&receiver, 1000, Duration::from_secs(1));
        assert!(matches!(result, Err(VocalizerError::Stream(_))));
    }
}
