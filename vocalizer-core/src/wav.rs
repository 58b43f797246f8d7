//! WAV decoding for recorded takes.

use std::path::Path;

use log::info;

use crate::error::Result;
use crate::frame::AudioBuffer;

/// Reads a WAV file into a mono buffer.
///
/// Integer samples are scaled to [-1, 1]; multi-channel files are averaged
/// down to one channel.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let buffer = AudioBuffer::from_interleaved(&samples, spec.channels as usize, spec.sample_rate);
    info!(
        "[WAV] Loaded {}: {} Hz, {} channel(s), {:.2} s",
        path.display(),
        spec.sample_rate,
        spec.channels,
        buffer.duration_secs()
    );
    Ok(buffer)
}
