//! Audio containers handed from capture to analysis.

/// A borrowed window of mono samples, normalized to [-1, 1].
#[derive(Debug, Clone, Copy)]
pub struct AudioFrame<'a> {
    /// Samples in capture order.
    pub samples: &'a [f32],
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl<'a> AudioFrame<'a> {
    pub fn new(samples: &'a [f32], sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A complete decoded mono recording.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Builds a mono buffer by averaging each interleaved sample group.
    ///
    /// A trailing partial group is dropped.
    pub fn from_interleaved(interleaved: &[f32], channels: usize, sample_rate: u32) -> Self {
        let samples = downmix(interleaved, channels);
        Self::new(samples, sample_rate)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the recording in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// The `len` samples starting at `start`, if they all exist.
    pub fn frame(&self, start: usize, len: usize) -> Option<AudioFrame<'_>> {
        let end = start.checked_add(len)?;
        self.samples
            .get(start..end)
            .map(|samples| AudioFrame::new(samples, self.sample_rate))
    }

    /// Windows of `frame_size` samples, stepping by `hop`.
    ///
    /// Yields `(start_index, frame)` pairs for every window that ends
    /// strictly before the last sample, so a window ending exactly at the
    /// buffer end is not analysed. Nothing is yielded for buffers of at
    /// most one window.
    pub fn windows(&self, frame_size: usize, hop: usize) -> Windows<'_> {
        Windows {
            buffer: self,
            frame_size,
            hop: hop.max(1),
            position: 0,
        }
    }
}

/// Iterator returned by [`AudioBuffer::windows`].
#[derive(Debug)]
pub struct Windows<'a> {
    buffer: &'a AudioBuffer,
    frame_size: usize,
    hop: usize,
    position: usize,
}

impl<'a> Iterator for Windows<'a> {
    type Item = (usize, AudioFrame<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.frame_size == 0 {
            return None;
        }
        let start = self.position;
        let end = start.checked_add(self.frame_size)?;
        if end >= self.buffer.len() {
            return None;
        }
        let frame = self.buffer.frame(start, self.frame_size)?;
        self.position = start + self.hop;
        Some((start, frame))
    }
}

/// Averages interleaved channels down to a single channel.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|group| group.iter().sum::<f32>() / channels as f32)
        .collect()
}
