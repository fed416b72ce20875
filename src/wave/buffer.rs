//! Decoded audio sample storage.
//!
//! A sample buffer holds the raw amplitudes of a recording, one Vec per
//! channel, at a fixed sample rate. Buffers are immutable once built and
//! are shared behind an `Arc` by the playback engine and the waveform
//! cache builder, so no synchronization is needed to read them.

/// Immutable multi-channel float sample store.
///
/// Channels are stored planar (non-interleaved) and are always the same
/// length; the constructor trims uneven input to the shortest channel so
/// every frame has a sample in every channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    /// Per-channel sample data, all channels equal length.
    channels: Vec<Vec<f32>>,
    /// Sample rate in Hz.
    sample_rate: u32,
}

impl SampleBuffer {
    /// Creates a buffer from planar channel data.
    ///
    /// # Arguments
    ///
    /// * `channels` - One Vec of samples per channel
    /// * `sample_rate` - Sample rate in Hz (clamped to at least 1)
    ///
    /// # Returns
    ///
    /// A buffer whose channels have been trimmed to a common length
    pub fn new(mut channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        // Trim to the shortest channel so the equal-length invariant
        // holds no matter what the decoder produced.
        let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
        for channel in &mut channels {
            channel.truncate(frames);
        }

        Self {
            channels,
            sample_rate: sample_rate.max(1),
        }
    }

    /// Returns the number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the number of frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Returns the samples of one channel.
    ///
    /// # Panics
    ///
    /// Panics if `index >= channel_count()`.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Returns the total duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_basic() {
        let buffer = SampleBuffer::new(vec![vec![0.1, 0.2, 0.3], vec![-0.1, -0.2, -0.3]], 44100);
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frame_count(), 3);
        assert_eq!(buffer.sample_rate(), 44100);
        assert_eq!(buffer.channel(0), &[0.1, 0.2, 0.3]);
        assert_eq!(buffer.channel(1), &[-0.1, -0.2, -0.3]);
    }

    #[test]
    fn test_buffer_trims_uneven_channels() {
        // Second channel is one sample short (e.g. a truncated file);
        // all channels end up at the shorter length.
        let buffer = SampleBuffer::new(vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5]], 8000);
        assert_eq!(buffer.frame_count(), 2);
        assert_eq!(buffer.channel(0), &[0.1, 0.2]);
        assert_eq!(buffer.channel(1), &[0.4, 0.5]);
    }

    #[test]
    fn test_buffer_empty() {
        let buffer = SampleBuffer::new(Vec::new(), 44100);
        assert_eq!(buffer.channel_count(), 0);
        assert_eq!(buffer.frame_count(), 0);
        assert_eq!(buffer.duration_seconds(), 0.0);
    }

    #[test]
    fn test_buffer_duration() {
        let buffer = SampleBuffer::new(vec![vec![0.0; 22050]], 44100);
        assert!((buffer.duration_seconds() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_buffer_zero_rate_clamped() {
        let buffer = SampleBuffer::new(vec![vec![0.0; 4]], 0);
        assert_eq!(buffer.sample_rate(), 1);
    }
}
