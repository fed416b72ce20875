//! Multi-resolution waveform cache.
//!
//! For each channel of a sample buffer this module builds a pyramid of
//! progressively halved layers: layer 0 is the full recording as
//! (time, amplitude) pairs, and every following layer keeps the
//! odd-indexed pair of each pair of the one before it. Rendering picks
//! whichever layer matches the on-screen resolution, so drawing cost
//! stays flat no matter how long the recording is or how far out the
//! view is zoomed. All layers of a channel together stay under twice
//! the size of the base layer (geometric series).

use super::SampleBuffer;
use rayon::prelude::*;

/// Target point count for a rendered view. Layers are halved until they
/// fit under this many samples, and the view resolver picks the coarsest
/// layer that still delivers at least this many points for the visible
/// span.
pub const RESOLUTION_TARGET: usize = 8192;

/// One resolution level of a channel's waveform.
///
/// `x_values[i]` is the timestamp in seconds of `y_values[i]`. Deeper
/// layers inherit the timestamps of the samples they keep, so x values
/// are non-decreasing but not evenly respaced.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformLayer {
    /// Sample timestamps in seconds.
    pub x_values: Vec<f32>,
    /// Amplitudes matching `x_values`.
    pub y_values: Vec<f32>,
    /// Samples per second this layer represents. Halves with each level.
    pub effective_rate: f64,
}

impl WaveformLayer {
    /// Returns the number of points in this layer.
    pub fn len(&self) -> usize {
        self.y_values.len()
    }

    /// Returns true if the layer holds no points.
    pub fn is_empty(&self) -> bool {
        self.y_values.is_empty()
    }
}

/// The full layer stack for a single channel.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformChannel {
    layers: Vec<WaveformLayer>,
}

impl WaveformChannel {
    /// Returns all layers, index 0 = full resolution.
    pub fn layers(&self) -> &[WaveformLayer] {
        &self.layers
    }

    /// Returns one layer by index.
    pub fn layer(&self, index: usize) -> Option<&WaveformLayer> {
        self.layers.get(index)
    }
}

/// Downsampled waveform data for every channel of a buffer.
///
/// Built once per loaded buffer (see `WaveformCache` for the rebuild and
/// swap machinery) and handed to the renderer as a read-only snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformPyramid {
    channels: Vec<WaveformChannel>,
    source_rate: u32,
    frame_count: usize,
}

impl WaveformPyramid {
    /// Builds the pyramid for every channel of a buffer.
    ///
    /// Channels are independent, so they are built in parallel.
    pub fn build(buffer: &SampleBuffer) -> Self {
        let channels = (0..buffer.channel_count())
            .into_par_iter()
            .map(|index| build_channel(buffer.channel(index), buffer.sample_rate()))
            .collect();

        Self {
            channels,
            source_rate: buffer.sample_rate(),
            frame_count: buffer.frame_count(),
        }
    }

    /// Returns the per-channel layer stacks.
    pub fn channels(&self) -> &[WaveformChannel] {
        &self.channels
    }

    /// Returns one channel by index.
    pub fn channel(&self, index: usize) -> Option<&WaveformChannel> {
        self.channels.get(index)
    }

    /// Returns the sample rate of the source buffer in Hz.
    pub fn source_rate(&self) -> u32 {
        self.source_rate
    }

    /// Returns the frame count of the source buffer.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Returns the duration of the source buffer in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.frame_count as f64 / self.source_rate as f64
    }
}

/// Builds the layer stack for one channel.
fn build_channel(samples: &[f32], sample_rate: u32) -> WaveformChannel {
    let base = WaveformLayer {
        x_values: (0..samples.len())
            .map(|i| i as f32 / sample_rate as f32)
            .collect(),
        y_values: samples.to_vec(),
        effective_rate: sample_rate as f64,
    };

    let mut layers = vec![base];
    loop {
        let last = &layers[layers.len() - 1];
        if last.len() <= RESOLUTION_TARGET {
            break;
        }
        let next = decimate(last);
        layers.push(next);
    }

    WaveformChannel { layers }
}

/// Produces the next-coarser layer by keeping the odd-indexed point of
/// each pair. No averaging or peak folding: the kept point carries its
/// original timestamp and amplitude.
fn decimate(layer: &WaveformLayer) -> WaveformLayer {
    let half = layer.len() / 2;
    let mut x_values = Vec::with_capacity(half);
    let mut y_values = Vec::with_capacity(half);

    for i in 0..half {
        x_values.push(layer.x_values[2 * i + 1]);
        y_values.push(layer.y_values[2 * i + 1]);
    }

    WaveformLayer {
        x_values,
        y_values,
        effective_rate: layer.effective_rate / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a buffer with one channel of `n` ramp samples.
    fn ramp_buffer(n: usize, rate: u32) -> SampleBuffer {
        SampleBuffer::new(vec![(0..n).map(|i| i as f32).collect()], rate)
    }

    #[test]
    fn test_single_layer_under_target() {
        let buffer = ramp_buffer(RESOLUTION_TARGET, 44100);
        let pyramid = WaveformPyramid::build(&buffer);
        let channel = pyramid.channel(0).unwrap();

        // At exactly the target size there is nothing to downsample.
        assert_eq!(channel.layers().len(), 1);
        assert_eq!(channel.layer(0).unwrap().len(), RESOLUTION_TARGET);
    }

    #[test]
    fn test_one_downsample_over_target() {
        // One sample over the target forces exactly one halving step.
        let n = RESOLUTION_TARGET + 1;
        let buffer = ramp_buffer(n, 44100);
        let pyramid = WaveformPyramid::build(&buffer);
        let channel = pyramid.channel(0).unwrap();

        assert_eq!(channel.layers().len(), 2);

        let coarse = channel.layer(1).unwrap();
        assert_eq!(coarse.len(), n / 2);
        assert_eq!(coarse.len(), 4096);
        assert!((coarse.effective_rate - 22050.0).abs() < 1e-9);

        // The kept samples are every odd-indexed original, in order.
        for (i, &y) in coarse.y_values.iter().enumerate() {
            assert_eq!(y, (2 * i + 1) as f32);
        }
    }

    #[test]
    fn test_halving_chain() {
        let n = 100_000;
        let buffer = ramp_buffer(n, 48000);
        let pyramid = WaveformPyramid::build(&buffer);
        let layers = pyramid.channel(0).unwrap().layers();

        assert_eq!(layers[0].len(), n);
        for pair in layers.windows(2) {
            assert_eq!(pair[1].len(), pair[0].len() / 2);
            assert!((pair[1].effective_rate - pair[0].effective_rate / 2.0).abs() < 1e-9);
        }
        assert!(layers.last().unwrap().len() <= RESOLUTION_TARGET);
        // The layer above the last was still too large.
        assert!(layers[layers.len() - 2].len() > RESOLUTION_TARGET);
    }

    #[test]
    fn test_base_layer_timestamps() {
        let buffer = ramp_buffer(4, 4);
        let pyramid = WaveformPyramid::build(&buffer);
        let base = pyramid.channel(0).unwrap().layer(0).unwrap();

        assert_eq!(base.x_values, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_decimated_timestamps_inherited() {
        let n = RESOLUTION_TARGET * 2;
        let buffer = ramp_buffer(n, 1000);
        let pyramid = WaveformPyramid::build(&buffer);
        let channel = pyramid.channel(0).unwrap();
        let base = channel.layer(0).unwrap();
        let coarse = channel.layer(1).unwrap();

        // Each kept point carries the timestamp of the original sample,
        // so x values stay aligned with the base layer and monotonic.
        for i in 0..coarse.len() {
            assert_eq!(coarse.x_values[i], base.x_values[2 * i + 1]);
        }
        for pair in coarse.x_values.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn test_stereo_channels_independent() {
        let left: Vec<f32> = (0..20_000).map(|i| i as f32).collect();
        let right: Vec<f32> = (0..20_000).map(|i| -(i as f32)).collect();
        let buffer = SampleBuffer::new(vec![left, right], 44100);
        let pyramid = WaveformPyramid::build(&buffer);

        assert_eq!(pyramid.channels().len(), 2);
        let l1 = pyramid.channel(0).unwrap().layer(1).unwrap();
        let r1 = pyramid.channel(1).unwrap().layer(1).unwrap();
        assert_eq!(l1.y_values[0], 1.0);
        assert_eq!(r1.y_values[0], -1.0);
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = SampleBuffer::new(vec![Vec::new()], 44100);
        let pyramid = WaveformPyramid::build(&buffer);
        let channel = pyramid.channel(0).unwrap();

        assert_eq!(channel.layers().len(), 1);
        assert!(channel.layer(0).unwrap().is_empty());
        assert_eq!(pyramid.frame_count(), 0);
    }
}
