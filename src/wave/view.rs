//! Viewport resolution selection.
//!
//! Maps a visible time window onto the waveform pyramid: picks the
//! coarsest layer that still delivers the target point density for the
//! span, then converts the window into an index range within that
//! layer. The result is a slice of at most a couple of target-constants
//! worth of points, whatever the zoom level.

use super::pyramid::{WaveformChannel, WaveformLayer, RESOLUTION_TARGET};

/// A renderable slice of one pyramid layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSelection {
    /// Index into the channel's layer stack (0 = full resolution).
    pub layer_index: usize,
    /// First point of the visible range within that layer.
    pub start: usize,
    /// Number of visible points.
    pub len: usize,
}

/// Picks the layer to render a span of source frames from.
///
/// Walks from the coarsest layer toward layer 0 and stops at the first
/// layer whose point count for the span meets the resolution target.
/// Layer 0 is the floor: a deeply zoomed-in view renders raw samples
/// even when fewer than the target are visible.
pub fn select_layer(channel: &WaveformChannel, span_frames: usize, full_rate: u32) -> usize {
    let layers = channel.layers();
    if layers.is_empty() {
        return 0;
    }

    let mut index = layers.len() - 1;
    while index > 0 && rendered_points(&layers[index], span_frames, full_rate) < RESOLUTION_TARGET {
        index -= 1;
    }
    index
}

/// Resolves a window of source frames to a slice of the best layer.
///
/// # Arguments
///
/// * `channel` - The channel's layer stack
/// * `start_frame` - Window start in source frames
/// * `span_frames` - Window length in source frames
/// * `full_rate` - Sample rate of the source buffer in Hz
pub fn resolve(
    channel: &WaveformChannel,
    start_frame: usize,
    span_frames: usize,
    full_rate: u32,
) -> LayerSelection {
    let layer_index = select_layer(channel, span_frames, full_rate);
    let layer = match channel.layer(layer_index) {
        Some(layer) => layer,
        None => {
            return LayerSelection {
                layer_index: 0,
                start: 0,
                len: 0,
            }
        }
    };

    // Scale the window into this layer's index space and clamp to its
    // actual extent.
    let ratio = layer.effective_rate / full_rate as f64;
    let start = ((start_frame as f64 * ratio) as usize).min(layer.len());
    let end = (((start_frame + span_frames) as f64 * ratio) as usize).min(layer.len());

    LayerSelection {
        layer_index,
        start,
        len: end - start,
    }
}

/// Clamps a time window to a recording and converts it to frames.
///
/// Returns `(start_frame, span_frames)`. Windows extending past either
/// end of the recording are clipped; a reversed window collapses to an
/// empty span.
pub fn window_frames(
    frame_count: usize,
    sample_rate: u32,
    start_seconds: f64,
    end_seconds: f64,
) -> (usize, usize) {
    let rate = sample_rate as f64;
    let start = (start_seconds * rate).clamp(0.0, frame_count as f64) as usize;
    let end = (end_seconds * rate).clamp(0.0, frame_count as f64) as usize;
    (start, end.saturating_sub(start))
}

/// Points a layer would contribute for a span of source frames.
fn rendered_points(layer: &WaveformLayer, span_frames: usize, full_rate: u32) -> usize {
    (span_frames as f64 * layer.effective_rate / full_rate as f64) as usize
}
