//! Waveform data structures for audio display and playback.
//!
//! This module provides the sample buffer shared between the playback
//! engine and the renderer, the multi-resolution waveform pyramid built
//! from it, and the cache that rebuilds the pyramid off the UI thread.

mod buffer;
mod cache;
mod pyramid;
mod view;
mod wave_import;

pub use buffer::SampleBuffer;
pub use cache::WaveformCache;
pub use pyramid::{WaveformChannel, WaveformLayer, WaveformPyramid, RESOLUTION_TARGET};
pub use view::{resolve, select_layer, window_frames, LayerSelection};
pub use wave_import::import_wav;
// WaveImportError is available for external error handling if needed
#[allow(unused_imports)]
pub use wave_import::WaveImportError;

/// Formats a time position as minutes, seconds, and milliseconds.
///
/// # Arguments
///
/// * `seconds` - Time position in seconds (negative values clamp to zero)
///
/// # Returns
///
/// String representation like "0:03.250" or "12:07.000"
pub fn format_time(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let minutes = total_ms / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{}:{:02}.{:03}", minutes, secs, millis)
}

/// Candidate intervals for time ruler labels, in seconds.
const RULER_STEPS: [f64; 16] = [
    0.001, 0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 300.0,
];

/// Picks a time ruler label interval for the current zoom.
///
/// Returns the smallest candidate step wide enough that adjacent labels
/// sit at least `min_label_columns` apart on screen.
///
/// # Arguments
///
/// * `seconds_per_column` - Seconds covered by one terminal column
/// * `min_label_columns` - Minimum columns between labels
pub fn ruler_step(seconds_per_column: f64, min_label_columns: usize) -> f64 {
    let min_span = seconds_per_column * min_label_columns as f64;
    for step in RULER_STEPS {
        if step >= min_span {
            return step;
        }
    }
    // Zoomed out beyond the table; fall back to whole minutes.
    (min_span / 60.0).ceil() * 60.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00.000");
        assert_eq!(format_time(1.234), "0:01.234");
        assert_eq!(format_time(61.5), "1:01.500");
        assert_eq!(format_time(-3.0), "0:00.000");
    }

    #[test]
    fn test_ruler_step_picks_next_interval() {
        // 0.01 s per column, labels at least 8 columns apart.
        let step = ruler_step(0.01, 8);
        assert_eq!(step, 0.1);

        // Very tight zoom lands on the finest interval.
        assert_eq!(ruler_step(0.0001, 4), 0.001);
    }

    #[test]
    fn test_ruler_step_fallback_past_table() {
        // 60 s per column, labels 10 columns apart needs 600 s steps.
        let step = ruler_step(60.0, 10);
        assert_eq!(step, 600.0);
    }
}
