//! wavetui - A terminal-based waveform viewer and player.
//!
//! This library provides the core functionality for the waveform player app.

pub mod app;
pub mod audio;
pub mod ui;
pub mod wave;

// Re-export commonly used types
pub use app::App;
pub use audio::{AudioEngine, PlaybackState};
pub use wave::{SampleBuffer, WaveformCache, WaveformPyramid, RESOLUTION_TARGET};
