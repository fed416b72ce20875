//! Audio playback for loaded sample buffers.
//!
//! This module streams decoded audio via rodio. It supports:
//! - Gapless block-based playback with low latency
//! - Play, pause, replay, and stop transport control
//! - Seeking while paused or stopped
//! - Lock-free position reporting for the playhead display

pub mod engine;

pub use engine::{AudioEngine, AudioError, PlaybackCursor, PlaybackState};
