//! Audio engine for sample buffer playback.
//!
//! Streams a loaded [`SampleBuffer`] through rodio, sharing transport
//! state with the audio thread through atomics.

use crate::wave::SampleBuffer;
use rodio::{OutputStream, OutputStreamHandle, Source};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Frames copied per refill of the output block.
/// Smaller = lower latency but higher per-block overhead.
const BLOCK_FRAMES: usize = 256;

/// Represents the current playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Not playing; either never started, stopped, or run to completion.
    Stopped,
    /// Currently playing.
    Playing,
    /// Paused at current position.
    Paused,
}

impl PlaybackState {
    fn as_u8(self) -> u8 {
        match self {
            PlaybackState::Stopped => 0,
            PlaybackState::Playing => 1,
            PlaybackState::Paused => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => PlaybackState::Playing,
            2 => PlaybackState::Paused,
            _ => PlaybackState::Stopped,
        }
    }
}

/// Transport state shared between the engine and the audio source.
/// Uses atomics for lock-free access from the audio thread.
#[derive(Debug)]
pub struct PlaybackCursor {
    /// Current playback state, encoded via `PlaybackState::as_u8`.
    state: AtomicU8,
    /// Next frame to hand to the output.
    position: AtomicUsize,
}

impl PlaybackCursor {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(PlaybackState::Stopped.as_u8()),
            position: AtomicUsize::new(0),
        }
    }

    /// Returns the current playback state.
    pub fn state(&self) -> PlaybackState {
        PlaybackState::from_u8(self.state.load(Ordering::Relaxed))
    }

    /// Returns the playhead position in source frames.
    pub fn position(&self) -> usize {
        self.position.load(Ordering::Relaxed)
    }

    fn set_state(&self, state: PlaybackState) {
        self.state.store(state.as_u8(), Ordering::Relaxed);
    }

    fn set_position(&self, frame: usize) {
        self.position.store(frame, Ordering::Relaxed);
    }
}

/// Outcome of one block fill against the loaded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FillStatus {
    /// More audio remains after this block.
    Continue,
    /// The buffer ran out during this block.
    Complete,
}

/// Copies up to one block of interleaved frames out of the buffer.
///
/// Starting at `position`, copies `min(requested, available)` frames
/// into `out` and zero-fills the rest, so a partial final block plays
/// as audio followed by silence rather than garbage.
///
/// # Returns
///
/// The number of frames copied, and `Complete` when the copy came up
/// short of the request (the buffer is exhausted).
fn fill_block(buffer: &SampleBuffer, position: usize, out: &mut [f32]) -> (usize, FillStatus) {
    let channels = buffer.channel_count().max(1);
    let requested = out.len() / channels;
    let available = buffer.frame_count().saturating_sub(position);
    let copied = requested.min(available);

    for frame in 0..copied {
        for ch in 0..buffer.channel_count() {
            out[frame * channels + ch] = buffer.channel(ch)[position + frame];
        }
    }
    out[copied * channels..].fill(0.0);

    let status = if copied < requested {
        FillStatus::Complete
    } else {
        FillStatus::Continue
    };
    (copied, status)
}

/// Audio source that streams the loaded buffer.
/// Implements rodio's Source trait for playback.
struct BufferSource {
    /// The buffer being played.
    buffer: Arc<SampleBuffer>,
    /// Transport shared with the engine.
    cursor: Arc<PlaybackCursor>,
    /// Interleaved block handed to the output one sample at a time.
    block: Vec<f32>,
    /// Current position in the block.
    block_pos: usize,
}

impl BufferSource {
    fn new(buffer: Arc<SampleBuffer>, cursor: Arc<PlaybackCursor>) -> Self {
        let samples = BLOCK_FRAMES * buffer.channel_count().max(1);
        Self {
            buffer,
            cursor,
            block: vec![0.0; samples],
            block_pos: samples, // Start at end to trigger first refill
        }
    }

    /// Renders the next block according to the transport state.
    fn refill(&mut self) {
        if self.cursor.state() == PlaybackState::Playing {
            let position = self.cursor.position();
            let (copied, status) = fill_block(&self.buffer, position, &mut self.block);
            self.cursor.set_position(position + copied);
            if status == FillStatus::Complete {
                // Out of audio: stop without rewinding, leaving the
                // playhead at the end of the recording.
                self.cursor.set_state(PlaybackState::Stopped);
            }
        } else {
            // Paused or stopped sources keep running and emit silence,
            // so resuming never has to rebuild the stream.
            self.block.fill(0.0);
        }
        self.block_pos = 0;
    }
}

impl Iterator for BufferSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.block_pos >= self.block.len() {
            self.refill();
        }

        let sample = self.block[self.block_pos];
        self.block_pos += 1;
        Some(sample)
    }
}

impl Source for BufferSource {
    fn current_frame_len(&self) -> Option<usize> {
        None // Continuous stream
    }

    fn channels(&self) -> u16 {
        self.buffer.channel_count().max(1) as u16
    }

    fn sample_rate(&self) -> u32 {
        self.buffer.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        None // Infinite stream
    }
}

/// Errors from audio device setup.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No output device could be opened.
    #[error("failed to open audio output: {0}")]
    Device(String),
    /// The device opened but the stream would not start.
    #[error("failed to start audio stream: {0}")]
    Stream(String),
}

/// The main audio engine for sample playback.
///
/// Owns the output stream and the transport. Transport calls are total:
/// calling them with nothing loaded, or in a state where they do not
/// apply, is a no-op rather than an error.
pub struct AudioEngine {
    /// Buffer currently loaded for playback.
    buffer: Option<Arc<SampleBuffer>>,
    /// Transport shared with the active source.
    cursor: Arc<PlaybackCursor>,
    /// Audio output stream and handle (must be kept alive).
    output: Option<(OutputStream, OutputStreamHandle)>,
}

impl AudioEngine {
    /// Creates an engine with no buffer loaded and no device open.
    pub fn new() -> Self {
        Self {
            buffer: None,
            cursor: Arc::new(PlaybackCursor::new()),
            output: None,
        }
    }

    /// Loads a buffer and opens the output device for it.
    ///
    /// Playback starts stopped at frame zero. Any previous stream is
    /// torn down first.
    ///
    /// # Errors
    ///
    /// Returns error if the output device cannot be opened or the
    /// stream will not start. The engine is left with nothing loaded;
    /// callers keep their own handle to the buffer for display.
    pub fn load(&mut self, buffer: Arc<SampleBuffer>) -> Result<(), AudioError> {
        // Drop the previous stream before rebinding. Its source still
        // holds the old cursor, so it can never touch the new one.
        self.output = None;
        self.buffer = None;
        self.cursor = Arc::new(PlaybackCursor::new());

        let (stream, handle) =
            OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))?;
        let source = BufferSource::new(Arc::clone(&buffer), Arc::clone(&self.cursor));
        handle
            .play_raw(source)
            .map_err(|e| AudioError::Stream(e.to_string()))?;

        info!(
            frames = buffer.frame_count(),
            channels = buffer.channel_count(),
            sample_rate = buffer.sample_rate(),
            "loaded buffer for playback"
        );
        self.output = Some((stream, handle));
        self.buffer = Some(buffer);
        Ok(())
    }

    /// Starts or resumes playback from the current position.
    ///
    /// No-op when nothing is loaded. Already playing is left as is.
    /// After a run to completion the playhead still sits at the end,
    /// so this completes again immediately; use [`AudioEngine::replay`]
    /// to hear the recording again from the top.
    pub fn play(&mut self) {
        if self.buffer.is_none() {
            return;
        }
        self.cursor.set_state(PlaybackState::Playing);
    }

    /// Pauses playback, keeping the current position.
    ///
    /// Only applies while playing; pausing a stopped engine stays
    /// stopped.
    pub fn pause(&mut self) {
        if self.cursor.state() == PlaybackState::Playing {
            self.cursor.set_state(PlaybackState::Paused);
        }
    }

    /// Rewinds to the start and plays.
    pub fn replay(&mut self) {
        if self.buffer.is_none() {
            return;
        }
        self.cursor.set_position(0);
        self.cursor.set_state(PlaybackState::Playing);
    }

    /// Stops playback and resets the playhead to the start.
    pub fn stop(&mut self) {
        self.cursor.set_state(PlaybackState::Stopped);
        self.cursor.set_position(0);
    }

    /// Moves the playhead to a frame, clamped to the buffer length.
    ///
    /// Ignored while playing: the audio thread owns the position during
    /// playback, so seeking is honored only from pause or stop.
    pub fn seek_to_frame(&mut self, frame: usize) {
        if self.cursor.state() == PlaybackState::Playing {
            return;
        }
        let limit = self.buffer.as_ref().map(|b| b.frame_count()).unwrap_or(0);
        self.cursor.set_position(frame.min(limit));
    }

    /// Returns the current transport state.
    pub fn state(&self) -> PlaybackState {
        self.cursor.state()
    }

    /// Returns the playhead position in source frames.
    pub fn position_frames(&self) -> usize {
        self.cursor.position()
    }

    /// Returns the playhead position in seconds.
    pub fn position_seconds(&self) -> f64 {
        match &self.buffer {
            Some(buffer) => self.cursor.position() as f64 / buffer.sample_rate() as f64,
            None => 0.0,
        }
    }

    /// Returns whether a buffer is loaded and ready to play.
    pub fn is_loaded(&self) -> bool {
        self.buffer.is_some()
    }

    /// Binds a buffer to the transport without opening a device.
    #[cfg(test)]
    pub(crate) fn load_for_test(&mut self, buffer: Arc<SampleBuffer>) {
        self.cursor = Arc::new(PlaybackCursor::new());
        self.buffer = Some(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono_buffer(samples: Vec<f32>, sample_rate: u32) -> Arc<SampleBuffer> {
        Arc::new(SampleBuffer::new(vec![samples], sample_rate))
    }

    #[test]
    fn test_fill_block_copies_and_completes() {
        let buffer = mono_buffer(vec![0.1, -0.2, 0.3, -0.4], 4);
        let mut out = [9.0f32; 2];

        let (copied, status) = fill_block(&buffer, 0, &mut out);
        assert_eq!(copied, 2);
        assert_eq!(status, FillStatus::Continue);
        assert_eq!(out, [0.1, -0.2]);

        let (copied, status) = fill_block(&buffer, 2, &mut out);
        assert_eq!(copied, 2);
        // An exact exhaustion is not yet complete; the next call is.
        assert_eq!(status, FillStatus::Continue);
        assert_eq!(out, [0.3, -0.4]);

        let (copied, status) = fill_block(&buffer, 4, &mut out);
        assert_eq!(copied, 0);
        assert_eq!(status, FillStatus::Complete);
        assert_eq!(out, [0.0, 0.0]);
    }

    #[test]
    fn test_fill_block_zero_pads_partial() {
        let buffer = mono_buffer(vec![0.5, 0.6, 0.7], 8);
        let mut out = [9.0f32; 4];

        let (copied, status) = fill_block(&buffer, 0, &mut out);
        assert_eq!(copied, 3);
        assert_eq!(status, FillStatus::Complete);
        assert_eq!(out, [0.5, 0.6, 0.7, 0.0]);
    }

    #[test]
    fn test_fill_block_interleaves_stereo() {
        let buffer = Arc::new(SampleBuffer::new(
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            8,
        ));
        let mut out = [0.0f32; 4];

        let (copied, status) = fill_block(&buffer, 0, &mut out);
        assert_eq!(copied, 2);
        assert_eq!(status, FillStatus::Continue);
        assert_eq!(out, [1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn test_fill_block_empty_buffer() {
        let buffer = mono_buffer(vec![], 8);
        let mut out = [9.0f32; 4];

        let (copied, status) = fill_block(&buffer, 0, &mut out);
        assert_eq!(copied, 0);
        assert_eq!(status, FillStatus::Complete);
        assert_eq!(out, [0.0; 4]);
    }

    #[test]
    fn test_source_emits_samples_then_stops_at_end() {
        let buffer = mono_buffer(vec![0.1, -0.2, 0.3, -0.4], 4);
        let cursor = Arc::new(PlaybackCursor::new());
        let mut source = BufferSource::new(Arc::clone(&buffer), Arc::clone(&cursor));
        cursor.set_state(PlaybackState::Playing);

        let first: Vec<f32> = (&mut source).take(4).collect();
        assert_eq!(first, vec![0.1, -0.2, 0.3, -0.4]);

        // The partial block already announced completion; the playhead
        // rests at the end rather than rewinding.
        assert_eq!(cursor.state(), PlaybackState::Stopped);
        assert_eq!(cursor.position(), 4);

        // Everything after the end is silence.
        assert!((&mut source).take(1024).all(|s| s == 0.0));
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_source_plays_multiple_blocks() {
        let frames = 1_000;
        let buffer = mono_buffer((0..frames).map(|i| i as f32).collect(), 44_100);
        let cursor = Arc::new(PlaybackCursor::new());
        let mut source = BufferSource::new(Arc::clone(&buffer), Arc::clone(&cursor));
        cursor.set_state(PlaybackState::Playing);

        for expected in 0..frames {
            assert_eq!(source.next(), Some(expected as f32));
        }
        assert_eq!(cursor.state(), PlaybackState::Stopped);
        assert_eq!(cursor.position(), frames);
    }

    #[test]
    fn test_source_silent_unless_playing() {
        let buffer = mono_buffer(vec![0.5; 100], 8_000);
        let cursor = Arc::new(PlaybackCursor::new());
        let mut source = BufferSource::new(Arc::clone(&buffer), Arc::clone(&cursor));

        // Stopped by default: silence, no progress.
        assert!((&mut source).take(512).all(|s| s == 0.0));
        assert_eq!(cursor.position(), 0);

        cursor.set_state(PlaybackState::Paused);
        assert!((&mut source).take(512).all(|s| s == 0.0));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_engine_transport_without_buffer() {
        let mut engine = AudioEngine::new();

        engine.play();
        assert_eq!(engine.state(), PlaybackState::Stopped);
        engine.pause();
        assert_eq!(engine.state(), PlaybackState::Stopped);
        engine.replay();
        assert_eq!(engine.state(), PlaybackState::Stopped);
        engine.stop();
        assert_eq!(engine.position_frames(), 0);
        assert!(!engine.is_loaded());
    }

    #[test]
    fn test_engine_play_pause_resume() {
        let mut engine = AudioEngine::new();
        engine.load_for_test(mono_buffer(vec![0.0; 100], 8_000));

        engine.play();
        assert_eq!(engine.state(), PlaybackState::Playing);
        // Playing again changes nothing.
        engine.play();
        assert_eq!(engine.state(), PlaybackState::Playing);

        engine.pause();
        assert_eq!(engine.state(), PlaybackState::Paused);
        engine.play();
        assert_eq!(engine.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_engine_pause_while_stopped_is_noop() {
        let mut engine = AudioEngine::new();
        engine.load_for_test(mono_buffer(vec![0.0; 100], 8_000));

        engine.pause();
        assert_eq!(engine.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_engine_stop_then_play_matches_replay() {
        let mut engine = AudioEngine::new();
        engine.load_for_test(mono_buffer(vec![0.0; 100], 8_000));

        engine.seek_to_frame(50);
        engine.stop();
        engine.play();
        assert_eq!(engine.state(), PlaybackState::Playing);
        assert_eq!(engine.position_frames(), 0);

        engine.pause();
        engine.seek_to_frame(50);
        engine.replay();
        assert_eq!(engine.state(), PlaybackState::Playing);
        assert_eq!(engine.position_frames(), 0);
    }

    #[test]
    fn test_engine_seek_rules() {
        let mut engine = AudioEngine::new();
        engine.load_for_test(mono_buffer(vec![0.0; 100], 8_000));

        engine.seek_to_frame(30);
        assert_eq!(engine.position_frames(), 30);

        // Past-the-end seeks clamp to the buffer length.
        engine.seek_to_frame(500);
        assert_eq!(engine.position_frames(), 100);

        // The audio thread owns the position while playing.
        engine.seek_to_frame(10);
        engine.play();
        engine.seek_to_frame(70);
        assert_eq!(engine.position_frames(), 10);

        engine.pause();
        engine.seek_to_frame(70);
        assert_eq!(engine.position_frames(), 70);
    }

    #[test]
    fn test_engine_position_seconds() {
        let mut engine = AudioEngine::new();
        assert_eq!(engine.position_seconds(), 0.0);

        engine.load_for_test(mono_buffer(vec![0.0; 8_000], 8_000));
        engine.seek_to_frame(4_000);
        assert!((engine.position_seconds() - 0.5).abs() < 1e-9);
    }

    /// Requires a working audio output device.
    #[test]
    #[ignore]
    fn test_engine_plays_through_device() {
        let mut engine = AudioEngine::new();
        let buffer = mono_buffer(vec![0.0; 4_410], 44_100);

        engine.load(buffer).unwrap();
        engine.play();
        std::thread::sleep(Duration::from_millis(250));
        assert_eq!(engine.state(), PlaybackState::Stopped);
        assert_eq!(engine.position_frames(), 4_410);
    }
}
