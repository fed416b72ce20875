//! Application state and logic for the waveform player.

use crate::audio::{AudioEngine, PlaybackState};
use crate::wave::{format_time, import_wav, SampleBuffer, WaveformCache};
use ratatui::layout::Rect;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Smallest viewport width, in frames.
const MIN_VIEW_SPAN: usize = 64;

/// Zoom factor applied per zoom step.
const ZOOM_STEP: f64 = 1.5;

/// State for the file browser dialog.
#[derive(Debug, Clone)]
pub struct FileBrowserState {
    /// Whether the browser is open.
    pub open: bool,
    /// Current directory path.
    pub current_dir: PathBuf,
    /// List of entries in current directory.
    pub entries: Vec<PathBuf>,
    /// Currently selected index.
    pub selected: usize,
    /// Scroll offset for long lists.
    pub scroll: usize,
}

impl Default for FileBrowserState {
    fn default() -> Self {
        Self {
            open: false,
            current_dir: std::env::current_dir().unwrap_or_default(),
            entries: Vec::new(),
            selected: 0,
            scroll: 0,
        }
    }
}

/// Layout regions for mouse hit testing.
/// Stores the screen coordinates of each UI panel.
#[derive(Debug, Clone, Default)]
pub struct LayoutRegions {
    /// The transport bar at the top.
    pub transport: Rect,
    /// The waveform area below it.
    pub waveform: Rect,
    /// The plot columns inside the waveform borders (set during rendering).
    pub wave_plot: Rect,
}

impl LayoutRegions {
    /// Returns the plot-relative column for a click in the waveform area.
    ///
    /// # Arguments
    ///
    /// * `x` - Screen X coordinate
    /// * `y` - Screen Y coordinate
    ///
    /// # Returns
    ///
    /// The column within the plot, or None if outside it
    pub fn wave_hit_test(&self, x: u16, y: u16) -> Option<u16> {
        if self.contains(self.wave_plot, x, y) {
            Some(x.saturating_sub(self.wave_plot.x))
        } else {
            None
        }
    }

    /// Checks if a point is within the waveform area.
    pub fn is_in_waveform(&self, x: u16, y: u16) -> bool {
        self.contains(self.waveform, x, y)
    }

    /// Checks if a point is within a rectangle.
    fn contains(&self, rect: Rect, x: u16, y: u16) -> bool {
        x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
    }
}

/// Main application state.
pub struct App {
    /// Decoded audio for the loaded file.
    buffer: Option<Arc<SampleBuffer>>,
    /// The audio engine for playback.
    pub audio: AudioEngine,
    /// Waveform pyramid cache, rebuilt off-thread on each load.
    pub cache: Arc<WaveformCache>,
    /// Path of the loaded file.
    pub file_path: Option<PathBuf>,
    /// First visible frame of the viewport.
    pub view_start: usize,
    /// Viewport width in frames.
    pub view_span: usize,
    /// Whether the viewport follows the playhead during playback.
    pub follow_playhead: bool,
    /// Status message to display.
    pub status_message: Option<(String, Instant)>,
    /// Whether the help overlay is visible.
    pub show_help: bool,
    /// Scroll offset within the help overlay.
    pub help_scroll: u16,
    /// File browser state for loading.
    pub file_browser: FileBrowserState,
    /// Layout regions for mouse hit testing (updated each frame).
    pub layout: LayoutRegions,
    /// Transport state seen by the previous update, for noticing when
    /// the audio thread has run the buffer to completion.
    last_state: PlaybackState,
}

impl App {
    /// Creates a new application with nothing loaded.
    pub fn new() -> Self {
        Self {
            buffer: None,
            audio: AudioEngine::new(),
            cache: Arc::new(WaveformCache::new()),
            file_path: None,
            view_start: 0,
            view_span: 0,
            follow_playhead: true,
            status_message: None,
            show_help: false,
            help_scroll: 0,
            file_browser: FileBrowserState::default(),
            layout: LayoutRegions::default(),
            last_state: PlaybackState::Stopped,
        }
    }

    /// Loads a WAV file for display and playback.
    ///
    /// Decoding happens here; the waveform pyramid is rebuilt on a
    /// worker thread. A missing audio device degrades gracefully: the
    /// waveform stays browsable and only the transport is inert.
    ///
    /// # Returns
    ///
    /// true if the file was decoded successfully
    pub fn open_file(&mut self, path: PathBuf) -> bool {
        match import_wav(&path) {
            Ok(buffer) => {
                let buffer = Arc::new(buffer);
                // Drop the previous file's pyramid right away so the new
                // view never renders against stale data.
                self.cache.clear();
                self.cache.rebuild(Arc::clone(&buffer));
                self.view_start = 0;
                self.view_span = buffer.frame_count().max(1);
                self.buffer = Some(Arc::clone(&buffer));
                self.file_path = Some(path.clone());
                self.last_state = PlaybackState::Stopped;

                match self.audio.load(buffer) {
                    Ok(()) => self.set_status(format!("Loaded: {}", path.display())),
                    Err(e) => {
                        warn!("audio output unavailable: {}", e);
                        self.set_status(format!("Loaded without audio: {}", e));
                    }
                }
                true
            }
            Err(e) => {
                self.set_status(format!("Load failed: {}", e));
                false
            }
        }
    }

    /// Returns the loaded sample buffer, if any.
    pub fn buffer(&self) -> Option<&Arc<SampleBuffer>> {
        self.buffer.as_ref()
    }

    /// Total frames in the loaded buffer, zero when nothing is loaded.
    pub fn frame_count(&self) -> usize {
        self.buffer.as_ref().map(|b| b.frame_count()).unwrap_or(0)
    }

    /// Sample rate of the loaded buffer, zero when nothing is loaded.
    pub fn sample_rate(&self) -> u32 {
        self.buffer.as_ref().map(|b| b.sample_rate()).unwrap_or(0)
    }

    // ==================== Transport ====================

    /// Toggles play/pause state.
    pub fn toggle_playback(&mut self) {
        if !self.audio.is_loaded() {
            self.set_status("No file loaded");
            return;
        }
        match self.audio.state() {
            PlaybackState::Playing => {
                self.audio.pause();
                self.set_status("Paused");
            }
            PlaybackState::Paused | PlaybackState::Stopped => {
                self.audio.play();
                self.set_status("Playing");
            }
        }
    }

    /// Stops playback and resets the playhead to the beginning.
    pub fn stop_playback(&mut self) {
        self.audio.stop();
        self.last_state = PlaybackState::Stopped;
        self.set_status("Stopped");
    }

    /// Restarts playback from the beginning of the recording.
    pub fn restart_playback(&mut self) {
        if !self.audio.is_loaded() {
            self.set_status("No file loaded");
            return;
        }
        self.audio.replay();
        self.set_status("Restarting from beginning");
    }

    /// Seeks to a frame when the transport allows it.
    ///
    /// The audio thread owns the position while playing, so clicks
    /// during playback are ignored.
    pub fn seek_to_frame(&mut self, frame: usize) {
        if !self.audio.is_loaded() {
            return;
        }
        if self.audio.state() == PlaybackState::Playing {
            self.set_status("Pause before seeking");
            return;
        }
        self.audio.seek_to_frame(frame);
        self.set_status(format!(
            "Playhead at {}",
            format_time(self.audio.position_seconds())
        ));
    }

    /// Per-frame update. Should be called regularly from the main loop.
    ///
    /// Follows the playhead when enabled and notices the transition to
    /// Stopped that the audio thread makes when the buffer runs out.
    pub fn update(&mut self) {
        let state = self.audio.state();

        if state == PlaybackState::Playing && self.follow_playhead {
            let position = self.audio.position_frames();
            // Scroll once the playhead passes three quarters of the
            // view, landing it at the first quarter.
            if position > self.view_start + self.view_span * 3 / 4 {
                let frames = self.frame_count();
                let new_start = position.saturating_sub(self.view_span / 4);
                self.view_start = new_start.min(frames.saturating_sub(self.view_span));
            }
        }

        if self.last_state == PlaybackState::Playing && state == PlaybackState::Stopped {
            self.set_status("Playback finished");
        }
        self.last_state = state;
    }

    // ==================== Viewport ====================

    /// Zooms in by one step, keeping `anchor` fixed on screen.
    pub fn zoom_in_at(&mut self, anchor: usize) {
        self.apply_zoom(anchor, 1.0 / ZOOM_STEP);
    }

    /// Zooms out by one step, keeping `anchor` fixed on screen.
    pub fn zoom_out_at(&mut self, anchor: usize) {
        self.apply_zoom(anchor, ZOOM_STEP);
    }

    /// Frame at the center of the viewport, the default zoom anchor.
    pub fn view_center(&self) -> usize {
        self.view_start + self.view_span / 2
    }

    fn apply_zoom(&mut self, anchor: usize, factor: f64) {
        let frames = self.frame_count();
        if frames == 0 {
            return;
        }
        let old_span = self.view_span.max(1);
        let new_span = ((old_span as f64 * factor).round() as usize)
            .clamp(MIN_VIEW_SPAN.min(frames), frames);

        // Keep the anchor at the same fraction of the viewport.
        let fraction = anchor.saturating_sub(self.view_start) as f64 / old_span as f64;
        let new_start = anchor.saturating_sub((fraction * new_span as f64) as usize);
        self.view_start = new_start.min(frames.saturating_sub(new_span));
        self.view_span = new_span;
    }

    /// Pans the viewport left by an eighth of its width.
    pub fn pan_left(&mut self) {
        let step = (self.view_span / 8).max(1);
        self.view_start = self.view_start.saturating_sub(step);
    }

    /// Pans the viewport right by an eighth of its width.
    pub fn pan_right(&mut self) {
        let frames = self.frame_count();
        let step = (self.view_span / 8).max(1);
        let limit = frames.saturating_sub(self.view_span);
        self.view_start = (self.view_start + step).min(limit);
    }

    /// Jumps the viewport to the start without changing zoom.
    pub fn view_to_start(&mut self) {
        self.view_start = 0;
    }

    /// Fits the whole recording in the viewport.
    pub fn fit_view(&mut self) {
        self.view_start = 0;
        self.view_span = self.frame_count().max(1);
    }

    /// Toggles whether the viewport follows the playhead.
    pub fn toggle_follow(&mut self) {
        self.follow_playhead = !self.follow_playhead;
        self.set_status(if self.follow_playhead {
            "Following playhead"
        } else {
            "Free scrolling"
        });
    }

    /// Converts a plot column to the frame shown at that column.
    pub fn frame_at_column(&self, column: u16) -> usize {
        let width = self.layout.wave_plot.width.max(1) as usize;
        let column = (column as usize).min(width - 1);
        self.view_start + column * self.view_span / width
    }

    // ==================== Status and layout ====================

    /// Sets a status message to display temporarily.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Clears expired status messages.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
            }
        }
    }

    /// Updates the layout regions based on current terminal size.
    /// Called by the UI module during rendering.
    pub fn update_layout(&mut self, layout: LayoutRegions) {
        self.layout = layout;
    }

    /// Toggles the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        self.help_scroll = 0;
    }

    /// Moves the help overlay scroll by `delta` rows, stopping at the top.
    pub fn scroll_help(&mut self, delta: i16) {
        self.help_scroll = self.help_scroll.saturating_add_signed(delta);
    }

    // ==================== File browser ====================

    /// Opens the file browser for loading a recording.
    pub fn open_file_browser(&mut self) {
        self.file_browser.open = true;
        self.file_browser.current_dir = std::env::current_dir().unwrap_or_default();
        self.file_browser.selected = 0;
        self.file_browser.scroll = 0;
        self.refresh_file_browser();
    }

    /// Refreshes the file browser entries.
    fn refresh_file_browser(&mut self) {
        self.file_browser.entries.clear();

        // Add parent directory entry if not at root
        if self.file_browser.current_dir.parent().is_some() {
            self.file_browser.entries.push(PathBuf::from(".."));
        }

        // Read directory entries
        if let Ok(entries) = std::fs::read_dir(&self.file_browser.current_dir) {
            let mut dirs: Vec<PathBuf> = Vec::new();
            let mut files: Vec<PathBuf> = Vec::new();

            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    dirs.push(path);
                } else if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                    if ext.eq_ignore_ascii_case("wav") {
                        files.push(path);
                    }
                }
            }

            // Directories first, each group alphabetical
            dirs.sort();
            files.sort();

            self.file_browser.entries.extend(dirs);
            self.file_browser.entries.extend(files);
        }

        // Reset selection if out of bounds
        if self.file_browser.selected >= self.file_browser.entries.len() {
            self.file_browser.selected = 0;
        }
    }

    /// Moves selection up in the file browser.
    pub fn file_browser_up(&mut self) {
        if self.file_browser.open && self.file_browser.selected > 0 {
            self.file_browser.selected -= 1;
            if self.file_browser.selected < self.file_browser.scroll {
                self.file_browser.scroll = self.file_browser.selected;
            }
        }
    }

    /// Moves selection down in the file browser.
    pub fn file_browser_down(&mut self) {
        if self.file_browser.open
            && self.file_browser.selected + 1 < self.file_browser.entries.len()
        {
            self.file_browser.selected += 1;
            // Keep the selection inside the ten-row window
            if self.file_browser.selected >= self.file_browser.scroll + 10 {
                self.file_browser.scroll = self.file_browser.selected.saturating_sub(9);
            }
        }
    }

    /// Selects the current entry in the file browser.
    ///
    /// # Returns
    ///
    /// true if a file was loaded
    pub fn file_browser_select(&mut self) -> bool {
        if !self.file_browser.open || self.file_browser.entries.is_empty() {
            return false;
        }

        let selected_path = &self.file_browser.entries[self.file_browser.selected];

        if selected_path == &PathBuf::from("..") {
            // ".." walks up one level
            if let Some(parent) = self.file_browser.current_dir.parent() {
                self.file_browser.current_dir = parent.to_path_buf();
                self.file_browser.selected = 0;
                self.file_browser.scroll = 0;
                self.refresh_file_browser();
            }
            false
        } else if selected_path.is_dir() {
            // Descend and rescan
            self.file_browser.current_dir = selected_path.clone();
            self.file_browser.selected = 0;
            self.file_browser.scroll = 0;
            self.refresh_file_browser();
            false
        } else {
            let path = selected_path.clone();
            self.file_browser.open = false;
            self.open_file(path)
        }
    }

    /// Cancels the file browser.
    pub fn file_browser_cancel(&mut self) {
        self.file_browser.open = false;
        self.set_status("Load cancelled");
    }
}

#[cfg(test)]
impl App {
    /// Loads a buffer directly, bypassing file IO and the audio device.
    fn load_buffer_for_test(&mut self, buffer: Arc<SampleBuffer>) {
        self.audio.load_for_test(Arc::clone(&buffer));
        self.view_start = 0;
        self.view_span = buffer.frame_count().max(1);
        self.last_state = PlaybackState::Stopped;
        self.buffer = Some(buffer);
    }
}
