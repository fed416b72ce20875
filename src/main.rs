//! wavetui - A terminal-based waveform viewer and player.
//!
//! This application loads WAV recordings, draws their waveforms at any
//! zoom level, and plays them back through the system audio device.
//!
//! # Features
//!
//! - Multi-channel waveform display with per-channel lanes
//! - Constant-cost rendering from a multi-resolution pyramid
//! - Real-time playback using rodio with play/pause/replay transport
//! - Click-to-seek and scroll-to-zoom mouse control
//! - File browser for opening recordings
//!
//! # Usage
//!
//! ```bash
//! cargo run -- recording.wav  # Open a file directly
//! cargo run                   # Start empty, press o to browse
//! ```
//!
//! Press `?` for help with keyboard shortcuts.

mod app;
mod audio;
mod ui;
mod wave;

use app::App;

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line options for the application.
struct CliOptions {
    /// Recording to open on startup.
    file: Option<PathBuf>,
}

impl CliOptions {
    /// Parses command-line arguments.
    ///
    /// Supports:
    /// - `<path>.wav`: Open the given recording on startup
    /// - `--help` or `-h`: Print help and exit
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut file: Option<PathBuf> = None;
        let mut i = 1;

        while i < args.len() {
            match args[i].as_str() {
                "--help" | "-h" => {
                    eprintln!("wavetui - Terminal-based waveform viewer and player");
                    eprintln!();
                    eprintln!(
                        "Usage: {} [FILE.wav]",
                        args.first().unwrap_or(&"wavetui".to_string())
                    );
                    eprintln!();
                    eprintln!("Options:");
                    eprintln!("  -h, --help  Print this help message");
                    eprintln!();
                    eprintln!("If no file is given, press o inside the app to open one.");
                    std::process::exit(0);
                }
                other => {
                    // Check if it might be a recording (positional argument)
                    if other.to_ascii_lowercase().ends_with(".wav") {
                        file = Some(PathBuf::from(other));
                    } else {
                        eprintln!("Unknown option: {}", other);
                        eprintln!("Use --help for usage information");
                        std::process::exit(1);
                    }
                }
            }
            i += 1;
        }

        Ok(Self { file })
    }
}

/// Main entry point.
fn main() -> Result<()> {
    // Parse CLI before the terminal enters raw mode
    let cli = CliOptions::parse()?;

    // Logs go to stderr, filtered by RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut terminal = setup_terminal().context("Failed to setup terminal")?;

    let mut app = App::new();
    if let Some(path) = cli.file {
        app.open_file(path);
    }

    let result = run_app(&mut terminal, &mut app);

    // Put the terminal back even if the loop errored
    restore_terminal(&mut terminal).context("Failed to restore terminal")?;

    result
}

/// Sets up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Main application loop.
///
/// The open overlay owns the input: help first, then the file browser,
/// then the normal bindings.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Follow the playhead and notice end of playback
        app.update();
        app.clear_expired_status();

        terminal.draw(|frame| ui::render(frame, app))?;

        // Short poll so the playhead keeps moving between events
        if !event::poll(Duration::from_millis(16))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if app.show_help {
                    handle_help_key(app, key.code);
                } else if app.file_browser.open {
                    handle_browser_key(app, key.code);
                } else if handle_key(app, key.code, key.modifiers) {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => {
                if app.show_help {
                    handle_help_mouse(app, mouse.kind);
                } else {
                    handle_mouse(app, mouse);
                }
            }
            _ => {}
        }
    }
}

/// Keys while the help overlay is open; everything else is swallowed.
fn handle_help_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('?') | KeyCode::Esc => app.toggle_help(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_help(-1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_help(1),
        KeyCode::PageUp => app.scroll_help(-10),
        KeyCode::PageDown => app.scroll_help(10),
        KeyCode::Home => app.help_scroll = 0,
        _ => {}
    }
}

/// Keys while the file browser is open.
fn handle_browser_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Enter => {
            app.file_browser_select();
        }
        KeyCode::Esc => app.file_browser_cancel(),
        KeyCode::Up | KeyCode::Char('k') => app.file_browser_up(),
        KeyCode::Down | KeyCode::Char('j') => app.file_browser_down(),
        _ => {}
    }
}

/// Mouse while the help overlay is open: the wheel scrolls, a click closes.
fn handle_help_mouse(app: &mut App, kind: MouseEventKind) {
    match kind {
        MouseEventKind::Down(MouseButton::Left) => app.toggle_help(),
        MouseEventKind::ScrollUp => app.scroll_help(-3),
        MouseEventKind::ScrollDown => app.scroll_help(3),
        _ => {}
    }
}

/// Frame to anchor a scroll zoom at: the frame under the pointer, or
/// the view center when the pointer is on a border.
fn scroll_anchor(app: &App, x: u16, y: u16) -> usize {
    match app.layout.wave_hit_test(x, y) {
        Some(column) => app.frame_at_column(column),
        None => app.view_center(),
    }
}

/// Handles mouse events.
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(column) = app.layout.wave_hit_test(x, y) {
                let frame = app.frame_at_column(column);
                app.seek_to_frame(frame);
            }
        }
        MouseEventKind::ScrollUp => {
            if app.layout.is_in_waveform(x, y) {
                let anchor = scroll_anchor(app, x, y);
                app.zoom_in_at(anchor);
            }
        }
        MouseEventKind::ScrollDown => {
            if app.layout.is_in_waveform(x, y) {
                let anchor = scroll_anchor(app, x, y);
                app.zoom_out_at(anchor);
            }
        }
        _ => {}
    }
}

/// Handles a key press event.
///
/// # Returns
///
/// `true` if the application should quit
fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        // Quit
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            return true;
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            return true;
        }

        // Help toggle
        KeyCode::Char('?') => {
            app.toggle_help();
        }

        // Playback controls
        KeyCode::Char(' ') => {
            app.toggle_playback();
        }
        KeyCode::Enter | KeyCode::Char('r') => {
            app.restart_playback();
        }
        KeyCode::Char('s') => {
            app.stop_playback();
        }

        // Open file (o or Ctrl+O)
        KeyCode::Char('o') => {
            app.open_file_browser();
        }

        // Viewport controls
        KeyCode::Char('f') => {
            app.toggle_follow();
        }
        KeyCode::Char('=') | KeyCode::Char('+') => {
            app.zoom_in_at(app.view_center());
        }
        KeyCode::Char('-') => {
            app.zoom_out_at(app.view_center());
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.pan_left();
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.pan_right();
        }
        KeyCode::Char('0') => {
            app.view_to_start();
        }
        KeyCode::Char('g') => {
            app.fit_view();
        }

        _ => {}
    }

    false
}
