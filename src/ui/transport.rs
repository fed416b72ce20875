//! Transport bar rendering.
//!
//! Displays the playback state, the playhead position against the total
//! duration, the source format, and transient status messages.

use crate::app::App;
use crate::audio::PlaybackState;
use crate::wave::format_time;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Renders the transport bar at the top of the screen.
///
/// # Arguments
///
/// * `frame` - The frame to render to
/// * `area` - The area to render in
/// * `app` - Application state
pub fn render_transport(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12), // State badge
            Constraint::Length(26), // Elapsed / total time
            Constraint::Length(17), // Source format
            Constraint::Length(12), // Follow flag
            Constraint::Min(16),    // Status or hint
        ])
        .split(inner);

    let (badge, color) = match app.audio.state() {
        PlaybackState::Playing => (" >> PLAYING", Color::Green),
        PlaybackState::Paused => (" || PAUSED", Color::Yellow),
        PlaybackState::Stopped => (" [] STOPPED", Color::Red),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            badge,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        chunks[0],
    );

    let total = app.buffer().map(|b| b.duration_seconds()).unwrap_or(0.0);
    let clock = format!(
        "{} / {}",
        format_time(app.audio.position_seconds()),
        format_time(total)
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            clock,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        chunks[1],
    );

    let format = match app.buffer() {
        Some(buffer) => format!("{} Hz  {} ch", buffer.sample_rate(), buffer.channel_count()),
        None => String::from("--"),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(format, Style::default().fg(Color::White))),
        chunks[2],
    );

    let follow = Line::from(vec![
        Span::styled("follow ", Style::default().fg(Color::DarkGray)),
        if app.follow_playhead {
            Span::styled("on", Style::default().fg(Color::Cyan))
        } else {
            Span::styled("off", Style::default().fg(Color::DarkGray))
        },
    ]);
    frame.render_widget(Paragraph::new(follow), chunks[3]);

    let status = match &app.status_message {
        Some((msg, _)) => Span::styled(
            msg.as_str(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ),
        None => Span::styled("Press ? for help", Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(Paragraph::new(status), chunks[4]);
}
