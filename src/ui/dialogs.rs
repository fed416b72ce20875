//! Dialog overlays.
//!
//! Provides the modal file browser for opening WAV recordings.

use crate::app::App;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use std::path::Path;

use super::centered_rect;

/// Shortens `text` to at most `max` characters by dropping the left end.
///
/// Works on char boundaries so non-ASCII paths cannot split mid-glyph.
fn shorten_left(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max || max < 4 {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - (max - 3)).collect();
    format!("...{}", tail)
}

/// Human-readable byte count for the size column.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    match bytes {
        b if b >= GB => format!("{:.1} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{} KB", b / KB),
        b => format!("{} B", b),
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("?"))
}

/// One row of the browser list: marker, name, optional size column.
fn entry_line(path: &Path, selected: bool, row_width: usize) -> Line<'static> {
    let parent = path == Path::new("..");
    let dir = !parent && path.is_dir();

    let (marker, name, color) = if parent {
        ("..", String::from("Parent directory"), Color::Blue)
    } else if dir {
        ("/ ", entry_name(path), Color::Blue)
    } else {
        ("~ ", entry_name(path), Color::Green)
    };

    let size = if parent || dir {
        String::new()
    } else {
        std::fs::metadata(path)
            .map(|m| format_size(m.len()))
            .unwrap_or_default()
    };

    let cursor = if selected { "▸ " } else { "  " };
    let name = shorten_left(&name, row_width.saturating_sub(14));
    // Cursor and marker cells are 2 and 3 columns wide; pad pushes the
    // size column to the right edge.
    let used = 5 + name.chars().count() + size.len();
    let pad = row_width.saturating_sub(used);

    let name_style = if selected {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    };

    Line::from(vec![
        Span::styled(cursor.to_string(), Style::default().fg(Color::Yellow)),
        Span::styled(format!("{} ", marker), Style::default().fg(Color::DarkGray)),
        Span::styled(name, name_style),
        Span::raw(" ".repeat(pad)),
        Span::styled(size, Style::default().fg(Color::DarkGray)),
    ])
}

/// Renders the file browser dialog overlay.
pub fn render_file_browser(frame: &mut Frame, app: &App) {
    if !app.file_browser.open {
        return;
    }

    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Open WAV File ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Current directory
            Constraint::Min(5),    // Entry list
            Constraint::Length(1), // Key hints
        ])
        .split(inner);

    let dir = app.file_browser.current_dir.display().to_string();
    frame.render_widget(
        Paragraph::new(Span::styled(
            shorten_left(&dir, chunks[0].width.saturating_sub(2) as usize),
            Style::default().fg(Color::Cyan),
        )),
        chunks[0],
    );

    let browser = &app.file_browser;
    if browser.entries.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No WAV files found in this directory",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )),
            chunks[1],
        );
    } else {
        let visible = chunks[1].height as usize;
        let first = browser.scroll;
        let last = (first + visible).min(browser.entries.len());
        let row_width = chunks[1].width as usize;

        for (row, path) in browser.entries[first..last].iter().enumerate() {
            let line = entry_line(path, first + row == browser.selected, row_width);
            frame.render_widget(
                Paragraph::new(line),
                Rect::new(chunks[1].x, chunks[1].y + row as u16, chunks[1].width, 1),
            );
        }
    }

    let hints = Line::from(vec![
        Span::styled("Up/Down", Style::default().fg(Color::Yellow)),
        Span::styled(" select   ", Style::default().fg(Color::DarkGray)),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::styled(" open   ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" cancel", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(hints), chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_left_keeps_tail() {
        assert_eq!(shorten_left("short", 20), "short");
        assert_eq!(shorten_left("/home/user/recordings", 13), "...recordings");
        // Too narrow to shorten sensibly: pass through.
        assert_eq!(shorten_left("abcdef", 3), "abcdef");
    }

    #[test]
    fn test_shorten_left_multibyte_safe() {
        let path = "/häuser/tímé/später.wav";
        let short = shorten_left(path, 10);
        assert!(short.starts_with("..."));
        assert_eq!(short.chars().count(), 10);
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2 KB");
        assert_eq!(format_size(3 * 1024 * 1024 + 200 * 1024), "3.2 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.0 GB");
    }
}
