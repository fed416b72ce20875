//! Help overlay listing every key and mouse binding.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;

/// Binding reference, grouped by section. Rendered in order.
const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "General",
        &[
            ("?", "Toggle this help"),
            ("q / Esc", "Quit"),
            ("Ctrl+C", "Quit"),
        ],
    ),
    (
        "Playback",
        &[
            ("Space", "Play / pause"),
            ("Enter / r", "Replay from the beginning"),
            ("s", "Stop and rewind"),
        ],
    ),
    (
        "View",
        &[
            ("h / Left", "Pan left"),
            ("l / Right", "Pan right"),
            ("= / +", "Zoom in"),
            ("-", "Zoom out"),
            ("0", "Go to the start"),
            ("g", "Fit the whole recording"),
            ("f", "Toggle follow playhead"),
        ],
    ),
    (
        "Files",
        &[("o", "Open the WAV file browser")],
    ),
    (
        "Mouse",
        &[
            ("Click", "Seek (while paused or stopped)"),
            ("Scroll", "Zoom at the pointer"),
        ],
    ),
];

/// Formats one binding row, aligning actions at `key_width`.
fn binding_line(keys: &'static str, action: &'static str, key_width: usize) -> Line<'static> {
    let pad = " ".repeat(key_width.saturating_sub(keys.chars().count()) + 2);
    Line::from(vec![
        Span::raw("  "),
        Span::styled(keys, Style::default().fg(Color::Yellow)),
        Span::raw(pad),
        Span::styled(action, Style::default().fg(Color::White)),
    ])
}

/// Renders the scrollable help overlay.
pub fn render_help(frame: &mut Frame, scroll: u16) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 2 {
        return;
    }

    // Keys align on the longest binding across all sections.
    let key_width = SECTIONS
        .iter()
        .flat_map(|(_, bindings)| bindings.iter())
        .map(|(keys, _)| keys.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line> = Vec::new();
    for (heading, bindings) in SECTIONS {
        lines.push(Line::from(Span::styled(
            *heading,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        for &(keys, action) in *bindings {
            lines.push(binding_line(keys, action, key_width));
        }
        lines.push(Line::from(""));
    }

    let body = Rect::new(inner.x, inner.y, inner.width, inner.height - 1);
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), body);

    // Fixed footer under the scrolling body.
    let footer = Line::from(vec![
        Span::styled("Scroll", Style::default().fg(Color::Yellow)),
        Span::styled(" Up/Down/j/k   ", Style::default().fg(Color::DarkGray)),
        Span::styled("Close", Style::default().fg(Color::Yellow)),
        Span::styled(" ?/Esc/Click", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(
        Paragraph::new(footer),
        Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_cover_transport_and_view_keys() {
        let all: Vec<&str> = SECTIONS
            .iter()
            .flat_map(|(_, bindings)| bindings.iter())
            .map(|(keys, _)| *keys)
            .collect();

        for expected in ["Space", "Enter / r", "s", "g", "f", "o", "?"] {
            assert!(all.contains(&expected), "missing binding row: {expected}");
        }
    }

    #[test]
    fn test_binding_line_alignment() {
        // All actions start at the same column regardless of key length.
        let short = binding_line("s", "Stop and rewind", 9);
        let long = binding_line("Enter / r", "Replay from the beginning", 9);
        let flatten = |line: &Line| -> String {
            line.spans.iter().map(|s| s.content.as_ref()).collect()
        };

        let short = flatten(&short);
        let long = flatten(&long);
        assert_eq!(short.find("Stop"), Some(13));
        assert_eq!(long.find("Replay"), Some(13));
    }
}
