//! Waveform display rendering.
//!
//! Draws one lane of mirrored peak bars per channel, a time ruler along
//! the top, and the playhead. Each frame resolves the visible window to
//! a slice of the pyramid, so the column scan touches a bounded number
//! of points regardless of recording length or zoom.

use crate::app::App;
use crate::wave::{resolve, ruler_step, WaveformPyramid};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Maps a plot column to its point range within a layer selection.
///
/// Columns share the selection evenly; when fewer points than columns
/// are visible the range is widened to at least one point so every
/// column samples something.
fn column_span(start: usize, len: usize, column: usize, width: usize) -> (usize, usize) {
    let width = width.max(1);
    let i0 = start + column * len / width;
    let mut i1 = start + (column + 1) * len / width;
    if i1 <= i0 && len > 0 {
        i1 = i0 + 1;
    }
    (i0, i1)
}

/// Largest absolute amplitude in `values[i0..i1]`, clamped to the slice.
fn peak_amplitude(values: &[f32], i0: usize, i1: usize) -> f32 {
    let end = i1.min(values.len());
    if i0 >= end {
        return 0.0;
    }
    values[i0..end]
        .iter()
        .fold(0.0f32, |acc, v| acc.max(v.abs()))
}

/// Computes the inclusive row range of a mirrored bar in a lane.
///
/// Row 0 is the top of the lane. A peak of 0.0 collapses to the
/// baseline row; a peak of 1.0 spans the whole lane.
fn bar_rows(peak: f32, height: u16) -> (u16, u16) {
    if height == 0 {
        return (0, 0);
    }
    let center = (height - 1) as f64 / 2.0;
    let extent = peak.clamp(0.0, 1.0) as f64 * center;
    let top = (center - extent).round() as u16;
    let bottom = (center + extent).round() as u16;
    (top, bottom)
}

/// First multiple of `step` at or after `t`.
fn next_boundary(t: f64, step: f64) -> f64 {
    (t / step).ceil() * step
}

/// Formats a ruler label, dropping milliseconds for coarse steps.
fn ruler_label(seconds: f64, step: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as i64;
    let minutes = total_ms / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;
    if step >= 1.0 {
        format!("{}:{:02}", minutes, secs)
    } else {
        format!("{}:{:02}.{:03}", minutes, secs, ms)
    }
}

/// Renders the time ruler row above the channel lanes.
///
/// Labels mark whole multiples of the chosen step; dots mark fifths of
/// a step between them.
fn render_ruler(frame: &mut Frame, area: Rect, view_start: usize, view_span: usize, rate: u32) {
    let width = area.width;
    if width == 0 || rate == 0 {
        return;
    }

    let seconds_per_column = view_span as f64 / rate as f64 / width as f64;
    let step = ruler_step(seconds_per_column, 8);
    let minor = step / 5.0;
    let t0 = view_start as f64 / rate as f64;

    let mut ruler_spans: Vec<Span> = Vec::with_capacity(width as usize);
    let mut col = 0u16;

    while col < width {
        let cell_start = t0 + col as f64 * seconds_per_column;
        let cell_end = cell_start + seconds_per_column;
        let boundary = next_boundary(cell_start, step);

        if boundary < cell_end {
            let label = ruler_label(boundary, step);
            let chars_remaining = (width - col) as usize;

            if label.len() <= chars_remaining {
                ruler_spans.push(Span::styled(
                    label.clone(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ));
                col += label.len() as u16;
                continue;
            } else {
                ruler_spans.push(Span::styled("|", Style::default().fg(Color::Yellow)));
            }
        } else if next_boundary(cell_start, minor) < cell_end {
            ruler_spans.push(Span::styled(".", Style::default().fg(Color::DarkGray)));
        } else {
            ruler_spans.push(Span::styled(" ", Style::default().fg(Color::DarkGray)));
        }
        col += 1;
    }

    frame.render_widget(Paragraph::new(Line::from(ruler_spans)), area);
}

/// Renders one channel lane of mirrored peak bars.
fn render_lane(
    frame: &mut Frame,
    area: Rect,
    pyramid: &WaveformPyramid,
    channel_index: usize,
    view_start: usize,
    view_span: usize,
    playhead_col: Option<u16>,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let channel = match pyramid.channel(channel_index) {
        Some(channel) => channel,
        None => return,
    };

    let selection = resolve(channel, view_start, view_span, pyramid.source_rate());
    let empty: &[f32] = &[];
    let values = channel
        .layer(selection.layer_index)
        .map(|layer| layer.y_values.as_slice())
        .unwrap_or(empty);

    // One bar extent per column, shared by every row pass.
    let width = area.width as usize;
    let bars: Vec<(u16, u16)> = (0..width)
        .map(|col| {
            let (i0, i1) = column_span(selection.start, selection.len, col, width);
            bar_rows(peak_amplitude(values, i0, i1), area.height)
        })
        .collect();
    let (baseline, _) = bar_rows(0.0, area.height);

    for row in 0..area.height {
        let mut line: Vec<Span> = Vec::with_capacity(width);
        for (col, &(top, bottom)) in bars.iter().enumerate() {
            let in_bar = top <= row && row <= bottom;
            let (ch, style) = if playhead_col == Some(col as u16) {
                let ch = if in_bar { '█' } else { '│' };
                (ch, Style::default().fg(Color::Yellow))
            } else if in_bar {
                ('█', Style::default().fg(Color::Cyan))
            } else if row == baseline {
                ('─', Style::default().fg(Color::DarkGray))
            } else {
                (' ', Style::default())
            };
            line.push(Span::styled(ch.to_string(), style));
        }
        frame.render_widget(
            Paragraph::new(Line::from(line)),
            Rect::new(area.x, area.y + row, area.width, 1),
        );
    }

    // Channel label overlay in the top-left corner of the lane.
    let label = format!("ch {}", channel_index + 1);
    if (label.len() as u16) <= area.width {
        frame.render_widget(
            Paragraph::new(Span::styled(label, Style::default().fg(Color::DarkGray))),
            Rect::new(area.x, area.y, area.width, 1),
        );
    }
}

/// Renders the waveform panel.
///
/// # Arguments
///
/// * `frame` - The frame to render to
/// * `area` - The area to render in
/// * `app` - Application state
pub fn render_waveform(frame: &mut Frame, area: Rect, app: &App) {
    let title = app
        .file_path
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| format!(" {} ", n.to_string_lossy()))
        .unwrap_or_else(|| " Waveform ".to_string());

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width < 2 || inner.height < 2 {
        return;
    }

    let buffer = match app.buffer() {
        Some(buffer) => buffer,
        None => {
            frame.render_widget(
                Paragraph::new(vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        "No file loaded",
                        Style::default().fg(Color::White),
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        "Press o to open a WAV file",
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
                .alignment(Alignment::Center),
                inner,
            );
            return;
        }
    };

    let pyramid = match app.cache.snapshot() {
        Some(pyramid) => pyramid,
        None => {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    "Building waveform...",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::ITALIC),
                )))
                .alignment(Alignment::Center),
                inner,
            );
            return;
        }
    };

    let view_span = app.view_span.max(1);
    render_ruler(
        frame,
        Rect::new(inner.x, inner.y, inner.width, 1),
        app.view_start,
        view_span,
        buffer.sample_rate(),
    );

    let lanes_area = Rect::new(
        inner.x,
        inner.y + 1,
        inner.width,
        inner.height.saturating_sub(1),
    );

    let channel_count = pyramid.channels().len();
    if channel_count == 0 || lanes_area.height == 0 {
        return;
    }

    // Playhead column, shared by every lane.
    let position = app.audio.position_frames();
    let playhead_col = if position >= app.view_start && position < app.view_start + view_span {
        Some(((position - app.view_start) * lanes_area.width as usize / view_span) as u16)
    } else {
        None
    };

    let lanes = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Ratio(1, channel_count as u32);
            channel_count
        ])
        .split(lanes_area);

    for (index, lane) in lanes.iter().enumerate() {
        render_lane(
            frame,
            *lane,
            &pyramid,
            index,
            app.view_start,
            view_span,
            playhead_col,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_span_subdivides_evenly() {
        // 1000 points over 100 columns: 10 points per column.
        assert_eq!(column_span(100, 1000, 0, 100), (100, 110));
        assert_eq!(column_span(100, 1000, 50, 100), (600, 610));
        assert_eq!(column_span(100, 1000, 99, 100), (1090, 1100));
    }

    #[test]
    fn test_column_span_sparse_points() {
        // Fewer points than columns: each column still covers one point.
        assert_eq!(column_span(100, 10, 0, 100), (100, 101));
        assert_eq!(column_span(100, 10, 50, 100), (105, 106));
        assert_eq!(column_span(100, 10, 99, 100), (109, 110));
    }

    #[test]
    fn test_column_span_empty_selection() {
        assert_eq!(column_span(7, 0, 3, 100), (7, 7));
    }

    #[test]
    fn test_peak_amplitude_uses_absolute_values() {
        let values = [0.1, -0.8, 0.3];
        assert_eq!(peak_amplitude(&values, 0, 3), 0.8);
        assert_eq!(peak_amplitude(&values, 2, 3), 0.3);
        // Ranges past the end clamp instead of panicking.
        assert_eq!(peak_amplitude(&values, 2, 9), 0.3);
        assert_eq!(peak_amplitude(&values, 5, 7), 0.0);
        assert_eq!(peak_amplitude(&values, 1, 1), 0.0);
    }

    #[test]
    fn test_bar_rows_mirror_around_center() {
        assert_eq!(bar_rows(0.0, 5), (2, 2));
        assert_eq!(bar_rows(0.5, 5), (1, 3));
        assert_eq!(bar_rows(1.0, 5), (0, 4));
        // Over-unity samples clamp to the lane.
        assert_eq!(bar_rows(2.0, 5), (0, 4));
        assert_eq!(bar_rows(1.0, 4), (0, 3));
        assert_eq!(bar_rows(1.0, 1), (0, 0));
    }

    #[test]
    fn test_next_boundary() {
        assert_eq!(next_boundary(0.0, 5.0), 0.0);
        assert_eq!(next_boundary(0.1, 5.0), 5.0);
        assert_eq!(next_boundary(12.3, 5.0), 15.0);
        assert_eq!(next_boundary(15.0, 5.0), 15.0);
    }

    #[test]
    fn test_ruler_label_precision_follows_step() {
        assert_eq!(ruler_label(0.0, 1.0), "0:00");
        assert_eq!(ruler_label(75.0, 5.0), "1:15");
        assert_eq!(ruler_label(0.25, 0.05), "0:00.250");
    }
}
