//! Terminal user interface components.
//!
//! This module provides the visual components for the waveform player,
//! including the transport bar, the waveform display, and the overlays.

mod dialogs;
mod help;
mod transport;
mod waveform;

use crate::app::{App, LayoutRegions};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

pub use dialogs::render_file_browser;
pub use help::render_help;
pub use transport::render_transport;
pub use waveform::render_waveform;

/// Splits the terminal into the transport row and the waveform panel
/// and records the regions the mouse handlers hit-test against.
fn calculate_layout(size: Rect) -> (LayoutRegions, [Rect; 2]) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Transport bar
            Constraint::Min(6),    // Waveform display
        ])
        .split(size);

    let waveform = main_chunks[1];

    // Columns inside the waveform borders; the same columns the plot
    // and the ruler are drawn in, so a click on either seeks.
    let wave_plot = Rect {
        x: waveform.x + 1,
        y: waveform.y + 1,
        width: waveform.width.saturating_sub(2),
        height: waveform.height.saturating_sub(2),
    };

    let layout = LayoutRegions {
        transport: main_chunks[0],
        waveform,
        wave_plot,
    };

    let main_arr = [main_chunks[0], main_chunks[1]];

    (layout, main_arr)
}

/// Draws one frame: transport, waveform, then whichever overlay is open.
pub fn render(frame: &mut Frame, app: &mut App) {
    let size = frame.area();
    let (layout, main_chunks) = calculate_layout(size);

    // The mouse handlers hit-test against the regions drawn this frame
    app.update_layout(layout);

    render_transport(frame, main_chunks[0], app);
    render_waveform(frame, main_chunks[1], app);

    if app.file_browser.open {
        render_file_browser(frame, app);
    }

    if app.show_help {
        render_help(frame, app.help_scroll);
    }
}

/// Centers a rectangle of the given percentage size within `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = (area.width as u32 * percent_x as u32 / 100) as u16;
    let height = (area.height as u32 * percent_y as u32 / 100) as u16;
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
