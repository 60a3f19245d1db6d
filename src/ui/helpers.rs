use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};

use crate::models::LinkKind;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Terminal cursor for `column`/`row` offsets inside `area`, pinned to the
/// last cell so long input never moves it past the popup border.
pub(crate) fn cursor_in(area: Rect, column: usize, row: u16) -> (u16, u16) {
    let column = u16::try_from(column).unwrap_or(u16::MAX);
    let last_column = area.right().saturating_sub(1).max(area.x);
    let last_row = area.bottom().saturating_sub(1).max(area.y);
    (
        area.x.saturating_add(column).min(last_column),
        area.y.saturating_add(row).min(last_row),
    )
}

/// Badge colour for a link kind.
pub(crate) fn kind_style(kind: LinkKind) -> Style {
    match kind {
        LinkKind::YouTube => Style::default().fg(Color::Red),
        LinkKind::Tabs => Style::default().fg(Color::Green),
    }
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
