pub mod access;
pub mod invoicing;

use tui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
};

/// One `Label: value` form row, highlighted when selected and showing a cursor while edited
pub(crate) fn field_line(label: &str, value: &str, selected: bool, editing: bool) -> Spans<'static> {
    if selected && editing {
        Spans::from(vec![
            Span::styled(format!("{}: ", label), Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{}|", value),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        let style = if selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        Spans::from(vec![
            Span::styled(format!("{}: ", label), style),
            Span::raw(value.to_string()),
        ])
    }
}

// Helper function to create a centered rect
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
