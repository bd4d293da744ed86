use crate::app::{App, RideListState};
use crate::feed::RideStatus;
use crate::util::{display_width, sanitize_label, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::render::spinner_glyph;

/// Render the ride wait-time screen: header, then the list or a placeholder.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_header(f, app, chunks[0]);

    let body = chunks[1];
    match &app.rides {
        RideListState::Loading => placeholder(
            f,
            body,
            format!("{} Loading wait times...", spinner_glyph(app.spinner_frame)),
            Color::Gray,
        ),
        RideListState::Failed => placeholder(
            f,
            body,
            format!("Could not load {} data.", app.park_name),
            Color::Red,
        ),
        RideListState::Loaded(rides) if rides.is_empty() => placeholder(
            f,
            body,
            format!("No rides found for {}.", app.park_name),
            Color::Gray,
        ),
        RideListState::Loaded(rides) => render_list(f, rides, app.selected_ride, body),
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            format!("🎢 {}", app.park_name),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Logged in as: {}", app.user_label())),
    ];
    let header = Paragraph::new(lines).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn placeholder(f: &mut Frame, area: Rect, text: String, color: Color) {
    let msg = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color));
    f.render_widget(msg, area);
}

fn render_list(f: &mut Frame, rides: &[RideStatus], selected: usize, area: Rect) {
    // Borders take two columns
    let width = area.width.saturating_sub(2) as usize;

    let items: Vec<ListItem> = rides
        .iter()
        .enumerate()
        .map(|(i, ride)| {
            let detail = detail_text(ride);
            let name_width = width.saturating_sub(display_width(&detail) + 1);
            let name = sanitize_label(&ride.name);
            let name = truncate_to_width(&name, name_width).into_owned();
            let pad = name_width.saturating_sub(display_width(&name));

            let name_style = if i == selected {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else {
                Style::default()
            };
            let detail_style = if ride.is_open {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            ListItem::new(Line::from(vec![
                Span::styled(name, name_style),
                Span::raw(" ".repeat(pad + 1)),
                Span::styled(detail, detail_style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Rides ({})", rides.len())),
        )
        .highlight_style(Style::default());

    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

/// "Status: Open | Wait: 25 min"
fn detail_text(ride: &RideStatus) -> String {
    format!(
        "Status: {} | Wait: {}",
        ride.status_label(),
        ride.wait_label()
    )
}
