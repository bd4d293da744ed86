use crate::app::{App, LoginField};
use crate::auth::AuthAction;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::render::spinner_glyph;

const FORM_WIDTH: u16 = 52;
/// Bordered form: eleven content rows, two of them for a wrapped error line.
pub(super) const FORM_HEIGHT: u16 = 13;
const MASK: char = '•';

/// Render the login form
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let form = centered_box(FORM_WIDTH, FORM_HEIGHT, area);
    let inner_width = form.width.saturating_sub(4) as usize;
    let login = &app.login;

    let focused = |field: LoginField| login.focus == field && login.pending.is_none();

    let mut lines = vec![
        Line::from(Span::styled(
            app.park_name.as_str(),
            Style::default().fg(Color::Cyan),
        )),
        Line::default(),
        Line::from("Email"),
        input_line(&login.email, inner_width, focused(LoginField::Email)),
        Line::from("Password"),
        input_line(
            &mask(&login.password),
            inner_width,
            focused(LoginField::Password),
        ),
        Line::default(),
        Line::from(vec![
            button("[ Login ]", login.can_submit(), focused(LoginField::SignIn)),
            Span::raw("   "),
            button("[ Sign Up ]", login.can_submit(), focused(LoginField::SignUp)),
        ]),
        Line::default(),
    ];

    if let Some(action) = login.pending {
        let verb = match action {
            AuthAction::SignIn => "Logging in",
            AuthAction::SignUp => "Creating account",
        };
        lines.push(Line::from(format!(
            "{} {}...",
            spinner_glyph(app.spinner_frame),
            verb
        )));
    } else if let Some(error) = login.error {
        lines.push(Line::from(Span::styled(
            error,
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" 🎢 Ride Wait Times "),
        );
    f.render_widget(paragraph, form);
}

/// One masking glyph per character of the password.
fn mask(password: &str) -> String {
    std::iter::repeat(MASK).take(password.chars().count()).collect()
}

/// Text field with a cursor when focused. Long input shows its tail.
fn input_line(value: &str, width: usize, focused: bool) -> Line<'static> {
    let cursor = if focused { "_" } else { "" };
    let budget = width.saturating_sub(1);
    let chars: Vec<char> = value.chars().collect();
    let visible: String = chars[chars.len().saturating_sub(budget)..].iter().collect();

    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(Span::styled(format!("{}{}", visible, cursor), style))
}

fn button(label: &'static str, enabled: bool, focused: bool) -> Span<'static> {
    let style = match (enabled, focused) {
        (true, true) => Style::default()
            .bg(Color::Cyan)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(Color::White),
        (false, true) => Style::default().bg(Color::DarkGray).fg(Color::Gray),
        (false, false) => Style::default().fg(Color::DarkGray),
    };
    Span::styled(label, style)
}

/// Fixed-size rectangle centered in `area`, shrunk to fit.
fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}
