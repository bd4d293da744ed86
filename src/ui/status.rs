use crate::app::{App, Screen};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.screen {
            Screen::Login => Cow::Borrowed("[Tab]next field [Enter]submit [Esc]quit"),
            Screen::Rides if app.auth.is_some() => {
                Cow::Borrowed("[j/k]move [s]ave favorite [r]eload [Esc]log out [q]uit")
            }
            Screen::Rides => Cow::Borrowed("[j/k]move [s]ave favorite [r]eload [q]uit"),
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
