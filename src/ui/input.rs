//! Input handling for the TUI.
//!
//! Routes key presses to the login form or the ride list depending on the
//! current screen.

use crate::app::{App, AppEvent, LoginField, Screen};
use crate::auth::AuthAction;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{spawn_auth, spawn_favorite_save, start_ride_fetch};
use super::Action;

/// Longest email or password the form accepts.
const MAX_FIELD_LENGTH: usize = 256;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Ok(Action::Quit);
    }

    match app.screen {
        Screen::Login => Ok(handle_login_input(app, code, modifiers, event_tx)),
        Screen::Rides => Ok(handle_rides_input(app, code, event_tx)),
    }
}

fn handle_login_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if code == KeyCode::Esc {
        return Action::Quit;
    }
    // Form is frozen while a request is in flight
    if app.login.pending.is_some() {
        return Action::Continue;
    }

    match code {
        KeyCode::Tab | KeyCode::Down => app.login.focus = app.login.focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.login.focus = app.login.focus.prev(),
        KeyCode::Enter => match app.login.focus {
            LoginField::Email => app.login.focus = LoginField::Password,
            LoginField::Password | LoginField::SignIn => {
                spawn_auth(app, AuthAction::SignIn, event_tx)
            }
            LoginField::SignUp => spawn_auth(app, AuthAction::SignUp, event_tx),
        },
        KeyCode::Backspace => {
            if let Some(input) = app.login.focused_input() {
                input.pop();
            }
        }
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(input) = app.login.focused_input() {
                if input.chars().count() < MAX_FIELD_LENGTH && !c.is_control() {
                    input.push(c);
                }
            }
        }
        _ => {}
    }
    Action::Continue
}

fn handle_rides_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Char('g') | KeyCode::Home => app.nav_first(),
        KeyCode::Char('G') | KeyCode::End => app.nav_last(),
        KeyCode::Char('s') => spawn_favorite_save(app),
        KeyCode::Char('r') => {
            if !start_ride_fetch(app, event_tx) {
                app.set_status("Already loading...");
            }
        }
        KeyCode::Esc => {
            if app.leave_rides() {
                tracing::info!("Returned to login screen");
            }
        }
        _ => {}
    }
    Action::Continue
}
