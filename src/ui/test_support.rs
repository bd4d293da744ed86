//! Test doubles and a headless renderer for UI tests.

use crate::app::App;
use crate::auth::{AuthError, AuthProvider, Session};
use crate::favorites::{FavoriteError, FavoritesSink};
use crate::feed::FeedClient;
use async_trait::async_trait;
use ratatui::{backend::TestBackend, Terminal};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub(super) struct NullSink;

#[async_trait]
impl FavoritesSink for NullSink {
    async fn save_favorite(&self, _: &Session, _: &str) -> Result<(), FavoriteError> {
        Ok(())
    }
}

pub(super) struct NullAuth;

#[async_trait]
impl AuthProvider for NullAuth {
    async fn sign_in(&self, _: &str, _: &SecretString) -> Result<Session, AuthError> {
        Err(AuthError::InvalidCredentials)
    }
    async fn sign_up(&self, _: &str, _: &SecretString) -> Result<Session, AuthError> {
        Err(AuthError::WeakPassword)
    }
}

/// App for "Test Park"; with auth it starts on the login screen.
pub(super) fn test_app(with_auth: bool) -> App {
    let client = FeedClient::new(
        Url::parse("http://127.0.0.1:9/queue_times.json").unwrap(),
        Duration::from_millis(50),
        Duration::from_millis(50),
        "ridewait-test",
    )
    .unwrap();
    let auth: Option<Arc<dyn AuthProvider>> = if with_auth {
        Some(Arc::new(NullAuth))
    } else {
        None
    };
    App::new("Test Park", client, auth, Arc::new(NullSink))
}

/// Draw one full frame at `width` x `height` and return its rows as text.
pub(super) fn draw(app: &App, width: u16, height: u16) -> Vec<String> {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|f| super::render::render(f, app)).unwrap();

    let buffer = terminal.backend().buffer();
    (0..height)
        .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect())
        .collect()
}

pub(super) fn contains(rows: &[String], needle: &str) -> bool {
    rows.iter().any(|row| row.contains(needle))
}
