//! Write-once favorite bookmarks.
//!
//! A favorite is a ride name recorded for a signed-in user. Writes are
//! best-effort: the UI fires them off and does not wait for the result.
//! [`FirebaseFavorites`] pushes to a Realtime Database;
//! [`crate::storage::Database`] keeps them in local SQLite.

mod firebase;

pub use firebase::FirebaseFavorites;

use crate::auth::Session;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FavoriteError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Invalid favorites URL: {0}")]
    InvalidUrl(String),
}

/// Destination for favorite writes.
#[async_trait]
pub trait FavoritesSink: Send + Sync {
    async fn save_favorite(&self, session: &Session, ride_name: &str)
        -> Result<(), FavoriteError>;
}
