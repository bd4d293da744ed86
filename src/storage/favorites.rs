use async_trait::async_trait;

use super::schema::Database;
use super::types::Favorite;
use crate::auth::Session;
use crate::favorites::{FavoriteError, FavoritesSink};

impl Database {
    // ========================================================================
    // Favorite Operations
    // ========================================================================

    /// Record a favorite ride for a user, returning the new row id.
    ///
    /// Saving the same ride twice stores two rows, matching push semantics
    /// of the remote sink.
    pub async fn insert_favorite(&self, user_id: &str, ride_name: &str) -> Result<i64, sqlx::Error> {
        let now = chrono::Utc::now().timestamp();
        let result =
            sqlx::query("INSERT INTO favorites (user_id, ride_name, saved_at) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(ride_name)
                .bind(now)
                .execute(&self.pool)
                .await?;
        Ok(result.last_insert_rowid())
    }

    /// All favorites for a user, newest first.
    pub async fn favorites_for(&self, user_id: &str) -> Result<Vec<Favorite>, sqlx::Error> {
        sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, user_id, ride_name, saved_at
            FROM favorites
            WHERE user_id = ?
            ORDER BY saved_at DESC, id DESC
        "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[async_trait]
impl FavoritesSink for Database {
    async fn save_favorite(
        &self,
        session: &Session,
        ride_name: &str,
    ) -> Result<(), FavoriteError> {
        let id = self.insert_favorite(&session.uid, ride_name).await?;
        tracing::debug!(uid = %session.uid, ride = %ride_name, id, "Favorite stored locally");
        Ok(())
    }
}
