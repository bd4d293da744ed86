use super::{FavoriteError, FavoritesSink};
use crate::auth::Session;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Favorites stored under `/favorites/<uid>` in a Firebase Realtime Database.
///
/// Each save is a REST `POST`, which appends a child with a generated key.
pub struct FirebaseFavorites {
    client: reqwest::Client,
    database_url: Url,
}

impl FirebaseFavorites {
    pub fn new(client: reqwest::Client, database_url: Url) -> Self {
        Self {
            client,
            database_url,
        }
    }

    fn user_list_url(&self, session: &Session) -> Result<Url, FavoriteError> {
        let mut url = self.database_url.clone();
        url.path_segments_mut()
            .map_err(|_| FavoriteError::InvalidUrl(self.database_url.to_string()))?
            .pop_if_empty()
            .push("favorites")
            .push(&format!("{}.json", session.uid));
        url.query_pairs_mut()
            .append_pair("auth", session.id_token.expose_secret());
        Ok(url)
    }
}

#[async_trait]
impl FavoritesSink for FirebaseFavorites {
    async fn save_favorite(
        &self,
        session: &Session,
        ride_name: &str,
    ) -> Result<(), FavoriteError> {
        let body = serde_json::Value::String(ride_name.to_string()).to_string();

        let response = self
            .client
            .post(self.user_list_url(session)?)
            .header(CONTENT_TYPE, "application/json")
            .timeout(REQUEST_TIMEOUT)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FavoriteError::HttpStatus(response.status().as_u16()));
        }

        tracing::debug!(uid = %session.uid, ride = %ride_name, "Favorite pushed");
        Ok(())
    }
}
