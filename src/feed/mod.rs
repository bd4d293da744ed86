//! Ride feed acquisition and ranking.
//!
//! - [`client`] - single HTTP GET against the queue-times endpoint
//! - [`parser`] - tolerant JSON decode into a flat list of [`RideStatus`]
//! - [`ranker`] - display ordering (open first, shortest wait first)
//!
//! [`load_rides`] runs all three and folds both failure kinds into a single
//! [`FeedError`], since the screen shows one "feed unavailable" message
//! either way.

mod client;
mod parser;
mod ranker;

pub use client::{
    FeedClient, FetchError, DEFAULT_CONNECT_TIMEOUT, DEFAULT_FEED_URL, DEFAULT_READ_TIMEOUT,
};
pub use parser::{parse, ParseError, RideStatus, Step, Tolerant, RIDE_SOURCES};
pub use ranker::rank;

use thiserror::Error;

/// The feed could not be turned into a ride list.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed unavailable: {0}")]
    Transport(#[from] FetchError),
    #[error("Feed unreadable: {0}")]
    Parse(#[from] ParseError),
}

/// Fetch, parse and rank the ride feed.
///
/// An empty feed is `Ok(vec![])`; surfacing "no rides" is up to the caller.
pub async fn load_rides(client: &FeedClient) -> Result<Vec<RideStatus>, FeedError> {
    let body = client.fetch_feed().await.inspect_err(|e| {
        tracing::warn!(url = %client.endpoint(), error = %e, "Ride feed fetch failed");
    })?;

    let rides = parse(&body).inspect_err(|e| {
        tracing::warn!(url = %client.endpoint(), error = %e, "Ride feed parse failed");
    })?;

    tracing::info!(count = rides.len(), "Ride feed loaded");
    Ok(rank(rides))
}
