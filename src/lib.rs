//! Terminal viewer for theme-park ride wait times.
//!
//! Fetches a park's queue-times feed, flattens and ranks the rides, and shows
//! them in a TUI. Users can sign in against Firebase and save favorite rides.

pub mod app;
pub mod auth;
pub mod config;
pub mod favorites;
pub mod feed;
pub mod storage;
pub mod ui;
pub mod util;
