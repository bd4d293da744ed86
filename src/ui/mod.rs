//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling per screen
//! - `events` - Background task event processing
//! - `helpers` - Task spawning for fetches, auth and favorite saves
//! - `render` - Screen rendering dispatch
//! - `login` - Login form widget
//! - `rides` - Ride wait-time list widget
//! - `status` - Status bar widget

mod events;
mod helpers;
mod input;
mod login;
mod loop_runner;
mod render;
mod rides;
mod status;
#[cfg(test)]
mod test_support;

pub use loop_runner::{run, Action};
