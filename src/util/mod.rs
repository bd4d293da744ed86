//! Terminal text helpers: Unicode-aware width/truncation and sanitising
//! feed-supplied labels before they are drawn.

mod text;

pub use text::{display_width, sanitize_label, truncate_to_width};
