//! Common utility functions
//!
//! - **[`text`]**: char-boundary safe windows over UTF-8 text

pub mod text;

pub use self::text::{context_window, expand_left, expand_right, preceding_window};
