//! Cross-platform utilities.

pub mod platform;

pub use platform::{PathSeparator, is_windows};
