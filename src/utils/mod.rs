//! Shared utility functions.
//!
//! - `numeric`: lenient integer parsing for export cells
//! - `debounce`: caller-side throttling of rapid input

pub mod debounce;
mod numeric;

pub use debounce::{debounce, DEFAULT_DEBOUNCE};
pub use numeric::parse_leading_int;
