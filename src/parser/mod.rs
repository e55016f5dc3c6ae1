//! Parsers for upstream export formats.

pub mod tabular;

pub use tabular::{parse_tabular, Delimiter, TabularRow};
