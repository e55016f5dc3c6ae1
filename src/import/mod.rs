//! Import pipeline: export file text to normalized store rows.

pub mod aliases;
pub mod classify;
pub mod mapper;
pub mod runner;

pub use classify::{FileKind, DEFAULT_HISTORY_TOKENS};
pub use mapper::{map_history_row, map_metadata_row};
pub use runner::{ImportError, ImportSummary, Importer};
