//! Repository layer over the in-memory store.

pub mod manuscripts;
pub mod search;

pub use manuscripts::{ManuscriptRepository, Snapshot, HISTORY_BY_MANUSCRIPT};
pub use search::{search_definition, SearchView, SEARCH_COLUMNS, SEARCH_QUERY_ID};
