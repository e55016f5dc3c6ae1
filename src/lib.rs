//! AJSR review reports.
//!
//! Ingests manuscript metadata and reviewer-history exports from a journal
//! submission system, normalizes them into an in-memory reactive store, and
//! serves live, searchable, sorted views for reports and certificates.

pub mod config;
pub mod import;
pub mod models;
pub mod parser;
pub mod repository;
pub mod services;
pub mod store;
pub mod utils;

pub use import::{FileKind, ImportError, ImportSummary, Importer};
pub use repository::{ManuscriptRepository, SearchView};
pub use store::{Store, StoreError, StoreEvent};
