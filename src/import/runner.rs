//! File import: read, parse, map and write one batch per file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::classify::{FileKind, DEFAULT_HISTORY_TOKENS};
use super::mapper::{map_history_row, map_metadata_row};
use crate::parser::parse_tabular;
use crate::repository::ManuscriptRepository;

/// Errors that can occur while importing a file.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Import of {path} did not complete: {reason}")]
    Interrupted { path: PathBuf, reason: String },
}

/// Outcome of importing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub file: String,
    pub kind: FileKind,
    /// Data rows parsed from the file.
    pub rows_read: usize,
    /// Rows that mapped to a record and were written.
    pub records_written: usize,
    /// Distinct stored rows whose data changed.
    pub rows_changed: usize,
    /// Rows dropped for lacking a manuscript id.
    pub rows_skipped: usize,
}

/// Imports export files into a [`ManuscriptRepository`].
#[derive(Clone)]
pub struct Importer {
    repo: ManuscriptRepository,
    history_tokens: Vec<String>,
}

impl Importer {
    pub fn new(repo: ManuscriptRepository) -> Self {
        Self {
            repo,
            history_tokens: DEFAULT_HISTORY_TOKENS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Replace the filename tokens that mark a history export.
    pub fn with_history_tokens(mut self, tokens: Vec<String>) -> Self {
        self.history_tokens = tokens;
        self
    }

    pub fn repository(&self) -> &ManuscriptRepository {
        &self.repo
    }

    pub fn classify(&self, path: &Path) -> FileKind {
        FileKind::from_path(path, self.history_tokens.as_slice())
    }

    /// Import already-loaded text. All records land in a single batch.
    pub fn import_text(&self, file: &str, text: &str, kind: FileKind) -> ImportSummary {
        let rows = parse_tabular(text.strip_prefix('\u{feff}').unwrap_or(text));
        let rows_read = rows.len();

        let (records_written, rows_changed) = match kind {
            FileKind::Metadata => {
                let records: Vec<_> = rows
                    .iter()
                    .enumerate()
                    .filter_map(|(i, row)| {
                        let record = map_metadata_row(row);
                        if record.is_none() {
                            debug!("{}: skipping row {} without manuscript id", file, i + 1);
                        }
                        record
                    })
                    .collect();
                (records.len(), self.repo.save_manuscripts(records))
            }
            FileKind::History => {
                let records: Vec<_> = rows
                    .iter()
                    .enumerate()
                    .filter_map(|(i, row)| {
                        let record = map_history_row(row);
                        if record.is_none() {
                            debug!("{}: skipping row {} without manuscript id", file, i + 1);
                        }
                        record
                    })
                    .collect();
                (records.len(), self.repo.save_history(records))
            }
        };

        let summary = ImportSummary {
            file: file.to_string(),
            kind,
            rows_read,
            records_written,
            rows_changed,
            rows_skipped: rows_read - records_written,
        };

        info!(
            "Imported {} as {}: {} rows, {} written, {} changed, {} skipped",
            summary.file,
            summary.kind,
            summary.rows_read,
            summary.records_written,
            summary.rows_changed,
            summary.rows_skipped
        );
        summary
    }

    /// Read and import one file. `kind` overrides filename classification.
    ///
    /// A file that cannot be read leaves the store untouched.
    pub async fn import_file(
        &self,
        path: &Path,
        kind: Option<FileKind>,
    ) -> Result<ImportSummary, ImportError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| {
            warn!("Failed to read {}: {}", path.display(), source);
            ImportError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let text = String::from_utf8_lossy(&bytes);
        let kind = kind.unwrap_or_else(|| self.classify(path));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(self.import_text(&name, &text, kind))
    }

    /// Import several files concurrently. Results follow the input order and
    /// each file is its own batch, so one failure does not affect the others.
    pub async fn import_files(
        &self,
        paths: &[PathBuf],
        kind: Option<FileKind>,
    ) -> Vec<Result<ImportSummary, ImportError>> {
        let handles: Vec<_> = paths
            .iter()
            .cloned()
            .map(|path| {
                let importer = self.clone();
                tokio::spawn(async move { importer.import_file(&path, kind).await })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (handle, path) in handles.into_iter().zip(paths) {
            results.push(handle.await.unwrap_or_else(|e| {
                Err(ImportError::Interrupted {
                    path: path.clone(),
                    reason: e.to_string(),
                })
            }));
        }
        results
    }
}
