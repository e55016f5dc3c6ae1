//! Shared helper functions for CLI commands.

use std::path::PathBuf;

use crate::cli::icons::error;
use crate::config::Settings;
use crate::import::{FileKind, ImportSummary, Importer};
use crate::repository::ManuscriptRepository;
use crate::store::Store;

/// Files named on the command line, or the configured defaults.
pub fn input_files(settings: &Settings, files: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let files = if files.is_empty() {
        settings.default_files.clone()
    } else {
        files.to_vec()
    };
    if files.is_empty() {
        anyhow::bail!("No input files. Pass export files or set `files` in the config.");
    }
    Ok(files)
}

/// Import `files` into a fresh store.
///
/// Unreadable files are reported and skipped; the rest still load.
pub async fn load_files(
    settings: &Settings,
    files: &[PathBuf],
    kind: Option<FileKind>,
) -> anyhow::Result<(Importer, Vec<ImportSummary>)> {
    let files = input_files(settings, files)?;
    let importer = Importer::new(ManuscriptRepository::new(Store::new()))
        .with_history_tokens(settings.history_tokens.clone());

    let mut summaries = Vec::with_capacity(files.len());
    for result in importer.import_files(&files, kind).await {
        match result {
            Ok(summary) => summaries.push(summary),
            Err(e) => eprintln!("{} {}", error(), e),
        }
    }
    Ok((importer, summaries))
}
