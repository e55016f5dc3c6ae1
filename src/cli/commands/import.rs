//! Export file import command.

use std::path::PathBuf;

use console::style;

use super::helpers::load_files;
use crate::cli::icons::{success, warning};
use crate::config::Settings;
use crate::import::FileKind;

/// Import export files and print a summary per file.
pub async fn cmd_import(
    settings: &Settings,
    files: &[PathBuf],
    kind: Option<FileKind>,
    json: bool,
) -> anyhow::Result<()> {
    let (importer, summaries) = load_files(settings, files, kind).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        println!(
            "{} {} ({})",
            success(),
            style(&summary.file).bold(),
            style(summary.kind).dim()
        );
        println!(
            "  {} rows read, {} records written",
            summary.rows_read, summary.records_written
        );
        if summary.rows_skipped > 0 {
            println!(
                "  {} {} rows skipped (no manuscript number)",
                warning(),
                summary.rows_skipped
            );
        }
    }

    let repo = importer.repository();
    println!();
    println!(
        "{} manuscripts, {} history events",
        style(repo.manuscript_count()).cyan(),
        style(repo.history_count()).cyan()
    );
    Ok(())
}
