//! JSON export command.

use std::path::{Path, PathBuf};

use super::helpers::load_files;
use crate::cli::icons::success;
use crate::config::Settings;

/// Load export files and write the resulting records as JSON.
pub async fn cmd_export(
    settings: &Settings,
    files: &[PathBuf],
    pretty: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let (importer, _) = load_files(settings, files, None).await?;
    let snapshot = importer.repository().snapshot();

    let json = if pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };

    match output {
        Some(path) => {
            tokio::fs::write(path, json).await?;
            eprintln!(
                "{} Wrote {} manuscripts to {}",
                success(),
                snapshot.manuscripts.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}
