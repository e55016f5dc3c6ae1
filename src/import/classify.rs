//! Filename-based classification of export files.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Filename fragments that mark a status-history export.
pub const DEFAULT_HISTORY_TOKENS: &[&str] =
    &["history", "status", "status history", "manuscript status"];

/// The two kinds of export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// One row per manuscript.
    Metadata,
    /// One row per reviewer invitation.
    History,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Metadata => "metadata",
            FileKind::History => "history",
        }
    }

    /// Classify by filename using [`DEFAULT_HISTORY_TOKENS`].
    pub fn from_filename(name: &str) -> Self {
        Self::from_filename_with_tokens(name, DEFAULT_HISTORY_TOKENS)
    }

    /// History when the lowercased name contains any token; metadata otherwise.
    pub fn from_filename_with_tokens<S: AsRef<str>>(name: &str, tokens: &[S]) -> Self {
        let lowered = name.to_lowercase();
        let is_history = tokens
            .iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .any(|t| !t.is_empty() && lowered.contains(&t));
        if is_history {
            FileKind::History
        } else {
            FileKind::Metadata
        }
    }

    /// Classify by the final path component.
    pub fn from_path<S: AsRef<str>>(path: &Path, tokens: &[S]) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        Self::from_filename_with_tokens(&name, tokens)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
