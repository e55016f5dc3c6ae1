//! Configuration management using the prefer crate.
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! an optional config file (TOML, YAML or JSON), and `AJSR_*` environment
//! variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::import::DEFAULT_HISTORY_TOKENS;
use crate::models::manuscript::columns;
use crate::utils::DEFAULT_DEBOUNCE;

/// Name used for config file discovery.
pub const CONFIG_NAME: &str = "ajsr";

pub const ENV_SORT_COLUMN: &str = "AJSR_SORT_COLUMN";
pub const ENV_SORT_DESC: &str = "AJSR_SORT_DESC";
pub const ENV_DEBOUNCE_MS: &str = "AJSR_DEBOUNCE_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Column the manuscript list is sorted by.
    pub sort_column: String,
    pub sort_descending: bool,
    /// Quiet period before a search term is applied.
    #[serde(serialize_with = "duration_ms::serialize")]
    pub debounce: Duration,
    /// Filename fragments that mark a status-history export.
    pub history_tokens: Vec<String>,
    /// Files imported when a command is given none.
    pub default_files: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sort_column: columns::INITIAL_SUBMISSION_DATE.to_string(),
            sort_descending: false,
            debounce: DEFAULT_DEBOUNCE,
            history_tokens: DEFAULT_HISTORY_TOKENS.iter().map(|t| t.to_string()).collect(),
            default_files: Vec::new(),
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Sort column for manuscript listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_column: Option<String>,
    /// Sort descending instead of ascending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_descending: Option<bool>,
    /// Search debounce in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    /// Filename fragments that mark a status-history export.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[prefer(default)]
    pub history_tokens: Vec<String>,
    /// Export files to import when none are given on the command line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[prefer(default)]
    pub files: Vec<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover an `ajsr` config file in the standard locations.
    /// Falls back to defaults when none is found or it cannot be loaded.
    pub async fn load() -> Self {
        let path = match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => pref_config.source_path().map(|p| p.to_path_buf()),
            Err(_) => None,
        };

        let Some(path) = path else {
            tracing::debug!("No config file found, using defaults");
            return Self::default();
        };

        match Self::load_from_path(&path).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file path, format chosen by extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(path, &contents)?;
        config.source_path = Some(path.to_path_buf());
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error("TOML", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error("YAML", e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_error("JSON", e.to_string())),
        }
    }

    /// Directory of the config file, if it came from one.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Expand `~` and resolve relative paths against `base_dir`.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref column) = self.sort_column {
            settings.sort_column = column.clone();
        }
        if let Some(descending) = self.sort_descending {
            settings.sort_descending = descending;
        }
        if let Some(ms) = self.debounce_ms {
            settings.debounce = Duration::from_millis(ms);
        }
        if !self.history_tokens.is_empty() {
            settings.history_tokens = self.history_tokens.clone();
        }
        if !self.files.is_empty() {
            settings.default_files = self
                .files
                .iter()
                .map(|f| self.resolve_path(f, base_dir))
                .collect();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of the config file directory.
    pub use_cwd: bool,
}

/// Apply `AJSR_*` overrides read through `lookup`.
fn apply_env_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(column) = var(ENV_SORT_COLUMN) {
        tracing::debug!("Using {} from environment: {}", ENV_SORT_COLUMN, column);
        settings.sort_column = column.trim().to_string();
    }
    if let Some(desc) = var(ENV_SORT_DESC) {
        settings.sort_descending = matches!(
            desc.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );
    }
    if let Some(ms) = var(ENV_DEBOUNCE_MS) {
        match ms.trim().parse::<u64>() {
            Ok(ms) => settings.debounce = Duration::from_millis(ms),
            Err(_) => tracing::warn!("Ignoring invalid {}: {}", ENV_DEBOUNCE_MS, ms),
        }
    }
}

/// Load settings with explicit options.
///
/// An explicit config path that cannot be loaded is an error; a discovered
/// one that cannot be loaded falls back to defaults.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> Result<(Settings, Config), ConfigError> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };

    let cwd = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let base_dir = if options.use_cwd {
        cwd()
    } else {
        config.base_dir().unwrap_or_else(cwd)
    };

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());

    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.sort_column, "initialSubmissionDate");
        assert!(!settings.sort_descending);
        assert_eq!(settings.debounce, Duration::from_millis(300));
        assert_eq!(
            settings.history_tokens,
            vec!["history", "status", "status history", "manuscript status"]
        );
    }

    #[tokio::test]
    async fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ajsr.toml");
        tokio::fs::write(
            &path,
            "sort_column = \"daysWithEditor\"\nsort_descending = true\ndebounce_ms = 50\nfiles = [\"exports/meta.tsv\"]\n",
        )
        .await
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.sort_column.as_deref(), Some("daysWithEditor"));
        assert_eq!(config.base_dir().as_deref(), Some(dir.path()));

        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, dir.path());
        assert!(settings.sort_descending);
        assert_eq!(settings.debounce, Duration::from_millis(50));
        assert_eq!(settings.default_files, vec![dir.path().join("exports/meta.tsv")]);
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("ajsr.yaml");
        tokio::fs::write(&yaml, "history_tokens:\n  - reviews\n").await.unwrap();
        let config = Config::load_from_path(&yaml).await.unwrap();
        assert_eq!(config.history_tokens, vec!["reviews"]);

        let json = dir.path().join("ajsr.json");
        tokio::fs::write(&json, r#"{"debounce_ms": 10}"#).await.unwrap();
        let config = Config::load_from_path(&json).await.unwrap();
        assert_eq!(config.debounce_ms, Some(10));
    }

    #[tokio::test]
    async fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ajsr.toml");
        tokio::fs::write(&path, "sort_column = [").await.unwrap();
        let err = Config::load_from_path(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "TOML", .. }));
    }

    #[tokio::test]
    async fn test_explicit_missing_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            use_cwd: false,
        };
        let err = load_settings_with_options(options).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_SORT_COLUMN, "editor"),
            (ENV_SORT_DESC, "TRUE"),
            (ENV_DEBOUNCE_MS, "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, |name| env.get(name).map(|v| v.to_string()));
        assert_eq!(settings.sort_column, "editor");
        assert!(settings.sort_descending);
        assert_eq!(settings.debounce, DEFAULT_DEBOUNCE);
    }

    #[test]
    fn test_resolve_path() {
        let config = Config::default();
        let base = Path::new("/data");
        assert_eq!(config.resolve_path("/abs/file.tsv", base), PathBuf::from("/abs/file.tsv"));
        assert_eq!(config.resolve_path("rel.tsv", base), PathBuf::from("/data/rel.tsv"));
    }
}
