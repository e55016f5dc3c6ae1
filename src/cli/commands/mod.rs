//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod config_cmd;
mod export;
mod helpers;
mod import;
mod report;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};
use crate::import::FileKind;

#[derive(Parser)]
#[command(name = "ajsr")]
#[command(about = "Manuscript review reports from journal submission exports")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Import export files and show what each contributed
    Import {
        /// Export files (tab- or comma-separated); defaults to the configured files
        files: Vec<PathBuf>,
        /// Treat every file as this kind instead of classifying by filename
        #[arg(short, long, value_enum)]
        kind: Option<FileKind>,
        /// Print summaries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print review reports for matching manuscripts
    Report {
        /// Export files to load
        files: Vec<PathBuf>,
        /// Only manuscripts whose id contains this text (case-sensitive)
        #[arg(short, long, default_value = "")]
        search: String,
        /// Column to sort by (defaults to the configured sort column)
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long, conflicts_with = "asc")]
        desc: bool,
        /// Sort ascending, overriding a descending configured default
        #[arg(long)]
        asc: bool,
        /// Print the copyable text block instead of the formatted card
        #[arg(long)]
        plain: bool,
    },

    /// Export loaded records as JSON
    Export {
        /// Export files to load
        files: Vec<PathBuf>,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interactive search: each stdin line replaces the search term
    Search {
        /// Export files to load
        files: Vec<PathBuf>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show which config file was loaded
    Path,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
    };
    let (settings, config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Import { files, kind, json } => {
            import::cmd_import(&settings, &files, kind, json).await
        }
        Commands::Report {
            files,
            search,
            sort,
            desc,
            asc,
            plain,
        } => {
            let descending = sort_direction(desc, asc);
            report::cmd_report(&settings, &files, &search, sort.as_deref(), descending, plain).await
        }
        Commands::Export {
            files,
            pretty,
            output,
        } => export::cmd_export(&settings, &files, pretty, output.as_deref()).await,
        Commands::Search { files } => search::cmd_search(&settings, &files).await,
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(&settings),
            ConfigCommands::Path => config_cmd::cmd_config_path(&config),
        },
    }
}

/// Explicit sort direction from the report flags; `None` keeps the configured one.
fn sort_direction(desc: bool, asc: bool) -> Option<bool> {
    match (desc, asc) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
