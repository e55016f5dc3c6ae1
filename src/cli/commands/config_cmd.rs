//! Configuration management commands.

use console::style;

use crate::cli::icons::arrow;
use crate::config::{Config, Settings};

/// Print the effective settings as TOML.
pub fn cmd_config_show(settings: &Settings) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(settings)?);
    Ok(())
}

/// Print the config file in use, if any.
pub fn cmd_config_path(config: &Config) -> anyhow::Result<()> {
    match config.source_path {
        Some(ref path) => println!("{} {}", arrow(), path.display()),
        None => println!("{}", style("No config file found; using defaults").dim()),
    }
    Ok(())
}
