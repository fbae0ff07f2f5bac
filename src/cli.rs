// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Deserialize;

/// Command-line arguments for `fileknockd`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "fileknockd",
    version,
    about = "Run actions when watched files and directories are closed.",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration directory to load drop-in files from (repeatable).
    ///
    /// Replaces the built-in search list when given.
    #[arg(long = "config-dir", value_name = "DIR")]
    pub config_dirs: Vec<PathBuf>,

    /// Optional daemon settings file (TOML).
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Start actions with the daemon's environment plus FK_PATH / FK_FILE,
    /// instead of only FK_PATH / FK_FILE.
    #[arg(long)]
    pub inherit_env: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, the settings file, `FILEKNOCK_LOG` or a default level is
    /// used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and compile configuration, print the watch set, then exit
    /// without subscribing or running anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI and in the settings file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
