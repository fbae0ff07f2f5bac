// src/config/settings.rs

//! Daemon-level settings.
//!
//! These are the daemon's own knobs, distinct from the drop-in watch files.
//! They come from, in order of precedence:
//! 1. CLI flags
//! 2. an optional TOML settings file (`--settings`)
//! 3. built-in defaults
//!
//! ```toml
//! config_dirs = ["/etc/fileknock.d", "/srv/fileknock.d"]
//! inherit_env = false
//! log_level = "debug"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::{CliArgs, LogLevel};
use crate::errors::{FileknockError, Result};
use crate::exec::EnvPolicy;

use super::discovery::default_config_dirs;

/// Direct mapping of the settings file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    #[serde(default)]
    pub config_dirs: Option<Vec<PathBuf>>,

    #[serde(default)]
    pub inherit_env: Option<bool>,

    #[serde(default)]
    pub log_level: Option<LogLevel>,
}

impl SettingsFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| FileknockError::SettingsError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(path, &contents)
    }

    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| FileknockError::SettingsError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Effective settings after merging CLI, settings file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_dirs: Vec<PathBuf>,
    pub env_policy: EnvPolicy,
    pub log_level: Option<LogLevel>,
    pub dry_run: bool,
}

impl Settings {
    /// Read the settings file named by `args` (if any) and merge.
    pub fn resolve(args: &CliArgs) -> Result<Self> {
        let file = match &args.settings {
            Some(path) => SettingsFile::load(path)?,
            None => SettingsFile::default(),
        };
        Ok(Self::merge(args, file))
    }

    pub fn merge(args: &CliArgs, file: SettingsFile) -> Self {
        let config_dirs = if !args.config_dirs.is_empty() {
            args.config_dirs.clone()
        } else {
            file.config_dirs.unwrap_or_else(default_config_dirs)
        };

        let inherit = args.inherit_env || file.inherit_env.unwrap_or(false);

        Self {
            config_dirs,
            env_policy: if inherit {
                EnvPolicy::Inherit
            } else {
                EnvPolicy::Isolated
            },
            log_level: args.log_level.or(file.log_level),
            dry_run: args.dry_run,
        }
    }
}
