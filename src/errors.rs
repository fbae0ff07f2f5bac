// src/errors.rs

//! Crate-wide error type and result alias.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileknockError {
    /// A configuration file is malformed or contradictory. Recoverable: the
    /// offending file is skipped.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The daemon settings file could not be read or parsed.
    #[error("Settings error in {path:?}: {reason}")]
    SettingsError { path: PathBuf, reason: String },

    /// The change-notification subsystem refused a watch. Recoverable.
    #[error("Cannot watch '{}': {source}", path.display())]
    SubscribeError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The change-notification subsystem itself could not be created.
    #[error("Failed to initialise change notification: {0}")]
    InitError(#[source] io::Error),

    /// Reading pending notifications failed. Fatal.
    #[error("Failed to read change notifications: {0}")]
    EventReadError(#[source] io::Error),

    /// An action could not be started. Recoverable.
    #[error("Failed to spawn action '{}': {source}", path.display())]
    SpawnError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl FileknockError {
    /// Whether this error only affects a single configuration entry or action
    /// and the daemon can carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FileknockError::ConfigError(_)
                | FileknockError::SubscribeError { .. }
                | FileknockError::SpawnError { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FileknockError>;
