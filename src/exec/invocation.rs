// src/exec/invocation.rs

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::watch::{ChangeEvent, WatchEntry};

/// Environment variable carrying the monitored directory or file.
pub const ENV_PATH: &str = "FK_PATH";
/// Environment variable carrying the child name the event was about.
pub const ENV_FILE: &str = "FK_FILE";

/// A fully parameterised action launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInvocation {
    executable: PathBuf,
    fk_path: PathBuf,
    fk_file: Option<OsString>,
}

impl ActionInvocation {
    pub fn new(executable: impl Into<PathBuf>, entry: &WatchEntry, event: &ChangeEvent) -> Self {
        Self {
            executable: executable.into(),
            fk_path: entry.target().path().to_path_buf(),
            fk_file: event.name.clone(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn fk_path(&self) -> &Path {
        &self.fk_path
    }

    pub fn fk_file(&self) -> Option<&OsStr> {
        self.fk_file.as_deref()
    }

    /// The variables the action is started with: `FK_PATH`, then `FK_FILE`
    /// when the event named a child.
    pub fn environment(&self) -> Vec<(&'static str, &OsStr)> {
        let mut env = vec![(ENV_PATH, self.fk_path.as_os_str())];
        if let Some(file) = &self.fk_file {
            env.push((ENV_FILE, file.as_os_str()));
        }
        env
    }
}
