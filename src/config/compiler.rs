// src/config/compiler.rs

//! Turns parsed configuration files into registered watches.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::engine::DaemonState;
use crate::errors::{FileknockError, Result};
use crate::fs::FileSystem;
use crate::watch::{ChangeSource, WatchEntry, WatchId, WatchTarget};

use super::discovery::config_files_in;
use super::keyvalue::KeyValueStore;

pub const KEY_MONITOR_PATH: &str = "MonitorPath";
pub const KEY_MONITOR_FILE: &str = "MonitorFile";
pub const KEY_CLOSED_EXEC: &str = "FileClosedExec";
pub const KEY_CLOSED_WRITE_EXEC: &str = "FileClosedWriteExec";

/// Result of compiling one configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// The file declares no `MonitorPath` / `MonitorFile`.
    NoWatch,
    /// The file declares a target but no action; nothing was subscribed.
    Inert(WatchEntry),
    /// Subscribed and registered.
    Registered(WatchId),
}

/// Totals of a full compile run over the configuration directories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileReport {
    pub files: usize,
    pub registered: usize,
    pub inert: usize,
    pub no_watch: usize,
    pub skipped: usize,
}

/// Build the watch entry declared by `store`, without subscribing anything.
///
/// - neither target key → `Ok(None)`
/// - both target keys → configuration error
/// - empty values count as absent
pub fn build_entry(origin: &Path, store: &KeyValueStore) -> Result<Option<WatchEntry>> {
    let target = match (
        store.get_non_empty(KEY_MONITOR_PATH),
        store.get_non_empty(KEY_MONITOR_FILE),
    ) {
        (None, None) => return Ok(None),
        (Some(_), Some(_)) => {
            return Err(FileknockError::ConfigError(format!(
                "{KEY_MONITOR_PATH} and {KEY_MONITOR_FILE} are mutually exclusive"
            )));
        }
        (Some(dir), None) => WatchTarget::Directory(PathBuf::from(dir)),
        (None, Some(file)) => WatchTarget::File(PathBuf::from(file)),
    };

    let on_close = store.get_non_empty(KEY_CLOSED_EXEC).map(PathBuf::from);
    let on_close_write = store.get_non_empty(KEY_CLOSED_WRITE_EXEC).map(PathBuf::from);

    Ok(Some(WatchEntry::new(origin, target, on_close, on_close_write)))
}

/// Compile one parsed file into `state`: build the entry, subscribe its
/// target and register it.
///
/// Errors are local to this file; the caller decides whether to continue.
pub fn compile<S: ChangeSource>(
    origin: &Path,
    store: &KeyValueStore,
    state: &mut DaemonState<S>,
) -> Result<CompileOutcome> {
    let Some(entry) = build_entry(origin, store)? else {
        return Ok(CompileOutcome::NoWatch);
    };

    let mask = entry.requested_mask();
    if mask.is_empty() {
        return Ok(CompileOutcome::Inert(entry));
    }

    let id = state
        .source
        .subscribe(entry.target(), mask)
        .map_err(|source| FileknockError::SubscribeError {
            path: entry.target().path().to_path_buf(),
            source,
        })?;

    info!(
        config = %origin.display(),
        target = ?entry.target(),
        watch_id = %id,
        ?mask,
        "watch registered"
    );
    state.registry.register(id, entry);
    Ok(CompileOutcome::Registered(id))
}

/// Load and compile every configuration file found in `dirs`, in order.
///
/// A bad file, a failed subscription or an unreadable directory is logged and
/// skipped; it never stops the remaining configuration from loading.
pub fn compile_dirs<S: ChangeSource>(
    fs: &dyn FileSystem,
    dirs: &[PathBuf],
    state: &mut DaemonState<S>,
) -> CompileReport {
    let mut report = CompileReport::default();

    for dir in dirs {
        let files = match config_files_in(fs, dir) {
            Ok(files) => files,
            Err(err) => {
                warn!(dir = %dir.display(), error = %format!("{err:#}"), "cannot read configuration directory");
                continue;
            }
        };

        for path in files {
            report.files += 1;
            info!(config = %path.display(), "configuration file");

            let outcome = KeyValueStore::load(fs, &path).and_then(|store| compile(&path, &store, state));
            match outcome {
                Ok(CompileOutcome::Registered(_)) => report.registered += 1,
                Ok(CompileOutcome::Inert(entry)) => {
                    report.inert += 1;
                    warn!(
                        config = %path.display(),
                        target = ?entry.target(),
                        "watch declares no {KEY_CLOSED_EXEC} or {KEY_CLOSED_WRITE_EXEC}; nothing subscribed"
                    );
                }
                Ok(CompileOutcome::NoWatch) => report.no_watch += 1,
                Err(err) => {
                    report.skipped += 1;
                    warn!(config = %path.display(), error = %err, "skipping configuration file");
                }
            }
        }
    }

    report
}
