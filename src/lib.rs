// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod watch;

use std::path::PathBuf;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::{build_entry, compile_dirs, config_files_in, KeyValueStore, Settings};
use crate::engine::{ControlEvent, Daemon, DaemonState};
use crate::errors::{FileknockError, Result};
use crate::exec::ProcessExecutor;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::{ChangeSource, InotifySource};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - configuration discovery and compilation
/// - the inotify change source and watch registry
/// - the process executor
/// - signal handling (SIGINT/SIGTERM shutdown, SIGHUP reload)
pub async fn run(settings: Settings) -> Result<()> {
    if settings.dry_run {
        print_dry_run(&RealFileSystem, &settings.config_dirs);
        return Ok(());
    }

    // Signals received while compiling queue up for the loop.
    let (control_tx, control_rx) = mpsc::channel::<ControlEvent>(8);
    spawn_signal_listener(control_tx)?;

    let state = build_state(&RealFileSystem, &settings.config_dirs)?;
    let executor = ProcessExecutor::new(settings.env_policy);

    let reload_dirs = settings.config_dirs.clone();
    let daemon = Daemon::new(state, executor, control_rx)
        .with_reloader(move || build_state(&RealFileSystem, &reload_dirs));

    daemon.run().await?;
    Ok(())
}

/// Create a fresh inotify instance and compile every configuration
/// directory into it.
///
/// Only failing to create the inotify instance is an error; problems with
/// individual files are logged and skipped.
pub fn build_state(fs: &dyn FileSystem, dirs: &[PathBuf]) -> Result<DaemonState<InotifySource>> {
    let source = InotifySource::new().map_err(FileknockError::InitError)?;
    Ok(compile_state(fs, dirs, source))
}

/// Compile every configuration directory into a new state around `source`.
pub fn compile_state<S: ChangeSource>(
    fs: &dyn FileSystem,
    dirs: &[PathBuf],
    source: S,
) -> DaemonState<S> {
    let mut state = DaemonState::new(source);
    let report = compile_dirs(fs, dirs, &mut state);
    info!(
        files = report.files,
        registered = report.registered,
        inert = report.inert,
        skipped = report.skipped,
        watches = state.registry.watch_count(),
        "configuration compiled"
    );
    state
}

/// Forward process signals to the daemon loop as control events.
fn spawn_signal_listener(tx: mpsc::Sender<ControlEvent>) -> Result<()> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = interrupt.recv() => {
                    info!("received SIGINT");
                    ControlEvent::Shutdown
                }
                _ = terminate.recv() => {
                    info!("received SIGTERM");
                    ControlEvent::Shutdown
                }
                _ = hangup.recv() => {
                    info!("received SIGHUP");
                    ControlEvent::Reload
                }
            };

            if tx.send(event).await.is_err() || event == ControlEvent::Shutdown {
                break;
            }
        }
        debug!("signal listener finished");
    });

    Ok(())
}

/// Dry-run output: every configuration file and the watch it would create.
fn print_dry_run(fs: &dyn FileSystem, dirs: &[PathBuf]) {
    println!("fileknockd dry-run");

    for dir in dirs {
        let files = match config_files_in(fs, dir) {
            Ok(files) => files,
            Err(err) => {
                println!("{}: unreadable ({err:#})", dir.display());
                continue;
            }
        };
        if files.is_empty() {
            continue;
        }

        println!("{}:", dir.display());
        for path in files {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            match KeyValueStore::load(fs, &path).and_then(|store| build_entry(&path, &store)) {
                Ok(None) => println!("  - {name}: no watch"),
                Ok(Some(entry)) => {
                    println!("  - {name}: {:?}", entry.target());
                    if let Some(action) = entry.on_close() {
                        println!("      on close: {}", action.display());
                    }
                    if let Some(action) = entry.on_close_write() {
                        println!("      on close-write: {}", action.display());
                    }
                    if entry.requested_mask().is_empty() {
                        println!("      (inert: no action configured)");
                    }
                }
                Err(err) => println!("  - {name}: rejected ({err})"),
            }
        }
    }

    debug!("dry-run complete (nothing subscribed)");
}
