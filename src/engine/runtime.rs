// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::errors::{FileknockError, Result};
use crate::exec::ActionExecutor;
use crate::watch::{ChangeEvent, ChangeSource, Notification};

use super::ControlEvent;
use super::dispatcher::resolve;
use super::state::DaemonState;

/// Builds a complete replacement state on reload.
pub type Reloader<S> = Box<dyn FnMut() -> Result<DaemonState<S>> + Send>;

/// Counters reported when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub events: u64,
    pub actions_fired: u64,
    pub spawn_failures: u64,
    pub overflows: u64,
    pub reloads: u64,
}

/// The daemon's single hot loop.
///
/// Waits on the change source and the control channel at once. Each wake-up
/// drains everything pending, resolves it against the registry and hands the
/// resulting invocations to the executor, which returns without waiting for
/// the action.
pub struct Daemon<S: ChangeSource, E: ActionExecutor> {
    state: DaemonState<S>,
    executor: E,
    control_rx: mpsc::Receiver<ControlEvent>,
    reloader: Option<Reloader<S>>,
    stats: DispatchStats,
}

impl<S: ChangeSource, E: ActionExecutor> fmt::Debug for Daemon<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Daemon")
            .field("watches", &self.state.registry.watch_count())
            .field("entries", &self.state.registry.entry_count())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<S: ChangeSource, E: ActionExecutor> Daemon<S, E> {
    pub fn new(
        state: DaemonState<S>,
        executor: E,
        control_rx: mpsc::Receiver<ControlEvent>,
    ) -> Self {
        Self {
            state,
            executor,
            control_rx,
            reloader: None,
            stats: DispatchStats::default(),
        }
    }

    /// Enable SIGHUP-style reloads.
    pub fn with_reloader(
        mut self,
        reloader: impl FnMut() -> Result<DaemonState<S>> + Send + 'static,
    ) -> Self {
        self.reloader = Some(Box::new(reloader));
        self
    }

    /// Main loop.
    ///
    /// Returns on `Shutdown` (or when every control sender is gone). A failed
    /// read from the change source is fatal and returned as
    /// [`FileknockError::EventReadError`].
    pub async fn run(mut self) -> Result<DispatchStats> {
        info!(
            watches = self.state.registry.watch_count(),
            entries = self.state.registry.entry_count(),
            "fileknock daemon started"
        );

        loop {
            tokio::select! {
                biased;

                control = self.control_rx.recv() => match control {
                    Some(ControlEvent::Reload) => self.reload(),
                    Some(ControlEvent::Shutdown) => {
                        info!("shutdown requested");
                        break;
                    }
                    None => {
                        info!("control channel closed; exiting");
                        break;
                    }
                },

                batch = self.state.source.next_batch() => {
                    let batch = batch.map_err(FileknockError::EventReadError)?;
                    self.handle_batch(batch);
                }
            }
        }

        info!(stats = ?self.stats, "fileknock daemon exiting");
        Ok(self.stats)
    }

    fn handle_batch(&mut self, batch: Vec<Notification>) {
        debug!(count = batch.len(), "drained notifications");
        for notification in batch {
            match notification {
                Notification::Change(event) => self.dispatch(&event),
                Notification::Overflow => {
                    self.stats.overflows += 1;
                    warn!("change notification queue overflowed; events were dropped");
                }
                Notification::Removed(id) => {
                    warn!(watch_id = %id, "watch removed by the kernel (target deleted or unmounted)");
                }
            }
        }
    }

    fn dispatch(&mut self, event: &ChangeEvent) {
        self.stats.events += 1;

        let invocations = resolve(&self.state.registry, event);
        debug!(
            watch_id = %event.watch_id,
            mask = ?event.mask,
            name = ?event.name,
            matched = invocations.len(),
            "close event"
        );

        for invocation in invocations {
            match self.executor.fire(&invocation) {
                Ok(pid) => {
                    self.stats.actions_fired += 1;
                    debug!(pid, action = %invocation.executable().display(), "action dispatched");
                }
                Err(err) => {
                    self.stats.spawn_failures += 1;
                    error!(error = %err, "action could not be started");
                }
            }
        }
    }

    /// Build the new state completely, then swap. On failure the current
    /// watches stay active.
    fn reload(&mut self) {
        let Some(reloader) = self.reloader.as_mut() else {
            warn!("reload requested but not supported by this daemon; ignoring");
            return;
        };

        info!("reloading configuration");
        match reloader() {
            Ok(state) => {
                let old = std::mem::replace(&mut self.state, state);
                self.stats.reloads += 1;
                info!(
                    watches = self.state.registry.watch_count(),
                    entries = self.state.registry.entry_count(),
                    previous_entries = old.registry.entry_count(),
                    "configuration reloaded"
                );
            }
            Err(err) => {
                error!(error = %err, "reload failed; keeping current watches");
            }
        }
    }
}
