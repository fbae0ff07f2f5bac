// src/engine/dispatcher.rs

//! Pure event resolution.
//!
//! Decides which actions a [`ChangeEvent`] fires, without touching processes
//! or the kernel. The async shell in [`runtime`](super::runtime) feeds the
//! result to an executor.

use std::path::Path;

use tracing::debug;

use crate::exec::ActionInvocation;
use crate::watch::{ChangeEvent, EventMask, WatchEntry, WatchRegistry};

/// Actions of `entry` that an event with `mask` fires, in firing order.
///
/// The two checks are independent: a write-close fires both actions when
/// both are configured.
pub fn fired_actions(entry: &WatchEntry, mask: EventMask) -> Vec<&Path> {
    let mut actions = Vec::with_capacity(2);
    if mask.is_close() {
        if let Some(action) = entry.on_close() {
            actions.push(action);
        }
    }
    if mask.is_close_write() {
        if let Some(action) = entry.on_close_write() {
            actions.push(action);
        }
    }
    actions
}

/// Resolve `event` against every entry registered for its watch id.
///
/// Unknown ids resolve to nothing. A directory entry only reacts to events
/// naming one of its children; closes of the directory itself are dropped.
pub fn resolve(registry: &WatchRegistry, event: &ChangeEvent) -> Vec<ActionInvocation> {
    let mut invocations = Vec::new();

    for entry in registry.lookup(event.watch_id) {
        if entry.target().is_directory() && event.name.is_none() {
            debug!(
                config = %entry.origin().display(),
                watch_id = %event.watch_id,
                mask = ?event.mask,
                "close of the watched directory itself; ignored"
            );
            continue;
        }

        for action in fired_actions(entry, event.mask) {
            debug!(
                config = %entry.origin().display(),
                action = %action.display(),
                "entry matched"
            );
            invocations.push(ActionInvocation::new(action, entry, event));
        }
    }

    invocations
}
