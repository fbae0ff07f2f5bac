// src/engine/state.rs

use crate::watch::{ChangeSource, WatchRegistry};

/// Everything the dispatch loop needs to resolve events: the subscription
/// source and the registry populated alongside it.
///
/// The two always travel together. Watch ids are only meaningful for the
/// source that issued them, so a reload replaces the whole value.
#[derive(Debug)]
pub struct DaemonState<S> {
    pub source: S,
    pub registry: WatchRegistry,
}

impl<S: ChangeSource> DaemonState<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            registry: WatchRegistry::new(),
        }
    }
}
