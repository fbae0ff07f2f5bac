// src/watch/registry.rs

use std::collections::BTreeMap;

use super::entry::WatchEntry;
use super::event::WatchId;

/// Maps subscription handles back to the watch entries that requested them.
///
/// Several entries share one id when several configuration files watch the
/// same path; [`lookup`](Self::lookup) always returns all of them, in
/// registration order.
#[derive(Debug, Clone, Default)]
pub struct WatchRegistry {
    entries: BTreeMap<WatchId, Vec<WatchEntry>>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `entry` to `id` and record it.
    ///
    /// Registering an identical entry (same origin, target and actions) under
    /// the same id again is a no-op; returns whether the entry was added.
    pub fn register(&mut self, id: WatchId, entry: WatchEntry) -> bool {
        let entry = entry.bound_to(id);
        let slot = self.entries.entry(id).or_default();
        if slot.contains(&entry) {
            return false;
        }
        slot.push(entry);
        true
    }

    /// All entries interested in `id`; empty for unknown ids.
    pub fn lookup(&self, id: WatchId) -> &[WatchEntry] {
        self.entries.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct subscriptions.
    pub fn watch_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of registered entries across all subscriptions.
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WatchEntry> {
        self.entries.values().flatten()
    }
}
