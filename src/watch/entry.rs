// src/watch/entry.rs

use std::path::{Path, PathBuf};

use super::event::{EventMask, WatchId};

/// What a watch entry monitors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WatchTarget {
    /// `MonitorPath`: close events on the directory's children.
    Directory(PathBuf),
    /// `MonitorFile`: close events on the file itself.
    File(PathBuf),
}

impl WatchTarget {
    pub fn path(&self) -> &Path {
        match self {
            WatchTarget::Directory(p) | WatchTarget::File(p) => p,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, WatchTarget::Directory(_))
    }
}

/// One monitored target plus the actions configured on it, as declared by a
/// single configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEntry {
    origin: PathBuf,
    target: WatchTarget,
    watch_id: Option<WatchId>,
    on_close: Option<PathBuf>,
    on_close_write: Option<PathBuf>,
}

impl WatchEntry {
    pub fn new(
        origin: impl Into<PathBuf>,
        target: WatchTarget,
        on_close: Option<PathBuf>,
        on_close_write: Option<PathBuf>,
    ) -> Self {
        Self {
            origin: origin.into(),
            target,
            watch_id: None,
            on_close,
            on_close_write,
        }
    }

    /// Configuration file this entry came from.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    pub fn watch_id(&self) -> Option<WatchId> {
        self.watch_id
    }

    /// Action for any close (`FileClosedExec`).
    pub fn on_close(&self) -> Option<&Path> {
        self.on_close.as_deref()
    }

    /// Action for close-after-write (`FileClosedWriteExec`).
    pub fn on_close_write(&self) -> Option<&Path> {
        self.on_close_write.as_deref()
    }

    /// Mask to subscribe with. Empty when no action is configured.
    pub fn requested_mask(&self) -> EventMask {
        let mut mask = EventMask::empty();
        if self.on_close.is_some() {
            mask |= EventMask::CLOSE;
        }
        if self.on_close_write.is_some() {
            mask |= EventMask::CLOSE_WRITE;
        }
        mask
    }

    pub(crate) fn bound_to(mut self, id: WatchId) -> Self {
        self.watch_id = Some(id);
        self
    }
}
