// src/watch/event.rs

use std::ffi::OsString;
use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Close-type activity, both as requested at subscription time and as
    /// reported on delivered events.
    ///
    /// Bit values follow the kernel's `IN_*` constants.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        /// Closed after being opened for writing.
        const CLOSE_WRITE = 0x0000_0008;
        /// Closed after being opened read-only.
        const CLOSE_NOWRITE = 0x0000_0010;
        /// Any close.
        const CLOSE = Self::CLOSE_WRITE.bits() | Self::CLOSE_NOWRITE.bits();
        /// The subject of the event is a directory.
        const IS_DIR = 0x4000_0000;
    }
}

impl EventMask {
    pub fn is_close(self) -> bool {
        self.intersects(EventMask::CLOSE)
    }

    pub fn is_close_write(self) -> bool {
        self.contains(EventMask::CLOSE_WRITE)
    }
}

/// Handle for one active subscription, as handed out by a
/// [`ChangeSource`](super::ChangeSource).
///
/// Subscribing the same path twice yields the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(pub u32);

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One decoded notification on a subscribed target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub watch_id: WatchId,
    pub mask: EventMask,
    /// Child name inside a watched directory. `None` for events on the
    /// watched object itself.
    pub name: Option<OsString>,
}

impl ChangeEvent {
    pub fn new(watch_id: WatchId, mask: EventMask, name: Option<OsString>) -> Self {
        Self {
            watch_id,
            mask,
            name,
        }
    }
}

/// Everything a drain of the change-notification subsystem can yield.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Change(ChangeEvent),
    /// The kernel queue overflowed; an unknown number of events was lost.
    Overflow,
    /// The kernel dropped this watch (target deleted, unmounted, ...).
    Removed(WatchId),
}
