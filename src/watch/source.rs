// src/watch/source.rs

//! Pluggable change-notification subsystem.
//!
//! The daemon talks to a `ChangeSource` instead of inotify directly. The
//! production implementation is [`InotifySource`](super::InotifySource);
//! tests swap in a scripted fake that records subscription requests and
//! replays notifications.

use std::future::Future;
use std::io;
use std::pin::Pin;

use super::entry::WatchTarget;
use super::event::{EventMask, Notification, WatchId};

/// A future resolving to the next drained batch of notifications.
pub type NextBatch<'a> = Pin<Box<dyn Future<Output = io::Result<Vec<Notification>>> + Send + 'a>>;

pub trait ChangeSource: Send {
    /// Subscribe `target` for the events in `mask`.
    ///
    /// The mask is added to whatever is already subscribed on the same path;
    /// the same path always maps to the same [`WatchId`].
    fn subscribe(&mut self, target: &WatchTarget, mask: EventMask) -> io::Result<WatchId>;

    /// Wait until notifications are pending, then drain all of them.
    ///
    /// Never resolves to an empty batch. Must be cancel-safe: dropping the
    /// future before it resolves loses no notifications.
    fn next_batch(&mut self) -> NextBatch<'_>;
}
