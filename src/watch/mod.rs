// src/watch/mod.rs

//! Watch entries, the registry that owns them, and the change-notification
//! subsystem they are subscribed with.
//!
//! This module does not decide which actions fire; it only turns targets into
//! subscriptions and kernel records into [`Notification`]s.

pub mod entry;
pub mod event;
pub mod kernel;
pub mod registry;
pub mod source;

pub use entry::{WatchEntry, WatchTarget};
pub use event::{ChangeEvent, EventMask, Notification, WatchId};
pub use kernel::InotifySource;
pub use registry::WatchRegistry;
pub use source::{ChangeSource, NextBatch};
