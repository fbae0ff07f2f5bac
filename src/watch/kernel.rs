// src/watch/kernel.rs

//! Linux inotify backend.

use std::collections::HashMap;
use std::io;

use inotify::{EventMask as RawMask, Inotify, WatchDescriptor, WatchMask};
use tokio::io::unix::AsyncFd;
use tracing::{debug, trace};

use super::entry::WatchTarget;
use super::event::{ChangeEvent, EventMask, Notification, WatchId};
use super::source::{ChangeSource, NextBatch};

/// Room for at least a dozen maximum-size events (16 byte header + NAME_MAX).
const READ_BUFFER_LEN: usize = 4096;

/// `ChangeSource` backed by one inotify instance registered with the Tokio
/// reactor.
///
/// Must be created from within a Tokio runtime. Dropping it closes the
/// inotify descriptor, which releases every watch it holds.
pub struct InotifySource {
    fd: AsyncFd<Inotify>,
    ids: HashMap<WatchDescriptor, WatchId>,
    next_id: u32,
    buffer: Vec<u8>,
}

impl std::fmt::Debug for InotifySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InotifySource")
            .field("watches", &self.ids.len())
            .finish_non_exhaustive()
    }
}

impl InotifySource {
    pub fn new() -> io::Result<Self> {
        let inotify = Inotify::init()?;
        let fd = AsyncFd::new(inotify)?;
        Ok(Self {
            fd,
            ids: HashMap::new(),
            next_id: 0,
            buffer: vec![0; READ_BUFFER_LEN],
        })
    }
}

impl ChangeSource for InotifySource {
    fn subscribe(&mut self, target: &WatchTarget, mask: EventMask) -> io::Result<WatchId> {
        let wd = self
            .fd
            .get_ref()
            .watches()
            .add(target.path(), watch_mask_for(target, mask))?;

        let next_id = &mut self.next_id;
        let id = *self.ids.entry(wd).or_insert_with(|| {
            *next_id += 1;
            WatchId(*next_id)
        });
        debug!(path = %target.path().display(), watch_id = %id, ?mask, "inotify watch added");
        Ok(id)
    }

    fn next_batch(&mut self) -> NextBatch<'_> {
        let Self {
            fd, ids, buffer, ..
        } = self;

        Box::pin(async move {
            loop {
                let mut guard = fd.readable_mut().await?;
                let mut batch = Vec::new();

                // Drain until the kernel reports nothing pending. `try_io`
                // clears readiness on WouldBlock, so the next wait really
                // blocks.
                loop {
                    match guard.try_io(|inner| read_pending(inner.get_mut(), buffer, ids)) {
                        Ok(Ok(mut notes)) => batch.append(&mut notes),
                        Ok(Err(err)) => return Err(err),
                        Err(_would_block) => break,
                    }
                }

                if !batch.is_empty() {
                    return Ok(batch);
                }
            }
        })
    }
}

fn watch_mask_for(target: &WatchTarget, mask: EventMask) -> WatchMask {
    // MASK_ADD: a second entry on the same path must widen, not replace, the
    // kernel-side mask.
    let mut watch_mask = WatchMask::MASK_ADD;
    if mask.contains(EventMask::CLOSE_WRITE) {
        watch_mask |= WatchMask::CLOSE_WRITE;
    }
    if mask.contains(EventMask::CLOSE_NOWRITE) {
        watch_mask |= WatchMask::CLOSE_NOWRITE;
    }
    if target.is_directory() {
        watch_mask |= WatchMask::ONLYDIR;
    }
    watch_mask
}

/// One non-blocking read. Reports `WouldBlock` when nothing was pending.
fn read_pending(
    inotify: &mut Inotify,
    buffer: &mut [u8],
    ids: &mut HashMap<WatchDescriptor, WatchId>,
) -> io::Result<Vec<Notification>> {
    let mut raw_count = 0usize;
    let mut notes = Vec::new();

    for event in inotify.read_events(buffer)? {
        raw_count += 1;

        if event.mask.contains(RawMask::Q_OVERFLOW) {
            notes.push(Notification::Overflow);
            continue;
        }

        let Some(&id) = ids.get(&event.wd) else {
            trace!(mask = ?event.mask, "event for unknown watch descriptor");
            continue;
        };

        if event.mask.contains(RawMask::IGNORED) {
            ids.remove(&event.wd);
            notes.push(Notification::Removed(id));
            continue;
        }

        let mask = decode_mask(event.mask);
        if mask.is_close() {
            notes.push(Notification::Change(ChangeEvent::new(
                id,
                mask,
                event.name.map(|n| n.to_os_string()),
            )));
        }
    }

    if raw_count == 0 {
        return Err(io::ErrorKind::WouldBlock.into());
    }
    Ok(notes)
}

fn decode_mask(raw: RawMask) -> EventMask {
    let mut mask = EventMask::empty();
    if raw.contains(RawMask::CLOSE_WRITE) {
        mask |= EventMask::CLOSE_WRITE;
    }
    if raw.contains(RawMask::CLOSE_NOWRITE) {
        mask |= EventMask::CLOSE_NOWRITE;
    }
    if raw.contains(RawMask::ISDIR) {
        mask |= EventMask::IS_DIR;
    }
    mask
}
