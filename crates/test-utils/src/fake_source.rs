use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use fileknock::watch::{
    ChangeEvent, ChangeSource, EventMask, NextBatch, Notification, WatchId, WatchTarget,
};

/// One recorded `subscribe` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub path: PathBuf,
    pub mask: EventMask,
}

/// A scripted change source.
///
/// - records every subscription request
/// - hands out one id per distinct path
/// - fails with `NotFound` for paths marked missing
/// - replays batches pushed through its [`FakeSourceHandle`]
pub struct FakeSource {
    ids: HashMap<PathBuf, WatchId>,
    missing: HashSet<PathBuf>,
    requests: Arc<Mutex<Vec<SubscriptionRequest>>>,
    rx: mpsc::UnboundedReceiver<io::Result<Vec<Notification>>>,
}

/// Test-side end of a [`FakeSource`].
#[derive(Debug, Clone)]
pub struct FakeSourceHandle {
    tx: mpsc::UnboundedSender<io::Result<Vec<Notification>>>,
    requests: Arc<Mutex<Vec<SubscriptionRequest>>>,
}

impl FakeSource {
    pub fn new() -> (Self, FakeSourceHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let source = Self {
            ids: HashMap::new(),
            missing: HashSet::new(),
            requests: Arc::clone(&requests),
            rx,
        };
        (source, FakeSourceHandle { tx, requests })
    }

    pub fn with_missing(mut self, path: impl Into<PathBuf>) -> Self {
        self.missing.insert(path.into());
        self
    }

    /// The id already handed out for `path`, if any.
    pub fn id_of(&self, path: impl AsRef<Path>) -> Option<WatchId> {
        self.ids.get(path.as_ref()).copied()
    }
}

impl ChangeSource for FakeSource {
    fn subscribe(&mut self, target: &WatchTarget, mask: EventMask) -> io::Result<WatchId> {
        let path = target.path().to_path_buf();
        self.requests.lock().unwrap().push(SubscriptionRequest {
            path: path.clone(),
            mask,
        });

        if self.missing.contains(&path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "No such file or directory",
            ));
        }

        let next = WatchId(self.ids.len() as u32 + 1);
        Ok(*self.ids.entry(path).or_insert(next))
    }

    fn next_batch(&mut self) -> NextBatch<'_> {
        Box::pin(async move {
            match self.rx.recv().await {
                Some(batch) => batch,
                // Nothing more will ever arrive; behave like an idle kernel.
                None => std::future::pending().await,
            }
        })
    }
}

impl FakeSourceHandle {
    pub fn requests(&self) -> Vec<SubscriptionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn push(&self, batch: Vec<Notification>) {
        self.tx.send(Ok(batch)).expect("fake source dropped");
    }

    pub fn push_event(&self, id: WatchId, mask: EventMask, name: Option<&str>) {
        self.push(vec![Notification::Change(ChangeEvent::new(
            id,
            mask,
            name.map(Into::into),
        ))]);
    }

    /// Whether the `FakeSource` side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn push_error(&self, err: io::Error) {
        self.tx.send(Err(err)).expect("fake source dropped");
    }
}
