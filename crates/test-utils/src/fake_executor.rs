use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use fileknock::errors::{FileknockError, Result};
use fileknock::exec::{ActionExecutor, ActionInvocation};

/// A fake executor that records every invocation instead of starting a
/// process. Actions listed via `fail_on` report a spawn error.
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor {
    fired: Arc<Mutex<Vec<ActionInvocation>>>,
    failing: Arc<Mutex<Vec<PathBuf>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(self, action: impl Into<PathBuf>) -> Self {
        self.failing.lock().unwrap().push(action.into());
        self
    }

    /// Shared view of what has been fired so far.
    pub fn fired(&self) -> Vec<ActionInvocation> {
        self.fired.lock().unwrap().clone()
    }

    pub fn fired_count(&self) -> usize {
        self.fired.lock().unwrap().len()
    }
}

impl ActionExecutor for RecordingExecutor {
    fn fire(&mut self, invocation: &ActionInvocation) -> Result<u32> {
        if self
            .failing
            .lock()
            .unwrap()
            .iter()
            .any(|p| p == invocation.executable())
        {
            return Err(FileknockError::SpawnError {
                path: invocation.executable().to_path_buf(),
                source: std::io::ErrorKind::NotFound.into(),
            });
        }

        let mut fired = self.fired.lock().unwrap();
        fired.push(invocation.clone());
        Ok(1000 + fired.len() as u32)
    }
}
