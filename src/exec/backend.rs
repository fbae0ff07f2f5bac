// src/exec/backend.rs

//! Pluggable action executor.
//!
//! The daemon hands every [`ActionInvocation`] to an `ActionExecutor`.
//! Production uses [`ProcessExecutor`], which starts a real process; tests
//! provide an executor that only records what would have run.

use std::process::Stdio;

use tokio::process::Command;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::errors::{FileknockError, Result};

use super::invocation::ActionInvocation;

/// Trait abstracting how actions are launched.
pub trait ActionExecutor: Send {
    /// Start the action and return immediately with its process id.
    ///
    /// Must not wait for the action to finish.
    fn fire(&mut self, invocation: &ActionInvocation) -> Result<u32>;
}

/// Which environment a spawned action starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvPolicy {
    /// Only `FK_PATH` / `FK_FILE`.
    #[default]
    Isolated,
    /// The daemon's environment plus `FK_PATH` / `FK_FILE`.
    Inherit,
}

/// Real executor: one child process per invocation.
///
/// Every child is awaited by a task in `children`, which logs its exit status
/// and reaps it. Finished tasks are collected on each `fire`, so the set only
/// holds actions that are still running.
pub struct ProcessExecutor {
    env: EnvPolicy,
    children: JoinSet<()>,
}

impl std::fmt::Debug for ProcessExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessExecutor")
            .field("env", &self.env)
            .field("running", &self.children.len())
            .finish()
    }
}

impl ProcessExecutor {
    pub fn new(env: EnvPolicy) -> Self {
        Self {
            env,
            children: JoinSet::new(),
        }
    }

    /// Actions started by this executor that have not been reaped yet.
    pub fn running(&mut self) -> usize {
        self.collect_finished();
        self.children.len()
    }

    /// Wait until every started action has exited.
    pub async fn wait_all(&mut self) {
        while self.children.join_next().await.is_some() {}
    }

    fn collect_finished(&mut self) {
        while let Some(res) = self.children.try_join_next() {
            if let Err(err) = res {
                warn!(error = %err, "action reaper task failed");
            }
        }
    }
}

impl ActionExecutor for ProcessExecutor {
    fn fire(&mut self, invocation: &ActionInvocation) -> Result<u32> {
        self.collect_finished();

        let executable = invocation.executable();
        let mut cmd = Command::new(executable);
        if self.env == EnvPolicy::Isolated {
            cmd.env_clear();
        }
        cmd.envs(invocation.environment())
            .stdin(Stdio::null())
            .kill_on_drop(false);

        let mut child = cmd.spawn().map_err(|source| FileknockError::SpawnError {
            path: executable.to_path_buf(),
            source,
        })?;
        let pid = child.id().unwrap_or_default();

        info!(
            pid,
            action = %executable.display(),
            fk_path = %invocation.fk_path().display(),
            fk_file = ?invocation.fk_file(),
            "action started"
        );

        let action = executable.to_path_buf();
        self.children.spawn(async move {
            match child.wait().await {
                Ok(status) => debug!(
                    pid,
                    action = %action.display(),
                    exit_code = ?status.code(),
                    success = status.success(),
                    "action exited"
                ),
                Err(err) => warn!(
                    pid,
                    action = %action.display(),
                    error = %err,
                    "failed to wait for action"
                ),
            }
        });

        Ok(pid)
    }
}
