// src/exec/mod.rs

//! Action execution layer.
//!
//! - [`invocation`] turns a matched watch entry and event into the command
//!   and `FK_*` environment to launch.
//! - [`backend`] provides the `ActionExecutor` trait and the
//!   `ProcessExecutor` used in production, which starts actions with
//!   `tokio::process::Command` and reaps them in the background.

pub mod backend;
pub mod invocation;

pub use backend::{ActionExecutor, EnvPolicy, ProcessExecutor};
pub use invocation::{ActionInvocation, ENV_FILE, ENV_PATH};
