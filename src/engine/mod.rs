// src/engine/mod.rs

//! Dispatch engine for fileknock.
//!
//! This module ties together:
//! - the daemon state (subscription source + registry)
//! - the pure event resolution in [`dispatcher`]
//! - the main loop in [`runtime`] that waits on the source, reacts to
//!   control events (shutdown, reload) and hands invocations to an executor

pub mod dispatcher;
pub mod runtime;
pub mod state;

/// Control requests flowing into the daemon loop, usually from signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Leave the loop and exit cleanly (SIGINT / SIGTERM).
    Shutdown,
    /// Rebuild the watch set from configuration and swap it in (SIGHUP).
    Reload,
}

pub use dispatcher::{fired_actions, resolve};
pub use runtime::{Daemon, DispatchStats, Reloader};
pub use state::DaemonState;
