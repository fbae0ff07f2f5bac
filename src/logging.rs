// src/logging.rs

//! Logging setup for `fileknockd` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining what gets logged:
//! 1. `--log-level` CLI flag, or `log_level` in the settings file
//! 2. `FILEKNOCK_LOG` environment variable, as `EnvFilter` directives
//!    (e.g. `"info"`, `"fileknock::engine=debug"`)
//! 3. default to `info`
//!
//! Logs go to STDERR; actions inherit the daemon's stdout for their own
//! output.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "FILEKNOCK_LOG";

/// Initialise the global logging subscriber. Call once at startup.
pub fn init_logging(level: Option<LogLevel>) -> Result<()> {
    let filter = match level {
        Some(lvl) => EnvFilter::new(directive_for(lvl)),
        None => EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    Ok(())
}

fn directive_for(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
