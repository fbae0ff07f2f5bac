// src/config/mod.rs

//! Configuration loading for fileknock.
//!
//! Responsibilities:
//! - Parse the `key=value` drop-in format (`keyvalue.rs`).
//! - Find drop-in files in the configuration directories (`discovery.rs`).
//! - Compile them into subscribed, registered watches (`compiler.rs`).
//! - Resolve the daemon's own settings from CLI and TOML (`settings.rs`).

pub mod compiler;
pub mod discovery;
pub mod keyvalue;
pub mod settings;

pub use compiler::{
    build_entry, compile, compile_dirs, CompileOutcome, CompileReport, KEY_CLOSED_EXEC,
    KEY_CLOSED_WRITE_EXEC, KEY_MONITOR_FILE, KEY_MONITOR_PATH,
};
pub use discovery::{config_files_in, default_config_dirs, DEFAULT_CONFIG_DIRS};
pub use keyvalue::KeyValueStore;
pub use settings::{Settings, SettingsFile};
