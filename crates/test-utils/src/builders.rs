#![allow(dead_code)]

use fileknock::config::{
    KeyValueStore, KEY_CLOSED_EXEC, KEY_CLOSED_WRITE_EXEC, KEY_MONITOR_FILE, KEY_MONITOR_PATH,
};

/// Builder for drop-in configuration text, to simplify test setup.
///
/// `build_text` yields what would be on disk; `build` parses it into a
/// `KeyValueStore`.
#[derive(Debug, Clone, Default)]
pub struct StoreBuilder {
    lines: Vec<String>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn monitor_path(self, dir: &str) -> Self {
        self.pair(KEY_MONITOR_PATH, dir)
    }

    pub fn monitor_file(self, file: &str) -> Self {
        self.pair(KEY_MONITOR_FILE, file)
    }

    pub fn closed_exec(self, action: &str) -> Self {
        self.pair(KEY_CLOSED_EXEC, action)
    }

    pub fn closed_write_exec(self, action: &str) -> Self {
        self.pair(KEY_CLOSED_WRITE_EXEC, action)
    }

    pub fn comment(mut self, text: &str) -> Self {
        self.lines.push(format!("# {text}"));
        self
    }

    pub fn pair(mut self, key: &str, value: &str) -> Self {
        self.lines.push(format!("{key}={value}"));
        self
    }

    pub fn build_text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    pub fn build(&self) -> KeyValueStore {
        KeyValueStore::parse(&self.build_text())
    }
}
