// src/config/keyvalue.rs

//! Reader for the `key=value` drop-in configuration format.
//!
//! ```text
//! # watch the spool directory
//! MonitorPath = /var/spool/incoming
//! FileClosedWriteExec = /usr/local/bin/ingest
//! ```
//!
//! - `#` at the start of a (left-trimmed) line marks a comment.
//! - Blank lines and lines without `=` are ignored.
//! - Keys and values are trimmed; keys match case-insensitively.
//! - When a key is repeated, the first occurrence wins.

use std::path::Path;

use crate::errors::{FileknockError, Result};
use crate::fs::FileSystem;

/// Parsed contents of one configuration file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueStore {
    pairs: Vec<(String, String)>,
}

impl KeyValueStore {
    /// Load and parse a configuration file.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let contents = fs
            .read_to_string(path)
            .map_err(|e| FileknockError::ConfigError(format!("{e:#}")))?;
        Ok(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let pairs = contents
            .split('\n')
            .filter_map(parse_line)
            .collect();
        Self { pairs }
    }

    /// Look up a value by key, ignoring ASCII case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Like [`get`](Self::get), but treats an empty value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Interpret a value as a boolean.
    ///
    /// Wrapping `"`, `'`, `(` and `[` are skipped; the value is true when the
    /// next character is one of `t`, `y` (any case) or `1`. Absent keys are
    /// false.
    pub fn get_bool(&self, key: &str) -> bool {
        let Some(value) = self.get(key) else {
            return false;
        };
        let unwrapped = value.trim_start_matches(['"', '\'', '(', '[']);
        matches!(
            unwrapped.chars().next(),
            Some('t' | 'T' | 'y' | 'Y' | '1')
        )
    }

    /// Interpret the leading integer of a value, the way `atoll` does.
    ///
    /// Returns `None` when the key is absent or the value has no leading
    /// digits. Values out of range saturate.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        parse_leading_i64(self.get(key)?)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn parse_line(raw: &str) -> Option<(String, String)> {
    let line = raw.trim_matches([' ', '\t', '\r']);
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let key = key.trim_matches([' ', '\t', '\r']);
    if key.is_empty() {
        return None;
    }
    Some((
        key.to_string(),
        value.trim_matches([' ', '\t', '\r']).to_string(),
    ))
}

fn parse_leading_i64(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = {
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        &digits[..end]
    };
    if digits.is_empty() {
        return None;
    }

    let mut acc: i64 = 0;
    for b in digits.bytes() {
        let d = i64::from(b - b'0');
        acc = if negative {
            acc.saturating_mul(10).saturating_sub(d)
        } else {
            acc.saturating_mul(10).saturating_add(d)
        };
    }
    Some(acc)
}
