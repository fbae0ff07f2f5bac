// src/config/discovery.rs

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::fs::FileSystem;

/// Drop-in directories searched by default, in order. All of them
/// contribute; none shadows another.
pub const DEFAULT_CONFIG_DIRS: [&str; 4] = [
    "/etc/fileknock.d",
    "/opt/fileknock/etc/fileknock.d",
    "/usr/local/etc/fileknock.d",
    "./fileknock.d",
];

pub fn default_config_dirs() -> Vec<PathBuf> {
    DEFAULT_CONFIG_DIRS.iter().map(PathBuf::from).collect()
}

/// Configuration files inside `dir`, sorted by name.
///
/// Dotfiles are skipped, so a file is disabled by prefixing it with `.`.
/// Subdirectories and other non-regular entries are skipped too. A missing
/// directory yields no files.
pub fn config_files_in(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<PathBuf>> {
    if !fs.is_dir(dir) {
        debug!(dir = %dir.display(), "configuration directory not present");
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = fs
        .read_dir(dir)?
        .into_iter()
        .filter(|path| !is_hidden(path))
        .filter(|path| {
            let keep = fs.is_file(path);
            if !keep {
                debug!(path = %path.display(), "skipping non-file entry");
            }
            keep
        })
        .collect();
    files.sort();
    Ok(files)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.as_encoded_bytes().first() == Some(&b'.'))
        .unwrap_or(true)
}
