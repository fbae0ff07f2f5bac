// src/fs/mod.rs

//! Filesystem access used for configuration discovery and loading.
//!
//! Watched targets are never read through this trait; they belong to the
//! change-notification subsystem. Only the drop-in configuration directories
//! and the files inside them go through [`FileSystem`], so tests can run the
//! whole compile step against [`mock::MockFileSystem`].

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

/// The filesystem operations configuration loading needs.
pub trait FileSystem: Send + Sync + Debug {
    /// Whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Full paths of the entries of `dir`, unordered.
    fn read_dir(&self, dir: &Path) -> Result<Vec<PathBuf>>;
}

/// The host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::read_dir(dir)
            .with_context(|| format!("listing {}", dir.display()))?
            .map(|entry| {
                entry
                    .map(|e| e.path())
                    .with_context(|| format!("listing {}", dir.display()))
            })
            .collect()
    }
}
