//! Asset bundles: enumerable `(path, content)` sources that generators turn
//! into file writes.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// A source of `(path, content)` pairs.
///
/// The bundle owns the ordering and the on-disk format; a generator only
/// converts each pair into a file.
pub trait AssetSource {
    fn entries(&self) -> Result<Vec<(String, Bytes)>>;
}

/// Assets held in memory, enumerated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    entries: Vec<(String, Bytes)>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Bytes>) {
        self.entries.push((path.into(), content.into()));
    }
}

impl AssetSource for MemoryAssets {
    fn entries(&self) -> Result<Vec<(String, Bytes)>> {
        Ok(self.entries.clone())
    }
}

/// Every regular file under a directory.
///
/// Paths are relative to the directory, `/`-separated, in sorted order.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirAssets {
    fn entries(&self) -> Result<Vec<(String, Bytes)>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Asset {
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|e| Error::Asset {
                    message: e.to_string(),
                })?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let content = std::fs::read(entry.path()).map_err(|source| Error::Read {
                path: entry.path().to_path_buf(),
                source,
            })?;
            entries.push((name, Bytes::from(content)));
        }
        Ok(entries)
    }
}
