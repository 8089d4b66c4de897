//! File access used by asset loaders (textures, shaders)
//!
//! Loaders only ever ask for "the bytes of this relative path"; where those bytes come from
//! is the file device's business. `FsFileDevice` reads from disk, `MemoryFileDevice` serves
//! preloaded blobs for tools and tests.

use std::path::PathBuf;
use rustc_hash::FxHashMap;
use crate::error::{RioError, RioResult};
use crate::engine_debug;

/// Source of asset bytes addressed by relative, `/`-separated paths
pub trait FileDevice {
    /// Load the whole file at `path`
    fn load(&self, path: &str) -> RioResult<Vec<u8>>;
}

// ===== FILESYSTEM =====

/// File device reading from a directory on disk
#[derive(Debug, Clone)]
pub struct FsFileDevice {
    root: PathBuf,
}

impl FsFileDevice {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl FileDevice for FsFileDevice {
    fn load(&self, path: &str) -> RioResult<Vec<u8>> {
        let full_path = self.root.join(path);
        let bytes = std::fs::read(&full_path)
            .map_err(|e| RioError::Io(format!("{}: {}", full_path.display(), e)))?;
        engine_debug!("rio::FileDevice", "Loaded {} ({} bytes)", full_path.display(), bytes.len());
        Ok(bytes)
    }
}

// ===== MEMORY =====

/// File device serving blobs registered in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryFileDevice {
    files: FxHashMap<String, Vec<u8>>,
}

impl MemoryFileDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the contents of `path`
    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileDevice for MemoryFileDevice {
    fn load(&self, path: &str) -> RioResult<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| RioError::Io(format!("{}: file not found", path)))
    }
}

#[cfg(test)]
#[path = "file_device_tests.rs"]
mod tests;
