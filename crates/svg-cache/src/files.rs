//! File access
//!
//! Where SVG bytes come from. The cache only ever asks for a whole file.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Synchronous, blocking file loader
pub trait FileInterface {
    fn load_file(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Loads from the filesystem, resolving relative paths against an optional base
#[derive(Debug, Clone, Default)]
pub struct FsFileInterface {
    base_dir: Option<PathBuf>,
}

impl FsFileInterface {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl FileInterface for FsFileInterface {
    fn load_file(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path))
    }
}

/// In-memory files, for embedded assets and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryFileInterface {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFileInterface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), data.into());
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }
}

impl FileInterface for MemoryFileInterface {
    fn load_file(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{path} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_files() {
        let files = MemoryFileInterface::new().with_file("icons/a.svg", "<svg/>");
        assert_eq!(files.load_file("icons/a.svg").unwrap(), b"<svg/>");
        assert_eq!(files.load_file("b.svg").unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_fs_resolves_relative_to_base() {
        let fs = FsFileInterface::new(Some(PathBuf::from("/assets")));
        assert_eq!(fs.resolve("icon.svg"), PathBuf::from("/assets/icon.svg"));
        assert_eq!(fs.resolve("/abs/icon.svg"), PathBuf::from("/abs/icon.svg"));
    }

    #[test]
    fn test_fs_missing_file_is_error() {
        let fs = FsFileInterface::default();
        assert!(fs.load_file("/nonexistent.svg").is_err());
    }
}
