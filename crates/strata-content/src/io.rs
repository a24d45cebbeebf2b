//! File access used by the content cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use strata_core::alloc::HashMap;

use crate::error::{AssetError, AssetResult};

/// Blocking file access.
pub trait FileSystem {
    fn read(&self, path: &Path) -> AssetResult<Vec<u8>>;

    fn write(&self, path: &Path, bytes: &[u8]) -> AssetResult<()>;

    fn exists(&self, path: &Path) -> bool;
}

impl<T: FileSystem + ?Sized> FileSystem for Arc<T> {
    fn read(&self, path: &Path) -> AssetResult<Vec<u8>> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> AssetResult<()> {
        (**self).write(path, bytes)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }
}

/// The real file system, with relative paths taken from `base_path`.
#[derive(Debug, Clone, Default)]
pub struct DiskFileSystem {
    base_path: PathBuf,
}

impl DiskFileSystem {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}

impl FileSystem for DiskFileSystem {
    fn read(&self, path: &Path) -> AssetResult<Vec<u8>> {
        let full_path = self.resolve_path(path);
        std::fs::read(&full_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound {
                    path: full_path.display().to_string(),
                }
            } else {
                AssetError::IoError {
                    path: full_path.clone(),
                    source: e,
                }
            }
        })
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> AssetResult<()> {
        let full_path = self.resolve_path(path);
        std::fs::write(&full_path, bytes).map_err(|e| AssetError::IoError {
            path: full_path.clone(),
            source: e,
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve_path(path).is_file()
    }
}

/// In-memory file system.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl AsRef<Path>, data: impl Into<Vec<u8>>) {
        self.files
            .write()
            .insert(path.as_ref().to_path_buf(), data.into());
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.write().remove(path.as_ref())
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.read().get(path.as_ref()).cloned()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read(&self, path: &Path) -> AssetResult<Vec<u8>> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound {
                path: path.display().to_string(),
            })
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> AssetResult<()> {
        self.insert(path, bytes);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_file_system() {
        let fs = MemoryFileSystem::new();
        fs.insert("Data/Sky.ast", vec![1, 2, 3]);
        assert!(fs.exists(Path::new("Data/Sky.ast")));
        assert_eq!(fs.read(Path::new("Data/Sky.ast")).unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            fs.read(Path::new("Sky.ast")),
            Err(AssetError::NotFound { .. })
        ));
    }

    #[test]
    fn test_disk_file_system_relative_to_base() {
        let dir = tempfile::tempdir().unwrap();
        let fs = DiskFileSystem::new(dir.path());
        fs.write(Path::new("out.bin"), &[9, 8]).unwrap();
        assert!(fs.exists(Path::new("out.bin")));
        assert_eq!(std::fs::read(dir.path().join("out.bin")).unwrap(), vec![9, 8]);
        assert!(matches!(
            fs.read(Path::new("missing.bin")),
            Err(AssetError::NotFound { .. })
        ));
    }
}
