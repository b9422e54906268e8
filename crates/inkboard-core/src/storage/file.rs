//! File-based store for native platforms.

use super::{BlobStore, BoxFuture, StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-based store for native platforms.
///
/// Each key is one file in the base directory. Writes go to a temporary
/// sibling first and are renamed into place, so readers in other processes
/// never observe a half-written blob.
pub struct FileStore {
    /// Base directory for blobs.
    base_path: PathBuf,
}

impl FileStore {
    /// Create a new file store with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create a file store in the default location.
    ///
    /// On Unix: `~/.local/share/inkboard/`
    /// On Windows: `%LOCALAPPDATA%\inkboard\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("inkboard"))
    }

    /// Get the file path for a key.
    fn blob_path(&self, key: &str) -> PathBuf {
        // Sanitize key to be safe for filenames
        let safe_key: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_key))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl BlobStore for FileStore {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Vec<u8>>>> {
        let path = self.blob_path(key);

        Box::pin(async move {
            match fs::read(&path) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(StorageError::Io(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                ))),
            }
        })
    }

    fn set(&self, key: &str, bytes: Vec<u8>) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.blob_path(key);
        let tmp = path.with_extension("json.tmp");

        Box::pin(async move {
            fs::write(&tmp, &bytes).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", tmp.display(), e))
            })?;
            fs::rename(&tmp, &path).map_err(|e| {
                StorageError::Io(format!("Failed to replace {}: {}", path.display(), e))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::block_on;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_set_get() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        block_on(store.set("board", b"{\"a\":1}".to_vec())).unwrap();
        let loaded = block_on(store.get("board")).unwrap();

        assert_eq!(loaded, Some(b"{\"a\":1}".to_vec()));
    }

    #[test]
    fn test_file_store_missing() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        assert_eq!(block_on(store.get("nonexistent")).unwrap(), None);
    }

    #[test]
    fn test_file_store_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileStore::new(nested.clone()).unwrap();

        assert!(nested.is_dir());
        assert_eq!(store.base_path(), nested.as_path());
    }

    #[test]
    fn test_file_store_overwrite_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        block_on(store.set("board", b"first".to_vec())).unwrap();
        block_on(store.set("board", b"second".to_vec())).unwrap();

        assert_eq!(block_on(store.get("board")).unwrap(), Some(b"second".to_vec()));
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["board.json".to_string()]);
    }

    #[test]
    fn test_file_store_sanitizes_key() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        // Key with special characters should be sanitized
        block_on(store.set("team/board:with*special", b"x".to_vec())).unwrap();

        // Should still be loadable with the same key
        let loaded = block_on(store.get("team/board:with*special")).unwrap();
        assert_eq!(loaded, Some(b"x".to_vec()));
    }
}
