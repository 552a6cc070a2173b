use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{StorageError, StorageResult};
use crate::storage::KeyValueStore;

/// One JSON file per key: `{dir}/{key}.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota_bytes: usize,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>, quota_bytes: usize) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            quota_bytes,
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }

    /// Total size of stored values, skipping `except`.
    fn used_bytes(&self, except: &Path) -> std::io::Result<usize> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut total = 0usize;
        for entry in entries {
            let path = entry?.path();
            if path == except || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            total += fs::metadata(&path)?.len() as usize;
        }
        Ok(total)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        let path = self.path_for(key);

        let needed = self.used_bytes(&path).map_err(io_err)? + value.len();
        if needed > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                needed,
                limit: self.quota_bytes,
            });
        }

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        fs::write(&path, value).map_err(io_err)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("storage"), 1024);

        store.set("bookFinder_favorites", "[]").unwrap();
        assert_eq!(store.get("bookFinder_favorites").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("storage/bookFinder_favorites.json").exists());
    }

    #[test]
    fn test_missing_key_and_dir() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("never-created"), 1024);
        assert!(store.get("anything").unwrap().is_none());
        assert!(store.remove("anything").is_ok());
    }

    #[test]
    fn test_quota_enforced_across_files() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path(), 10);

        store.set("a", "123456").unwrap();
        let err = store.set("b", "12345").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 11, limit: 10, .. }));

        // Overwriting a key only counts its new size.
        store.set("a", "1234567890").unwrap();
    }

    #[test]
    fn test_key_is_sanitized_into_file_name() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path(), 1024);
        store.set("../escape", "1").unwrap();
        assert!(dir.path().join("___escape.json").exists());
    }
}
