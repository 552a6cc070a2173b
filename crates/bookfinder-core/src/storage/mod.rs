//! Best-effort, namespaced key/value persistence.
//!
//! Every operation returns a [`StorageResult`]; nothing here panics or bubbles
//! up past the collection, history and stats layers, which log and carry on.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{StorageError, StorageResult};

/// Keys of the logical collections this crate persists.
pub mod keys {
    pub const FAVORITES: &str = "favorites";
    pub const READING_LIST: &str = "readingList";
    pub const SEARCH_HISTORY: &str = "searchHistory";
    pub const STATS: &str = "stats";
}

pub const DEFAULT_NAMESPACE: &str = "bookFinder";
/// Same order of magnitude as a browser's local storage allowance.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Raw string storage with a byte quota.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// JSON values under an application-scoped key prefix.
///
/// Cloning is cheap; clones share the same backing store.
#[derive(Clone)]
pub struct StorageGateway {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl StorageGateway {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    /// A gateway over a fresh in-memory store with default namespace and quota.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStore::new(DEFAULT_QUOTA_BYTES)),
            DEFAULT_NAMESPACE,
        )
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        let store: Arc<dyn KeyValueStore> = match config.backend {
            StorageBackend::File => {
                Arc::new(FileStore::new(&config.directory, config.quota_bytes))
            }
            StorageBackend::Memory => Arc::new(MemoryStore::new(config.quota_bytes)),
        };
        Self::new(store, config.namespace.clone())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}_{key}", self.namespace)
    }

    /// Read and decode `key`. Absent keys are `Ok(None)`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let scoped = self.scoped(key);
        let Some(raw) = self.store.get(&scoped)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                key: scoped,
                source,
            })
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let scoped = self.scoped(key);
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialization {
            key: scoped.clone(),
            source,
        })?;
        self.store.set(&scoped, &raw)
    }

    pub fn remove(&self, key: &str) -> StorageResult<()> {
        self.store.remove(&self.scoped(key))
    }

    /// Read `key`, treating absence and any failure as the default value.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.get(key) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "could not load persisted value, using default");
                T::default()
            }
        }
    }

    /// Write `key`, logging instead of returning a failure.
    pub fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match self.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "could not persist value");
                false
            }
        }
    }

    /// Remove `key`, logging instead of returning a failure.
    pub fn discard(&self, key: &str) -> bool {
        match self.remove(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "could not remove persisted value");
                false
            }
        }
    }
}

impl std::fmt::Debug for StorageGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageGateway")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let gateway = StorageGateway::in_memory();
        gateway.set("list", &vec!["a", "b"]).unwrap();

        let loaded: Option<Vec<String>> = gateway.get("list").unwrap();
        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));

        gateway.remove("list").unwrap();
        let gone: Option<Vec<String>> = gateway.get("list").unwrap();
        assert!(gone.is_none());
    }

    #[test]
    fn test_keys_are_namespaced() {
        let store = Arc::new(MemoryStore::new(DEFAULT_QUOTA_BYTES));
        let gateway = StorageGateway::new(store.clone(), "bookFinder");
        gateway.set(keys::FAVORITES, &Vec::<String>::new()).unwrap();

        assert_eq!(store.get("bookFinder_favorites").unwrap().as_deref(), Some("[]"));
        assert!(store.get("favorites").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_value_is_reported_not_raised() {
        let store = Arc::new(MemoryStore::new(DEFAULT_QUOTA_BYTES));
        store.set("bookFinder_stats", "{not json").unwrap();
        let gateway = StorageGateway::new(store, DEFAULT_NAMESPACE);

        let result: StorageResult<Option<Vec<u32>>> = gateway.get(keys::STATS);
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));

        let fallback: Vec<u32> = gateway.load_or_default(keys::STATS);
        assert!(fallback.is_empty());
    }

    #[test]
    fn test_persist_reports_quota_failure() {
        let gateway = StorageGateway::new(Arc::new(MemoryStore::new(16)), "ns");
        assert!(!gateway.persist("big", &"x".repeat(64)));
        assert!(gateway.persist("s", &1));
    }
}
