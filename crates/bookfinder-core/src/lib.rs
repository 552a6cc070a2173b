pub mod collections;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod stats;
pub mod storage;

pub use collections::CollectionStore;
pub use config::{AppConfig, CatalogConfig, StorageBackend, StorageConfig};
pub use error::{CoreError, Result, StorageError, StorageResult};
pub use history::HistoryTracker;
pub use models::*;
pub use stats::StatsTracker;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageGateway};
