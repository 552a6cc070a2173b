use crate::storage::{StorageGateway, keys};

pub const HISTORY_CAPACITY: usize = 50;
pub const DEFAULT_RECENT: usize = 10;

/// Bounded log of distinct past queries, oldest first.
#[derive(Debug)]
pub struct HistoryTracker {
    gateway: StorageGateway,
    entries: Vec<String>,
}

impl HistoryTracker {
    pub fn load(gateway: StorageGateway) -> Self {
        let mut entries: Vec<String> = gateway.load_or_default(keys::SEARCH_HISTORY);
        truncate_oldest(&mut entries);
        Self { gateway, entries }
    }

    /// Storage order, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, query: &str) -> bool {
        self.entries.iter().any(|entry| entry == query.trim())
    }

    /// Append `query` unless it is blank or already present. A repeated query
    /// keeps its original position.
    pub fn record(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() || self.contains(query) {
            return false;
        }
        self.entries.push(query.to_string());
        truncate_oldest(&mut self.entries);
        self.gateway.persist(keys::SEARCH_HISTORY, &self.entries);
        true
    }

    /// Up to `n` queries, most recent first.
    pub fn recent(&self, n: usize) -> Vec<String> {
        self.entries.iter().rev().take(n).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.gateway.discard(keys::SEARCH_HISTORY);
    }
}

fn truncate_oldest(entries: &mut Vec<String>) {
    if entries.len() > HISTORY_CAPACITY {
        let excess = entries.len() - HISTORY_CAPACITY;
        entries.drain(..excess);
    }
}
