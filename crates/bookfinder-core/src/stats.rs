use chrono::Utc;

use crate::models::SearchStats;
use crate::storage::{StorageGateway, keys};

/// Counts completed searches and remembers when the last one finished.
#[derive(Debug)]
pub struct StatsTracker {
    gateway: StorageGateway,
    stats: SearchStats,
}

impl StatsTracker {
    pub fn load(gateway: StorageGateway) -> Self {
        let stats = gateway.load_or_default(keys::STATS);
        Self { gateway, stats }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn record_search(&mut self) {
        self.stats.search_count += 1;
        self.stats.last_search_time = Some(Utc::now());
        self.gateway.persist(keys::STATS, &self.stats);
    }
}
