use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Book;

/// A reading-list item: the book itself plus when it was queued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListEntry {
    #[serde(flatten)]
    pub book: Book,
    pub added_at: DateTime<Utc>,
}

impl ReadingListEntry {
    pub fn new(book: Book) -> Self {
        Self {
            book,
            added_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.book.id
    }
}

/// Persisted search counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchStats {
    pub search_count: u64,
    pub last_search_time: Option<DateTime<Utc>>,
}

/// Aggregate view over stats and collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibrarySummary {
    pub total_searches: u64,
    pub last_search: Option<DateTime<Utc>>,
    pub favorite_count: usize,
    pub reading_list_count: usize,
}
