//! Favorites and reading list, each a persisted set keyed by book id.

use crate::models::{Book, ReadingListEntry};
use crate::storage::{StorageGateway, keys};

#[derive(Debug)]
pub struct CollectionStore {
    gateway: StorageGateway,
    favorites: Vec<Book>,
    reading_list: Vec<ReadingListEntry>,
}

impl CollectionStore {
    /// Rebuild both collections from persisted storage. Missing or unreadable
    /// entries start empty.
    pub fn load(gateway: StorageGateway) -> Self {
        let favorites: Vec<Book> = gateway.load_or_default(keys::FAVORITES);
        let reading_list: Vec<ReadingListEntry> = gateway.load_or_default(keys::READING_LIST);
        tracing::debug!(
            favorites = favorites.len(),
            reading_list = reading_list.len(),
            "collections loaded"
        );
        Self {
            gateway,
            favorites,
            reading_list,
        }
    }

    pub fn favorites(&self) -> &[Book] {
        &self.favorites
    }

    pub fn reading_list(&self) -> &[ReadingListEntry] {
        &self.reading_list
    }

    pub fn is_favorited(&self, id: &str) -> bool {
        self.favorites.iter().any(|book| book.id == id)
    }

    pub fn is_in_reading_list(&self, id: &str) -> bool {
        self.reading_list.iter().any(|entry| entry.id() == id)
    }

    /// Returns `false` if the book was already a favorite.
    pub fn add_favorite(&mut self, book: Book) -> bool {
        if self.is_favorited(&book.id) {
            return false;
        }
        tracing::info!(id = %book.id, title = %book.title, "added to favorites");
        self.favorites.push(book);
        self.gateway.persist(keys::FAVORITES, &self.favorites);
        true
    }

    pub fn remove_favorite(&mut self, id: &str) -> Option<Book> {
        let index = self.favorites.iter().position(|book| book.id == id)?;
        let removed = self.favorites.remove(index);
        tracing::info!(id = %removed.id, title = %removed.title, "removed from favorites");
        self.gateway.persist(keys::FAVORITES, &self.favorites);
        Some(removed)
    }

    /// Flip membership; returns whether the book is a favorite afterwards.
    pub fn toggle_favorite(&mut self, book: Book) -> bool {
        if self.is_favorited(&book.id) {
            self.remove_favorite(&book.id);
            false
        } else {
            self.add_favorite(book)
        }
    }

    /// Returns `false` if the book was already queued.
    pub fn add_to_reading_list(&mut self, book: Book) -> bool {
        if self.is_in_reading_list(&book.id) {
            return false;
        }
        tracing::info!(id = %book.id, title = %book.title, "added to reading list");
        self.reading_list.push(ReadingListEntry::new(book));
        self.gateway.persist(keys::READING_LIST, &self.reading_list);
        true
    }

    pub fn remove_from_reading_list(&mut self, id: &str) -> Option<ReadingListEntry> {
        let index = self.reading_list.iter().position(|entry| entry.id() == id)?;
        let removed = self.reading_list.remove(index);
        self.gateway.persist(keys::READING_LIST, &self.reading_list);
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStore;

    fn book(id: &str) -> Book {
        Book::new(id, format!("Book {id}"))
    }

    #[test]
    fn test_add_favorite_is_idempotent() {
        let mut store = CollectionStore::load(StorageGateway::in_memory());
        assert!(store.add_favorite(book("a")));
        assert!(!store.add_favorite(book("a")));

        assert_eq!(store.favorites().len(), 1);
        let ids: HashSet<_> = store.favorites().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids.len(), store.favorites().len());
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut store = CollectionStore::load(StorageGateway::in_memory());
        store.add_favorite(book("keep"));

        assert!(store.toggle_favorite(book("x")));
        assert!(store.is_favorited("x"));
        assert!(!store.toggle_favorite(book("x")));
        assert!(!store.is_favorited("x"));

        assert!(!store.toggle_favorite(book("keep")));
        assert!(store.toggle_favorite(book("keep")));
        assert_eq!(store.favorites().len(), 1);
    }

    #[test]
    fn test_remove_missing_favorite_is_noop() {
        let mut store = CollectionStore::load(StorageGateway::in_memory());
        store.add_favorite(book("a"));
        assert!(store.remove_favorite("zzz").is_none());
        assert_eq!(store.favorites().len(), 1);
    }

    #[test]
    fn test_favorites_survive_reconstruction() {
        let gateway = StorageGateway::in_memory();
        let mut store = CollectionStore::load(gateway.clone());
        store.add_favorite(book("c"));
        store.add_favorite(book("a"));
        store.add_favorite(book("b"));
        store.remove_favorite("a");

        let reloaded = CollectionStore::load(gateway);
        assert_eq!(reloaded.favorites(), store.favorites());
        let ids: Vec<_> = reloaded.favorites().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[test]
    fn test_reading_list_unique_and_stamped() {
        let gateway = StorageGateway::in_memory();
        let mut store = CollectionStore::load(gateway.clone());

        assert!(store.add_to_reading_list(book("r1")));
        assert!(!store.add_to_reading_list(book("r1")));
        assert!(store.is_in_reading_list("r1"));
        let added_at = store.reading_list()[0].added_at;

        let reloaded = CollectionStore::load(gateway);
        assert_eq!(reloaded.reading_list().len(), 1);
        assert_eq!(reloaded.reading_list()[0].added_at, added_at);

        assert!(store.remove_from_reading_list("r1").is_some());
        assert!(store.remove_from_reading_list("r1").is_none());
        assert!(store.reading_list().is_empty());
    }

    #[test]
    fn test_storage_failure_keeps_in_memory_state() {
        let gateway = StorageGateway::new(Arc::new(MemoryStore::new(8)), "bookFinder");
        let mut store = CollectionStore::load(gateway.clone());

        assert!(store.add_favorite(book("too-big-to-persist")));
        assert!(store.is_favorited("too-big-to-persist"));

        let reloaded = CollectionStore::load(gateway);
        assert!(reloaded.favorites().is_empty());
    }
}
