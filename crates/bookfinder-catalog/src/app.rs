use bookfinder_core::models::{LibrarySummary, SearchOptions};
use bookfinder_core::{AppConfig, CollectionStore, StorageGateway};

use crate::client::{CatalogSource, GoogleBooksClient};
use crate::error::Result;
use crate::session::SearchSession;

/// One application instance: storage, collections and the search session.
pub struct BookFinder<S> {
    gateway: StorageGateway,
    collections: CollectionStore,
    session: SearchSession<S>,
}

impl BookFinder<GoogleBooksClient> {
    /// Build against the Google Books catalog with the configured storage.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let source = GoogleBooksClient::from_config(&config.catalog)?;
        let gateway = StorageGateway::from_config(&config.storage);
        tracing::info!(
            namespace = gateway.namespace(),
            base_url = %config.catalog.base_url,
            "book finder initialized"
        );
        Ok(Self::new(source, config.catalog.search.clone(), gateway))
    }
}

impl<S: CatalogSource> BookFinder<S> {
    pub fn new(source: S, defaults: SearchOptions, gateway: StorageGateway) -> Self {
        let collections = CollectionStore::load(gateway.clone());
        let session = SearchSession::new(source, defaults, &gateway);
        Self {
            gateway,
            collections,
            session,
        }
    }

    pub fn gateway(&self) -> &StorageGateway {
        &self.gateway
    }

    pub fn session(&self) -> &SearchSession<S> {
        &self.session
    }

    pub fn collections(&self) -> &CollectionStore {
        &self.collections
    }

    pub fn collections_mut(&mut self) -> &mut CollectionStore {
        &mut self.collections
    }

    pub async fn summary(&self) -> LibrarySummary {
        let stats = self.session.stats().await;
        LibrarySummary {
            total_searches: stats.search_count,
            last_search: stats.last_search_time,
            favorite_count: self.collections.favorites().len(),
            reading_list_count: self.collections.reading_list().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookfinder_core::models::{Book, SearchPage};
    use bookfinder_core::{StorageBackend, StorageConfig};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tempfile::tempdir;

    struct StaticCatalog;

    #[async_trait::async_trait]
    impl CatalogSource for StaticCatalog {
        async fn search(&self, query: &str, _options: &SearchOptions) -> Result<SearchPage> {
            Ok(SearchPage {
                books: vec![Book::new(format!("{query}-1"), query)],
                total_items: 1,
                has_more: false,
            })
        }

        async fn get_by_id(&self, id: &str) -> Result<Book> {
            Ok(Book::new(id, "Detail"))
        }
    }

    #[tokio::test]
    async fn test_summary_counts_everything() {
        let mut app = BookFinder::new(StaticCatalog, SearchOptions::default(), StorageGateway::in_memory());
        app.session().search("rust", None).await.unwrap();
        app.session().search("go", None).await.unwrap();
        app.collections_mut().add_favorite(Book::new("a", "A"));
        app.collections_mut().add_to_reading_list(Book::new("b", "B"));
        app.collections_mut().add_to_reading_list(Book::new("c", "C"));

        let summary = app.summary().await;
        assert_eq!(summary.total_searches, 2);
        assert!(summary.last_search.is_some());
        assert_eq!(summary.favorite_count, 1);
        assert_eq!(summary.reading_list_count, 2);
    }

    #[tokio::test]
    async fn test_state_reloads_from_shared_storage() {
        let gateway = StorageGateway::in_memory();
        {
            let mut app = BookFinder::new(StaticCatalog, SearchOptions::default(), gateway.clone());
            app.session().search("dune", None).await.unwrap();
            app.collections_mut().toggle_favorite(Book::new("dune-1", "Dune"));
        }

        let app = BookFinder::new(StaticCatalog, SearchOptions::default(), gateway);
        assert!(app.collections().is_favorited("dune-1"));
        assert_eq!(app.session().history().await, vec!["dune".to_string()]);
        assert_eq!(app.summary().await.total_searches, 1);
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let mut config = AppConfig::default();
        config.catalog.search.max_results = 0;
        let err = BookFinder::from_config(&config).err().unwrap();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_from_config_end_to_end() {
        let dir = tempdir().unwrap();
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/volumes")
            .match_query(Matcher::UrlEncoded("q".into(), "tolkien".into()))
            .with_status(200)
            .with_body(
                json!({"totalItems": 1, "items": [{"id": "lotr", "volumeInfo": {"title": "The Lord of the Rings"}}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let mut config = AppConfig::default();
        config.catalog.base_url = server.url();
        config.storage = StorageConfig {
            backend: StorageBackend::File,
            directory: dir.path().display().to_string(),
            ..StorageConfig::default()
        };

        let mut app = BookFinder::from_config(&config).unwrap();
        app.session().search("tolkien", None).await.unwrap();
        let book = app.session().state().await.results[0].clone();
        assert_eq!(book.title, "The Lord of the Rings");
        app.collections_mut().add_favorite(book);

        let reopened = BookFinder::from_config(&config).unwrap();
        assert!(reopened.collections().is_favorited("lotr"));
        assert_eq!(reopened.session().history().await, vec!["tolkien".to_string()]);
    }
}
