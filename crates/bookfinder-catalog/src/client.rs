use std::time::Duration;

use async_trait::async_trait;
use bookfinder_core::CatalogConfig;
use bookfinder_core::models::{Book, SearchOptions, SearchPage};

use crate::error::{CatalogError, Result};
use crate::http::CatalogHttpClient;
use crate::normalize::{parse_volume, parse_volume_list};
use crate::query;

/// A remote catalog the search session can query.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// One page of normalized results for `query`.
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchPage>;

    /// A single normalized record.
    async fn get_by_id(&self, id: &str) -> Result<Book>;
}

/// Google Books volumes API.
#[derive(Debug, Clone)]
pub struct GoogleBooksClient {
    http: CatalogHttpClient,
    base_url: String,
    defaults: SearchOptions,
}

impl GoogleBooksClient {
    pub fn new() -> Result<Self> {
        Self::from_config(&CatalogConfig::default())
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        query::validate_options(&config.search)?;
        Ok(Self {
            http: CatalogHttpClient::new(
                Duration::from_secs(config.timeout_secs),
                &config.user_agent,
            )?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            defaults: config.search.clone(),
        })
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::from_config(&CatalogConfig {
            base_url: base_url.to_string(),
            ..CatalogConfig::default()
        })
    }

    /// Request URL for a volume search. `query` is sent trimmed and percent-encoded.
    pub fn volumes_url(&self, query: &str, options: &SearchOptions) -> String {
        let mut url = format!(
            "{}/volumes?q={}&maxResults={}&startIndex={}&orderBy={}&filter={}&printType={}",
            self.base_url,
            urlencoding::encode(query.trim()),
            options.max_results,
            options.start_index,
            options.order_by.as_str(),
            options.filter.as_str(),
            options.print_type.as_str(),
        );
        if let Some(lang) = options.effective_lang_restrict() {
            url.push_str("&langRestrict=");
            url.push_str(&urlencoding::encode(lang));
        }
        url
    }

    /// Featured shelf: `category`, or a random featured topic, 12 results.
    pub async fn get_featured(&self, category: Option<&str>) -> Result<SearchPage> {
        let category = query::featured_category(category);
        self.search(&category, &query::featured_options(&self.defaults))
            .await
    }

    pub async fn search_by_author(&self, author: &str) -> Result<SearchPage> {
        let (q, options) = query::author_query(author, &self.defaults)?;
        self.search(&q, &options).await
    }

    pub async fn search_by_category(&self, category: &str) -> Result<SearchPage> {
        let (q, options) = query::category_query(category, &self.defaults)?;
        self.search(&q, &options).await
    }
}

#[async_trait]
impl CatalogSource for GoogleBooksClient {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchPage> {
        let query = query::require_query(query)?;
        query::validate_options(options)?;

        let url = self.volumes_url(query, options);
        let body = self.http.get(&url).await?;
        let (books, total_items) = parse_volume_list(&body)?;

        tracing::debug!(
            query,
            start_index = options.start_index,
            fetched = books.len(),
            total_items,
            "volume search completed"
        );
        Ok(SearchPage {
            books,
            total_items,
            has_more: options.has_more(total_items),
        })
    }

    async fn get_by_id(&self, id: &str) -> Result<Book> {
        let id = id.trim();
        if id.is_empty() {
            return Err(CatalogError::empty_id());
        }
        let url = format!("{}/volumes/{}", self.base_url, urlencoding::encode(id));
        let body = self.http.get(&url).await?;
        parse_volume(&body, id)
    }
}
