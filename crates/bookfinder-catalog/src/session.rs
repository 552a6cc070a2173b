//! Search session: query execution, pagination and error/loading state.
//!
//! State lives behind an async mutex that is never held across a catalog
//! request, so session futures can be polled concurrently. Each new search
//! bumps a generation counter; responses from an older generation are dropped
//! instead of overwriting newer state.
//!
//! History and stats writes may hit the filesystem, so they run on the
//! blocking pool and never under the state lock.

use std::sync::{Arc, PoisonError};

use bookfinder_core::models::{
    Book, OrderBy, PriceFilter, SearchOptions, SearchPage, SearchStats, filter_by_price,
};
use bookfinder_core::{HistoryTracker, StatsTracker, StorageGateway};
use tokio::sync::Mutex;

use crate::client::CatalogSource;
use crate::error::{CatalogError, Result};
use crate::query;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    Searching,
    Ready,
    Error,
}

/// What happened to a fetch once it finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was applied to the session.
    Applied { fetched: usize },
    /// The request failed; the message is in the session's error field.
    Failed(String),
    /// A newer request started meanwhile, so this response was discarded.
    Superseded,
    /// Nothing was requested.
    Skipped,
}

/// Observable session state. Cloned out by [`SearchSession::state`].
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub query: String,
    /// Options of the first page of the current query.
    pub options: SearchOptions,
    pub results: Vec<Book>,
    pub total_items: u32,
    pub current_page: u32,
    pub has_more: bool,
    pub error: Option<String>,
    pub in_flight: bool,
    pub generation: u64,

    pub price_filter: PriceFilter,
    pub sort_by: OrderBy,
    pub selected_category: Option<String>,

    pub selected_book: Option<Book>,
    pub loading_detail: bool,
    pub featured: Vec<Book>,
    pub loading_featured: bool,
}

impl SessionState {
    /// Results passing the active price filter. Stored results are untouched.
    pub fn filtered_results(&self) -> Vec<Book> {
        filter_by_price(&self.results, self.price_filter)
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    fn clear_results(&mut self) {
        self.results.clear();
        self.total_items = 0;
        self.has_more = false;
        self.current_page = 0;
    }
}

struct Inner {
    state: SessionState,
    detail_request: u64,
    featured_request: u64,
}

struct Trackers {
    history: HistoryTracker,
    stats: StatsTracker,
}

pub struct SearchSession<S> {
    source: S,
    defaults: SearchOptions,
    inner: Mutex<Inner>,
    trackers: Arc<std::sync::Mutex<Trackers>>,
}

impl<S: CatalogSource> SearchSession<S> {
    /// A fresh idle session. History and stats are loaded from `gateway`.
    pub fn new(source: S, defaults: SearchOptions, gateway: &StorageGateway) -> Self {
        let state = SessionState {
            options: defaults.clone(),
            sort_by: defaults.order_by,
            ..SessionState::default()
        };
        Self {
            source,
            defaults,
            inner: Mutex::new(Inner {
                state,
                detail_request: 0,
                featured_request: 0,
            }),
            trackers: Arc::new(std::sync::Mutex::new(Trackers {
                history: HistoryTracker::load(gateway.clone()),
                stats: StatsTracker::load(gateway.clone()),
            })),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state.clone()
    }

    pub async fn filtered_results(&self) -> Vec<Book> {
        self.inner.lock().await.state.filtered_results()
    }

    pub async fn set_price_filter(&self, filter: PriceFilter) {
        self.inner.lock().await.state.price_filter = filter;
    }

    /// Ordering used by later searches that don't pass explicit options.
    pub async fn set_sort_order(&self, order: OrderBy) {
        self.inner.lock().await.state.sort_by = order;
    }

    /// Start a new query, replacing any accumulated results.
    ///
    /// Only validation problems are returned as errors; a failed request is
    /// reported through the session's error field and `FetchOutcome::Failed`.
    pub async fn search(&self, query: &str, options: Option<SearchOptions>) -> Result<FetchOutcome> {
        let query = match query::require_query(query) {
            Ok(q) => q.to_string(),
            Err(e) => return Err(self.surface(e).await),
        };
        let options = match options {
            Some(options) => options,
            None => {
                let sort_by = self.inner.lock().await.state.sort_by;
                self.defaults.clone().with_start_index(0).with_order_by(sort_by)
            }
        };
        if let Err(e) = query::validate_options(&options) {
            return Err(self.surface(e).await);
        }

        Ok(self.run_search(query, options, true).await)
    }

    /// `inauthor:` search. Replaces results like any new search but is not
    /// recorded in history.
    pub async fn search_by_author(&self, author: &str) -> Result<FetchOutcome> {
        let (query, options) = match query::author_query(author, &self.defaults) {
            Ok(built) => built,
            Err(e) => return Err(self.surface(e).await),
        };
        Ok(self.run_search(query, options, false).await)
    }

    /// `subject:` search. Replaces results like any new search but is not
    /// recorded in history.
    pub async fn search_by_category(&self, category: &str) -> Result<FetchOutcome> {
        let (query, options) = match query::category_query(category, &self.defaults) {
            Ok(built) => built,
            Err(e) => return Err(self.surface(e).await),
        };
        self.inner.lock().await.state.selected_category = Some(category.trim().to_string());
        Ok(self.run_search(query, options, false).await)
    }

    async fn run_search(&self, query: String, options: SearchOptions, track: bool) -> FetchOutcome {
        let generation = {
            let mut inner = self.inner.lock().await;
            let state = &mut inner.state;
            state.generation += 1;
            state.phase = SessionPhase::Searching;
            state.in_flight = true;
            state.error = None;
            state.query = query.clone();
            state.options = options.clone();
            state.generation
        };
        tracing::debug!(%query, generation, "search started");

        let result = self.source.search(&query, &options).await;

        let mut inner = self.inner.lock().await;
        if inner.state.generation != generation {
            tracing::debug!(%query, generation, "discarding superseded search response");
            return FetchOutcome::Superseded;
        }

        let state = &mut inner.state;
        state.in_flight = false;
        let outcome = match result {
            Ok(SearchPage {
                books,
                total_items,
                has_more,
            }) => {
                let fetched = books.len();
                state.results = books;
                state.total_items = total_items;
                state.has_more = has_more;
                state.current_page = 0;
                state.phase = SessionPhase::Ready;
                tracing::info!(%query, fetched, total_items, "search completed");
                FetchOutcome::Applied { fetched }
            }
            Err(e) => {
                tracing::warn!(%query, error = %e, "search failed");
                let message = e.to_string();
                state.clear_results();
                state.error = Some(message.clone());
                state.phase = SessionPhase::Error;
                FetchOutcome::Failed(message)
            }
        };
        drop(inner);

        if track && matches!(outcome, FetchOutcome::Applied { .. }) {
            self.with_trackers(move |t| {
                t.history.record(&query);
                t.stats.record_search();
            })
            .await;
        }
        outcome
    }

    /// Fetch the next page of the current query and append it.
    ///
    /// Skipped when there is nothing more to fetch or a request is already in
    /// flight. A failure keeps existing results and only sets the error field.
    pub async fn load_more(&self) -> FetchOutcome {
        let (generation, query, options) = {
            let mut inner = self.inner.lock().await;
            let state = &mut inner.state;
            if !state.has_more || state.in_flight {
                return FetchOutcome::Skipped;
            }
            let page_size = state.options.max_results;
            let next_start = state
                .options
                .start_index
                .saturating_add((state.current_page + 1).saturating_mul(page_size));
            state.in_flight = true;
            (
                state.generation,
                state.query.clone(),
                state.options.clone().with_start_index(next_start),
            )
        };
        tracing::debug!(%query, start_index = options.start_index, "loading more results");

        let result = self.source.search(&query, &options).await;

        let mut inner = self.inner.lock().await;
        let state = &mut inner.state;
        if state.generation != generation {
            tracing::debug!(%query, generation, "discarding stale page");
            return FetchOutcome::Superseded;
        }

        state.in_flight = false;
        match result {
            Ok(page) => {
                let fetched = page.books.len();
                state.results.extend(page.books);
                state.total_items = page.total_items;
                state.has_more = page.has_more;
                state.current_page += 1;
                tracing::info!(%query, fetched, page = state.current_page, "loaded more results");
                FetchOutcome::Applied { fetched }
            }
            Err(e) => {
                tracing::warn!(%query, error = %e, "loading more results failed");
                let message = e.to_string();
                state.error = Some(message.clone());
                FetchOutcome::Failed(message)
            }
        }
    }

    /// Fetch one book into `selected_book`.
    pub async fn load_book_detail(&self, id: &str) -> Result<FetchOutcome> {
        let id = id.trim();
        if id.is_empty() {
            return Err(self.surface(CatalogError::empty_id()).await);
        }

        let request = {
            let mut inner = self.inner.lock().await;
            inner.detail_request += 1;
            inner.state.loading_detail = true;
            inner.state.error = None;
            inner.detail_request
        };

        let result = self.source.get_by_id(id).await;

        let mut inner = self.inner.lock().await;
        if inner.detail_request != request {
            return Ok(FetchOutcome::Superseded);
        }
        let state = &mut inner.state;
        state.loading_detail = false;
        Ok(match result {
            Ok(book) => {
                tracing::info!(id, title = %book.title, "book detail loaded");
                state.selected_book = Some(book);
                FetchOutcome::Applied { fetched: 1 }
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "loading book detail failed");
                let message = e.to_string();
                state.selected_book = None;
                state.error = Some(message.clone());
                FetchOutcome::Failed(message)
            }
        })
    }

    /// Fill the featured shelf from `category`, or a random featured topic.
    pub async fn load_featured(&self, category: Option<&str>) -> FetchOutcome {
        let category = query::featured_category(category);
        let options = query::featured_options(&self.defaults);

        let request = {
            let mut inner = self.inner.lock().await;
            inner.featured_request += 1;
            inner.state.loading_featured = true;
            inner.state.error = None;
            inner.featured_request
        };

        let result = self.source.search(&category, &options).await;

        let mut inner = self.inner.lock().await;
        if inner.featured_request != request {
            return FetchOutcome::Superseded;
        }
        let state = &mut inner.state;
        state.loading_featured = false;
        match result {
            Ok(page) => {
                let fetched = page.books.len();
                tracing::info!(%category, fetched, "featured books loaded");
                state.featured = page.books;
                FetchOutcome::Applied { fetched }
            }
            Err(e) => {
                tracing::warn!(%category, error = %e, "loading featured books failed");
                let message = e.to_string();
                state.featured.clear();
                state.error = Some(message.clone());
                FetchOutcome::Failed(message)
            }
        }
    }

    /// Back to idle. Any request still in flight will be discarded.
    pub async fn clear_results(&self) {
        let mut inner = self.inner.lock().await;
        let state = &mut inner.state;
        state.generation += 1;
        state.in_flight = false;
        state.clear_results();
        state.query.clear();
        state.error = None;
        state.phase = SessionPhase::Idle;
    }

    /// Clear results, detail and featured books.
    pub async fn reset(&self) {
        self.clear_results().await;
        let mut inner = self.inner.lock().await;
        inner.detail_request += 1;
        inner.featured_request += 1;
        let state = &mut inner.state;
        state.selected_book = None;
        state.loading_detail = false;
        state.featured.clear();
        state.loading_featured = false;
    }

    pub async fn recent_searches(&self, n: usize) -> Vec<String> {
        self.with_trackers(move |t| t.history.recent(n)).await
    }

    pub async fn history(&self) -> Vec<String> {
        self.with_trackers(|t| t.history.entries().to_vec()).await
    }

    pub async fn clear_history(&self) {
        self.with_trackers(|t| t.history.clear()).await;
    }

    pub async fn stats(&self) -> SearchStats {
        self.with_trackers(|t| t.stats.stats().clone()).await
    }

    /// Run `f` against history and stats on the blocking pool.
    async fn with_trackers<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Trackers) -> R + Send + 'static,
        R: Default + Send + 'static,
    {
        let trackers = Arc::clone(&self.trackers);
        let task = tokio::task::spawn_blocking(move || {
            let mut guard = trackers.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        });
        match task.await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "history/stats task failed");
                R::default()
            }
        }
    }

    /// Put a validation error in the error field and hand it back.
    async fn surface(&self, err: CatalogError) -> CatalogError {
        self.inner.lock().await.state.error = Some(err.to_string());
        err
    }
}
