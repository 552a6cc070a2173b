use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::models::Book;

pub const DEFAULT_MAX_RESULTS: u32 = 40;
/// The provider refuses pages larger than this.
pub const MAX_RESULTS_LIMIT: u32 = 40;
pub const DEFAULT_LANG_RESTRICT: &str = "zh-TW";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    #[default]
    Relevance,
    Newest,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Newest => "newest",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolumeFilter {
    Partial,
    Full,
    FreeEbooks,
    PaidEbooks,
    #[default]
    Ebooks,
}

impl VolumeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Partial => "partial",
            Self::Full => "full",
            Self::FreeEbooks => "free-ebooks",
            Self::PaidEbooks => "paid-ebooks",
            Self::Ebooks => "ebooks",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintType {
    #[default]
    All,
    Books,
    Magazines,
}

impl PrintType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Books => "books",
            Self::Magazines => "magazines",
        }
    }
}

/// Every option a volume search understands, with the provider defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub max_results: u32,
    pub start_index: u32,
    pub order_by: OrderBy,
    pub filter: VolumeFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang_restrict: Option<String>,
    pub print_type: PrintType,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            start_index: 0,
            order_by: OrderBy::Relevance,
            filter: VolumeFilter::Ebooks,
            lang_restrict: Some(DEFAULT_LANG_RESTRICT.to_string()),
            print_type: PrintType::All,
        }
    }
}

impl SearchOptions {
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_start_index(mut self, start_index: u32) -> Self {
        self.start_index = start_index;
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 || self.max_results > MAX_RESULTS_LIMIT {
            return Err(CoreError::ValidationError(format!(
                "max_results must be between 1 and {MAX_RESULTS_LIMIT}, got {}",
                self.max_results
            )));
        }
        Ok(())
    }

    /// Language restriction to send, if any. Blank values mean "no restriction".
    pub fn effective_lang_restrict(&self) -> Option<&str> {
        self.lang_restrict
            .as_deref()
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
    }

    /// Whether the provider has results beyond the page these options request.
    pub fn has_more(&self, total_items: u32) -> bool {
        u64::from(self.start_index) + u64::from(self.max_results) < u64::from(total_items)
    }
}

/// One page of normalized results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub books: Vec<Book>,
    pub total_items: u32,
    pub has_more: bool,
}

/// Client-side price filter applied over fetched results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceFilter {
    #[default]
    All,
    Free,
    Paid,
}

impl PriceFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            Self::All => true,
            Self::Free => book.is_free(),
            Self::Paid => book.is_paid(),
        }
    }
}

/// Books from `books` passing `filter`, in their original order.
pub fn filter_by_price(books: &[Book], filter: PriceFilter) -> Vec<Book> {
    books
        .iter()
        .filter(|book| filter.matches(book))
        .cloned()
        .collect()
}
