//! Structured query builders and the fixed category lists.

use bookfinder_core::CoreError;
use bookfinder_core::models::{OrderBy, SearchOptions};
use rand::seq::IndexedRandom;

use crate::error::{CatalogError, Result};

/// Page size used by author and category searches.
pub const STRUCTURED_PAGE_SIZE: u32 = 20;
pub const FEATURED_PAGE_SIZE: u32 = 12;

/// Topics the featured shelf draws from when no category is given.
pub const FEATURED_CATEGORIES: &[&str] = &[
    "programming",
    "artificial intelligence",
    "JavaScript",
    "Python",
    "Vue.js",
    "fiction",
    "business management",
    "self-improvement",
    "history",
    "science",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabeledValue {
    pub label: &'static str,
    pub value: &'static str,
}

/// Browse categories offered to the user; an empty value means "all".
pub const BOOK_CATEGORIES: &[LabeledValue] = &[
    LabeledValue { label: "All", value: "" },
    LabeledValue { label: "Programming", value: "programming" },
    LabeledValue { label: "Fiction", value: "fiction" },
    LabeledValue { label: "Business", value: "business" },
    LabeledValue { label: "Self-help", value: "self-help" },
    LabeledValue { label: "Science", value: "science" },
    LabeledValue { label: "History", value: "history" },
    LabeledValue { label: "Art", value: "art" },
    LabeledValue { label: "Cooking", value: "cooking" },
    LabeledValue { label: "Travel", value: "travel" },
    LabeledValue { label: "Health", value: "health" },
];

pub const SORT_OPTIONS: &[(&str, OrderBy)] = &[
    ("Relevance", OrderBy::Relevance),
    ("Newest", OrderBy::Newest),
];

/// Trimmed, non-empty query text.
pub fn require_query(query: &str) -> Result<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CatalogError::empty_query());
    }
    Ok(query)
}

pub fn validate_options(options: &SearchOptions) -> Result<()> {
    options.validate().map_err(|e| match e {
        CoreError::ValidationError(msg) => CatalogError::Validation(msg),
        other => CatalogError::Core(other),
    })
}

/// `inauthor:` query, newest first.
pub fn author_query(author: &str, defaults: &SearchOptions) -> Result<(String, SearchOptions)> {
    let author = require_query(author)?;
    let options = defaults
        .clone()
        .with_start_index(0)
        .with_max_results(STRUCTURED_PAGE_SIZE)
        .with_order_by(OrderBy::Newest);
    Ok((format!("inauthor:{author}"), options))
}

/// `subject:` query with default ordering.
pub fn category_query(category: &str, defaults: &SearchOptions) -> Result<(String, SearchOptions)> {
    let category = require_query(category)?;
    let options = defaults
        .clone()
        .with_start_index(0)
        .with_max_results(STRUCTURED_PAGE_SIZE);
    Ok((format!("subject:{category}"), options))
}

/// The requested category, or a uniformly random featured one when blank.
pub fn featured_category(category: Option<&str>) -> String {
    match category.map(str::trim).filter(|c| !c.is_empty()) {
        Some(category) => category.to_string(),
        None => FEATURED_CATEGORIES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(FEATURED_CATEGORIES[0])
            .to_string(),
    }
}

pub fn featured_options(defaults: &SearchOptions) -> SearchOptions {
    defaults
        .clone()
        .with_start_index(0)
        .with_max_results(FEATURED_PAGE_SIZE)
        .with_order_by(OrderBy::Relevance)
}
