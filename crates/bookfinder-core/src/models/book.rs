use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const UNKNOWN_PUBLISHER: &str = "Unknown Publisher";
pub const NO_DESCRIPTION: &str = "No description available";
pub const DEFAULT_CATEGORY: &str = "Other";
pub const DEFAULT_LANGUAGE: &str = "zh";
pub const PLACEHOLDER_THUMBNAIL: &str = "/placeholder-book.jpg";
pub const PLACEHOLDER_SMALL_THUMBNAIL: &str = "/placeholder-book-small.jpg";

/// A catalog volume in its canonical, normalized form.
///
/// Instances produced by the catalog client always carry a non-empty `id` and
/// `title`; every other field has been defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub authors: Vec<String>,
    pub publisher: String,
    #[serde(default)]
    pub published_date: String,
    pub description: String,
    #[serde(default)]
    pub page_count: u32,
    pub categories: Vec<String>,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub ratings_count: u32,
    pub language: String,

    pub thumbnail: String,
    pub small_thumbnail: String,

    #[serde(default)]
    pub saleability: Saleability,
    #[serde(default)]
    pub is_ebook: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,

    #[serde(default)]
    pub preview_link: String,
    #[serde(default)]
    pub info_link: String,
    #[serde(default)]
    pub canonical_volume_link: String,

    pub retrieved_at: DateTime<Utc>,
}

impl Book {
    /// A minimal book with every optional field defaulted.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: String::new(),
            authors: vec![UNKNOWN_AUTHOR.to_string()],
            publisher: UNKNOWN_PUBLISHER.to_string(),
            published_date: String::new(),
            description: NO_DESCRIPTION.to_string(),
            page_count: 0,
            categories: vec![DEFAULT_CATEGORY.to_string()],
            average_rating: 0.0,
            ratings_count: 0,
            language: DEFAULT_LANGUAGE.to_string(),
            thumbnail: PLACEHOLDER_THUMBNAIL.to_string(),
            small_thumbnail: PLACEHOLDER_SMALL_THUMBNAIL.to_string(),
            saleability: Saleability::NotForSale,
            is_ebook: false,
            price: None,
            preview_link: String::new(),
            info_link: String::new(),
            canonical_volume_link: String::new(),
            retrieved_at: Utc::now(),
        }
    }

    /// Free ebooks: flagged as an ebook and sold for nothing.
    pub fn is_free(&self) -> bool {
        self.is_ebook && self.saleability == Saleability::Free
    }

    /// Paid books need both a retail price and a for-sale listing.
    pub fn is_paid(&self) -> bool {
        self.price.is_some() && self.saleability == Saleability::ForSale
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Saleability {
    #[default]
    NotForSale,
    ForSale,
    Free,
}

impl Saleability {
    /// Map the provider's saleability string; anything unrecognized is not for sale.
    pub fn from_provider(value: &str) -> Self {
        match value {
            "FOR_SALE" => Self::ForSale,
            "FREE" => Self::Free,
            _ => Self::NotForSale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub amount: f64,
    pub currency_code: String,
}
