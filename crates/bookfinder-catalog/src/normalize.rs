//! Provider volume records → canonical [`Book`]s.
//!
//! This is the validity gate: a record without an id or title never becomes a
//! `Book`, and every other field is defaulted here.

use bookfinder_core::models::{
    Book, DEFAULT_CATEGORY, DEFAULT_LANGUAGE, NO_DESCRIPTION, PLACEHOLDER_SMALL_THUMBNAIL,
    PLACEHOLDER_THUMBNAIL, Price, Saleability, UNKNOWN_AUTHOR, UNKNOWN_PUBLISHER,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{CatalogError, Result};

// Every raw field is lenient: a value of the wrong shape reads as absent, so
// only a missing id or title can drop a record.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawVolume {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub volume_info: Option<RawVolumeInfo>,
    #[serde(deserialize_with = "lenient")]
    pub sale_info: Option<RawSaleInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawVolumeInfo {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "string_list")]
    pub authors: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    pub publisher: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub published_date: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub page_count: Option<u32>,
    #[serde(deserialize_with = "string_list")]
    pub categories: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    pub average_rating: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub ratings_count: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub language: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub image_links: Option<RawImageLinks>,
    #[serde(deserialize_with = "lenient")]
    pub preview_link: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub info_link: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub canonical_volume_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawImageLinks {
    #[serde(deserialize_with = "lenient")]
    pub small_thumbnail: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub thumbnail: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub small: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub medium: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub large: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub extra_large: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSaleInfo {
    #[serde(deserialize_with = "lenient")]
    pub saleability: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub is_ebook: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub retail_price: Option<RawPrice>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPrice {
    #[serde(deserialize_with = "lenient")]
    pub amount: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub currency_code: Option<String>,
}

/// `Some` if the value has the expected shape, `None` otherwise.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// A list of strings, or a bare string as a one-element list. Non-string
/// entries are skipped.
fn string_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(vec![s]),
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn non_empty_list(value: Option<Vec<String>>, fallback: &str) -> Vec<String> {
    let list: Vec<String> = value
        .unwrap_or_default()
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect();
    if list.is_empty() {
        vec![fallback.to_string()]
    } else {
        list
    }
}

/// large → medium → thumbnail → smallThumbnail → placeholder.
pub fn thumbnail_url(links: Option<&RawImageLinks>) -> String {
    links
        .and_then(|l| {
            [&l.large, &l.medium, &l.thumbnail, &l.small_thumbnail]
                .into_iter()
                .flatten()
                .find(|url| !url.trim().is_empty())
                .cloned()
        })
        .unwrap_or_else(|| PLACEHOLDER_THUMBNAIL.to_string())
}

/// smallThumbnail → thumbnail → placeholder.
pub fn small_thumbnail_url(links: Option<&RawImageLinks>) -> String {
    links
        .and_then(|l| {
            [&l.small_thumbnail, &l.thumbnail]
                .into_iter()
                .flatten()
                .find(|url| !url.trim().is_empty())
                .cloned()
        })
        .unwrap_or_else(|| PLACEHOLDER_SMALL_THUMBNAIL.to_string())
}

/// Normalize one record, or `None` if it lacks an id or title.
pub fn normalize_volume(raw: RawVolume, retrieved_at: DateTime<Utc>) -> Option<Book> {
    let id = non_blank(raw.id)?;
    let info = raw.volume_info.unwrap_or_default();
    let title = non_blank(info.title)?;
    let sale = raw.sale_info.unwrap_or_default();

    let price = sale.retail_price.map(|p| Price {
        amount: p.amount.unwrap_or_default(),
        currency_code: p.currency_code.unwrap_or_default(),
    });

    Some(Book {
        id,
        title,
        subtitle: info.subtitle.unwrap_or_default(),
        authors: non_empty_list(info.authors, UNKNOWN_AUTHOR),
        publisher: non_blank(info.publisher).unwrap_or_else(|| UNKNOWN_PUBLISHER.to_string()),
        published_date: info.published_date.unwrap_or_default(),
        description: non_blank(info.description).unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        page_count: info.page_count.unwrap_or_default(),
        categories: non_empty_list(info.categories, DEFAULT_CATEGORY),
        average_rating: info.average_rating.unwrap_or_default(),
        ratings_count: info.ratings_count.unwrap_or_default(),
        language: non_blank(info.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        thumbnail: thumbnail_url(info.image_links.as_ref()),
        small_thumbnail: small_thumbnail_url(info.image_links.as_ref()),
        saleability: sale
            .saleability
            .as_deref()
            .map(Saleability::from_provider)
            .unwrap_or_default(),
        is_ebook: sale.is_ebook.unwrap_or_default(),
        price,
        preview_link: info.preview_link.unwrap_or_default(),
        info_link: info.info_link.unwrap_or_default(),
        canonical_volume_link: info.canonical_volume_link.unwrap_or_default(),
        retrieved_at,
    })
}

/// Normalize a `/volumes` response body into books and the provider's total.
///
/// Items that fail to decode or normalize are dropped, not reported.
pub fn parse_volume_list(body: &str) -> Result<(Vec<Book>, u32)> {
    let json: Value = serde_json::from_str(body).map_err(|e| CatalogError::Parse(e.to_string()))?;
    let total_items = json
        .get("totalItems")
        .and_then(Value::as_u64)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0);

    let now = Utc::now();
    let books: Vec<Book> = json
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<RawVolume>(item.clone()).ok())
                .filter_map(|raw| normalize_volume(raw, now))
                .collect()
        })
        .unwrap_or_default();

    let dropped = json
        .get("items")
        .and_then(Value::as_array)
        .map_or(0, |items| items.len() - books.len());
    if dropped > 0 {
        tracing::debug!(dropped, "dropped catalog records without id or title");
    }

    Ok((books, total_items))
}

/// Normalize a single `/volumes/{id}` response body.
pub fn parse_volume(body: &str, requested_id: &str) -> Result<Book> {
    let raw: RawVolume = serde_json::from_str(body).map_err(|e| CatalogError::Parse(e.to_string()))?;
    normalize_volume(raw, Utc::now())
        .ok_or_else(|| CatalogError::InvalidRecord(requested_id.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(value: Value) -> RawVolume {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_full_record() {
        let book = normalize_volume(
            raw(json!({
                "id": "zyTCAlFPjgYC",
                "volumeInfo": {
                    "title": "The Google Story",
                    "authors": ["David A. Vise", "Mark Malseed"],
                    "publisher": "Random House",
                    "publishedDate": "2005-11-15",
                    "pageCount": 207,
                    "categories": ["Browsers (Computer programs)"],
                    "averageRating": 3.5,
                    "ratingsCount": 136,
                    "language": "en",
                    "imageLinks": {
                        "smallThumbnail": "http://img/small",
                        "thumbnail": "http://img/thumb",
                        "large": "http://img/large"
                    },
                    "previewLink": "http://preview",
                    "infoLink": "http://info",
                    "canonicalVolumeLink": "http://canonical"
                },
                "saleInfo": {
                    "saleability": "FOR_SALE",
                    "isEbook": true,
                    "retailPrice": {"amount": 11.99, "currencyCode": "USD"}
                }
            })),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(book.id, "zyTCAlFPjgYC");
        assert_eq!(book.authors.len(), 2);
        assert_eq!(book.thumbnail, "http://img/large");
        assert_eq!(book.small_thumbnail, "http://img/small");
        assert_eq!(book.saleability, Saleability::ForSale);
        assert!(book.is_ebook);
        assert_eq!(
            book.price,
            Some(Price {
                amount: 11.99,
                currency_code: "USD".to_string()
            })
        );
        assert!(book.is_paid());
    }

    #[test]
    fn test_missing_fields_are_defaulted() {
        let book = normalize_volume(
            raw(json!({"id": "x1", "volumeInfo": {"title": "Bare", "publisher": ""}})),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(book.authors, vec![UNKNOWN_AUTHOR.to_string()]);
        assert_eq!(book.publisher, UNKNOWN_PUBLISHER);
        assert_eq!(book.description, NO_DESCRIPTION);
        assert_eq!(book.categories, vec![DEFAULT_CATEGORY.to_string()]);
        assert_eq!(book.thumbnail, PLACEHOLDER_THUMBNAIL);
        assert_eq!(book.small_thumbnail, PLACEHOLDER_SMALL_THUMBNAIL);
        assert_eq!(book.saleability, Saleability::NotForSale);
        assert!(book.price.is_none());
    }

    #[test]
    fn test_empty_author_list_gets_sentinel() {
        let book = normalize_volume(
            raw(json!({"id": "x2", "volumeInfo": {"title": "T", "authors": []}})),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(book.authors, vec![UNKNOWN_AUTHOR.to_string()]);
    }

    #[test]
    fn test_records_without_title_or_id_are_dropped() {
        assert!(normalize_volume(raw(json!({"id": "no-title", "volumeInfo": {}})), Utc::now()).is_none());
        assert!(normalize_volume(raw(json!({"id": "blank", "volumeInfo": {"title": "  "}})), Utc::now()).is_none());
        assert!(normalize_volume(raw(json!({"volumeInfo": {"title": "No id"}})), Utc::now()).is_none());
    }

    #[test]
    fn test_thumbnail_preference() {
        let links = RawImageLinks {
            medium: Some("m".to_string()),
            thumbnail: Some("t".to_string()),
            ..Default::default()
        };
        assert_eq!(thumbnail_url(Some(&links)), "m");
        assert_eq!(small_thumbnail_url(Some(&links)), "t");
        assert_eq!(thumbnail_url(None), PLACEHOLDER_THUMBNAIL);
    }

    #[test]
    fn test_parse_volume_list_filters_and_counts() {
        let body = json!({
            "totalItems": 3,
            "items": [
                {"id": "a", "volumeInfo": {"title": "Kept"}},
                {"id": "b", "volumeInfo": {"authors": ["Nobody"]}},
                {"id": "c", "volumeInfo": {"title": 42}},
                {"id": "d", "volumeInfo": {"title": "Also kept"}}
            ]
        })
        .to_string();

        let (books, total) = parse_volume_list(&body).unwrap();
        assert_eq!(total, 3);
        let ids: Vec<_> = books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
    }

    #[test]
    fn test_mistyped_secondary_fields_fall_back() {
        let body = json!({
            "totalItems": 4,
            "items": [
                {"id": "a", "volumeInfo": {"title": "One author", "authors": "Jane Doe"}},
                {"id": "b", "volumeInfo": {"title": "Negative pages", "pageCount": -1, "categories": [7, "Poetry"]}},
                {"id": "c", "volumeInfo": {"title": "Odd links", "imageLinks": "none"}, "saleInfo": {"retailPrice": "free"}},
                {"id": "d", "volumeInfo": {"title": "Clean", "pageCount": 120}}
            ]
        })
        .to_string();

        let (books, _) = parse_volume_list(&body).unwrap();
        let ids: Vec<_> = books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);

        assert_eq!(books[0].authors, vec!["Jane Doe".to_string()]);
        assert_eq!(books[1].page_count, 0);
        assert_eq!(books[1].categories, vec!["Poetry".to_string()]);
        assert_eq!(books[2].thumbnail, PLACEHOLDER_THUMBNAIL);
        assert!(books[2].price.is_none());
        assert_eq!(books[3].page_count, 120);
    }

    #[test]
    fn test_parse_volume_list_without_items() {
        let (books, total) = parse_volume_list(r#"{"kind": "books#volumes", "totalItems": 0}"#).unwrap();
        assert!(books.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn test_parse_volume_rejects_untitled_record() {
        let err = parse_volume(r#"{"id": "q", "volumeInfo": {}}"#, "q").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRecord(id) if id == "q"));
    }
}
