use bookfinder_core::CoreError;
use thiserror::Error;

/// Errors surfaced by the catalog client and session.
///
/// Transport failures are always classified into one of the human-readable
/// variants; raw `reqwest` errors never leave this crate.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),

    #[error("request timed out, please check your network connection")]
    Timeout,

    #[error("API quota exhausted, please try again later")]
    QuotaExceeded,

    #[error("server error (HTTP {0}), please try again later")]
    Server(u16),

    #[error("network error, please check your connection")]
    Network { detail: String },

    #[error("unexpected response from catalog: {0}")]
    Parse(String),

    #[error("catalog record {0} has no usable id or title")]
    InvalidRecord(String),

    #[error("could not build HTTP client: {0}")]
    ClientBuild(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CatalogError {
    pub fn empty_query() -> Self {
        Self::Validation("please enter a search keyword".to_string())
    }

    pub fn empty_id() -> Self {
        Self::Validation("book id must not be empty".to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Core(CoreError::ValidationError(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
