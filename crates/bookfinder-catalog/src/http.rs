use std::time::Duration;

use reqwest::StatusCode;

use crate::error::{CatalogError, Result};

// ─── CatalogHttpClient ────────────────────────────────────────────────────────

/// Thin GET client with a hard request timeout.
///
/// Failed requests are classified and returned once; there is no retry.
#[derive(Debug, Clone)]
pub struct CatalogHttpClient {
    client: reqwest::Client,
}

impl CatalogHttpClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| CatalogError::ClientBuild(e.to_string()))?;
        Ok(Self { client })
    }

    pub async fn get(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "sending catalog request");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "catalog request failed");
            return Err(classify_status(status));
        }

        let body = resp.text().await.map_err(classify_transport)?;
        tracing::debug!(url, bytes = body.len(), "catalog response received");
        Ok(body)
    }
}

/// Map a non-success HTTP status onto the error taxonomy.
pub fn classify_status(status: StatusCode) -> CatalogError {
    match status.as_u16() {
        403 | 429 => CatalogError::QuotaExceeded,
        code if code >= 500 => CatalogError::Server(code),
        code => CatalogError::Network {
            detail: format!("HTTP {code}"),
        },
    }
}

fn classify_transport(err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        tracing::warn!(error = %err, "catalog request timed out");
        return CatalogError::Timeout;
    }
    if let Some(status) = err.status() {
        return classify_status(status);
    }
    tracing::warn!(error = %err, "catalog transport error");
    CatalogError::Network {
        detail: err.to_string(),
    }
}
