//! PubMed E-utilities client
//!
//! Two round trips per search: `esearch.fcgi` returns matching PMIDs,
//! `efetch.fcgi` returns the article records for all ids in one batch.
//! Both responses are XML; parsing lives in [`parse`] so it can be
//! exercised against canned documents.

pub mod parse;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::PubMedConfig;
use crate::errors::AppError;

/// Request timeout fallback if the configured value is unusable.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// One article entry from an efetch response. Title and abstract are
/// optional because either element may be absent from the record; the
/// fetcher decides what to do with incomplete entries.
#[derive(Debug, Clone, PartialEq)]
pub struct PubMedArticle {
    pub pmid: String,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
}

/// Literature-search API seam.
///
/// Implementations must be Send + Sync for use across tokio tasks.
#[async_trait]
pub trait LiteratureClient: Send + Sync {
    /// Search for article ids matching `query`, newest first, capped at
    /// `max_results`.
    async fn search_ids(&self, query: &str, max_results: u32) -> Result<Vec<String>, AppError>;

    /// Fetch full article records for the given ids in a single call.
    async fn fetch_articles(&self, ids: &[String]) -> Result<Vec<PubMedArticle>, AppError>;
}

/// HTTP client against the NCBI Entrez endpoints.
pub struct EntrezClient {
    client: reqwest::Client,
    config: PubMedConfig,
}

impl EntrezClient {
    pub fn new(config: PubMedConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::FetchFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    async fn get_xml(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String, AppError> {
        let url = format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'));

        let res = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::FetchFailed(format!("{endpoint} request failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(AppError::FetchFailed(format!(
                "{endpoint} returned HTTP {status}"
            )));
        }

        res.text()
            .await
            .map_err(|e| AppError::FetchFailed(format!("{endpoint} body read failed: {e}")))
    }
}

#[async_trait]
impl LiteratureClient for EntrezClient {
    async fn search_ids(&self, query: &str, max_results: u32) -> Result<Vec<String>, AppError> {
        let params = [
            ("db", self.config.db.clone()),
            ("term", query.to_string()),
            ("retmax", max_results.to_string()),
            ("sort", "date".to_string()),
        ];
        let body = self.get_xml("esearch.fcgi", &params).await?;
        let ids = parse::esearch_ids(&body)?;

        tracing::debug!(query_len = query.len(), ids = ids.len(), "esearch completed");
        Ok(ids)
    }

    async fn fetch_articles(&self, ids: &[String]) -> Result<Vec<PubMedArticle>, AppError> {
        let params = [
            ("db", self.config.db.clone()),
            ("id", ids.join(",")),
            ("retmode", "xml".to_string()),
        ];
        let body = self.get_xml("efetch.fcgi", &params).await?;
        let articles = parse::efetch_articles(&body)?;

        tracing::debug!(requested = ids.len(), returned = articles.len(), "efetch completed");
        Ok(articles)
    }
}
