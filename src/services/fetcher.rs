//! Paper fetch service
//!
//! Runs the two-round-trip PubMed search and reconciles the returned
//! articles against the store: known titles come back verbatim from
//! their stored rows, unknown titles are persisted first. Entries
//! without a usable title are skipped and surfaced as a count rather
//! than silently dropped.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::db::{Paper, PaperStore};
use crate::errors::AppError;
use crate::pubmed::LiteratureClient;

/// Abstract placeholder when the article record carries none.
pub const NO_ABSTRACT_PLACEHOLDER: &str = "No abstract available";

/// Author extraction is not implemented upstream; every new row gets
/// this literal.
pub const AUTHORS_PLACEHOLDER: &str = "Authors not implemented";

/// Default result cap when the caller does not specify one.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Outcome of one search call. `papers` preserves the order the
/// external API returned (the requested recency sort); `skipped`
/// counts entries dropped for missing titles.
#[derive(Debug, Serialize)]
pub struct SearchOutcome {
    pub papers: Vec<Paper>,
    pub skipped: usize,
}

pub struct PaperFetcher {
    store: Arc<dyn PaperStore>,
    client: Arc<dyn LiteratureClient>,
}

impl PaperFetcher {
    pub fn new(store: Arc<dyn PaperStore>, client: Arc<dyn LiteratureClient>) -> Self {
        Self { store, client }
    }

    /// Search the literature API and return paper records, reusing
    /// stored rows where the title already exists.
    ///
    /// Transport or parse failures in either round trip abort the whole
    /// call; a store error aborts as well. Only per-entry extraction
    /// problems are isolated.
    pub async fn search(&self, query: &str, max_results: u32) -> Result<SearchOutcome, AppError> {
        let start = Instant::now();

        let ids = self.client.search_ids(query, max_results).await?;
        if ids.is_empty() {
            tracing::debug!(query_len = query.len(), "Search returned no ids");
            return Ok(SearchOutcome {
                papers: Vec::new(),
                skipped: 0,
            });
        }

        let articles = self.client.fetch_articles(&ids).await?;

        let mut papers = Vec::with_capacity(articles.len());
        let mut skipped = 0usize;

        for article in articles {
            let title = match article.title.as_deref().map(str::trim) {
                Some(t) if !t.is_empty() => t.to_string(),
                _ => {
                    skipped += 1;
                    tracing::debug!(pmid = %article.pmid, "Article entry has no title, skipping");
                    continue;
                }
            };

            if let Some(existing) = self.store.find_paper_by_title(&title).await? {
                // Stored fields are returned verbatim; the fresh entry
                // is not re-parsed.
                papers.push(existing);
                continue;
            }

            let abstract_text = article
                .abstract_text
                .unwrap_or_else(|| NO_ABSTRACT_PLACEHOLDER.to_string());
            let url = article_url(&article.pmid);

            let saved = self
                .store
                .save_paper(&title, &abstract_text, AUTHORS_PLACEHOLDER, &url)
                .await?;
            papers.push(saved);
        }

        metrics::counter!("paperbrief_search_ops_total").increment(1);
        metrics::histogram!("paperbrief_search_duration_seconds")
            .record(start.elapsed().as_secs_f64());
        metrics::histogram!("paperbrief_search_results_count").record(papers.len() as f64);

        tracing::debug!(
            query_len = query.len(),
            results = papers.len(),
            skipped,
            duration_ms = start.elapsed().as_millis(),
            "Search completed"
        );

        Ok(SearchOutcome { papers, skipped })
    }
}

/// Detail-page URL for an article id.
fn article_url(pmid: &str) -> String {
    format!("https://pubmed.ncbi.nlm.nih.gov/{pmid}/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::pubmed::PubMedArticle;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted literature client returning fixed ids and articles.
    struct ScriptedClient {
        ids: Vec<String>,
        articles: Vec<PubMedArticle>,
        fetch_calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(ids: &[&str], articles: Vec<PubMedArticle>) -> Self {
            Self {
                ids: ids.iter().map(|s| s.to_string()).collect(),
                articles,
                fetch_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LiteratureClient for ScriptedClient {
        async fn search_ids(&self, _query: &str, _max: u32) -> Result<Vec<String>, AppError> {
            Ok(self.ids.clone())
        }

        async fn fetch_articles(&self, _ids: &[String]) -> Result<Vec<PubMedArticle>, AppError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.articles.clone())
        }
    }

    /// Client that fails one of the two round trips.
    struct FailingClient {
        fail_search: bool,
    }

    #[async_trait]
    impl LiteratureClient for FailingClient {
        async fn search_ids(&self, _query: &str, _max: u32) -> Result<Vec<String>, AppError> {
            if self.fail_search {
                Err(AppError::FetchFailed("esearch request failed".to_string()))
            } else {
                Ok(vec!["111".to_string()])
            }
        }

        async fn fetch_articles(&self, _ids: &[String]) -> Result<Vec<PubMedArticle>, AppError> {
            Err(AppError::FetchFailed("efetch request failed".to_string()))
        }
    }

    fn article(pmid: &str, title: Option<&str>, abstract_text: Option<&str>) -> PubMedArticle {
        PubMedArticle {
            pmid: pmid.to_string(),
            title: title.map(str::to_string),
            abstract_text: abstract_text.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn empty_id_list_returns_empty_and_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let client = Arc::new(ScriptedClient::new(&[], vec![]));
        let fetcher = PaperFetcher::new(store.clone(), client.clone());

        let outcome = fetcher.search("no hits", DEFAULT_MAX_RESULTS).await.unwrap();

        assert!(outcome.papers.is_empty());
        assert_eq!(outcome.skipped, 0);
        assert_eq!(store.paper_count(), 0);
        // The detail fetch round trip is not even attempted.
        assert_eq!(client.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn new_titles_are_persisted_with_placeholders() {
        let store = Arc::new(MemoryStore::new());
        let client = Arc::new(ScriptedClient::new(
            &["111", "222"],
            vec![
                article("111", Some("Paper A"), Some("Abstract A")),
                article("222", Some("Paper B"), None),
            ],
        ));
        let fetcher = PaperFetcher::new(store.clone(), client);

        let outcome = fetcher.search("CRISPR gene editing", 10).await.unwrap();

        assert_eq!(outcome.papers.len(), 2);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(store.paper_count(), 2);

        assert_eq!(outcome.papers[0].title, "Paper A");
        assert_eq!(outcome.papers[0].abstract_text, "Abstract A");
        assert_eq!(outcome.papers[0].authors, AUTHORS_PLACEHOLDER);
        assert_eq!(outcome.papers[0].url, "https://pubmed.ncbi.nlm.nih.gov/111/");

        assert_eq!(outcome.papers[1].abstract_text, NO_ABSTRACT_PLACEHOLDER);
    }

    #[tokio::test]
    async fn repeated_search_reuses_stored_rows() {
        let store = Arc::new(MemoryStore::new());
        let client = Arc::new(ScriptedClient::new(
            &["111", "222"],
            vec![
                article("111", Some("Paper A"), Some("Abstract A")),
                article("222", Some("Paper B"), Some("Abstract B")),
            ],
        ));
        let fetcher = PaperFetcher::new(store.clone(), client);

        let first = fetcher.search("CRISPR gene editing", 10).await.unwrap();
        let second = fetcher.search("CRISPR gene editing", 10).await.unwrap();

        // Second run returns the same titles sourced from the store,
        // with zero new inserts.
        assert_eq!(store.paper_count(), 2);
        assert_eq!(second.papers.len(), 2);
        for (a, b) in first.papers.iter().zip(second.papers.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.title, b.title);
            assert_eq!(a.abstract_text, b.abstract_text);
        }
    }

    #[tokio::test]
    async fn titleless_entries_are_skipped_and_counted() {
        let store = Arc::new(MemoryStore::new());
        let client = Arc::new(ScriptedClient::new(
            &["111", "222", "333"],
            vec![
                article("111", Some("Paper A"), None),
                article("222", None, Some("orphan abstract")),
                article("333", Some("  "), None),
            ],
        ));
        let fetcher = PaperFetcher::new(store.clone(), client);

        let outcome = fetcher.search("partial batch", 10).await.unwrap();

        assert_eq!(outcome.papers.len(), 1);
        assert_eq!(outcome.skipped, 2);
        assert_eq!(store.paper_count(), 1);
    }

    #[tokio::test]
    async fn id_search_failure_aborts_without_store_writes() {
        let store = Arc::new(MemoryStore::new());
        let client = Arc::new(FailingClient { fail_search: true });
        let fetcher = PaperFetcher::new(store.clone(), client);

        let err = fetcher.search("any", 10).await.unwrap_err();
        assert!(matches!(err, AppError::FetchFailed(_)));
        assert_eq!(store.paper_count(), 0);
    }

    #[tokio::test]
    async fn detail_fetch_failure_aborts_without_store_writes() {
        let store = Arc::new(MemoryStore::new());
        let client = Arc::new(FailingClient { fail_search: false });
        let fetcher = PaperFetcher::new(store.clone(), client);

        let err = fetcher.search("any", 10).await.unwrap_err();
        assert!(matches!(err, AppError::FetchFailed(_)));
        assert_eq!(store.paper_count(), 0);
    }

    #[tokio::test]
    async fn persisted_fields_round_trip_through_title_lookup() {
        let store = Arc::new(MemoryStore::new());
        let client = Arc::new(ScriptedClient::new(
            &["111"],
            vec![article("111", Some("Paper A"), Some("Abstract A"))],
        ));
        let fetcher = PaperFetcher::new(store.clone(), client);

        let outcome = fetcher.search("round trip", 10).await.unwrap();
        let saved = &outcome.papers[0];

        let found = store
            .find_paper_by_title("Paper A")
            .await
            .unwrap()
            .expect("paper should be stored");
        assert_eq!(found.title, saved.title);
        assert_eq!(found.abstract_text, saved.abstract_text);
        assert_eq!(found.authors, saved.authors);
        assert_eq!(found.url, saved.url);
    }
}
