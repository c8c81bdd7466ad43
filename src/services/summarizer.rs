//! Research summarizer service
//!
//! Produces the structured three-field synopsis for a paper, preferring
//! a cached summary row over a model call. A summary generated for a
//! title that is not in the store is returned but not persisted, so a
//! repeat request recomputes it; this mirrors the behavior the rest of
//! the system was built against.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::db::PaperStore;
use crate::errors::AppError;
use crate::llm::ChatModel;

/// The three-field summary shape. All fields are required when parsing
/// model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryFields {
    pub key_findings: String,
    pub methodology: String,
    pub implications: String,
}

pub struct ResearchSummarizer {
    store: Arc<dyn PaperStore>,
    model: Arc<dyn ChatModel>,
}

impl ResearchSummarizer {
    pub fn new(store: Arc<dyn PaperStore>, model: Arc<dyn ChatModel>) -> Self {
        Self { store, model }
    }

    /// Return the summary for a paper, generating and caching it if
    /// needed.
    pub async fn summarize(
        &self,
        title: &str,
        abstract_text: &str,
    ) -> Result<SummaryFields, AppError> {
        let paper = self.store.find_paper_by_title(title).await?;

        if let Some(ref paper) = paper {
            if let Some(existing) = self.store.find_summary_for_paper(paper.id).await? {
                metrics::counter!("paperbrief_summary_cache_hits_total").increment(1);
                tracing::debug!(paper_id = %paper.id, "Returning cached summary");
                return Ok(SummaryFields {
                    key_findings: existing.key_findings,
                    methodology: existing.methodology,
                    implications: existing.implications,
                });
            }
        }

        let prompt = build_prompt(title, abstract_text);
        let raw = self.model.complete_json(&prompt).await?;

        let fields: SummaryFields = serde_json::from_str(&raw).map_err(|e| {
            AppError::SummarizeFailed(format!("model returned malformed summary: {e}"))
        })?;

        metrics::counter!("paperbrief_summaries_generated_total").increment(1);

        // Only papers already present in the store get a persisted
        // summary; an unknown title yields a one-off result.
        if let Some(paper) = paper {
            self.store
                .save_summary(
                    paper.id,
                    &fields.key_findings,
                    &fields.methodology,
                    &fields.implications,
                )
                .await?;
            tracing::debug!(paper_id = %paper.id, "Summary persisted");
        } else {
            tracing::debug!(title_len = title.len(), "Paper not in store, summary not persisted");
        }

        Ok(fields)
    }
}

fn build_prompt(title: &str, abstract_text: &str) -> String {
    format!(
        "Analyze and summarize the following research paper:\n\
         Title: {title}\n\
         Abstract: {abstract_text}\n\n\
         Provide a response in the following JSON format:\n\
         {{\n\
         \x20   \"key_findings\": string,\n\
         \x20   \"methodology\": string,\n\
         \x20   \"implications\": string\n\
         }}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::llm::MockChatModel;

    async fn seeded_store(title: &str) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .save_paper(title, "Some abstract", "Authors not implemented", "https://example.com")
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn cached_summary_skips_the_model() {
        let store = seeded_store("Paper A").await;
        let paper = store.find_paper_by_title("Paper A").await.unwrap().unwrap();
        store
            .save_summary(paper.id, "stored findings", "stored methods", "stored implications")
            .await
            .unwrap();

        let model = Arc::new(MockChatModel::new());
        let summarizer = ResearchSummarizer::new(store.clone(), model.clone());

        let fields = summarizer.summarize("Paper A", "Some abstract").await.unwrap();

        assert_eq!(fields.key_findings, "stored findings");
        assert_eq!(fields.methodology, "stored methods");
        assert_eq!(fields.implications, "stored implications");
        assert_eq!(model.calls(), 0);
        assert_eq!(store.summary_count(), 1);
    }

    #[tokio::test]
    async fn uncached_summary_is_generated_once_and_persisted() {
        let store = seeded_store("Paper A").await;
        let model = Arc::new(MockChatModel::new());
        let summarizer = ResearchSummarizer::new(store.clone(), model.clone());

        let fields = summarizer.summarize("Paper A", "Some abstract").await.unwrap();

        assert_eq!(model.calls(), 1);
        assert_eq!(store.summary_count(), 1);

        // The persisted row carries the same three fields.
        let paper = store.find_paper_by_title("Paper A").await.unwrap().unwrap();
        let stored = store.find_summary_for_paper(paper.id).await.unwrap().unwrap();
        assert_eq!(stored.key_findings, fields.key_findings);
        assert_eq!(stored.methodology, fields.methodology);
        assert_eq!(stored.implications, fields.implications);
    }

    #[tokio::test]
    async fn unknown_title_is_summarized_but_not_persisted() {
        let store = Arc::new(MemoryStore::new());
        let model = Arc::new(MockChatModel::new());
        let summarizer = ResearchSummarizer::new(store.clone(), model.clone());

        let fields = summarizer.summarize("Not stored", "Loose abstract").await.unwrap();
        assert!(!fields.key_findings.is_empty());
        assert_eq!(store.summary_count(), 0);

        // No cache row exists, so the identical request hits the model
        // again.
        summarizer.summarize("Not stored", "Loose abstract").await.unwrap();
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn malformed_model_output_fails_without_persisting() {
        let store = seeded_store("Paper A").await;
        let model = Arc::new(MockChatModel::with_json_response(
            r#"{"key_findings": "only one field"}"#,
        ));
        let summarizer = ResearchSummarizer::new(store.clone(), model);

        let err = summarizer.summarize("Paper A", "Some abstract").await.unwrap_err();
        assert!(matches!(err, AppError::SummarizeFailed(_)));
        assert_eq!(store.summary_count(), 0);
    }

    #[test]
    fn prompt_embeds_title_and_abstract() {
        let prompt = build_prompt("T", "A");
        assert!(prompt.contains("Title: T"));
        assert!(prompt.contains("Abstract: A"));
        assert!(prompt.contains("\"key_findings\""));
    }
}
