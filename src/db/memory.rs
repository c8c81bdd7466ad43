//! In-memory store for tests and development
//!
//! Implements [`PaperStore`] over mutex-guarded vectors, mirroring the
//! repository's behavior: unconditional inserts, first-match title
//! lookup, store-assigned ids and timestamps. Exposes row counts so
//! tests can assert on insert activity.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::models::{Paper, PaperSummary, Subscriber};
use super::PaperStore;
use crate::errors::AppError;

#[derive(Default)]
pub struct MemoryStore {
    papers: Mutex<Vec<Paper>>,
    summaries: Mutex<Vec<PaperSummary>>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of paper rows ever inserted (rows are never deleted).
    pub fn paper_count(&self) -> usize {
        self.papers.lock().unwrap().len()
    }

    pub fn summary_count(&self) -> usize {
        self.summaries.lock().unwrap().len()
    }
}

#[async_trait]
impl PaperStore for MemoryStore {
    async fn find_paper_by_title(&self, title: &str) -> Result<Option<Paper>, AppError> {
        Ok(self
            .papers
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.title == title)
            .cloned())
    }

    async fn save_paper(
        &self,
        title: &str,
        abstract_text: &str,
        authors: &str,
        url: &str,
    ) -> Result<Paper, AppError> {
        let row = Paper {
            id: Uuid::new_v4(),
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
            authors: authors.to_string(),
            url: url.to_string(),
            fetch_date: chrono::Utc::now().into(),
        };
        self.papers.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn find_summary_for_paper(
        &self,
        paper_id: Uuid,
    ) -> Result<Option<PaperSummary>, AppError> {
        Ok(self
            .summaries
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.paper_id == paper_id)
            .cloned())
    }

    async fn save_summary(
        &self,
        paper_id: Uuid,
        key_findings: &str,
        methodology: &str,
        implications: &str,
    ) -> Result<PaperSummary, AppError> {
        let row = PaperSummary {
            id: Uuid::new_v4(),
            paper_id,
            key_findings: key_findings.to_string(),
            methodology: methodology.to_string(),
            implications: implications.to_string(),
            created_at: chrono::Utc::now().into(),
        };
        self.summaries.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn add_subscriber(&self, email: &str) -> Result<Subscriber, AppError> {
        let row = Subscriber {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: chrono::Utc::now().into(),
        };
        self.subscribers.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list_subscribers(&self) -> Result<Vec<Subscriber>, AppError> {
        Ok(self.subscribers.lock().unwrap().clone())
    }
}
