//! Service layer for paperbrief
//!
//! Business logic over the external seams: paper fetching,
//! summarization, and newsletter generation. Services are thread-safe
//! and shared via Arc; each receives its collaborators at construction
//! rather than reaching for process-wide state.

use std::sync::Arc;

use crate::db::{PaperStore, Repository};
use crate::email::Mailer;
use crate::errors::AppError;
use crate::llm::ChatModel;
use crate::pubmed::LiteratureClient;

pub mod fetcher;
pub mod newsletter;
pub mod summarizer;

pub use fetcher::PaperFetcher;
pub use newsletter::NewsletterService;
pub use summarizer::ResearchSummarizer;

/// Application state container for dependency injection.
///
/// Cheap to clone; handlers pull the service they need.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<PaperFetcher>,
    pub summarizer: Arc<ResearchSummarizer>,
    pub newsletter: Arc<NewsletterService>,
    /// Direct store access for subscriber management.
    pub store: Arc<dyn PaperStore>,
}

impl AppState {
    pub fn new(
        repo: Repository,
        literature: Arc<dyn LiteratureClient>,
        model: Arc<dyn ChatModel>,
        mailer: Option<Arc<Mailer>>,
    ) -> Result<Self, AppError> {
        let store: Arc<dyn PaperStore> = Arc::new(repo);
        Ok(Self {
            fetcher: Arc::new(PaperFetcher::new(store.clone(), literature)),
            summarizer: Arc::new(ResearchSummarizer::new(store.clone(), model.clone())),
            newsletter: Arc::new(NewsletterService::new(model, mailer)?),
            store,
        })
    }
}
