//! Database layer for paperbrief
//!
//! SeaORM entity definitions, the Postgres-backed [`Repository`], and the
//! [`PaperStore`] trait that services receive as an injected handle.

pub mod memory;
pub mod models;
pub mod repository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
pub use models::{Paper, PaperSummary, Subscriber};
pub use repository::Repository;

/// Persistence contract for the fetch/summarize workflow.
///
/// Both save operations insert unconditionally; deduplication is the
/// caller's responsibility via the corresponding find operation. Store
/// errors propagate unwrapped, no retry.
#[async_trait]
pub trait PaperStore: Send + Sync {
    /// Exact-match title lookup returning the first matching row.
    /// Behavior on duplicate titles is undefined (no uniqueness is
    /// enforced at the schema level).
    async fn find_paper_by_title(&self, title: &str) -> Result<Option<Paper>, AppError>;

    /// Insert a new paper with a store-assigned id and fetch timestamp.
    async fn save_paper(
        &self,
        title: &str,
        abstract_text: &str,
        authors: &str,
        url: &str,
    ) -> Result<Paper, AppError>;

    async fn find_summary_for_paper(
        &self,
        paper_id: Uuid,
    ) -> Result<Option<PaperSummary>, AppError>;

    /// Insert a new summary row linked to `paper_id`. Existence of the
    /// paper is only checked by the foreign-key constraint.
    async fn save_summary(
        &self,
        paper_id: Uuid,
        key_findings: &str,
        methodology: &str,
        implications: &str,
    ) -> Result<PaperSummary, AppError>;

    async fn add_subscriber(&self, email: &str) -> Result<Subscriber, AppError>;

    async fn list_subscribers(&self) -> Result<Vec<Subscriber>, AppError>;
}
