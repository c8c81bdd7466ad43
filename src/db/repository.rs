//! Postgres repository
//!
//! High-level interface over the SeaORM connection: paper and summary
//! CRUD, subscriber rows, schema bootstrap, and a ping for readiness
//! checks. Every save commits a single row; there are no transactions
//! spanning multiple statements in this workflow.

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, Statement,
};
use uuid::Uuid;

use super::models::{paper, paper_summary, subscriber, Paper, PaperSummary, Subscriber};
use super::PaperStore;
use crate::config::DatabaseConfig;
use crate::errors::AppError;

/// Schema bootstrap statements, executed in order at startup. Tables
/// are created on the fly; a schema this small carries no migration
/// tooling.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS papers (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        abstract TEXT NOT NULL,
        authors TEXT NOT NULL,
        url TEXT NOT NULL,
        fetch_date TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    // Titles are the dedup key but intentionally not UNIQUE; see the
    // PaperStore contract.
    "CREATE INDEX IF NOT EXISTS idx_papers_title ON papers (title)",
    r#"
    CREATE TABLE IF NOT EXISTS paper_summaries (
        id UUID PRIMARY KEY,
        paper_id UUID NOT NULL REFERENCES papers (id),
        key_findings TEXT NOT NULL,
        methodology TEXT NOT NULL,
        implications TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS subscribers (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
];

#[derive(Clone)]
pub struct Repository {
    db: DatabaseConnection,
}

impl Repository {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut opt = sea_orm::ConnectOptions::new(&config.url);
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(600))
            .sqlx_logging(cfg!(debug_assertions));

        let db = sea_orm::Database::connect(opt).await?;

        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Database connection pool initialized"
        );

        Ok(Self { db })
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), DbErr> {
        for stmt in SCHEMA {
            self.db
                .execute(Statement::from_string(DbBackend::Postgres, stmt.to_string()))
                .await?;
        }
        tracing::info!("Database schema ready");
        Ok(())
    }

    /// Ping the database to verify connectivity.
    /// Used by readiness checks.
    pub async fn ping(&self) -> Result<(), DbErr> {
        let stmt = Statement::from_string(DbBackend::Postgres, "SELECT 1".to_string());
        self.db.execute(stmt).await?;
        Ok(())
    }
}

#[async_trait]
impl PaperStore for Repository {
    async fn find_paper_by_title(&self, title: &str) -> Result<Option<Paper>, AppError> {
        Ok(paper::Entity::find()
            .filter(paper::Column::Title.eq(title))
            .one(&self.db)
            .await?)
    }

    async fn save_paper(
        &self,
        title: &str,
        abstract_text: &str,
        authors: &str,
        url: &str,
    ) -> Result<Paper, AppError> {
        let row = paper::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title.to_string()),
            abstract_text: Set(abstract_text.to_string()),
            authors: Set(authors.to_string()),
            url: Set(url.to_string()),
            fetch_date: Set(chrono::Utc::now().into()),
        };
        Ok(row.insert(&self.db).await?)
    }

    async fn find_summary_for_paper(
        &self,
        paper_id: Uuid,
    ) -> Result<Option<PaperSummary>, AppError> {
        Ok(paper_summary::Entity::find()
            .filter(paper_summary::Column::PaperId.eq(paper_id))
            .one(&self.db)
            .await?)
    }

    async fn save_summary(
        &self,
        paper_id: Uuid,
        key_findings: &str,
        methodology: &str,
        implications: &str,
    ) -> Result<PaperSummary, AppError> {
        let row = paper_summary::ActiveModel {
            id: Set(Uuid::new_v4()),
            paper_id: Set(paper_id),
            key_findings: Set(key_findings.to_string()),
            methodology: Set(methodology.to_string()),
            implications: Set(implications.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(row.insert(&self.db).await?)
    }

    async fn add_subscriber(&self, email: &str) -> Result<Subscriber, AppError> {
        let row = subscriber::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(row.insert(&self.db).await?)
    }

    async fn list_subscribers(&self) -> Result<Vec<Subscriber>, AppError> {
        Ok(subscriber::Entity::find()
            .order_by_asc(subscriber::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}
