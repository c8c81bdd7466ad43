use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use paperbrief::config::AppConfig;
use paperbrief::db::Repository;
use paperbrief::email::Mailer;
use paperbrief::llm::{ChatModel, MockChatModel, OpenAiChat};
use paperbrief::pubmed::{EntrezClient, LiteratureClient};
use paperbrief::services::AppState;
use paperbrief::{metrics, routes};

/// Graceful shutdown signal handler
/// Listens for SIGINT (Ctrl+C) and SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    tracing::info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    dotenvy::dotenv().ok();
    let config = AppConfig::build()?;

    // 2. Setup logging with JSON format for production
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.rust_log))
        .json()
        .with_current_span(true)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting paperbrief...");

    // 3. Initialize database and bootstrap the schema
    let repo = Repository::new(&config.database).await?;
    repo.init_schema().await?;
    tracing::info!("Connected to database");

    // 4. External clients
    let literature: Arc<dyn LiteratureClient> = Arc::new(EntrezClient::new(config.pubmed.clone())?);

    let model: Arc<dyn ChatModel> = if config.llm.api_key == "mock" {
        tracing::warn!("Using mock chat model - not for production use");
        Arc::new(MockChatModel::new())
    } else {
        Arc::new(OpenAiChat::new(config.llm.clone())?)
    };

    let mailer = if config.smtp.is_configured() {
        Some(Arc::new(Mailer::new(&config.smtp)?))
    } else {
        tracing::warn!("SMTP not configured, newsletter delivery disabled");
        None
    };

    // 5. Application state and router
    let state = AppState::new(repo.clone(), literature, model, mailer)?;
    let metrics_router = metrics::setup_metrics()?;
    let app = routes::create_router(state, repo, metrics_router);

    // 6. Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
