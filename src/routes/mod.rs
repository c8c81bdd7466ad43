pub mod health;
pub mod newsletter;
pub mod papers;

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::db::Repository;
use crate::services::AppState;

/// Maximum concurrent requests (backpressure control)
const MAX_CONCURRENT_REQUESTS: usize = 100;

/// Request timeout. Generous because one search can chain a PubMed
/// round trip and several sequential model calls.
const REQUEST_TIMEOUT_SECS: u64 = 120;

pub fn create_router(state: AppState, repo: Repository, metrics_router: Router) -> Router {
    // Health routes keep their own state: readiness pings the database
    // directly.
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/readiness", get(health::readiness_check))
        .with_state(repo);

    let api_routes = Router::new()
        .route("/api/v1/papers/search", get(papers::search_papers))
        .route("/api/v1/papers/summarize", post(papers::summarize_paper))
        .route("/api/v1/newsletter/preview", get(newsletter::preview_newsletter))
        .route("/api/v1/newsletter/send", post(newsletter::send_newsletter))
        .route(
            "/api/v1/subscribers",
            post(newsletter::subscribe).get(newsletter::list_subscribers),
        )
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .merge(metrics_router)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
                .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS)),
        )
}
