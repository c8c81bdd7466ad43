use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::db::Paper;
use crate::errors::AppError;
use crate::services::fetcher::DEFAULT_MAX_RESULTS;
use crate::services::summarizer::SummaryFields;
use crate::services::AppState;

/// Search query parameters with validation
#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    /// Free-text query (required, 1-500 chars)
    #[validate(length(min = 1, max = 500, message = "Query must be 1-500 characters"))]
    q: String,

    /// Result cap (default: 10, max: 50)
    #[validate(range(min = 1, max = 50, message = "Limit must be 1-50"))]
    limit: Option<u32>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub papers: Vec<Paper>,
    pub total_results: usize,
    /// Article entries dropped for missing titles.
    pub skipped: usize,
}

/// Search papers endpoint
///
/// Runs the PubMed search and returns paper records, reusing stored
/// rows for titles seen before.
#[instrument(skip(state), fields(query_len = params.q.len(), limit = params.limit))]
pub async fn search_papers(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    params.validate().map_err(validation_error)?;

    if params.q.trim().is_empty() {
        return Err(AppError::MissingField("q".to_string()));
    }

    let limit = params.limit.unwrap_or(DEFAULT_MAX_RESULTS);
    let query = params.q.clone();

    let outcome = state.fetcher.search(&params.q, limit).await?;
    let total_results = outcome.papers.len();

    Ok(Json(SearchResponse {
        query,
        papers: outcome.papers,
        total_results,
        skipped: outcome.skipped,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SummarizeRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    title: String,

    #[serde(rename = "abstract")]
    abstract_text: String,
}

/// Summarize paper endpoint
///
/// Returns the cached summary when one exists for the title, otherwise
/// generates one via the chat model.
#[instrument(skip(state, req), fields(title_len = req.title.len()))]
pub async fn summarize_paper(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummaryFields>, AppError> {
    req.validate().map_err(validation_error)?;

    let fields = state
        .summarizer
        .summarize(&req.title, &req.abstract_text)
        .await?;

    Ok(Json(fields))
}

pub(super) fn validation_error(e: validator::ValidationErrors) -> AppError {
    let messages: Vec<String> = e
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |err| {
                format!(
                    "{}: {}",
                    field,
                    err.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_default()
                )
            })
        })
        .collect();
    AppError::ValidationError(messages.join("; "))
}
