use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use super::papers::validation_error;
use crate::db::Subscriber;
use crate::errors::AppError;
use crate::services::newsletter::{render_html, Newsletter};
use crate::services::AppState;

#[derive(Serialize)]
pub struct PreviewResponse {
    pub newsletter: Newsletter,
    pub html: String,
}

/// Newsletter preview endpoint
///
/// Generates this week's content without sending anything.
#[instrument(skip(state))]
pub async fn preview_newsletter(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let newsletter = state.newsletter.generate().await?;
    let html = render_html(&newsletter);
    Ok(Json(PreviewResponse { newsletter, html }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendRequest {
    #[validate(email(message = "Recipient must be a valid email address"))]
    recipient: String,
}

#[derive(Serialize)]
pub struct SendResponse {
    pub sent_to: String,
}

/// Newsletter send endpoint
#[instrument(skip(state, req))]
pub async fn send_newsletter(
    State(state): State<AppState>,
    Json(req): Json<SendRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate().map_err(validation_error)?;

    state.newsletter.send(&req.recipient).await?;
    Ok(Json(SendResponse {
        sent_to: req.recipient,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(email(message = "Must be a valid email address"))]
    email: String,
}

/// Subscribe endpoint
#[instrument(skip(state, req))]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(req): Json<SubscribeRequest>,
) -> Result<Json<Subscriber>, AppError> {
    req.validate().map_err(validation_error)?;

    let subscriber = state.store.add_subscriber(&req.email).await?;
    tracing::info!(subscriber_id = %subscriber.id, "New subscriber");
    Ok(Json(subscriber))
}

#[derive(Serialize)]
pub struct SubscribersResponse {
    pub subscribers: Vec<Subscriber>,
    pub total: usize,
}

/// Subscriber list endpoint
pub async fn list_subscribers(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let subscribers = state.store.list_subscribers().await?;
    let total = subscribers.len();
    Ok(Json(SubscribersResponse { subscribers, total }))
}
