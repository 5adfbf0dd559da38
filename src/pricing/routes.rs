//! Pricing route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use uuid::Uuid;

use crate::error::Result;
use crate::AppState;

use super::calculators::calculate_price;
use super::requests::{InlineQuoteRequest, StudioQuoteRequest};
use super::responses::QuoteResponse;
use super::services;

/// Pricing routes, mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pricing/quote", post(quote_inline))
        .route("/studios/:studio_id/quote", post(quote_studio))
        .route("/studios/:studio_id/rates-cache", delete(invalidate_rates))
}

/// Price a selection against rates sent in the request body.
///
/// Negative amounts, discounts outside 0-100 % and overflowing totals are rejected with 400.
pub async fn quote_inline(
    State(state): State<AppState>,
    Json(request): Json<InlineQuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let breakdown = calculate_price(&request.selection, &request.rates, &state.config.pricing_policy())?;
    Ok(Json(QuoteResponse::new(
        request.rates.studio_id,
        request.selection,
        breakdown,
    )))
}

/// Price a selection against a stored studio's rates
pub async fn quote_studio(
    State(state): State<AppState>,
    Path(studio_id): Path<Uuid>,
    Json(request): Json<StudioQuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let breakdown = services::quote_for_studio(
        &state.db,
        &state.cache,
        studio_id,
        &request.selection,
        &state.config.pricing_policy(),
    )
    .await?;

    Ok(Json(QuoteResponse::new(studio_id, request.selection, breakdown)))
}

/// Forget a studio's cached rates after the host edits them
pub async fn invalidate_rates(
    State(state): State<AppState>,
    Path(studio_id): Path<Uuid>,
) -> StatusCode {
    state.cache.invalidate_studio(studio_id).await;
    StatusCode::NO_CONTENT
}
