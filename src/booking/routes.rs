//! Booking wizard route handlers

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::pricing::services::load_studio_rates;
use crate::pricing::PriceBreakdown;
use crate::AppState;

use super::confirmation::Confirmation;
use super::wizard::{BookingWizard, WizardPatch};

/// Request to open a booking session
#[derive(Debug, Deserialize)]
pub struct StartBookingRequest {
    pub studio_id: Uuid,
}

/// Session state plus the live price summary
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: BookingWizard,
    pub step_number: usize,
    pub step_title: &'static str,
    pub missing_fields: Vec<&'static str>,
    pub summary: PriceBreakdown,
}

/// Live summary fragment
#[derive(Template)]
#[template(path = "booking/summary.html")]
struct SummaryTemplate {
    studio_name: String,
    step_number: usize,
    step_title: &'static str,
    duration: u32,
    duration_unit: &'static str,
    currency: String,
    base_price: String,
    equipment_price: String,
    insurance_price: String,
    subtotal: String,
    discount_percent: String,
    discount_amount: String,
    total: String,
    deposit_amount: String,
    final_amount: String,
    has_equipment: bool,
    has_insurance: bool,
    has_discount: bool,
}

/// Booking routes, mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(start_booking))
        .route("/bookings/:session_id", get(get_booking).patch(update_booking))
        .route("/bookings/:session_id/next", post(next_step))
        .route("/bookings/:session_id/back", post(prev_step))
        .route("/bookings/:session_id/summary", get(summary_fragment))
        .route("/bookings/:session_id/complete", post(complete_booking))
        .route("/confirmations/:reference", get(get_confirmation))
}

async fn load_session(state: &AppState, session_id: Uuid) -> Result<BookingWizard> {
    state
        .cache
        .sessions
        .get(&session_id)
        .await
        .map(|wizard| (*wizard).clone())
        .ok_or_else(|| AppError::NotFound(format!("Booking session {}", session_id)))
}

async fn save_session(state: &AppState, wizard: BookingWizard) {
    state.cache.sessions.insert(wizard.id, Arc::new(wizard)).await;
}

async fn session_response(state: &AppState, wizard: BookingWizard) -> Result<SessionResponse> {
    let rates = load_studio_rates(&state.db, &state.cache, wizard.studio_id).await?;
    let summary = wizard.summary(&rates, &state.config.pricing_policy())?;

    Ok(SessionResponse {
        step_number: wizard.step.number(),
        step_title: wizard.step.title(),
        missing_fields: wizard.missing_fields(wizard.step),
        summary,
        session: wizard,
    })
}

/// Open a wizard for a studio
pub async fn start_booking(
    State(state): State<AppState>,
    Json(request): Json<StartBookingRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let rates = load_studio_rates(&state.db, &state.cache, request.studio_id).await?;
    let wizard = BookingWizard::for_studio(&rates);

    tracing::info!("Booking session {} opened for studio {}", wizard.id, wizard.studio_id);
    save_session(&state, wizard.clone()).await;

    Ok((StatusCode::CREATED, Json(session_response(&state, wizard).await?)))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    let wizard = load_session(&state, session_id).await?;
    Ok(Json(session_response(&state, wizard).await?))
}

pub async fn update_booking(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(patch): Json<WizardPatch>,
) -> Result<Json<SessionResponse>> {
    let mut wizard = load_session(&state, session_id).await?;
    wizard.update(patch)?;
    save_session(&state, wizard.clone()).await;

    Ok(Json(session_response(&state, wizard).await?))
}

pub async fn next_step(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    let mut wizard = load_session(&state, session_id).await?;
    let step = wizard.next_step()?;
    tracing::debug!("Booking session {} advanced to {}", session_id, step);
    save_session(&state, wizard.clone()).await;

    Ok(Json(session_response(&state, wizard).await?))
}

pub async fn prev_step(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    let mut wizard = load_session(&state, session_id).await?;
    wizard.prev_step()?;
    save_session(&state, wizard.clone()).await;

    Ok(Json(session_response(&state, wizard).await?))
}

/// HTML fragment re-rendered by the booking page after every change
pub async fn summary_fragment(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Html<String>> {
    let wizard = load_session(&state, session_id).await?;
    let rates = load_studio_rates(&state.db, &state.cache, wizard.studio_id).await?;
    let summary = wizard.summary(&rates, &state.config.pricing_policy())?;

    let template = SummaryTemplate {
        studio_name: rates.name.clone(),
        step_number: wizard.step.number(),
        step_title: wizard.step.title(),
        duration: wizard.duration.unwrap_or(0),
        duration_unit: wizard.pricing_type.unit(),
        currency: summary.currency.clone(),
        base_price: summary.base_price.to_string(),
        equipment_price: summary.equipment_price.to_string(),
        insurance_price: summary.insurance_price.to_string(),
        subtotal: summary.subtotal.to_string(),
        discount_percent: summary.discount_percent.normalize().to_string(),
        discount_amount: summary.discount_amount.to_string(),
        total: summary.total.to_string(),
        deposit_amount: summary.deposit_amount.to_string(),
        final_amount: summary.final_amount.to_string(),
        has_equipment: !summary.equipment_price.is_zero(),
        has_insurance: wizard.insurance,
        has_discount: !summary.discount_amount.is_zero(),
    };

    Ok(Html(template.render()?))
}

/// Finish the wizard and hand the booking off
pub async fn complete_booking(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Confirmation>)> {
    let wizard = load_session(&state, session_id).await?;
    let rates = load_studio_rates(&state.db, &state.cache, wizard.studio_id).await?;

    let confirmation = wizard.complete(&rates, &state.config.pricing_policy(), |booking| {
        tracing::info!(
            "Booking {} handed off: studio {} on {} at {}, total {} {}",
            booking.reference,
            booking.studio_id,
            booking.date,
            booking.start_time,
            booking.breakdown.currency,
            booking.breakdown.total
        );
        Confirmation::issue(booking)
    })??;

    let stored = state
        .cache
        .confirmations
        .entry(confirmation.reference.clone())
        .or_insert_with(async { Arc::new(confirmation.clone()) })
        .await;
    if !stored.is_fresh() {
        return Err(AppError::Internal(format!(
            "Confirmation reference {} already issued",
            confirmation.reference
        )));
    }
    state.cache.sessions.invalidate(&session_id).await;

    Ok((StatusCode::CREATED, Json(confirmation)))
}

pub async fn get_confirmation(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<Confirmation>> {
    let confirmation = state
        .cache
        .confirmations
        .get(&reference)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Confirmation {}", reference)))?;

    Ok(Json((*confirmation).clone()))
}
