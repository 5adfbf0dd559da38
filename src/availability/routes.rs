//! Availability route handlers

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::pricing::services::load_studio_rates;
use crate::AppState;

use super::generator::{generate_availability, AvailabilityOptions, DayAvailability, DEFAULT_WINDOW_DAYS};

const MAX_WINDOW_DAYS: u32 = 90;

/// Query parameters for the availability calendar
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub start: Option<NaiveDate>,
}

fn default_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

/// Availability routes, mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new().route("/studios/:studio_id/availability", get(studio_availability))
}

/// Calendar for a studio, starting today unless `start` is given
pub async fn studio_availability(
    State(state): State<AppState>,
    Path(studio_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<DayAvailability>>> {
    if query.days == 0 {
        return Err(AppError::BadRequest("days must be at least 1".to_string()));
    }

    let rates = load_studio_rates(&state.db, &state.cache, studio_id).await?;

    let options = AvailabilityOptions {
        days: query.days.min(MAX_WINDOW_DAYS),
        instant_booking: rates.instant_booking,
        user_verified: query.verified,
    };
    let start = query.start.unwrap_or_else(|| Utc::now().date_naive());

    let mut rng = match state.config.availability_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    tracing::debug!(
        "Generating {} days of availability for studio {} from {}",
        options.days,
        studio_id,
        start
    );

    Ok(Json(generate_availability(&mut rng, start, options)))
}
