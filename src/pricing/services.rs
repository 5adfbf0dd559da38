//! Pricing service functions with database access.
//!
//! Rate tables are read through the application cache; on a miss they are loaded
//! from the database and cached for subsequent quotes.

use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::AppError;

use super::calculators::{calculate_price, PriceBreakdown, PricingPolicy};
use super::models::{PricingSelection, StudioRates};
use super::queries;

/// Pricing lookup error types
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("No studio found with id {studio_id}")]
    StudioNotFound { studio_id: Uuid },

    #[error("Failed to load rates for studio {studio_id}: {message}")]
    RateLookup { studio_id: Uuid, message: String },

    #[error("Invalid rates for studio {studio_id}: {reason}")]
    InvalidRates { studio_id: Uuid, reason: String },

    #[error("Price for studio {studio_id} is too large to calculate")]
    AmountOverflow { studio_id: Uuid },
}

/// Resolve a studio's rate table, cache first.
pub async fn load_studio_rates(
    pool: &PgPool,
    cache: &AppCache,
    studio_id: Uuid,
) -> Result<Arc<StudioRates>, PricingError> {
    if let Some(cached) = cache.studios.get(&studio_id).await {
        tracing::debug!("Cache HIT for studio rates: {}", studio_id);
        return Ok(cached);
    }

    tracing::debug!("Cache MISS for studio rates: {}", studio_id);
    let rates = queries::find_studio_rates(pool, studio_id)
        .await
        .map_err(|e: AppError| {
            tracing::error!("Rate lookup failed for studio {}: {}", studio_id, e);
            PricingError::RateLookup {
                studio_id,
                message: e.to_string(),
            }
        })?
        .ok_or(PricingError::StudioNotFound { studio_id })?;

    let rates = Arc::new(rates);
    cache.studios.insert(studio_id, rates.clone()).await;

    Ok(rates)
}

/// Quote a selection against a stored studio's rates.
pub async fn quote_for_studio(
    pool: &PgPool,
    cache: &AppCache,
    studio_id: Uuid,
    selection: &PricingSelection,
    policy: &PricingPolicy,
) -> Result<PriceBreakdown, PricingError> {
    let rates = load_studio_rates(pool, cache, studio_id).await?;
    calculate_price(selection, &rates, policy)
}
