//! Database queries for studio rate tables.
//!
//! Reads the marketplace tables `studios`, `studio_equipment` and
//! `studio_group_discounts`. Soft-deleted rows are never returned.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{DiscountTierRow, EquipmentRow, StudioRates, StudioRow};

/// Find a live studio row by ID
pub async fn find_studio(pool: &PgPool, studio_id: Uuid) -> Result<Option<StudioRow>, AppError> {
    let studio = sqlx::query_as::<_, StudioRow>(
        r#"
        SELECT
            id, name, currency,
            hourly_rate, peak_hour_rate, off_peak_rate,
            daily_rate, weekly_rate, insurance_fee,
            instant_booking, max_guests
        FROM studios
        WHERE id = $1
          AND deleted_at IS NULL
        "#,
    )
    .bind(studio_id)
    .fetch_optional(pool)
    .await?;

    Ok(studio)
}

/// List the equipment a studio rents out
pub async fn list_equipment(pool: &PgPool, studio_id: Uuid) -> Result<Vec<EquipmentRow>, AppError> {
    let equipment = sqlx::query_as::<_, EquipmentRow>(
        r#"
        SELECT id, studio_id, name, price
        FROM studio_equipment
        WHERE studio_id = $1
          AND available = TRUE
          AND deleted_at IS NULL
        ORDER BY name
        "#,
    )
    .bind(studio_id)
    .fetch_all(pool)
    .await?;

    Ok(equipment)
}

/// List a studio's group discount tiers, lowest threshold first
pub async fn list_discount_tiers(
    pool: &PgPool,
    studio_id: Uuid,
) -> Result<Vec<DiscountTierRow>, AppError> {
    let tiers = sqlx::query_as::<_, DiscountTierRow>(
        r#"
        SELECT studio_id, min_guests, discount_percent
        FROM studio_group_discounts
        WHERE studio_id = $1
          AND deleted_at IS NULL
        ORDER BY min_guests
        "#,
    )
    .bind(studio_id)
    .fetch_all(pool)
    .await?;

    Ok(tiers)
}

/// Load a studio's complete rate table, or `None` if the studio doesn't exist
pub async fn find_studio_rates(pool: &PgPool, studio_id: Uuid) -> Result<Option<StudioRates>, AppError> {
    let Some(studio) = find_studio(pool, studio_id).await? else {
        return Ok(None);
    };

    let equipment = list_equipment(pool, studio_id).await?;
    let tiers = list_discount_tiers(pool, studio_id).await?;

    Ok(Some(studio.into_rates(equipment, tiers)))
}
