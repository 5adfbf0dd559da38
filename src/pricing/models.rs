//! Pricing domain types and database rows.
//!
//! Row types use sqlx's FromRow derive for direct database deserialization and are
//! folded into a [`StudioRates`] table by the queries layer.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::services::PricingError;

/// Pricing tier chosen by the guest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingType {
    #[default]
    Hourly,
    Daily,
    Weekly,
}

impl PricingType {
    /// Unit the duration is counted in
    pub fn unit(&self) -> &'static str {
        match self {
            PricingType::Hourly => "hours",
            PricingType::Daily => "days",
            PricingType::Weekly => "weeks",
        }
    }
}

/// What the guest has picked so far.
///
/// `selected_equipment` is a set, so selecting the same item twice is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSelection {
    #[serde(default)]
    pub pricing_type: PricingType,
    pub duration: u32,
    pub guest_count: u32,
    #[serde(default)]
    pub is_peak_time: bool,
    #[serde(default)]
    pub selected_equipment: BTreeSet<String>,
    #[serde(default)]
    pub insurance: bool,
}

impl Default for PricingSelection {
    fn default() -> Self {
        Self {
            pricing_type: PricingType::Hourly,
            duration: 1,
            guest_count: 1,
            is_peak_time: false,
            selected_equipment: BTreeSet::new(),
            insurance: false,
        }
    }
}

/// Rentable add-on offered by a studio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

/// Group discount: `discount_percent` off once `min_guests` is reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDiscountTier {
    pub min_guests: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_percent: Decimal,
}

/// A studio's full rate table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioRates {
    pub studio_id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub hourly_rate: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub peak_hour_rate: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub off_peak_rate: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str")]
    pub daily_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub weekly_rate: Decimal,
    #[serde(default, with = "rust_decimal::serde::str")]
    pub insurance_fee: Decimal,
    #[serde(default)]
    pub instant_booking: bool,
    #[serde(default)]
    pub max_guests: Option<u32>,
    #[serde(default)]
    pub equipment: Vec<EquipmentItem>,
    #[serde(default)]
    pub group_discounts: Vec<GroupDiscountTier>,
}

pub(crate) fn default_currency() -> String {
    "INR".to_string()
}

impl StudioRates {
    /// Hourly rate for the given time-of-day flag, falling back to the base hourly rate
    pub fn hourly_rate_for(&self, is_peak_time: bool) -> Decimal {
        let rate = if is_peak_time {
            self.peak_hour_rate
        } else {
            self.off_peak_rate
        };
        rate.unwrap_or(self.hourly_rate)
    }

    /// Look up an equipment item by ID
    pub fn equipment_item(&self, id: &str) -> Option<&EquipmentItem> {
        self.equipment.iter().find(|item| item.id == id)
    }

    /// Reject rate tables that could price a booking below zero.
    ///
    /// Every amount must be non-negative and every discount within 0..=100 percent.
    pub fn validate(&self) -> Result<(), PricingError> {
        let invalid = |reason: String| PricingError::InvalidRates {
            studio_id: self.studio_id,
            reason,
        };

        let amounts = [
            ("hourly_rate", Some(self.hourly_rate)),
            ("peak_hour_rate", self.peak_hour_rate),
            ("off_peak_rate", self.off_peak_rate),
            ("daily_rate", Some(self.daily_rate)),
            ("weekly_rate", Some(self.weekly_rate)),
            ("insurance_fee", Some(self.insurance_fee)),
        ];
        for (field, amount) in amounts {
            if amount.is_some_and(|a| a < Decimal::ZERO) {
                return Err(invalid(format!("{} is negative", field)));
            }
        }

        if let Some(item) = self.equipment.iter().find(|item| item.price < Decimal::ZERO) {
            return Err(invalid(format!("equipment {} has a negative price", item.id)));
        }

        if let Some(tier) = self
            .group_discounts
            .iter()
            .find(|tier| tier.discount_percent < Decimal::ZERO || tier.discount_percent > Decimal::ONE_HUNDRED)
        {
            return Err(invalid(format!(
                "discount of {}% for {} guests is outside 0-100",
                tier.discount_percent, tier.min_guests
            )));
        }

        Ok(())
    }
}

/// Studio from studios
#[derive(Debug, Clone, FromRow)]
pub struct StudioRow {
    pub id: Uuid,
    pub name: String,
    pub currency: String,
    pub hourly_rate: Decimal,
    pub peak_hour_rate: Option<Decimal>,
    pub off_peak_rate: Option<Decimal>,
    pub daily_rate: Decimal,
    pub weekly_rate: Decimal,
    pub insurance_fee: Decimal,
    pub instant_booking: bool,
    pub max_guests: Option<i32>,
}

/// Equipment from studio_equipment
#[derive(Debug, Clone, FromRow)]
pub struct EquipmentRow {
    pub id: String,
    pub studio_id: Uuid,
    pub name: String,
    pub price: Decimal,
}

/// Discount tier from studio_group_discounts
#[derive(Debug, Clone, FromRow)]
pub struct DiscountTierRow {
    pub studio_id: Uuid,
    pub min_guests: i32,
    pub discount_percent: Decimal,
}

impl StudioRow {
    /// Assemble the rate table from the studio row and its child rows
    pub fn into_rates(self, equipment: Vec<EquipmentRow>, tiers: Vec<DiscountTierRow>) -> StudioRates {
        StudioRates {
            studio_id: self.id,
            name: self.name,
            currency: self.currency,
            hourly_rate: self.hourly_rate,
            peak_hour_rate: self.peak_hour_rate,
            off_peak_rate: self.off_peak_rate,
            daily_rate: self.daily_rate,
            weekly_rate: self.weekly_rate,
            insurance_fee: self.insurance_fee,
            instant_booking: self.instant_booking,
            max_guests: self.max_guests.and_then(|m| u32::try_from(m).ok()),
            equipment: equipment
                .into_iter()
                .map(|e| EquipmentItem {
                    id: e.id,
                    name: e.name,
                    price: e.price,
                })
                .collect(),
            group_discounts: tiers
                .into_iter()
                .filter_map(|t| {
                    // Negative thresholds are bad data, not "always applies"
                    u32::try_from(t.min_guests).ok().map(|min_guests| GroupDiscountTier {
                        min_guests,
                        discount_percent: t.discount_percent,
                    })
                })
                .collect(),
        }
    }
}
