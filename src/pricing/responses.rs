//! Response DTOs for pricing API endpoints.

use serde::Serialize;
use uuid::Uuid;

use super::calculators::PriceBreakdown;
use super::models::PricingSelection;

/// Response for a price quote
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub studio_id: Uuid,
    pub selection: PricingSelection,
    pub duration_unit: &'static str,
    pub breakdown: PriceBreakdown,
}

impl QuoteResponse {
    pub fn new(studio_id: Uuid, selection: PricingSelection, breakdown: PriceBreakdown) -> Self {
        Self {
            studio_id,
            duration_unit: selection.pricing_type.unit(),
            selection,
            breakdown,
        }
    }
}
