//! Request DTOs for pricing API endpoints.

use serde::Deserialize;

use super::models::{PricingSelection, StudioRates};

/// Request to price a selection against a rate table supplied by the caller
#[derive(Debug, Deserialize)]
pub struct InlineQuoteRequest {
    pub rates: StudioRates,
    pub selection: PricingSelection,
}

/// Request to price a selection against a stored studio
#[derive(Debug, Deserialize)]
pub struct StudioQuoteRequest {
    #[serde(flatten)]
    pub selection: PricingSelection,
}
