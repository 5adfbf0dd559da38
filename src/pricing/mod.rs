//! Pricing engine module for studio bookings.
//!
//! Turns a booking selection and a studio's rate table into a price breakdown.
//! The calculators are pure; the services layer resolves rate tables from the
//! marketplace database through the application cache.

pub mod calculators;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{applicable_discount, calculate_price, round_money, PriceBreakdown, PricingPolicy};
pub use models::{EquipmentItem, GroupDiscountTier, PricingSelection, PricingType, StudioRates};
pub use routes::router;
pub use services::PricingError;
