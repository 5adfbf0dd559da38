//! Core pricing calculation functions.
//!
//! Pure functions for booking price math - no database access.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::models::{GroupDiscountTier, PricingSelection, PricingType, StudioRates};
use crate::pricing::services::PricingError;

/// Share of the total collected up front when the booking is confirmed
const DEPOSIT_RATIO: Decimal = Decimal::from_parts(30, 0, 0, false, 2);

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use studiobook::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Knobs that change how a selection is priced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Multiply daily and weekly rates by the selected duration.
    ///
    /// Off by default: the marketplace has always charged a flat daily/weekly rate
    /// even though the booking form collects a duration for those modes.
    pub scale_long_stays_by_duration: bool,
}

/// Full price breakdown for a selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub equipment_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub insurance_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_percent: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub deposit_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub final_amount: Decimal,
    pub currency: String,
}

/// Pick the group discount for a party size.
///
/// Returns the largest `discount_percent` among tiers whose `min_guests` the
/// guest count reaches, or zero when no tier qualifies.
pub fn applicable_discount(tiers: &[GroupDiscountTier], guest_count: u32) -> Decimal {
    tiers
        .iter()
        .filter(|tier| tier.min_guests <= guest_count)
        .map(|tier| tier.discount_percent)
        .max()
        .unwrap_or(Decimal::ZERO)
}

/// Base price before add-ons, or `None` if it overflows
pub fn base_price(selection: &PricingSelection, rates: &StudioRates, policy: &PricingPolicy) -> Option<Decimal> {
    let duration = Decimal::from(selection.duration);
    match selection.pricing_type {
        PricingType::Hourly => rates.hourly_rate_for(selection.is_peak_time).checked_mul(duration),
        PricingType::Daily if policy.scale_long_stays_by_duration => rates.daily_rate.checked_mul(duration),
        PricingType::Daily => Some(rates.daily_rate),
        PricingType::Weekly if policy.scale_long_stays_by_duration => rates.weekly_rate.checked_mul(duration),
        PricingType::Weekly => Some(rates.weekly_rate),
    }
}

/// Sum of the selected equipment prices, or `None` if it overflows.
///
/// IDs the studio doesn't list contribute nothing.
pub fn equipment_price(selection: &PricingSelection, rates: &StudioRates) -> Option<Decimal> {
    selection
        .selected_equipment
        .iter()
        .filter_map(|id| {
            let item = rates.equipment_item(id);
            if item.is_none() {
                tracing::debug!("Ignoring unknown equipment id {} for studio {}", id, rates.studio_id);
            }
            item
        })
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.price))
}

/// Calculate the full price breakdown for a selection.
///
/// `subtotal = base + equipment + insurance`, `total = subtotal - discount`, and the
/// total is split 30/70 into deposit and final payment. The final payment absorbs
/// rounding so that `deposit + final == total` always holds.
///
/// Rates are validated first, so a successful breakdown never has a negative total.
pub fn calculate_price(
    selection: &PricingSelection,
    rates: &StudioRates,
    policy: &PricingPolicy,
) -> Result<PriceBreakdown, PricingError> {
    rates.validate()?;
    let overflow = || PricingError::AmountOverflow {
        studio_id: rates.studio_id,
    };

    let base_price = base_price(selection, rates, policy).ok_or_else(overflow)?;
    let equipment_price = equipment_price(selection, rates).ok_or_else(overflow)?;
    let insurance_price = if selection.insurance {
        rates.insurance_fee
    } else {
        Decimal::ZERO
    };

    let subtotal = base_price
        .checked_add(equipment_price)
        .and_then(|sum| sum.checked_add(insurance_price))
        .ok_or_else(overflow)?;

    let discount_percent = applicable_discount(&rates.group_discounts, selection.guest_count);
    let discount_amount = subtotal
        .checked_mul(discount_percent)
        .and_then(|amount| amount.checked_div(Decimal::ONE_HUNDRED))
        .map(|amount| round_money(amount, 2).min(subtotal))
        .ok_or_else(overflow)?;

    let total = subtotal - discount_amount;
    let deposit_amount = total
        .checked_mul(DEPOSIT_RATIO)
        .map(|amount| round_money(amount, 2))
        .ok_or_else(overflow)?;
    let final_amount = total - deposit_amount;

    Ok(PriceBreakdown {
        base_price,
        equipment_price,
        insurance_price,
        subtotal,
        discount_percent,
        discount_amount,
        total,
        deposit_amount,
        final_amount,
        currency: rates.currency.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    use crate::pricing::models::EquipmentItem;

    fn studio() -> StudioRates {
        StudioRates {
            studio_id: Uuid::nil(),
            name: "Daylight Loft".to_string(),
            currency: "INR".to_string(),
            hourly_rate: dec!(450),
            peak_hour_rate: Some(dec!(500)),
            off_peak_rate: Some(dec!(400)),
            daily_rate: dec!(3200),
            weekly_rate: dec!(19000),
            insurance_fee: dec!(100),
            instant_booking: true,
            max_guests: Some(12),
            equipment: vec![
                EquipmentItem {
                    id: "camera".to_string(),
                    name: "Cinema camera".to_string(),
                    price: dec!(500),
                },
                EquipmentItem {
                    id: "lights".to_string(),
                    name: "LED light kit".to_string(),
                    price: dec!(250),
                },
            ],
            group_discounts: vec![
                GroupDiscountTier {
                    min_guests: 4,
                    discount_percent: dec!(10),
                },
                GroupDiscountTier {
                    min_guests: 8,
                    discount_percent: dec!(15),
                },
            ],
        }
    }

    fn selection(pricing_type: PricingType, duration: u32) -> PricingSelection {
        PricingSelection {
            pricing_type,
            duration,
            guest_count: 1,
            is_peak_time: false,
            selected_equipment: BTreeSet::new(),
            insurance: false,
        }
    }

    fn equipment(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_bankers_rounding_to_even() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(2));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(2.345), 2), dec!(2.34));
        assert_eq!(round_money(dec!(2.355), 2), dec!(2.36));
    }

    #[test]
    fn test_round_money_normal_rounding() {
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
        assert_eq!(round_money(dec!(0), 2), dec!(0));
    }

    // ==================== worked example ====================

    #[test]
    fn test_calculate_price_reference_booking() {
        let mut rates = studio();
        rates.equipment.truncate(1);
        rates.group_discounts.truncate(1);

        let selection = PricingSelection {
            pricing_type: PricingType::Hourly,
            duration: 3,
            guest_count: 5,
            is_peak_time: true,
            selected_equipment: equipment(&["camera"]),
            insurance: true,
        };

        let breakdown = calculate_price(&selection, &rates, &PricingPolicy::default()).unwrap();

        assert_eq!(breakdown.base_price, dec!(1500));
        assert_eq!(breakdown.equipment_price, dec!(500));
        assert_eq!(breakdown.insurance_price, dec!(100));
        assert_eq!(breakdown.subtotal, dec!(2100));
        assert_eq!(breakdown.discount_percent, dec!(10));
        assert_eq!(breakdown.discount_amount, dec!(210));
        assert_eq!(breakdown.total, dec!(1890));
        assert_eq!(breakdown.deposit_amount, dec!(567));
        assert_eq!(breakdown.final_amount, dec!(1323));
        assert_eq!(breakdown.currency, "INR");
    }

    // ==================== base price ====================

    #[test]
    fn test_hourly_uses_peak_rate_only_when_peak() {
        let rates = studio();
        let policy = PricingPolicy::default();

        for duration in 0..=12 {
            let mut s = selection(PricingType::Hourly, duration);
            assert_eq!(base_price(&s, &rates, &policy), Some(dec!(400) * Decimal::from(duration)));

            s.is_peak_time = true;
            assert_eq!(base_price(&s, &rates, &policy), Some(dec!(500) * Decimal::from(duration)));
        }
    }

    #[test]
    fn test_daily_and_weekly_are_flat_by_default() {
        let rates = studio();
        let policy = PricingPolicy::default();

        assert_eq!(base_price(&selection(PricingType::Daily, 3), &rates, &policy), Some(dec!(3200)));
        assert_eq!(base_price(&selection(PricingType::Weekly, 2), &rates, &policy), Some(dec!(19000)));
    }

    #[test]
    fn test_daily_and_weekly_scale_when_policy_enabled() {
        let rates = studio();
        let policy = PricingPolicy {
            scale_long_stays_by_duration: true,
        };

        assert_eq!(base_price(&selection(PricingType::Daily, 3), &rates, &policy), Some(dec!(9600)));
        assert_eq!(base_price(&selection(PricingType::Weekly, 2), &rates, &policy), Some(dec!(38000)));
        // Hourly is unaffected by the policy
        assert_eq!(base_price(&selection(PricingType::Hourly, 2), &rates, &policy), Some(dec!(800)));
    }

    // ==================== equipment ====================

    #[test]
    fn test_equipment_price_is_order_independent() {
        let rates = studio();
        let mut a = selection(PricingType::Hourly, 1);
        a.selected_equipment = equipment(&["camera", "lights"]);
        let mut b = selection(PricingType::Hourly, 1);
        b.selected_equipment = equipment(&["lights", "camera"]);

        assert_eq!(equipment_price(&a, &rates), Some(dec!(750)));
        assert_eq!(equipment_price(&a, &rates), equipment_price(&b, &rates));
    }

    #[test]
    fn test_equipment_price_counts_duplicates_once() {
        let rates = studio();
        let mut s = selection(PricingType::Hourly, 1);
        s.selected_equipment = equipment(&["camera", "camera", "camera"]);

        assert_eq!(s.selected_equipment.len(), 1);
        assert_eq!(equipment_price(&s, &rates), Some(dec!(500)));
    }

    #[test]
    fn test_equipment_price_ignores_unknown_ids() {
        let rates = studio();
        let mut s = selection(PricingType::Hourly, 1);
        s.selected_equipment = equipment(&["camera", "drone"]);

        assert_eq!(equipment_price(&s, &rates), Some(dec!(500)));
    }

    // ==================== discounts ====================

    #[test]
    fn test_applicable_discount_picks_best_qualifying_tier() {
        let tiers = studio().group_discounts;

        assert_eq!(applicable_discount(&tiers, 1), dec!(0));
        assert_eq!(applicable_discount(&tiers, 3), dec!(0));
        assert_eq!(applicable_discount(&tiers, 4), dec!(10));
        assert_eq!(applicable_discount(&tiers, 7), dec!(10));
        assert_eq!(applicable_discount(&tiers, 8), dec!(15));
        assert_eq!(applicable_discount(&tiers, 50), dec!(15));
    }

    #[test]
    fn test_applicable_discount_unordered_and_non_monotonic_tiers() {
        let tiers = vec![
            GroupDiscountTier {
                min_guests: 10,
                discount_percent: dec!(5),
            },
            GroupDiscountTier {
                min_guests: 2,
                discount_percent: dec!(12),
            },
        ];

        assert_eq!(applicable_discount(&tiers, 11), dec!(12));
        assert_eq!(applicable_discount(&[], 11), dec!(0));
    }

    // ==================== invariants ====================

    #[test]
    fn test_breakdown_invariants_hold_across_selections() {
        let rates = studio();
        let policy = PricingPolicy::default();
        let picks: [&[&str]; 3] = [&[], &["camera"], &["camera", "lights"]];

        for pricing_type in [PricingType::Hourly, PricingType::Daily, PricingType::Weekly] {
            for duration in [1, 3, 7] {
                for guest_count in [1, 4, 9] {
                    for ids in picks {
                        for insurance in [false, true] {
                            let s = PricingSelection {
                                pricing_type,
                                duration,
                                guest_count,
                                is_peak_time: duration % 2 == 1,
                                selected_equipment: equipment(ids),
                                insurance,
                            };
                            let b = calculate_price(&s, &rates, &policy).unwrap();

                            assert_eq!(b.subtotal, b.base_price + b.equipment_price + b.insurance_price);
                            assert_eq!(b.total, b.subtotal - b.discount_amount);
                            assert_eq!(b.deposit_amount + b.final_amount, b.total);
                            assert!(b.total >= Decimal::ZERO);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_deposit_split_absorbs_rounding_in_final_payment() {
        let mut rates = studio();
        rates.off_peak_rate = Some(dec!(333.33));
        let s = selection(PricingType::Hourly, 1);

        let b = calculate_price(&s, &rates, &PricingPolicy::default()).unwrap();

        // 333.33 * 0.30 = 99.999 -> 100.00
        assert_eq!(b.deposit_amount, dec!(100.00));
        assert_eq!(b.final_amount, dec!(233.33));
        assert_eq!(b.deposit_amount + b.final_amount, b.total);
    }

    #[test]
    fn test_no_insurance_means_zero_insurance_price() {
        let rates = studio();
        let b = calculate_price(&selection(PricingType::Daily, 1), &rates, &PricingPolicy::default()).unwrap();

        assert_eq!(b.insurance_price, dec!(0));
        assert_eq!(b.discount_amount, dec!(0));
        assert_eq!(b.total, dec!(3200));
        assert_eq!(b.deposit_amount, dec!(960));
        assert_eq!(b.final_amount, dec!(2240));
    }

    // ==================== rejected input ====================

    #[test]
    fn test_rate_overflow_is_an_error() {
        let mut rates = studio();
        rates.off_peak_rate = Some(Decimal::MAX);

        let err = calculate_price(&selection(PricingType::Hourly, 2), &rates, &PricingPolicy::default()).unwrap_err();
        assert!(matches!(err, PricingError::AmountOverflow { .. }));
    }

    #[test]
    fn test_equipment_sum_overflow_is_an_error() {
        let mut rates = studio();
        for item in &mut rates.equipment {
            item.price = Decimal::MAX;
        }
        let mut s = selection(PricingType::Hourly, 1);
        s.selected_equipment = equipment(&["camera", "lights"]);

        assert_eq!(equipment_price(&s, &rates), None);
        assert!(matches!(
            calculate_price(&s, &rates, &PricingPolicy::default()),
            Err(PricingError::AmountOverflow { .. })
        ));
    }

    #[test]
    fn test_discount_over_100_percent_is_rejected() {
        let mut rates = studio();
        rates.off_peak_rate = Some(dec!(100));
        rates.group_discounts = vec![GroupDiscountTier {
            min_guests: 1,
            discount_percent: dec!(150),
        }];

        let result = calculate_price(&selection(PricingType::Hourly, 1), &rates, &PricingPolicy::default());
        assert!(matches!(result, Err(PricingError::InvalidRates { .. })));
    }

    #[test]
    fn test_full_discount_prices_at_zero() {
        let mut rates = studio();
        rates.off_peak_rate = Some(dec!(0.015));
        rates.group_discounts = vec![GroupDiscountTier {
            min_guests: 1,
            discount_percent: dec!(100),
        }];

        let b = calculate_price(&selection(PricingType::Hourly, 1), &rates, &PricingPolicy::default()).unwrap();

        // 0.015 rounds half-even to 0.02; the discount is capped at the subtotal
        assert_eq!(b.discount_amount, dec!(0.015));
        assert_eq!(b.total, dec!(0));
        assert_eq!(b.deposit_amount + b.final_amount, b.total);
    }
}
