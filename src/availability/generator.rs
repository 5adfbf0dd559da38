//! Randomized availability grid.

use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::Serialize;

/// First bookable hour of the day
pub const OPENING_HOUR: u32 = 9;
/// Last bookable hour of the day (slot starts at 20:00)
pub const LAST_SLOT_HOUR: u32 = 20;
/// Default calendar window
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

const AVAILABLE_PROBABILITY: f64 = 0.7;
const INSTANT_BOOKABLE_PROBABILITY: f64 = 0.8;

/// One hourly slot in the calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    /// Start time as "HH:MM"
    pub time: String,
    pub available: bool,
    pub instant_bookable: bool,
}

/// A day of slots, in time order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
    pub fully_booked: bool,
}

impl DayAvailability {
    pub fn new(date: NaiveDate, slots: Vec<TimeSlot>) -> Self {
        let fully_booked = !slots.iter().any(|slot| slot.available);
        Self {
            date,
            slots,
            fully_booked,
        }
    }

    pub fn available_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter().filter(|slot| slot.available)
    }
}

/// Inputs that shape the generated calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityOptions {
    pub days: u32,
    /// Studio accepts bookings without host approval
    pub instant_booking: bool,
    /// Guest has passed identity verification
    pub user_verified: bool,
}

impl Default for AvailabilityOptions {
    fn default() -> Self {
        Self {
            days: DEFAULT_WINDOW_DAYS,
            instant_booking: false,
            user_verified: false,
        }
    }
}

/// Slot start times for a day, "09:00" through "20:00"
pub fn slot_times() -> impl Iterator<Item = String> {
    (OPENING_HOUR..=LAST_SLOT_HOUR).map(|hour| format!("{:02}:00", hour))
}

/// Generate `options.days` days of availability starting at `start`.
///
/// Each slot is open with probability 0.7. An open slot is instant-bookable with
/// probability 0.8, and only when both the studio and the guest allow it.
pub fn generate_availability<R: Rng>(
    rng: &mut R,
    start: NaiveDate,
    options: AvailabilityOptions,
) -> Vec<DayAvailability> {
    let instant_allowed = options.instant_booking && options.user_verified;

    (0..options.days)
        .filter_map(|offset| start.checked_add_days(Days::new(u64::from(offset))))
        .map(|date| {
            let slots = slot_times()
                .map(|time| {
                    let available = rng.gen_bool(AVAILABLE_PROBABILITY);
                    let instant_bookable =
                        available && instant_allowed && rng.gen_bool(INSTANT_BOOKABLE_PROBABILITY);
                    TimeSlot {
                        time,
                        available,
                        instant_bookable,
                    }
                })
                .collect();
            DayAvailability::new(date, slots)
        })
        .collect()
}
