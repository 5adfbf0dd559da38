//! Studio availability calendar.
//!
//! The grid produced here is a placeholder for the front-end calendar. It is
//! randomized on every request and carries no booking state, so it must never be
//! used to accept or reject a booking.

pub mod generator;
pub mod routes;

pub use generator::{generate_availability, AvailabilityOptions, DayAvailability, TimeSlot};
pub use routes::router;
