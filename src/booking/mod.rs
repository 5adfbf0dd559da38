//! Booking wizard sessions and confirmations.

pub mod confirmation;
pub mod routes;
pub mod wizard;

pub use confirmation::Confirmation;
pub use routes::router;
pub use wizard::{BookingPayload, BookingWizard, PaymentMethod, WizardError, WizardPatch, WizardStep};
