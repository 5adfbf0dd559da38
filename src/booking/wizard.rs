//! Booking wizard state machine.
//!
//! The wizard walks a guest through five strictly linear steps. Each forward move
//! is gated on the fields that step collects; a failed gate leaves the wizard
//! untouched. At the last step the assembled booking is handed to a completion
//! callback, which owns persistence and payment.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::{
    calculate_price, PriceBreakdown, PricingError, PricingPolicy, PricingSelection, PricingType, StudioRates,
};

/// Wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    DateTime,
    GuestsRequests,
    EquipmentInsurance,
    Payment,
    Confirmation,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::DateTime,
        WizardStep::GuestsRequests,
        WizardStep::EquipmentInsurance,
        WizardStep::Payment,
        WizardStep::Confirmation,
    ];

    /// 1-based position, as shown in the progress bar
    pub fn number(self) -> usize {
        self as usize + 1
    }

    pub fn next(self) -> Option<WizardStep> {
        Self::ALL.get(self as usize + 1).copied()
    }

    pub fn prev(self) -> Option<WizardStep> {
        (self as usize).checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::DateTime => "Date & Time",
            WizardStep::GuestsRequests => "Guests & Requests",
            WizardStep::EquipmentInsurance => "Equipment & Insurance",
            WizardStep::Payment => "Payment",
            WizardStep::Confirmation => "Confirmation",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// How the guest intends to pay the deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Upi,
    NetBanking,
    Wallet,
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("{step} is missing required fields: {}", .fields.join(", "))]
    MissingFields {
        step: WizardStep,
        fields: Vec<&'static str>,
    },

    #[error("{requested} guests exceeds the studio limit of {max}")]
    TooManyGuests { requested: u32, max: u32 },

    #[error("Cannot {action} from {step}")]
    InvalidTransition {
        step: WizardStep,
        action: &'static str,
    },

    #[error("Booking can only be completed from Confirmation, wizard is at {step}")]
    NotAtConfirmation { step: WizardStep },

    #[error("Rates are for studio {rates_studio} but the booking is for studio {booking_studio}")]
    StudioMismatch {
        booking_studio: Uuid,
        rates_studio: Uuid,
    },

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Partial update from the booking form. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WizardPatch {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub duration: Option<u32>,
    pub pricing_type: Option<PricingType>,
    pub is_peak_time: Option<bool>,
    pub guest_count: Option<u32>,
    pub special_requests: Option<String>,
    pub selected_equipment: Option<BTreeSet<String>>,
    pub insurance: Option<bool>,
    pub payment_method: Option<PaymentMethod>,
    pub terms_accepted: Option<bool>,
}

/// Booking handed to the completion callback
#[derive(Debug, Clone, Serialize)]
pub struct BookingPayload {
    pub reference: String,
    pub session_id: Uuid,
    pub studio_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub selection: PricingSelection,
    pub special_requests: String,
    pub payment_method: PaymentMethod,
    pub breakdown: PriceBreakdown,
    pub submitted_at: DateTime<Utc>,
}

/// In-progress booking form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingWizard {
    pub id: Uuid,
    pub studio_id: Uuid,
    pub step: WizardStep,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub duration: Option<u32>,
    pub pricing_type: PricingType,
    pub is_peak_time: bool,
    pub guest_count: u32,
    pub special_requests: String,
    pub selected_equipment: BTreeSet<String>,
    pub insurance: bool,
    pub payment_method: Option<PaymentMethod>,
    pub terms_accepted: bool,
    /// Studio capacity, when the studio sets one
    pub max_guests: Option<u32>,
}

impl BookingWizard {
    pub fn new(studio_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            studio_id,
            step: WizardStep::DateTime,
            date: None,
            start_time: None,
            duration: None,
            pricing_type: PricingType::Hourly,
            is_peak_time: false,
            guest_count: 1,
            special_requests: String::new(),
            selected_equipment: BTreeSet::new(),
            insurance: false,
            payment_method: None,
            terms_accepted: false,
            max_guests: None,
        }
    }

    /// Start a wizard for a studio, picking up its guest limit
    pub fn for_studio(rates: &StudioRates) -> Self {
        Self {
            max_guests: rates.max_guests,
            ..Self::new(rates.studio_id)
        }
    }

    /// Apply form input. Not allowed once the booking reached Confirmation.
    pub fn update(&mut self, patch: WizardPatch) -> Result<(), WizardError> {
        if self.step == WizardStep::Confirmation {
            return Err(WizardError::InvalidTransition {
                step: self.step,
                action: "edit the booking",
            });
        }

        if let Some(date) = patch.date {
            self.date = Some(date);
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = Some(start_time);
        }
        if let Some(duration) = patch.duration {
            self.duration = Some(duration);
        }
        if let Some(pricing_type) = patch.pricing_type {
            self.pricing_type = pricing_type;
        }
        if let Some(is_peak_time) = patch.is_peak_time {
            self.is_peak_time = is_peak_time;
        }
        if let Some(guest_count) = patch.guest_count {
            self.guest_count = guest_count;
        }
        if let Some(special_requests) = patch.special_requests {
            self.special_requests = special_requests;
        }
        if let Some(selected_equipment) = patch.selected_equipment {
            self.selected_equipment = selected_equipment;
        }
        if let Some(insurance) = patch.insurance {
            self.insurance = insurance;
        }
        if let Some(payment_method) = patch.payment_method {
            self.payment_method = Some(payment_method);
        }
        if let Some(terms_accepted) = patch.terms_accepted {
            self.terms_accepted = terms_accepted;
        }

        Ok(())
    }

    /// Fields `step` requires that are still unset
    pub fn missing_fields(&self, step: WizardStep) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match step {
            WizardStep::DateTime => {
                if self.date.is_none() {
                    missing.push("date");
                }
                if self.start_time.is_none() {
                    missing.push("start_time");
                }
                if !matches!(self.duration, Some(d) if d > 0) {
                    missing.push("duration");
                }
            }
            WizardStep::GuestsRequests => {
                if self.guest_count == 0 {
                    missing.push("guest_count");
                }
            }
            WizardStep::EquipmentInsurance | WizardStep::Confirmation => {}
            WizardStep::Payment => {
                if self.payment_method.is_none() {
                    missing.push("payment_method");
                }
                if !self.terms_accepted {
                    missing.push("terms_accepted");
                }
            }
        }
        missing
    }

    fn check_gate(&self, step: WizardStep) -> Result<(), WizardError> {
        let fields = self.missing_fields(step);
        if !fields.is_empty() {
            return Err(WizardError::MissingFields { step, fields });
        }

        if step == WizardStep::GuestsRequests {
            if let Some(max) = self.max_guests {
                if self.guest_count > max {
                    return Err(WizardError::TooManyGuests {
                        requested: self.guest_count,
                        max,
                    });
                }
            }
        }

        Ok(())
    }

    /// Check the gates of every step up to and including `last`.
    ///
    /// Fields stay editable after their step is passed, so earlier gates are re-run.
    fn check_gates_through(&self, last: WizardStep) -> Result<(), WizardError> {
        WizardStep::ALL
            .into_iter()
            .take_while(|step| *step <= last)
            .try_for_each(|step| self.check_gate(step))
    }

    /// Advance one step if the current step and every step before it are complete.
    ///
    /// On failure the wizard is unchanged.
    pub fn next_step(&mut self) -> Result<WizardStep, WizardError> {
        let next = self.step.next().ok_or(WizardError::InvalidTransition {
            step: self.step,
            action: "advance",
        })?;

        self.check_gates_through(self.step)?;
        self.step = next;
        Ok(next)
    }

    /// Go back one step. Staying put at the first step is not an error.
    pub fn prev_step(&mut self) -> Result<WizardStep, WizardError> {
        if self.step == WizardStep::Confirmation {
            return Err(WizardError::InvalidTransition {
                step: self.step,
                action: "go back",
            });
        }

        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        Ok(self.step)
    }

    /// Current picks as a pricing selection. An unset duration prices as zero.
    pub fn selection(&self) -> PricingSelection {
        PricingSelection {
            pricing_type: self.pricing_type,
            duration: self.duration.unwrap_or(0),
            guest_count: self.guest_count,
            is_peak_time: self.is_peak_time,
            selected_equipment: self.selected_equipment.clone(),
            insurance: self.insurance,
        }
    }

    /// Live price summary for the current selection
    pub fn summary(&self, rates: &StudioRates, policy: &PricingPolicy) -> Result<PriceBreakdown, PricingError> {
        calculate_price(&self.selection(), rates, policy)
    }

    /// Reference printed on the confirmation, e.g. `SB-1A2B3C4D5E6F`
    pub fn reference(&self) -> String {
        let simple = self.id.simple().to_string();
        format!("SB-{}", simple[..12].to_uppercase())
    }

    /// Assemble the booking and hand it to `on_booking_complete`.
    ///
    /// Only valid at Confirmation, and only while every earlier step's gate still
    /// passes. Returns whatever the callback returns.
    pub fn complete<F, T>(
        &self,
        rates: &StudioRates,
        policy: &PricingPolicy,
        on_booking_complete: F,
    ) -> Result<T, WizardError>
    where
        F: FnOnce(BookingPayload) -> T,
    {
        if self.step != WizardStep::Confirmation {
            return Err(WizardError::NotAtConfirmation { step: self.step });
        }
        if rates.studio_id != self.studio_id {
            return Err(WizardError::StudioMismatch {
                booking_studio: self.studio_id,
                rates_studio: rates.studio_id,
            });
        }

        self.check_gates_through(WizardStep::Payment)?;

        let (Some(date), Some(start_time), Some(payment_method)) =
            (self.date, self.start_time, self.payment_method)
        else {
            let mut fields = self.missing_fields(WizardStep::DateTime);
            fields.extend(self.missing_fields(WizardStep::Payment));
            return Err(WizardError::MissingFields {
                step: self.step,
                fields,
            });
        };
        let breakdown = self.summary(rates, policy)?;

        let payload = BookingPayload {
            reference: self.reference(),
            session_id: self.id,
            studio_id: self.studio_id,
            date,
            start_time,
            selection: self.selection(),
            special_requests: self.special_requests.clone(),
            payment_method,
            breakdown,
            submitted_at: Utc::now(),
        };

        Ok(on_booking_complete(payload))
    }
}
