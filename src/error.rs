//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::booking::WizardError;
use crate::pricing::PricingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_type: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

fn body(error_type: &'static str, message: String, details: Option<serde_json::Value>) -> ErrorResponse {
    ErrorResponse {
        error_type,
        message,
        details,
    }
}

fn pricing_status_and_body(e: &PricingError) -> (StatusCode, ErrorResponse) {
    match e {
        PricingError::StudioNotFound { studio_id } => (
            StatusCode::NOT_FOUND,
            body(
                "studio_not_found",
                e.to_string(),
                Some(serde_json::json!({ "studio_id": studio_id })),
            ),
        ),
        PricingError::InvalidRates { .. } => (
            StatusCode::BAD_REQUEST,
            body("invalid_rates", e.to_string(), None),
        ),
        PricingError::AmountOverflow { .. } => (
            StatusCode::BAD_REQUEST,
            body("amount_overflow", e.to_string(), None),
        ),
        PricingError::RateLookup { .. } => {
            tracing::error!("Pricing error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                body("pricing_error", "Could not load studio rates".to_string(), None),
            )
        }
    }
}

impl AppError {
    fn status_and_body(&self) -> (StatusCode, ErrorResponse) {
        match self {
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                body("not_found", format!("{} not found", what), None),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                body("bad_request", msg.clone(), None),
            ),
            AppError::Pricing(e) | AppError::Wizard(WizardError::Pricing(e)) => pricing_status_and_body(e),
            AppError::Wizard(e) => {
                let details = match e {
                    WizardError::MissingFields { step, fields } => {
                        Some(serde_json::json!({ "step": step, "missing": fields }))
                    }
                    _ => None,
                };
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    body("wizard_error", e.to_string(), details),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body("database_error", "Database error".to_string(), None),
                )
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body("template_error", "Template error".to_string(), None),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body("internal_error", "Internal error".to_string(), None),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::WizardStep;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("Booking session".to_string()), StatusCode::NOT_FOUND),
            (AppError::BadRequest("days".to_string()), StatusCode::BAD_REQUEST),
            (
                AppError::Pricing(PricingError::StudioNotFound {
                    studio_id: Uuid::nil(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Wizard(WizardError::NotAtConfirmation {
                    step: WizardStep::Payment,
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Pricing(PricingError::AmountOverflow {
                    studio_id: Uuid::nil(),
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Wizard(WizardError::Pricing(PricingError::InvalidRates {
                    studio_id: Uuid::nil(),
                    reason: "hourly_rate is negative".to_string(),
                })),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::Internal("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_missing_fields_are_reported_in_details() {
        let err = AppError::Wizard(WizardError::MissingFields {
            step: WizardStep::DateTime,
            fields: vec!["date", "start_time"],
        });

        let (_, body) = err.status_and_body();
        let details = body.details.unwrap();
        assert_eq!(details["step"], "date_time");
        assert_eq!(details["missing"][1], "start_time");
    }

    #[test]
    fn test_internal_errors_hide_cause() {
        let (_, body) = AppError::Internal("secret detail".to_string()).status_and_body();
        assert!(!body.message.contains("secret"));
    }
}
