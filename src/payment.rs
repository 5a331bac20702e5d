//! Payment model and state machine
//!
//! `Pending → Completed` or `Pending → Failed`, nothing else. Terminal
//! states are sticky: re-verifying a settled payment reports its stored
//! state without touching the gateway again.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use validator::Validate;

/// Payment status
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "payment_status")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Settle a pending payment from a gateway verify outcome. Terminal
    /// states never move.
    pub fn settle(self, verified: bool) -> Self {
        match self {
            Self::Pending if verified => Self::Completed,
            Self::Pending => Self::Failed,
            terminal => terminal,
        }
    }
}

/// A local payment record correlated to a booking by its reference string.
/// The reference is validated against an existing booking at creation.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Payment {
    pub id: i64,
    pub booking_reference: String,
    /// Gateway transaction id, set after the initialize call answers.
    pub transaction_id: Option<String>,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for `POST /api/payments/initiate`
#[derive(Debug, Deserialize, Validate)]
pub struct InitiatePaymentRequest {
    #[validate(length(min = 1, max = 100, message = "Booking reference is required."))]
    pub booking_reference: String,
    pub amount: Decimal,
    #[validate(email(message = "A valid payer email is required."))]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
}

/// Request DTO for administrative payment creation
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    #[validate(length(min = 1, max = 100, message = "Booking reference is required."))]
    pub booking_reference: String,
    pub amount: Decimal,
}

/// Response for a successful initiation: where to send the payer's browser.
#[derive(Debug, Serialize)]
pub struct InitiatePaymentResponse {
    pub payment_url: String,
}

/// Query parameters for the verify callback
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentQuery {
    pub tx_ref: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_settles_by_outcome() {
        assert_eq!(PaymentStatus::Pending.settle(true), PaymentStatus::Completed);
        assert_eq!(PaymentStatus::Pending.settle(false), PaymentStatus::Failed);
    }

    #[test]
    fn terminal_states_are_sticky() {
        assert_eq!(PaymentStatus::Completed.settle(false), PaymentStatus::Completed);
        assert_eq!(PaymentStatus::Failed.settle(true), PaymentStatus::Failed);
    }
}
