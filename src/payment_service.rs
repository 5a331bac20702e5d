//! Payment coordinator - local payment records reconciled against the
//! external gateway's initiate/verify handshake
//!
//! Two entry points create payments: booking creation (inline) and the
//! standalone initiate endpoint. Both funnel through [`Self::initiate`] so
//! the gateway call shape never diverges.

use rust_decimal::Decimal;
use sqlx::types::chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::booking::Booking;
use crate::error::ApiError;
use crate::gateway::{InitializePayment, PaymentGateway};
use crate::models::PaginationParams;
use crate::payment::{Payment, PaymentStatus};

/// Payer identity forwarded to the gateway.
#[derive(Debug, Clone)]
pub struct Payer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&AuthUser> for Payer {
    fn from(user: &AuthUser) -> Self {
        Self {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

pub struct PaymentService {
    db_pool: PgPool,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
    callback_url: String,
    return_url: String,
}

impl PaymentService {
    pub fn new(
        db_pool: PgPool,
        gateway: Arc<dyn PaymentGateway>,
        currency: String,
        callback_url: String,
        return_url: String,
    ) -> Self {
        Self {
            db_pool,
            gateway,
            currency,
            callback_url,
            return_url,
        }
    }

    /// Create a Pending payment. The reference must name an existing
    /// booking, and a duplicate reference is a conflict, not a validation
    /// failure.
    pub async fn create_payment(
        &self,
        reference: &str,
        amount: Decimal,
    ) -> Result<Payment, ApiError> {
        if amount <= Decimal::ZERO {
            return Err(ApiError::validation(
                "amount",
                "Amount must be greater than zero.",
            ));
        }
        self.ensure_booking_exists(reference).await?;

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (booking_reference, amount, status, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(reference)
        .bind(amount)
        .bind(PaymentStatus::Pending)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| ApiError::from_payment_insert(e, reference))?;

        tracing::info!(reference = %reference, amount = %amount, "payment created");
        Ok(payment)
    }

    /// Create a Pending payment and obtain a checkout redirect from the
    /// gateway. Single attempt: a non-success answer marks the payment
    /// Failed and surfaces the provider's raw response.
    pub async fn initiate(
        &self,
        reference: &str,
        amount: Decimal,
        payer: &Payer,
    ) -> Result<String, ApiError> {
        let payment = self.create_payment(reference, amount).await?;
        self.initialize_checkout(payment, payer)
            .await
            .map_err(ApiError::Gateway)
    }

    /// Payment leg of booking creation. Degraded rather than fatal: a
    /// gateway failure leaves the booking in place, marks the payment
    /// Failed, and yields no checkout URL.
    pub async fn initiate_for_booking(
        &self,
        booking: &Booking,
        payer: &Payer,
    ) -> Result<Option<String>, ApiError> {
        let payment = self
            .create_payment(&booking.booking_id.to_string(), booking.total_price)
            .await?;

        match self.initialize_checkout(payment, payer).await {
            Ok(url) => Ok(Some(url)),
            Err(detail) => {
                tracing::warn!(
                    booking_id = %booking.booking_id,
                    detail = %detail,
                    "gateway rejected payment initiation for new booking"
                );
                Ok(None)
            }
        }
    }

    /// Reconcile a payment against the gateway's verify endpoint.
    ///
    /// Unknown references are a distinct `NotFound` (callbacks arrive with
    /// garbled refs) and never create a record. Terminal payments report
    /// their stored state without another gateway call.
    pub async fn verify(&self, tx_ref: &str) -> Result<bool, ApiError> {
        let payment = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE booking_reference = $1",
        )
        .bind(tx_ref)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(ApiError::NotFound("Payment"))?;

        if payment.status.is_terminal() {
            tracing::info!(
                reference = %tx_ref,
                status = ?payment.status,
                "verify on settled payment; reporting stored state"
            );
            return Ok(payment.status == PaymentStatus::Completed);
        }

        let verified = self
            .gateway
            .verify(tx_ref)
            .await
            .map_err(|e| ApiError::Gateway(e.detail()))?;

        let status = payment.status.settle(verified);
        self.set_status(payment.id, status).await?;

        tracing::info!(reference = %tx_ref, status = ?status, "payment settled");
        Ok(verified)
    }

    // ===== Administrative CRUD =====

    pub async fn list_payments(
        &self,
        pagination: PaginationParams,
    ) -> Result<Vec<Payment>, ApiError> {
        let (limit, offset) = pagination.limit_offset();

        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(payments)
    }

    pub async fn get_payment(&self, id: i64) -> Result<Payment, ApiError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(ApiError::NotFound("Payment"))
    }

    // ===== Private Helper Methods =====

    /// Call the gateway's initialize endpoint for an already-created
    /// Pending payment; record the transaction id (falling back to the
    /// reference when the gateway omits one) or mark the payment Failed.
    async fn initialize_checkout(
        &self,
        payment: Payment,
        payer: &Payer,
    ) -> Result<String, serde_json::Value> {
        let request = InitializePayment {
            amount: payment.amount,
            currency: self.currency.clone(),
            email: payer.email.clone(),
            first_name: payer.first_name.clone(),
            last_name: payer.last_name.clone(),
            tx_ref: payment.booking_reference.clone(),
            callback_url: self.callback_url.clone(),
            return_url: self.return_url.clone(),
        };

        match self.gateway.initialize(request).await {
            Ok(session) => {
                let transaction_id = session
                    .transaction_id
                    .unwrap_or_else(|| payment.booking_reference.clone());
                if let Err(e) = self
                    .set_transaction_id(payment.id, &transaction_id)
                    .await
                {
                    tracing::error!(error = %e, "failed to record gateway transaction id");
                }
                Ok(session.checkout_url)
            }
            Err(gateway_err) => {
                if let Err(e) = self.set_status(payment.id, PaymentStatus::Failed).await {
                    tracing::error!(error = %e, "failed to mark payment as Failed");
                }
                Err(gateway_err.detail())
            }
        }
    }

    async fn ensure_booking_exists(&self, reference: &str) -> Result<(), ApiError> {
        let booking_id: Uuid = reference
            .parse()
            .map_err(|_| ApiError::NotFound("Booking"))?;

        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM bookings WHERE booking_id = $1)")
                .bind(booking_id)
                .fetch_one(&self.db_pool)
                .await?;

        if !exists.0 {
            return Err(ApiError::NotFound("Booking"));
        }
        Ok(())
    }

    async fn set_transaction_id(&self, id: i64, transaction_id: &str) -> Result<(), ApiError> {
        sqlx::query("UPDATE payments SET transaction_id = $1 WHERE id = $2")
            .bind(transaction_id)
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }

    async fn set_status(&self, id: i64, status: PaymentStatus) -> Result<(), ApiError> {
        sqlx::query("UPDATE payments SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }
}
